//! Storage collaborator.
//!
//! The workspace never touches a database directly. Everything it persists
//! or reads goes through the [`DraftStore`] trait:
//! - `MemoryDraftStore` for tests and embedding
//! - a relational implementation supplied by the host application

pub mod memory;
pub mod traits;

pub use memory::MemoryDraftStore;
pub use traits::{DraftStore, StorageError, StoreResult};
