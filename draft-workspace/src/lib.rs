//! Draft Workspace - lifecycle of a representative's draft bills
//!
//! Creation, editing, visibility changes, deletion and commenting on draft
//! bills, with every request checked against the decisions in
//! [`draft_access`]. Persistence sits behind the [`DraftStore`] trait so the
//! same lifecycle runs over any backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                     DraftWorkspace                     │
//! │  create · update · change_visibility · delete          │
//! │  add_comment · delete_comment · list_visible           │
//! │  get_comments · view · statistics · workspace_entity   │
//! └──────────┬──────────────────┬────────────────┬─────────┘
//!            │                  │                │
//!   ┌────────▼───────┐  ┌───────▼──────┐  ┌──────▼─────┐
//!   │  draft-access  │  │  DraftStore  │  │  AuditLog  │
//!   │ actor + perms  │  │   (trait)    │  │            │
//!   └────────────────┘  └──────────────┘  └────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use draft_workspace::{DraftWorkspace, MemoryDraftStore, NewDraft};
//! use draft_access::{DistrictTag, EntityId, OwningEntity, SessionIdentity};
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryDraftStore::new());
//! store.register_entity(OwningEntity::new(1, "Rep. Alvarez", DistrictTag::new("MO-05")));
//! let workspace = DraftWorkspace::new(store);
//!
//! let rep = SessionIdentity::representative(7, EntityId(1));
//! let id = workspace
//!     .create(Some(&rep), NewDraft::new(EntityId(1), "Clean Water Act", "Be it enacted..."))
//!     .await
//!     .unwrap();
//!
//! // Drafts start hidden
//! assert!(workspace.list_visible(None, None).await.unwrap().is_empty());
//! assert!(workspace.view(Some(&rep), id).await.is_ok());
//! # });
//! ```

pub mod audit;
pub mod config;
pub mod document;
pub mod error;
pub mod manager;
pub mod store;
pub mod telemetry;

pub use audit::{AuditEntry, AuditLog, AuditStats, Operation, Outcome};
pub use config::{AuditConfig, LimitsConfig, LogFormat, LoggingConfig, WorkspaceConfig};
pub use document::{Comment, DraftDocument, DraftStatistics, DraftUpdate, DraftView, NewDraft};
pub use error::{Result, WorkspaceError};
pub use manager::DraftWorkspace;
pub use store::{DraftStore, MemoryDraftStore, StorageError, StoreResult};
pub use telemetry::init_tracing;
