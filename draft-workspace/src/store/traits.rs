//! Core trait for storage backends.
//!
//! Each call is a single atomic request/response. Implementations provide
//! at least read-committed, single-row atomic writes; the workspace adds no
//! locking of its own, so concurrent writes to one draft are last-write-wins.

use async_trait::async_trait;
use draft_access::{CommentId, DocumentId, EntityId, IdentityId, OwningEntity};

use crate::document::{Comment, DraftDocument};

/// Error types for storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    #[error("Owning entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Timeout, lost connection or similar
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = std::result::Result<T, StorageError>;

/// Persistence for drafts, comments, owning entities and delegate links.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Load one draft.
    async fn load_document(&self, id: DocumentId) -> StoreResult<DraftDocument>;

    /// Insert a draft whose id is unassigned, or overwrite an existing one.
    ///
    /// Saving with an assigned id that no longer exists fails with
    /// `DocumentNotFound` rather than recreating a deleted draft.
    async fn save_document(&self, document: DraftDocument) -> StoreResult<DocumentId>;

    /// Remove a draft and all of its comments.
    async fn delete_document(&self, id: DocumentId) -> StoreResult<()>;

    /// Drafts of one owner, or of every owner, newest first.
    async fn list_documents(&self, owner: Option<EntityId>) -> StoreResult<Vec<DraftDocument>>;

    /// Entity the identity currently serves as staff, if any.
    async fn load_delegate_linkage(&self, identity: IdentityId) -> StoreResult<Option<EntityId>>;

    /// Insert a comment. Its document must exist.
    async fn save_comment(&self, comment: Comment) -> StoreResult<CommentId>;

    /// Comments on one draft, oldest first.
    async fn list_comments(&self, document: DocumentId) -> StoreResult<Vec<Comment>>;

    /// Remove one comment.
    async fn delete_comment(&self, id: CommentId) -> StoreResult<()>;

    /// Load one owning entity.
    async fn load_entity(&self, id: EntityId) -> StoreResult<OwningEntity>;

    /// Every owning entity, ordered by id.
    async fn list_owning_entities(&self) -> StoreResult<Vec<OwningEntity>>;
}
