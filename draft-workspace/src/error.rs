//! Error types for workspace operations

use crate::audit::Operation;
use crate::store::StorageError;
use draft_access::{AccessError, ActorKind};
use thiserror::Error;

/// Result type for workspace operations
pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Every failure a lifecycle operation can report.
///
/// Each variant names the precondition that failed; nothing is partially
/// applied when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    /// Resolved actor lacks the capability the operation needs
    #[error("Forbidden: {actor} may not {operation}")]
    Forbidden { operation: Operation, actor: ActorKind },

    /// Document, comment or owning entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Visibility value outside hidden/constituents/public
    #[error("Invalid visibility: {0}")]
    InvalidVisibility(String),

    /// Caller-supplied text failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage collaborator failed; not retried here
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl WorkspaceError {
    pub(crate) fn forbidden(operation: Operation, actor: ActorKind) -> Self {
        Self::Forbidden { operation, actor }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<StorageError> for WorkspaceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DocumentNotFound(id) => Self::NotFound(format!("document {id}")),
            StorageError::CommentNotFound(id) => Self::NotFound(format!("comment {id}")),
            StorageError::EntityNotFound(id) => Self::NotFound(format!("owning entity {id}")),
            StorageError::Unavailable(reason) => Self::StorageUnavailable(reason),
        }
    }
}

impl From<AccessError> for WorkspaceError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::InvalidVisibility(value) => Self::InvalidVisibility(value),
        }
    }
}
