//! Error types for access resolution

use thiserror::Error;

/// Result type for access operations
pub type Result<T> = std::result::Result<T, AccessError>;

/// Access error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Visibility value outside hidden/constituents/public
    #[error("Invalid visibility: {0}")]
    InvalidVisibility(String),
}
