//! Error types for the storage boundary.

use thiserror::Error;

use crate::PostId;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Post does not exist.
    #[error("post not found: {0}")]
    PostNotFound(PostId),

    /// Scheduling fields of a published post cannot be changed.
    #[error("post already published: {0}")]
    PostImmutable(PostId),

    /// Backend-specific failure (connection, query, constraint).
    #[error("storage backend error: {0}")]
    Backend(String),
}
