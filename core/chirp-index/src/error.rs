//! Error types for the search index.

use chirp_types::PageError;
use thiserror::Error;

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur in index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index location could not be created, opened or locked.
    #[error("index unavailable: {0}")]
    Unavailable(String),

    /// A write or commit failed after the write lock was held.
    /// The transaction has been rolled back.
    #[error("index write failed: {0}")]
    WriteFailed(String),

    /// The query text could not be parsed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The requested page was invalid.
    #[error(transparent)]
    Page(#[from] PageError),
}

impl IndexError {
    pub(crate) fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }
}
