//! Error types for the feed layer.

use chirp_index::IndexError;
use chirp_store::StoreError;
use chirp_types::PageError;
use thiserror::Error;

/// Result type for feed, search and publish operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors that can occur in feed, search and publish operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Content or follow-graph store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Search index error.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// The requested page was invalid.
    #[error(transparent)]
    Page(#[from] PageError),

    /// Configuration could not be loaded or was out of range.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FeedError {
    /// True when a user or record was missing from the store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}
