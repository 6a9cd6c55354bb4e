//! Content writes that keep the search index in step.

use crate::error::FeedResult;
use chirp_index::SearchIndex;
use chirp_store::ContentStore;
use chirp_types::{ContentId, ContentRecord, UserId};
use std::sync::Arc;
use tracing::{info, warn};

/// Creates and deletes content, updating the index after each store write.
///
/// The store write lands first. If the index update then fails the error
/// is returned as is; nothing is retried or rolled back.
#[derive(Clone)]
pub struct Publisher {
    index: Arc<SearchIndex>,
    content: Arc<dyn ContentStore>,
}

impl Publisher {
    pub fn new(index: Arc<SearchIndex>, content: Arc<dyn ContentStore>) -> Self {
        Self { index, content }
    }

    /// Stores a new record by `author` and indexes it.
    pub fn publish(&self, author: UserId, body: &str) -> FeedResult<ContentRecord> {
        let record = self.content.create_record(author, body)?;
        self.index.add(&record).inspect_err(|e| {
            warn!(content_id = %record.id, error = %e, "Stored content could not be indexed");
        })?;
        info!(content_id = %record.id, author = %author, "Published");
        Ok(record)
    }

    /// Deletes a record and drops it from the index.
    pub fn retract(&self, id: ContentId) -> FeedResult<ContentRecord> {
        let record = self.content.delete_record(id)?;
        self.index.remove(&record).inspect_err(|e| {
            warn!(content_id = %id, error = %e, "Deleted content is still indexed");
        })?;
        info!(content_id = %id, "Retracted");
        Ok(record)
    }
}
