//! Search results resolved to stored records.

use crate::error::FeedResult;
use chirp_index::SearchIndex;
use chirp_store::ContentStore;
use chirp_types::{ContentRecord, Page};
use std::sync::Arc;
use tracing::debug;

/// Runs index queries and loads the matching records.
#[derive(Clone)]
pub struct SearchService {
    index: Arc<SearchIndex>,
    content: Arc<dyn ContentStore>,
}

impl SearchService {
    pub fn new(index: Arc<SearchIndex>, content: Arc<dyn ContentStore>) -> Self {
        Self { index, content }
    }

    /// One page of records matching `text`, best match first.
    ///
    /// A hit whose record has since left the store is dropped from `items`
    /// but still counted in `total`, which describes the index at query
    /// time. Any other store failure is returned.
    pub fn search(
        &self,
        text: &str,
        page: u32,
        page_size: u32,
    ) -> FeedResult<Page<ContentRecord>> {
        let hits = self.index.query(text, page, page_size)?;

        let mut items = Vec::with_capacity(hits.ids.len());
        for id in &hits.ids {
            match self.content.get_record(*id) {
                Ok(record) => items.push(record),
                Err(e) if e.is_not_found() => {
                    debug!(content_id = %id, "Indexed content missing from store, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        debug!(query = text, page = page, hits = hits.total, resolved = items.len(), "Search");
        Ok(Page::from_parts(items, hits.total, hits.request))
    }
}
