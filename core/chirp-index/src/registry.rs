//! Shared index handles keyed by location.
//!
//! Each location must be backed by exactly one [`SearchIndex`] per process
//! so that all writers to it go through the same writer lock. The registry
//! hands out that one handle and offers the location-addressed operations
//! (`add`, `remove`, `query`) on top of it. A handle stays registered until
//! [`IndexRegistry::close`] drops it.

use crate::error::{IndexError, IndexResult};
use crate::index::{QueryHits, SearchIndex};
use chirp_types::ContentRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Process-wide map from index location to its shared handle.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    indexes: Mutex<HashMap<PathBuf, Arc<SearchIndex>>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `location`, creating the index if needed.
    pub fn ensure_index(&self, location: impl AsRef<Path>) -> IndexResult<Arc<SearchIndex>> {
        let location = location.as_ref();
        std::fs::create_dir_all(location).map_err(|e| {
            IndexError::Unavailable(format!(
                "failed to create index directory {}: {e}",
                location.display()
            ))
        })?;
        let key = canonical(location)?;
        self.get_or_open(key)
    }

    /// Returns the handle for an index that already exists at `location`.
    ///
    /// Fails with [`IndexError::Unavailable`] instead of creating one.
    pub fn open_index(&self, location: impl AsRef<Path>) -> IndexResult<Arc<SearchIndex>> {
        let location = location.as_ref();
        if !SearchIndex::exists(location) {
            return Err(IndexError::Unavailable(format!(
                "no index at {}",
                location.display()
            )));
        }
        let key = canonical(location)?;
        self.get_or_open(key)
    }

    /// Indexes `record` at `location`, creating the index if needed.
    pub fn add(&self, location: impl AsRef<Path>, record: &ContentRecord) -> IndexResult<()> {
        self.ensure_index(location)?.add(record)
    }

    /// Removes `record` from the index at `location`.
    pub fn remove(&self, location: impl AsRef<Path>, record: &ContentRecord) -> IndexResult<bool> {
        self.open_index(location)?.remove(record)
    }

    /// Queries the index at `location`.
    pub fn query(
        &self,
        location: impl AsRef<Path>,
        text: &str,
        page: u32,
        page_size: u32,
    ) -> IndexResult<QueryHits> {
        self.open_index(location)?.query(text, page, page_size)
    }

    /// Forgets the handle for `location`. Returns false if none was open.
    ///
    /// Callers still holding the `Arc` keep a working handle; the next
    /// `ensure_index` opens a fresh one. Do not write through an old handle
    /// once a new one exists.
    pub fn close(&self, location: impl AsRef<Path>) -> bool {
        let location = location.as_ref();
        let key = location
            .canonicalize()
            .unwrap_or_else(|_| location.to_path_buf());
        let closed = self
            .indexes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some();
        if closed {
            debug!(location = %key.display(), "Closed index handle");
        }
        closed
    }

    /// Number of open handles.
    pub fn len(&self) -> usize {
        self.indexes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_or_open(&self, key: PathBuf) -> IndexResult<Arc<SearchIndex>> {
        // Held across `ensure` so two callers cannot open the same location twice.
        let mut indexes = self.indexes.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = indexes.get(&key) {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(SearchIndex::ensure(&key)?);
        indexes.insert(key, Arc::clone(&index));
        Ok(index)
    }
}

fn canonical(location: &Path) -> IndexResult<PathBuf> {
    location.canonicalize().map_err(|e| {
        IndexError::Unavailable(format!("failed to resolve {}: {e}", location.display()))
    })
}
