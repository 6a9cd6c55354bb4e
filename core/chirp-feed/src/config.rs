//! Runtime configuration.

use crate::error::{FeedError, FeedResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory holding the search index.
pub const DEFAULT_INDEX_DIR: &str = "index";

/// Default number of items per feed or search page.
pub const DEFAULT_POSTS_PER_PAGE: u32 = 5;

/// Environment variable overriding [`ChirpConfig::index_dir`].
pub const ENV_INDEX_DIR: &str = "CHIRP_INDEX_DIR";

/// Environment variable overriding [`ChirpConfig::posts_per_page`].
pub const ENV_POSTS_PER_PAGE: &str = "CHIRP_POSTS_PER_PAGE";

/// Configuration for a [`Chirp`](crate::Chirp) instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChirpConfig {
    /// Directory holding the search index. Created on first use.
    pub index_dir: PathBuf,
    /// Items per page for timelines, profiles and search results.
    pub posts_per_page: u32,
}

impl Default for ChirpConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from(DEFAULT_INDEX_DIR),
            posts_per_page: DEFAULT_POSTS_PER_PAGE,
        }
    }
}

impl ChirpConfig {
    /// Reads overrides from `CHIRP_INDEX_DIR` and `CHIRP_POSTS_PER_PAGE`,
    /// keeping defaults for anything unset.
    pub fn from_env() -> FeedResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FeedResult<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_INDEX_DIR).filter(|d| !d.trim().is_empty()) {
            config.index_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_POSTS_PER_PAGE) {
            config.posts_per_page = raw.trim().parse().map_err(|e| {
                FeedError::Config(format!("{ENV_POSTS_PER_PAGE}={raw:?} is not a page size: {e}"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no instance can run with.
    pub fn validate(&self) -> FeedResult<()> {
        if self.posts_per_page == 0 {
            return Err(FeedError::Config(
                "posts_per_page must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
