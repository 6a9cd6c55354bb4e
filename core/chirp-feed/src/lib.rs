//! Feeds, search and publishing for Chirp.
//!
//! Ties the content and follow-graph stores to the search index:
//!
//! - **Feed aggregator**: timelines built from the follow graph, newest first
//! - **Search service**: index hits resolved to stored records
//! - **Publisher**: content writes followed by the matching index update
//! - **Chirp**: all three over one store and one index, using
//!   [`ChirpConfig`] for the index location and page size
//!
//! # Example
//!
//! ```no_run
//! use chirp_feed::{Chirp, ChirpConfig};
//! use chirp_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let john = store.create_user("john")?;
//!
//! let chirp = Chirp::open(ChirpConfig::from_env()?, Arc::clone(&store))?;
//! chirp.publish(john.id, "hello from john")?;
//!
//! let timeline = chirp.timeline(john.id, 1)?;
//! assert_eq!(timeline.total, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod aggregator;
mod app;
mod config;
mod error;
mod publisher;
mod search;

pub use aggregator::FeedAggregator;
pub use app::Chirp;
pub use config::{
    ChirpConfig, DEFAULT_INDEX_DIR, DEFAULT_POSTS_PER_PAGE, ENV_INDEX_DIR, ENV_POSTS_PER_PAGE,
};
pub use error::{FeedError, FeedResult};
pub use publisher::Publisher;
pub use search::SearchService;
