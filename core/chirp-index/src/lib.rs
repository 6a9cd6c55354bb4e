//! Full-text search index for Chirp content.
//!
//! Keeps an on-disk text index in step with content mutations and answers
//! ranked free-text queries against it.
//!
//! # Architecture
//!
//! - One index lives in one directory and is backed by a single SQLite
//!   file using the FTS5 extension
//! - `documents` maps each content identifier (stored verbatim as text,
//!   unique) to the row holding its tokenized body in `postings`
//! - Opening a directory that already holds an index reuses it; nothing
//!   is ever recreated on open
//! - Writes take the handle's writer lock plus an `IMMEDIATE` transaction;
//!   queries use their own connection and read one WAL snapshot
//!
//! # Example
//!
//! ```no_run
//! use chirp_index::SearchIndex;
//! use chirp_types::{ContentId, ContentRecord, Timestamp, UserId};
//!
//! let index = SearchIndex::ensure("/var/lib/chirp/index")?;
//! let record = ContentRecord::new(ContentId::new(1), UserId::new(1), "the quick fox", Timestamp::now());
//! index.add(&record)?;
//!
//! let hits = index.query("quick", 1, 10)?;
//! assert_eq!(hits.total, 1);
//! # Ok::<(), chirp_index::IndexError>(())
//! ```

mod error;
mod index;
mod query;
mod registry;

pub use error::{IndexError, IndexResult};
pub use index::{QueryHits, SearchIndex, INDEX_FILE, SCHEMA_VERSION};
pub use query::{QueryNode, SearchQuery, MAX_NESTING};
pub use registry::IndexRegistry;
