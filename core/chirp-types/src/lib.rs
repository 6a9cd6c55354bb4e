//! Core type definitions for Chirp.
//!
//! This crate defines the plain data shared by the index, store and feed
//! crates:
//! - Content and user identifiers (integer keys with a string form)
//! - Millisecond creation timestamps
//! - Content records, index documents and follow edges
//! - The 1-indexed page slicing contract used by both search and feeds
//!
//! Nothing here performs I/O.

mod ids;
mod page;
mod record;
mod timestamp;

pub use ids::{ContentId, UserId};
pub use page::{Page, PageError, PageRequest, PageResult};
pub use record::{ContentRecord, FollowEdge, IndexDocument};
pub use timestamp::Timestamp;
