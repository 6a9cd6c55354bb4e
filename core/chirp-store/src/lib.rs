//! Content and follow-graph stores for Chirp.
//!
//! The core reads content and follow edges through two narrow traits,
//! [`ContentStore`] and [`GraphStore`]. The relational store that backs
//! them in production is outside the core; this crate ships the traits
//! plus two implementations:
//!
//! - [`MemoryStore`]: lock-guarded maps, for tests and embedding
//! - [`SqliteStore`]: `users`, `posts` and `followers` tables in SQLite
//!
//! Both assign record ids and creation timestamps themselves. Timestamps
//! never go backwards within one store.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ContentStore, GraphStore, User};
