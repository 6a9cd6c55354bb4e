//! Records read from the content and graph stores.
//!
//! The core never owns these: the content store creates and deletes
//! records, the index holds an extract of each one, and the feed only
//! reads them.

use crate::{ContentId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A piece of authored content as held by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Store-assigned identifier.
    pub id: ContentId,
    /// Body text, arbitrary length.
    pub body: String,
    /// The author.
    pub author: UserId,
    /// Creation time, assigned once by the store.
    pub created_at: Timestamp,
}

impl ContentRecord {
    /// Creates a record from its parts.
    pub fn new(id: ContentId, author: UserId, body: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id,
            body: body.into(),
            author,
            created_at,
        }
    }

    /// Returns the extract of this record that goes into the search index.
    #[must_use]
    pub fn to_document(&self) -> IndexDocument {
        IndexDocument {
            id: self.id,
            body: self.body.clone(),
        }
    }
}

/// The searchable extract of a content record.
///
/// At most one document exists per `id` in an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Mirrors the record identifier.
    pub id: ContentId,
    /// Tokenized for full-text search.
    pub body: String,
}

impl From<&ContentRecord> for IndexDocument {
    fn from(record: &ContentRecord) -> Self {
        record.to_document()
    }
}

/// A directed follow relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower: UserId,
    pub followee: UserId,
}

impl FollowEdge {
    #[must_use]
    pub const fn new(follower: UserId, followee: UserId) -> Self {
        Self { follower, followee }
    }

    /// True when a user follows themselves.
    #[must_use]
    pub fn is_self_edge(&self) -> bool {
        self.follower == self.followee
    }
}
