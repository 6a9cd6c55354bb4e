//! The store interfaces consumed by the feed and search services.

use crate::error::StoreResult;
use chirp_types::{ContentId, ContentRecord, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// Read and write access to content records.
pub trait ContentStore: Send + Sync {
    /// Fetches one record. Fails with `NotFound` if it does not exist.
    fn get_record(&self, id: ContentId) -> StoreResult<ContentRecord>;

    /// Fetches every record written by any of `authors`, in no particular
    /// order.
    fn list_by_authors(&self, authors: &BTreeSet<UserId>) -> StoreResult<Vec<ContentRecord>>;

    /// Creates a record, assigning its id and creation timestamp.
    /// Fails with `NotFound` if the author does not exist.
    fn create_record(&self, author: UserId, body: &str) -> StoreResult<ContentRecord>;

    /// Deletes a record and returns it. Fails with `NotFound` if absent.
    fn delete_record(&self, id: ContentId) -> StoreResult<ContentRecord>;
}

/// Read and write access to follow edges.
///
/// Edge mutations are idempotent: adding an existing edge or removing a
/// missing one succeeds and reports `false`. Both endpoints must be known
/// users, otherwise the call fails with `NotFound`.
pub trait GraphStore: Send + Sync {
    /// Adds `follower -> followee`. Returns `true` if the edge is new.
    fn add_edge(&self, follower: UserId, followee: UserId) -> StoreResult<bool>;

    /// Removes `follower -> followee`. Returns `true` if an edge was removed.
    fn remove_edge(&self, follower: UserId, followee: UserId) -> StoreResult<bool>;

    /// Everyone `user` follows.
    fn followees_of(&self, user: UserId) -> StoreResult<BTreeSet<UserId>>;

    /// Everyone following `user`.
    fn followers_of(&self, user: UserId) -> StoreResult<BTreeSet<UserId>>;

    /// True if `follower -> followee` exists.
    fn has_edge(&self, follower: UserId, followee: UserId) -> StoreResult<bool> {
        Ok(self.followees_of(follower)?.contains(&followee))
    }
}
