//! In-memory store.

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, GraphStore, User};
use chirp_types::{ContentId, ContentRecord, FollowEdge, Timestamp, UserId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    records: BTreeMap<ContentId, ContentRecord>,
    edges: BTreeSet<FollowEdge>,
    next_user: i64,
    next_record: i64,
    last_created: Option<Timestamp>,
}

impl MemoryState {
    fn require_user(&self, id: UserId) -> StoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("user {id}")))
        }
    }

    fn next_timestamp(&mut self) -> Timestamp {
        let ts = match self.last_created {
            Some(last) => last.tick(),
            None => Timestamp::now(),
        };
        self.last_created = Some(ts);
        ts
    }
}

/// A [`ContentStore`] and [`GraphStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a user. Fails with `Conflict` if the name is taken.
    pub fn create_user(&self, username: &str) -> StoreResult<User> {
        let mut state = self.write();
        if state.users.values().any(|u| u.username == username) {
            return Err(StoreError::Conflict(format!("username {username:?} is taken")));
        }
        state.next_user += 1;
        let user = User {
            id: UserId::new(state.next_user),
            username: username.to_string(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Looks up a user by id.
    pub fn user(&self, id: UserId) -> StoreResult<User> {
        self.read()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    /// Inserts a fully formed record, keeping its id and timestamp.
    ///
    /// Replaces any record with the same id. Used to load existing data
    /// and to build fixtures with explicit timestamps.
    pub fn insert_record(&self, record: &ContentRecord) -> StoreResult<()> {
        let mut state = self.write();
        state.require_user(record.author)?;
        state.next_record = state.next_record.max(record.id.get());
        if state.last_created.is_none_or(|last| record.created_at > last) {
            state.last_created = Some(record.created_at);
        }
        state.records.insert(record.id, record.clone());
        Ok(())
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.read().records.len()
    }
}

impl ContentStore for MemoryStore {
    fn get_record(&self, id: ContentId) -> StoreResult<ContentRecord> {
        self.read()
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("content {id}")))
    }

    fn list_by_authors(&self, authors: &BTreeSet<UserId>) -> StoreResult<Vec<ContentRecord>> {
        Ok(self
            .read()
            .records
            .values()
            .filter(|r| authors.contains(&r.author))
            .cloned()
            .collect())
    }

    fn create_record(&self, author: UserId, body: &str) -> StoreResult<ContentRecord> {
        let mut state = self.write();
        state.require_user(author)?;
        state.next_record += 1;
        let id = ContentId::new(state.next_record);
        let created_at = state.next_timestamp();
        let record = ContentRecord::new(id, author, body, created_at);
        state.records.insert(id, record.clone());
        debug!(content_id = %id, author = %author, "Created record");
        Ok(record)
    }

    fn delete_record(&self, id: ContentId) -> StoreResult<ContentRecord> {
        self.write()
            .records
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("content {id}")))
    }
}

impl GraphStore for MemoryStore {
    fn add_edge(&self, follower: UserId, followee: UserId) -> StoreResult<bool> {
        let mut state = self.write();
        state.require_user(follower)?;
        state.require_user(followee)?;
        Ok(state.edges.insert(FollowEdge::new(follower, followee)))
    }

    fn remove_edge(&self, follower: UserId, followee: UserId) -> StoreResult<bool> {
        let mut state = self.write();
        state.require_user(follower)?;
        state.require_user(followee)?;
        Ok(state.edges.remove(&FollowEdge::new(follower, followee)))
    }

    fn followees_of(&self, user: UserId) -> StoreResult<BTreeSet<UserId>> {
        let state = self.read();
        state.require_user(user)?;
        // Edges sort by follower first, so one user's followees are contiguous.
        let lo = FollowEdge::new(user, UserId::new(i64::MIN));
        let hi = FollowEdge::new(user, UserId::new(i64::MAX));
        Ok(state.edges.range(lo..=hi).map(|e| e.followee).collect())
    }

    fn followers_of(&self, user: UserId) -> StoreResult<BTreeSet<UserId>> {
        let state = self.read();
        state.require_user(user)?;
        Ok(state
            .edges
            .iter()
            .filter(|e| e.followee == user)
            .map(|e| e.follower)
            .collect())
    }

    fn has_edge(&self, follower: UserId, followee: UserId) -> StoreResult<bool> {
        let state = self.read();
        state.require_user(follower)?;
        state.require_user(followee)?;
        Ok(state.edges.contains(&FollowEdge::new(follower, followee)))
    }
}
