//! Behaviour every store implementation must share.

#![allow(dead_code)]

use chirp_store::{ContentStore, GraphStore, MemoryStore, SqliteStore, StoreError, User};
use chirp_types::{ContentId, ContentRecord, Timestamp, UserId};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

/// Fixture hooks the traits do not cover.
pub trait TestStore: ContentStore + GraphStore {
    fn user(&self, name: &str) -> User;
    fn insert(&self, record: &ContentRecord);
}

impl TestStore for MemoryStore {
    fn user(&self, name: &str) -> User {
        self.create_user(name).unwrap()
    }

    fn insert(&self, record: &ContentRecord) {
        self.insert_record(record).unwrap();
    }
}

impl TestStore for SqliteStore {
    fn user(&self, name: &str) -> User {
        self.create_user(name).unwrap()
    }

    fn insert(&self, record: &ContentRecord) {
        self.insert_record(record).unwrap();
    }
}

fn set(ids: &[UserId]) -> BTreeSet<UserId> {
    ids.iter().copied().collect()
}

// ── Content ──────────────────────────────────────────────────────

pub fn create_and_get<S: TestStore>(store: &S) {
    let john = store.user("john");
    let record = store.create_record(john.id, "hello world").unwrap();

    assert_eq!(record.author, john.id);
    assert_eq!(record.body, "hello world");
    assert_eq!(store.get_record(record.id).unwrap(), record);
}

pub fn create_assigns_distinct_ids_and_monotonic_timestamps<S: TestStore>(store: &S) {
    let john = store.user("john");
    let mut last: Option<ContentRecord> = None;
    for n in 0..20 {
        let record = store.create_record(john.id, &format!("post {n}")).unwrap();
        if let Some(prev) = &last {
            assert_ne!(record.id, prev.id);
            assert!(record.created_at >= prev.created_at);
        }
        last = Some(record);
    }
}

pub fn create_after_future_record_stays_monotonic<S: TestStore>(store: &S) {
    let john = store.user("john");
    let future = Timestamp::from_millis(Timestamp::now().as_millis() + 3_600_000);
    store.insert(&ContentRecord::new(ContentId::new(1), john.id, "from the future", future));

    let next = store.create_record(john.id, "now").unwrap();
    assert!(next.created_at >= future);
    assert_ne!(next.id, ContentId::new(1));
}

pub fn create_for_unknown_author_is_not_found<S: TestStore>(store: &S) {
    let err = store.create_record(UserId::new(404), "ghost").unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

pub fn get_missing_is_not_found<S: TestStore>(store: &S) {
    let err = store.get_record(ContentId::new(404)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
}

pub fn delete_returns_record<S: TestStore>(store: &S) {
    let john = store.user("john");
    let record = store.create_record(john.id, "short lived").unwrap();

    assert_eq!(store.delete_record(record.id).unwrap(), record);
    assert!(store.get_record(record.id).unwrap_err().is_not_found());
    assert!(store.delete_record(record.id).unwrap_err().is_not_found());
}

pub fn list_by_authors_filters<S: TestStore>(store: &S) {
    let john = store.user("john");
    let susan = store.user("susan");
    let mary = store.user("mary");
    let a = store.create_record(john.id, "from john").unwrap();
    let b = store.create_record(susan.id, "from susan").unwrap();
    store.create_record(mary.id, "from mary").unwrap();

    let mut found = store.list_by_authors(&set(&[john.id, susan.id])).unwrap();
    found.sort_by_key(|r| r.id);
    assert_eq!(found, vec![a, b]);
}

pub fn list_by_no_authors_is_empty<S: TestStore>(store: &S) {
    let john = store.user("john");
    store.create_record(john.id, "post").unwrap();
    assert!(store.list_by_authors(&BTreeSet::new()).unwrap().is_empty());
}

pub fn insert_keeps_timestamp<S: TestStore>(store: &S) {
    let john = store.user("john");
    let record = ContentRecord::new(ContentId::new(50), john.id, "fixed", Timestamp::from_millis(1_000));
    store.insert(&record);
    assert_eq!(store.get_record(ContentId::new(50)).unwrap(), record);
}

// ── Graph ────────────────────────────────────────────────────────

pub fn follow_and_unfollow<S: TestStore>(store: &S) {
    let john = store.user("john");
    let susan = store.user("susan");

    assert!(store.followees_of(john.id).unwrap().is_empty());
    assert!(store.followers_of(john.id).unwrap().is_empty());

    assert!(store.add_edge(john.id, susan.id).unwrap());
    assert!(store.has_edge(john.id, susan.id).unwrap());
    assert!(!store.has_edge(susan.id, john.id).unwrap());
    assert_eq!(store.followees_of(john.id).unwrap(), set(&[susan.id]));
    assert_eq!(store.followers_of(susan.id).unwrap(), set(&[john.id]));

    assert!(store.remove_edge(john.id, susan.id).unwrap());
    assert!(!store.has_edge(john.id, susan.id).unwrap());
    assert!(store.followees_of(john.id).unwrap().is_empty());
    assert!(store.followers_of(susan.id).unwrap().is_empty());
}

pub fn edge_mutations_are_idempotent<S: TestStore>(store: &S) {
    let john = store.user("john");
    let susan = store.user("susan");

    assert!(store.add_edge(john.id, susan.id).unwrap());
    assert!(!store.add_edge(john.id, susan.id).unwrap());
    assert_eq!(store.followees_of(john.id).unwrap().len(), 1);

    assert!(store.remove_edge(john.id, susan.id).unwrap());
    assert!(!store.remove_edge(john.id, susan.id).unwrap());
    assert!(store.followees_of(john.id).unwrap().is_empty());
}

pub fn self_edge_is_allowed<S: TestStore>(store: &S) {
    let john = store.user("john");
    assert!(store.add_edge(john.id, john.id).unwrap());
    assert_eq!(store.followees_of(john.id).unwrap(), set(&[john.id]));
}

pub fn edges_to_unknown_users_are_not_found<S: TestStore>(store: &S) {
    let john = store.user("john");
    let ghost = UserId::new(404);

    assert!(store.add_edge(john.id, ghost).unwrap_err().is_not_found());
    assert!(store.remove_edge(ghost, john.id).unwrap_err().is_not_found());
    assert!(store.followees_of(ghost).unwrap_err().is_not_found());
    assert!(store.followers_of(ghost).unwrap_err().is_not_found());
}

pub fn followees_are_per_user<S: TestStore>(store: &S) {
    let u: Vec<User> = ["john", "susan", "mary", "david"]
        .iter()
        .map(|name| store.user(name))
        .collect();

    store.add_edge(u[0].id, u[1].id).unwrap();
    store.add_edge(u[0].id, u[3].id).unwrap();
    store.add_edge(u[1].id, u[2].id).unwrap();
    store.add_edge(u[2].id, u[3].id).unwrap();

    assert_eq!(store.followees_of(u[0].id).unwrap(), set(&[u[1].id, u[3].id]));
    assert_eq!(store.followees_of(u[1].id).unwrap(), set(&[u[2].id]));
    assert_eq!(store.followees_of(u[2].id).unwrap(), set(&[u[3].id]));
    assert!(store.followees_of(u[3].id).unwrap().is_empty());
    assert_eq!(store.followers_of(u[3].id).unwrap(), set(&[u[0].id, u[2].id]));
}
