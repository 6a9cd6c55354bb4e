use chirp_index::{IndexError, IndexRegistry};
use chirp_types::{ContentId, ContentRecord, Timestamp, UserId};
use std::sync::Arc;
use tempfile::TempDir;

fn post(id: i64, body: &str) -> ContentRecord {
    ContentRecord::new(ContentId::new(id), UserId::new(1), body, Timestamp::now())
}

// ── Handles ──────────────────────────────────────────────────────

#[test]
fn same_location_shares_one_handle() {
    let dir = TempDir::new().unwrap();
    let registry = IndexRegistry::new();

    let a = registry.ensure_index(dir.path().join("index")).unwrap();
    let b = registry
        .ensure_index(dir.path().join("index").join("..").join("index"))
        .unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 1);
}

#[test]
fn different_locations_get_different_handles() {
    let dir = TempDir::new().unwrap();
    let registry = IndexRegistry::new();

    let a = registry.ensure_index(dir.path().join("one")).unwrap();
    let b = registry.ensure_index(dir.path().join("two")).unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 2);
}

#[test]
fn open_missing_index_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let registry = IndexRegistry::new();

    let err = registry.open_index(dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, IndexError::Unavailable(_)), "got {err:?}");
    assert!(registry.is_empty());
}

#[test]
fn close_forgets_the_handle() {
    let dir = TempDir::new().unwrap();
    let registry = IndexRegistry::new();
    let location = dir.path().join("index");

    let first = registry.ensure_index(&location).unwrap();
    first.add(&post(1, "kept across handles")).unwrap();

    assert!(registry.close(&location));
    assert!(registry.is_empty());
    assert!(!registry.close(&location));

    let second = registry.ensure_index(&location).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.contains(ContentId::new(1)).unwrap());
    assert_eq!(registry.len(), 1);
}

#[test]
fn close_unknown_location_is_false() {
    let dir = TempDir::new().unwrap();
    let registry = IndexRegistry::new();
    assert!(!registry.close(dir.path().join("never-opened")));
}

// ── Location-addressed operations ────────────────────────────────

#[test]
fn add_query_remove_by_location() {
    let dir = TempDir::new().unwrap();
    let location = dir.path().join("index");
    let registry = IndexRegistry::new();
    let record = post(11, "the quick fox");

    registry.add(&location, &record).unwrap();
    let hits = registry.query(&location, "quick", 1, 10).unwrap();
    assert_eq!(hits.ids, vec![ContentId::new(11)]);
    assert_eq!(hits.total, 1);

    assert!(registry.remove(&location, &record).unwrap());
    assert_eq!(registry.query(&location, "quick", 1, 10).unwrap().total, 0);
}

#[test]
fn query_before_any_add_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let registry = IndexRegistry::new();
    let err = registry
        .query(dir.path().join("index"), "anything", 1, 10)
        .unwrap_err();
    assert!(matches!(err, IndexError::Unavailable(_)), "got {err:?}");
}

#[test]
fn remove_from_missing_location_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let registry = IndexRegistry::new();
    let err = registry
        .remove(dir.path().join("index"), &post(1, "x"))
        .unwrap_err();
    assert!(matches!(err, IndexError::Unavailable(_)), "got {err:?}");
}
