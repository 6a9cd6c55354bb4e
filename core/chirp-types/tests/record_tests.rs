use chirp_types::{ContentId, ContentRecord, FollowEdge, IndexDocument, Timestamp, UserId};
use pretty_assertions::assert_eq;

fn record() -> ContentRecord {
    ContentRecord::new(
        ContentId::new(7),
        UserId::new(2),
        "the quick fox",
        Timestamp::from_millis(1_000),
    )
}

// ── ContentRecord ────────────────────────────────────────────────

#[test]
fn record_fields() {
    let r = record();
    assert_eq!(r.id, ContentId::new(7));
    assert_eq!(r.author, UserId::new(2));
    assert_eq!(r.body, "the quick fox");
    assert_eq!(r.created_at, Timestamp::from_millis(1_000));
}

#[test]
fn record_to_document_keeps_id_and_body() {
    let doc = record().to_document();
    assert_eq!(
        doc,
        IndexDocument {
            id: ContentId::new(7),
            body: "the quick fox".into(),
        }
    );
    assert_eq!(IndexDocument::from(&record()), doc);
}

#[test]
fn record_serialization_roundtrip() {
    let r = record();
    let json = serde_json::to_string(&r).unwrap();
    let parsed: ContentRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(r, parsed);
}

// ── FollowEdge ───────────────────────────────────────────────────

#[test]
fn self_edge_detection() {
    assert!(FollowEdge::new(UserId::new(1), UserId::new(1)).is_self_edge());
    assert!(!FollowEdge::new(UserId::new(1), UserId::new(2)).is_self_edge());
}

#[test]
fn edges_are_directed() {
    let ab = FollowEdge::new(UserId::new(1), UserId::new(2));
    let ba = FollowEdge::new(UserId::new(2), UserId::new(1));
    assert_ne!(ab, ba);
}
