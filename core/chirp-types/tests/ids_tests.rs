use chirp_types::{ContentId, UserId};
use std::collections::BTreeSet;
use std::str::FromStr;

// ── ContentId ─────────────────────────────────────────────────────

#[test]
fn content_id_raw_roundtrip() {
    let id = ContentId::new(42);
    assert_eq!(id.get(), 42);
    assert_eq!(ContentId::from(42), id);
}

#[test]
fn content_id_display_is_plain_decimal() {
    assert_eq!(ContentId::new(1234).to_string(), "1234");
    assert_eq!(ContentId::new(-7).to_string(), "-7");
}

#[test]
fn content_id_parse() {
    let parsed = ContentId::parse("99").unwrap();
    assert_eq!(parsed, ContentId::new(99));
}

#[test]
fn content_id_from_str_trims() {
    let parsed = ContentId::from_str(" 5 ").unwrap();
    assert_eq!(parsed, ContentId::new(5));
}

#[test]
fn content_id_parse_invalid() {
    assert!(ContentId::parse("not-a-number").is_err());
    assert!(ContentId::parse("").is_err());
}

#[test]
fn content_id_sorts_numerically() {
    // "10" < "9" as strings, but ids compare as integers.
    assert!(ContentId::new(9) < ContentId::new(10));
}

#[test]
fn content_id_serializes_transparently() {
    let json = serde_json::to_string(&ContentId::new(17)).unwrap();
    assert_eq!(json, "17");
    let parsed: ContentId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, ContentId::new(17));
}

// ── UserId ────────────────────────────────────────────────────────

#[test]
fn user_id_display_and_parse() {
    let id = UserId::new(3);
    let parsed = UserId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn user_id_parse_invalid() {
    assert!(UserId::from_str("three").is_err());
}

#[test]
fn user_id_set_dedups() {
    let mut set = BTreeSet::new();
    set.insert(UserId::new(1));
    set.insert(UserId::new(1));
    set.insert(UserId::new(2));
    assert_eq!(set.len(), 2);
}
