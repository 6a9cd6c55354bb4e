use chirp_feed::{ChirpConfig, FeedError, ENV_INDEX_DIR, ENV_POSTS_PER_PAGE};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::PathBuf;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

// ── Defaults ─────────────────────────────────────────────────────

#[test]
fn defaults() {
    let config = ChirpConfig::default();
    assert_eq!(config.index_dir, PathBuf::from("index"));
    assert_eq!(config.posts_per_page, 5);
    assert!(config.validate().is_ok());
}

#[test]
fn unset_environment_keeps_defaults() {
    let config = ChirpConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, ChirpConfig::default());
}

// ── Environment ──────────────────────────────────────────────────

#[test]
fn environment_overrides() {
    let config = ChirpConfig::from_lookup(lookup(&[
        (ENV_INDEX_DIR, "/var/lib/chirp/index"),
        (ENV_POSTS_PER_PAGE, " 20 "),
    ]))
    .unwrap();
    assert_eq!(config.index_dir, PathBuf::from("/var/lib/chirp/index"));
    assert_eq!(config.posts_per_page, 20);
}

#[test]
fn blank_index_dir_is_ignored() {
    let config = ChirpConfig::from_lookup(lookup(&[(ENV_INDEX_DIR, "  ")])).unwrap();
    assert_eq!(config.index_dir, PathBuf::from("index"));
}

#[test]
fn unparsable_page_size_is_rejected() {
    let err = ChirpConfig::from_lookup(lookup(&[(ENV_POSTS_PER_PAGE, "many")])).unwrap_err();
    assert!(matches!(err, FeedError::Config(_)), "got {err:?}");
}

#[test]
fn zero_page_size_is_rejected() {
    let err = ChirpConfig::from_lookup(lookup(&[(ENV_POSTS_PER_PAGE, "0")])).unwrap_err();
    assert!(matches!(err, FeedError::Config(_)), "got {err:?}");
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn missing_fields_deserialize_to_defaults() {
    let config: ChirpConfig = serde_json::from_str(r#"{"posts_per_page": 10}"#).unwrap();
    assert_eq!(config.index_dir, PathBuf::from("index"));
    assert_eq!(config.posts_per_page, 10);
}

#[test]
fn serde_round_trip() {
    let config = ChirpConfig {
        index_dir: PathBuf::from("/tmp/chirp"),
        posts_per_page: 7,
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: ChirpConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
