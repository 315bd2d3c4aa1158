//! Tests for SessionStore
//!
//! These tests verify:
//! - Listing sessions in tag order with their metadata
//! - Comment and tag updates persisted across store instances
//! - Unknown sessions and unreadable metadata
//! - Tag naming

#[path = "../common/mod.rs"]
mod common;

use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use common::*;
use pitlog::session::{is_valid_tag, tag_for, SessionStore, METADATA_FILENAME};
use pitlog::PitlogError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store() -> (TempDir, PathBuf, SessionStore) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("data");
    let store = SessionStore::open(&root).unwrap();
    (temp_dir, root, store)
}

// =============================================================================
// Listing Tests
// =============================================================================

#[test]
fn test_list_empty_root() {
    let (_temp, _root, store) = setup_store();

    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_open_creates_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("nested").join("data");

    let store = SessionStore::open(&root).unwrap();

    assert!(root.is_dir());
    assert_eq!(store.root(), root.as_path());
}

#[test]
fn test_list_is_sorted_by_tag() {
    let (_temp, root, store) = setup_store();
    for tag in ["20261018-120000", "20261017-090000", "20261018-080000"] {
        record_session(&root, tag, &[race_start(0)]);
    }

    let tags: Vec<String> = store.list().unwrap().into_iter().map(|s| s.tag).collect();

    assert_eq!(
        tags,
        vec!["20261017-090000", "20261018-080000", "20261018-120000"]
    );
}

#[test]
fn test_list_new_session_has_empty_metadata() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &scenario());

    let sessions = store.list().unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].tag, "race1");
    assert!(sessions[0].metadata.comments.is_empty());
    assert!(sessions[0].metadata.tags.is_empty());
}

#[test]
fn test_list_ignores_plain_files() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);
    fs::write(root.join("notes.txt"), "not a session").unwrap();

    let sessions = store.list().unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].tag, "race1");
}

#[test]
fn test_list_skips_directories_without_logs() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);
    fs::create_dir(root.join("lost+found")).unwrap();

    let sessions = store.list().unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].tag, "race1");
    assert!(!store.exists("lost+found"));
    assert!(matches!(
        store.append_comment("lost+found", "x"),
        Err(PitlogError::UnknownSession(tag)) if tag == "lost+found"
    ));
}

#[test]
fn test_exists() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);

    assert!(store.exists("race1"));
    assert!(!store.exists("race2"));
    assert!(!store.exists("../data"));
}

// =============================================================================
// Metadata Tests
// =============================================================================

#[test]
fn test_append_comment_round_trip() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);

    store.append_comment("race1", "slow in turn 3").unwrap();
    let metadata = store.append_comment("race1", "retry with 140").unwrap();

    assert_eq!(metadata.comments, vec!["slow in turn 3", "retry with 140"]);
    assert_eq!(store.metadata("race1").unwrap(), metadata);

    // Visible through a fresh store over the same root
    let reopened = SessionStore::open(&root).unwrap();
    let listed = reopened.list().unwrap();
    assert_eq!(listed[0].metadata.comments, metadata.comments);
}

#[test]
fn test_replace_tags_replaces_whole_set() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);

    store.replace_tags("race1", ["fast", "wet"]).unwrap();
    let metadata = store.replace_tags("race1", ["qualifying"]).unwrap();

    let tags: Vec<&str> = metadata.tags.iter().map(String::as_str).collect();
    assert_eq!(tags, vec!["qualifying"]);
    assert_eq!(store.metadata("race1").unwrap().tags, metadata.tags);
}

#[test]
fn test_replace_tags_deduplicates() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);

    let metadata = store
        .replace_tags("race1", vec!["b".to_string(), "a".to_string(), "b".to_string()])
        .unwrap();

    let tags: Vec<&str> = metadata.tags.iter().map(String::as_str).collect();
    assert_eq!(tags, vec!["a", "b"]);
}

#[test]
fn test_comments_survive_tag_replacement() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);

    store.append_comment("race1", "first").unwrap();
    let metadata = store.replace_tags("race1", ["fast"]).unwrap();

    assert_eq!(metadata.comments, vec!["first"]);
}

#[test]
fn test_metadata_update_leaves_no_temp_file() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);

    store.append_comment("race1", "note").unwrap();

    let dir = store.session_dir("race1");
    assert!(dir.join(METADATA_FILENAME).is_file());
    assert!(!dir.join(format!("{}.tmp", METADATA_FILENAME)).exists());
}

#[test]
fn test_metadata_does_not_disturb_replay() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &scenario());

    store.append_comment("race1", "note").unwrap();
    store.replace_tags("race1", ["fast"]).unwrap();

    assert_eq!(replay_all(&root, "race1"), scenario());
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_unknown_session() {
    let (_temp, _root, store) = setup_store();

    assert!(matches!(
        store.append_comment("missing", "x"),
        Err(PitlogError::UnknownSession(_))
    ));
    assert!(matches!(
        store.replace_tags("missing", ["x"]),
        Err(PitlogError::UnknownSession(_))
    ));
    assert!(matches!(
        store.metadata("missing"),
        Err(PitlogError::UnknownSession(_))
    ));
}

#[test]
fn test_path_like_tag_is_unknown() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);

    let result = store.append_comment("race1/../race1", "x");

    assert!(matches!(result, Err(PitlogError::UnknownSession(_))));
}

#[test]
fn test_malformed_metadata() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);
    fs::write(store.session_dir("race1").join(METADATA_FILENAME), "{broken").unwrap();

    // Listed with empty metadata
    let sessions = store.list().unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].metadata.comments.is_empty());

    // Reported when asked for directly
    assert!(matches!(
        store.metadata("race1"),
        Err(PitlogError::MalformedMetadata { .. })
    ));
    assert!(matches!(
        store.append_comment("race1", "x"),
        Err(PitlogError::MalformedMetadata { .. })
    ));
}

#[test]
fn test_metadata_with_missing_fields() {
    let (_temp, root, store) = setup_store();
    record_session(&root, "race1", &[race_start(0)]);
    fs::write(
        store.session_dir("race1").join(METADATA_FILENAME),
        r#"{"comments":["only comments"]}"#,
    )
    .unwrap();

    let metadata = store.metadata("race1").unwrap();

    assert_eq!(metadata.comments, vec!["only comments"]);
    assert!(metadata.tags.is_empty());
}

// =============================================================================
// Tag Tests
// =============================================================================

#[test]
fn test_tag_format() {
    let time = Utc.with_ymd_and_hms(2026, 10, 18, 14, 25, 3).unwrap();

    assert_eq!(tag_for(&time), "20261018-142503");
}

#[test]
fn test_tags_sort_chronologically() {
    let earlier = Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap();
    let later = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();

    assert!(tag_for(&earlier) < tag_for(&later));
}

#[test]
fn test_valid_tags() {
    assert!(is_valid_tag("20261018-142503"));
    assert!(is_valid_tag("race1"));
    assert!(!is_valid_tag(""));
    assert!(!is_valid_tag(".."));
    assert!(!is_valid_tag("../x"));
    assert!(!is_valid_tag("a/b"));
    assert!(!is_valid_tag("/abs"));
}
