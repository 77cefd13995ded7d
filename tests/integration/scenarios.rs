//! End-to-end recording and reconstruction scenarios

use memlog::api::{HistoryApi, RecordOutcome};
use memlog::error::ApiError;
use memlog::patch::OpKind;
use memlog::store::{BlockStore, FsBlockStore, Metadata};
use std::sync::Arc;
use tempfile::TempDir;

fn open(temp_dir: &TempDir) -> (HistoryApi, Arc<FsBlockStore>) {
    let store = Arc::new(FsBlockStore::new(temp_dir.path()));
    (HistoryApi::new(store.clone()), store)
}

/// Appending a line records a single insert hunk and replaces the snapshot.
#[test]
fn test_appended_line_is_one_insert_hunk() {
    let temp_dir = TempDir::new().unwrap();
    let (api, store) = open(&temp_dir);
    let meta = Metadata::new();

    api.record_observation("human", "Name: Alice\n", &meta).unwrap();
    let outcome = api
        .record_observation("human", "Name: Alice\nAge: 30\n", &meta)
        .unwrap();
    assert_eq!(outcome, RecordOutcome::Recorded { hunks: 1 });

    let log = store.read_log("human").unwrap();
    assert_eq!(log.len(), 1);
    let hunk = &log[0].patch.hunks[0];
    let inserts: Vec<&str> = hunk
        .ops
        .iter()
        .filter(|op| op.kind == OpKind::Insert)
        .map(|op| op.text.as_str())
        .collect();
    assert_eq!(inserts, vec!["Age: 30\n"]);
    assert!(hunk.ops.iter().all(|op| op.kind != OpKind::Delete));

    assert_eq!(
        api.current_content("human").unwrap(),
        "Name: Alice\nAge: 30\n"
    );
}

/// First observation creates a snapshot and nothing else.
#[test]
fn test_first_observation_creates_snapshot_only() {
    let temp_dir = TempDir::new().unwrap();
    let (api, store) = open(&temp_dir);

    let outcome = api
        .record_observation("persona", "Helpful assistant", &Metadata::new())
        .unwrap();
    assert_eq!(outcome, RecordOutcome::Initialized);
    assert_eq!(store.count_log("persona").unwrap(), 0);
    assert!(!temp_dir.path().join("persona.jsonl").exists());

    let versions = api.version_history("persona").unwrap();
    assert_eq!(versions.len(), 1);
    assert!(versions[0].patch.is_none());
    assert!(versions[0].is_current());
    assert_eq!(versions[0].content, "Helpful assistant");
}

/// Three observations reconstruct to three versions, oldest first.
#[test]
fn test_three_observations_reconstruct_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let (api, _) = open(&temp_dir);
    let meta = Metadata::new();
    let contents = [
        "Name: Alice\n",
        "Name: Alice\nAge: 30\n",
        "Name: Alice Smith\nAge: 31\nCity: Paris",
    ];
    for content in contents {
        api.record_observation("human", content, &meta).unwrap();
    }

    let versions = api.version_history("human").unwrap();
    let reconstructed: Vec<&str> = versions.iter().map(|v| v.content.as_str()).collect();
    assert_eq!(reconstructed, contents);
    assert!(versions[2].is_current());
}

/// Recording identical content twice leaves the log untouched.
#[test]
fn test_unchanged_content_appends_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let (api, store) = open(&temp_dir);
    let meta = Metadata::new();

    api.record_observation("human", "a\n", &meta).unwrap();
    api.record_observation("human", "b\n", &meta).unwrap();
    let log_before = std::fs::read_to_string(temp_dir.path().join("human.jsonl")).unwrap();
    let snapshot_before = store.read_snapshot("human").unwrap().unwrap();

    assert_eq!(
        api.record_observation("human", "b\n", &meta).unwrap(),
        RecordOutcome::Unchanged
    );
    let log_after = std::fs::read_to_string(temp_dir.path().join("human.jsonl")).unwrap();
    assert_eq!(log_before, log_after);
    assert_eq!(store.read_snapshot("human").unwrap().unwrap(), snapshot_before);
}

/// Missing blocks are reported with the names that do exist.
#[test]
fn test_unknown_block_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let (api, _) = open(&temp_dir);
    api.record_observation("human", "x", &Metadata::new()).unwrap();

    match api.version_history("persona") {
        Err(ApiError::BlockNotFound { available, .. }) => {
            assert_eq!(available, vec!["human".to_string()])
        }
        other => panic!("expected BlockNotFound, got {:?}", other.map(|v| v.len())),
    }
}

/// Content that toggles a trailing newline survives the round trip.
#[test]
fn test_trailing_newline_changes_are_exact() {
    let temp_dir = TempDir::new().unwrap();
    let (api, _) = open(&temp_dir);
    let meta = Metadata::new();
    let contents = ["one\ntwo", "one\ntwo\n", "one\ntwo", ""];
    for content in contents {
        api.record_observation("human", content, &meta).unwrap();
    }

    let versions = api.version_history("human").unwrap();
    let reconstructed: Vec<&str> = versions.iter().map(|v| v.content.as_str()).collect();
    assert_eq!(reconstructed, contents);
}
