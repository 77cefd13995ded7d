//! On-disk layout and compatibility of the block store

use memlog::api::HistoryApi;
use memlog::error::{ApiError, PatchError};
use memlog::store::{BlockStore, FsBlockStore, Metadata};
use std::fs;
use tempfile::TempDir;

fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_snapshot_and_log_records() {
    let temp_dir = TempDir::new().unwrap();
    let api = HistoryApi::open(temp_dir.path());
    let meta = metadata(&[("description", "About the user"), ("agent_id", "agent-1")]);

    api.record_observation("human", "Name: Alice\n", &meta).unwrap();
    api.record_observation("human", "Name: Alice\nAge: 30\n", &meta)
        .unwrap();

    let snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp_dir.path().join("human.json")).unwrap())
            .unwrap();
    assert_eq!(snapshot["block_name"], "human");
    assert_eq!(snapshot["content"], "Name: Alice\nAge: 30\n");
    assert_eq!(snapshot["description"], "About the user");
    assert!(snapshot["updated_at"].as_str().unwrap().ends_with('Z'));

    let log = fs::read_to_string(temp_dir.path().join("human.jsonl")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["agent_id"], "agent-1");
    assert_eq!(record["diff"], "@@ -1,1 +1,2 @@\n Name: Alice\n+Age: 30\n");
    assert!(record["timestamp"].is_string());
}

#[test]
fn test_no_temp_files_left_behind() {
    let temp_dir = TempDir::new().unwrap();
    let api = HistoryApi::open(temp_dir.path());
    for content in ["a", "b", "c"] {
        api.record_observation("human", content, &Metadata::new())
            .unwrap();
    }
    let mut names: Vec<String> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["human.json", "human.jsonl"]);
}

#[test]
fn test_legacy_log_with_file_headers_reconstructs() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("human.json"),
        r#"{"block_name": "human", "content": "Name: Alice\nAge: 30", "updated_at": "2024-05-01T12:00:00Z"}"#,
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("human.jsonl"),
        concat!(
            r#"{"timestamp": "2024-05-01T12:00:00Z", "diff": "--- a/human\n+++ b/human\n@@ -1 +1,2 @@\n Name: Alice\n+Age: 30\n", "agent_id": "agent-1"}"#,
            "\n"
        ),
    )
    .unwrap();

    let versions = HistoryApi::open(temp_dir.path())
        .version_history("human")
        .unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].content, "Name: Alice\n");
    assert_eq!(versions[1].content, "Name: Alice\nAge: 30");
}

#[test]
fn test_malformed_log_diff_is_corruption() {
    let temp_dir = TempDir::new().unwrap();
    let api = HistoryApi::open(temp_dir.path());
    api.record_observation("human", "x\n", &Metadata::new()).unwrap();
    fs::write(
        temp_dir.path().join("human.jsonl"),
        "{\"timestamp\": \"2024-05-01T12:00:00Z\", \"diff\": \"@@ -a,1 +1,1 @@\\n-x\\n+y\\n\"}\n",
    )
    .unwrap();

    let err = api.version_history("human").unwrap_err();
    assert!(err.is_corruption());
    assert!(matches!(
        err,
        ApiError::CorruptHistory {
            source: PatchError::Malformed { .. },
            ..
        }
    ));
}

#[test]
fn test_unparseable_log_line_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let api = HistoryApi::open(temp_dir.path());
    api.record_observation("human", "x\n", &Metadata::new()).unwrap();
    fs::write(temp_dir.path().join("human.jsonl"), "{not json}\n").unwrap();

    let err = api.version_history("human").unwrap_err();
    assert!(err.is_corruption());
}

#[test]
fn test_snapshot_missing_required_field_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("human.json"),
        r#"{"block_name": "human", "updated_at": "2024-05-01T12:00:00Z"}"#,
    )
    .unwrap();
    let store = FsBlockStore::new(temp_dir.path());
    assert!(store.read_snapshot("human").is_err());
}

#[test]
fn test_history_count_matches_log_lines() {
    let temp_dir = TempDir::new().unwrap();
    let api = HistoryApi::open(temp_dir.path());
    for content in ["1", "2", "3", "3", "4"] {
        api.record_observation("human", content, &Metadata::new())
            .unwrap();
    }
    let blocks = api.list_blocks().unwrap();
    assert_eq!(blocks[0].history_count, 3);
    assert_eq!(blocks[0].size, 1);
}

#[test]
fn test_legacy_snapshot_with_null_description_stays_tracked() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("human.json"),
        r#"{"block_name":"human","content":"Name: Alice","updated_at":"2025-01-01T00:00:00.123456Z","description":null}"#,
    )
    .unwrap();
    let api = HistoryApi::open(temp_dir.path());

    assert_eq!(api.current_content("human").unwrap(), "Name: Alice");
    assert_eq!(api.list_blocks().unwrap().len(), 1);

    let summary = api.record_observations(vec![memlog::api::Observation {
        name: "human".to_string(),
        content: "Name: Alice\nAge: 30".to_string(),
        metadata: metadata(&[("description", "")]),
    }]);
    assert_eq!(summary.recorded, 1);
    assert_eq!(summary.failed, 0);

    let versions = api.version_history("human").unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].content, "Name: Alice");
}
