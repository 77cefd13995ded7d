//! Integration tests for the memlog binary's commands.

use super::test_utils::isolated_env;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn memlog(root: &Path, workspace: &Path, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_memlog");
    Command::new(bin)
        .envs(isolated_env(root))
        .env_remove("LETTA_API_KEY")
        .arg("--quiet")
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn record(root: &Path, workspace: &Path, name: &str, content: &str) -> Output {
    let input = root.join("input.txt");
    fs::write(&input, content).unwrap();
    memlog(
        root,
        workspace,
        &["record", name, "--file", input.to_str().unwrap()],
    )
}

#[test]
fn test_record_list_show_history() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let workspace = root.join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let output = memlog(root, &workspace, &["list"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains("No memory blocks tracked yet."));

    let output = record(root, &workspace, "human", "Name: Alice\n");
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains("Started tracking 'human'."));

    let output = record(root, &workspace, "human", "Name: Alice\nAge: 30\n");
    assert!(stdout(&output).contains("Recorded change to 'human'"));
    assert!(workspace.join(".letta/memory_logs/human.jsonl").exists());

    let output = memlog(root, &workspace, &["show", "human"]);
    assert_eq!(stdout(&output), "Name: Alice\nAge: 30\n\n");

    let output = memlog(root, &workspace, &["history", "human", "--plain"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("human: version 1 of 2"));
    assert!(text.contains("human: version 2 of 2 (current)"));
    assert!(text.contains("+Age: 30"));

    let output = memlog(root, &workspace, &["list", "--format", "json"]);
    let listed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["blocks"][0]["name"], "human");
    assert_eq!(listed["blocks"][0]["history_count"], 1);
}

#[test]
fn test_history_without_changes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let workspace = root.join("ws");
    fs::create_dir_all(&workspace).unwrap();

    record(root, &workspace, "persona", "Helpful assistant");
    let output = memlog(root, &workspace, &["history", "persona"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("No history for 'persona'. Current content:"));
}

#[test]
fn test_missing_block_reports_available_blocks() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let workspace = root.join("ws");
    fs::create_dir_all(&workspace).unwrap();

    record(root, &workspace, "human", "x");
    let output = memlog(root, &workspace, &["show", "persona"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Memory block 'persona' not found."));
    assert!(err.contains("Available blocks: human"));
}

#[test]
fn test_corrupted_history_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let workspace = root.join("ws");
    fs::create_dir_all(&workspace).unwrap();

    record(root, &workspace, "human", "one\n");
    record(root, &workspace, "human", "two\n");
    let snapshot = workspace.join(".letta/memory_logs/human.json");
    let mut value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&snapshot).unwrap()).unwrap();
    value["content"] = serde_json::json!("something else\n");
    fs::write(&snapshot, value.to_string()).unwrap();

    let output = memlog(root, &workspace, &["history", "human", "--plain"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("History is corrupted for block 'human'"));
}

#[test]
fn test_workspace_config_moves_storage() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let workspace = root.join("ws");
    fs::create_dir_all(&workspace).unwrap();
    fs::write(
        workspace.join(".memlog.toml"),
        "[storage]\nlogs_dir = \"history\"\n",
    )
    .unwrap();

    let output = record(root, &workspace, "human", "x");
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(workspace.join("history/human.json").exists());
}
