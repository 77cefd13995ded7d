//! Hook mode never fails the calling tool.

use super::test_utils::isolated_env;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn run_hook(root: &Path, args: &[&str], stdin: &str) -> Output {
    let bin = env!("CARGO_BIN_EXE_memlog");
    let mut child = Command::new(bin)
        .envs(isolated_env(root))
        .env_remove("LETTA_API_KEY")
        .arg("--quiet")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_invalid_input_exits_zero() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_hook(temp_dir.path(), &[], "definitely not json");
    assert!(output.status.success());
}

#[test]
fn test_failed_tool_call_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    let event = format!(
        r#"{{"agent_id": "agent-1", "working_directory": "{}", "tool_result": {{"status": "error"}}}}"#,
        workspace.display()
    );
    let output = run_hook(temp_dir.path(), &["hook"], &event);
    assert!(output.status.success());
    assert!(!workspace.join(".letta").exists());
}

#[test]
fn test_missing_api_key_skips_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    std::fs::create_dir_all(&workspace).unwrap();
    let event = format!(
        r#"{{"agent_id": "agent-1", "working_directory": "{}", "tool_result": {{"status": "success"}}}}"#,
        workspace.display()
    );
    let output = run_hook(temp_dir.path(), &[], &event);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!workspace.join(".letta/memory_logs").exists());
}
