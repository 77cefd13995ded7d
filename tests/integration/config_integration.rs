//! Integration tests for layered configuration loading

use memlog::config::{ConfigLoader, KeySource};
use std::fs;
use tempfile::TempDir;

use crate::integration::with_xdg_env;

#[test]
fn test_global_config_from_xdg_config_home() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let config = with_xdg_env(&test_dir, || {
        let global = test_dir.path().join("config").join("memlog");
        fs::create_dir_all(&global).unwrap();
        fs::write(
            global.join("config.toml"),
            "[letta]\nbase_url = \"http://localhost:8283\"\n\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();
        assert_eq!(
            ConfigLoader::xdg_config_path(),
            Some(global.join("config.toml"))
        );
        ConfigLoader::load(&workspace).unwrap()
    });

    assert_eq!(config.letta.base_url, "http://localhost:8283");
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logs_dir(&workspace), workspace.join(".letta/memory_logs"));
}

#[test]
fn test_environment_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();
    fs::write(
        workspace.join(".memlog.toml"),
        "[letta]\ntimeout_secs = 3\n",
    )
    .unwrap();

    let config = with_xdg_env(&test_dir, || {
        std::env::set_var("MEMLOG__LETTA__TIMEOUT_SECS", "7");
        let config = ConfigLoader::load(&workspace);
        std::env::remove_var("MEMLOG__LETTA__TIMEOUT_SECS");
        config.unwrap()
    });
    assert_eq!(config.letta.timeout_secs, 7);
}

#[test]
fn test_invalid_config_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();
    fs::write(
        workspace.join(".memlog.toml"),
        "[letta]\nbase_url = \"localhost\"\n",
    )
    .unwrap();

    let result = with_xdg_env(&test_dir, || ConfigLoader::load(&workspace));
    let err = result.unwrap_err().to_string();
    assert!(err.contains("Configuration validation failed"));
    assert!(err.contains("base_url"));
}

#[test]
fn test_api_key_falls_back_to_letta_settings() {
    let test_dir = TempDir::new().unwrap();

    let resolved = with_xdg_env(&test_dir, || {
        let letta_dir = test_dir.path().join("home").join(".letta");
        fs::create_dir_all(&letta_dir).unwrap();
        fs::write(
            letta_dir.join("settings.json"),
            r#"{"env": {"LETTA_API_KEY": "sk-from-settings"}}"#,
        )
        .unwrap();
        ConfigLoader::default().letta.resolve()
    });

    assert_eq!(
        resolved.api_key,
        Some(("sk-from-settings".to_string(), KeySource::LettaSettings))
    );
}
