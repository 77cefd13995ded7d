//! Configuration System
//!
//! Layered configuration: built-in defaults, the user's global file, the
//! workspace file and `MEMLOG__*` environment variables, in increasing order of
//! precedence. Letta credentials additionally fall back to the Letta CLI's own
//! settings file.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

mod merge {
    pub(crate) mod merge_policy;
}
mod sources {
    pub(crate) mod global_file;
    pub(crate) mod workspace_file;
}

pub use sources::global_file::global_config_path;
pub use sources::workspace_file::workspace_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemlogConfig {
    /// Where snapshots and logs live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Letta API access
    #[serde(default)]
    pub letta: LettaConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Block store directory; relative paths resolve against the workspace
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from(".letta/memory_logs")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
        }
    }
}

/// Letta service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LettaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Connect and request timeout for block fetches
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.letta.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for LettaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Where a resolved API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    ConfigFile,
    LettaSettings,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Environment => write!(f, "LETTA_API_KEY environment variable"),
            KeySource::ConfigFile => write!(f, "memlog config (letta.api_key)"),
            KeySource::LettaSettings => write!(f, "~/.letta/settings.json"),
        }
    }
}

/// Credentials after applying every fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLetta {
    pub api_key: Option<(String, KeySource)>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl LettaConfig {
    /// Resolve credentials against the process environment and the Letta CLI
    /// settings file in `$HOME/.letta/settings.json`.
    pub fn resolve(&self) -> ResolvedLetta {
        let settings = std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".letta").join("settings.json"))
            .map(|path| LettaSettings::read(&path))
            .unwrap_or_default();
        self.resolve_with(
            |name| std::env::var(name).ok().filter(|v| !v.is_empty()),
            &settings,
        )
    }

    fn resolve_with<E>(&self, env: E, settings: &LettaSettings) -> ResolvedLetta
    where
        E: Fn(&str) -> Option<String>,
    {
        let api_key = env("LETTA_API_KEY")
            .map(|key| (key, KeySource::Environment))
            .or_else(|| {
                self.api_key
                    .clone()
                    .filter(|key| !key.is_empty())
                    .map(|key| (key, KeySource::ConfigFile))
            })
            .or_else(|| {
                settings
                    .api_key
                    .clone()
                    .map(|key| (key, KeySource::LettaSettings))
            });

        let base_url = env("LETTA_BASE_URL")
            .or_else(|| settings.base_url.clone())
            .unwrap_or_else(|| self.base_url.clone());

        ResolvedLetta {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// The `env` table of the Letta CLI settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LettaSettings {
    api_key: Option<String>,
    base_url: Option<String>,
}

impl LettaSettings {
    /// Missing or unreadable settings count as empty.
    fn read(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    fn parse(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparseable Letta settings");
                return Self::default();
            }
        };
        let field = |name: &str| {
            value
                .get("env")
                .and_then(|env| env.get(name))
                .and_then(|v| v.as_str())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            api_key: field("LETTA_API_KEY"),
            base_url: field("LETTA_BASE_URL"),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Storage(String),
    Letta(String),
    Logging(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Letta(msg) => write!(f, "Letta: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl MemlogConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.storage.logs_dir.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "logs_dir cannot be empty".to_string(),
            ));
        }
        if let Err(e) = self.letta.validate() {
            errors.push(ValidationError::Letta(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Block store directory for `workspace`.
    pub fn logs_dir(&self, workspace: &Path) -> PathBuf {
        if self.storage.logs_dir.is_absolute() {
            self.storage.logs_dir.clone()
        } else {
            workspace.join(&self.storage.logs_dir)
        }
    }
}

/// Loads [`MemlogConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace, validated.
    pub fn load(workspace_root: &Path) -> Result<MemlogConfig, ApiError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        builder = sources::global_file::add_to_builder(builder)?;
        builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        builder = builder.add_source(Environment::with_prefix("MEMLOG").separator("__"));

        let config: MemlogConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load configuration from one explicit file plus environment overrides.
    pub fn load_from_file(path: &Path) -> Result<MemlogConfig, ApiError> {
        let config: MemlogConfig = merge::merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(Environment::with_prefix("MEMLOG").separator("__"))
            .build()?
            .try_deserialize()?;
        Self::validated(config)
    }

    /// Path of the user-level config file, if a home directory is known.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_config_path()
    }

    /// Built-in defaults without reading any source.
    pub fn default() -> MemlogConfig {
        MemlogConfig::default()
    }

    fn validated(config: MemlogConfig) -> Result<MemlogConfig, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
