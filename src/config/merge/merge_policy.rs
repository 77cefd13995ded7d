//! Merge rules: defaults applied before any file or environment source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("storage.logs_dir", ".letta/memory_logs")?
        .set_default("letta.base_url", "https://api.letta.com")?
        .set_default("letta.timeout_secs", 10)
}
