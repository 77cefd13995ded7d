//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::api::{HistoryApi, Observation, RecordOutcome};
use crate::cli::history_view::run_history_view;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_block_list_json, format_block_list_text, format_debug_report, format_history_json,
    format_history_text, format_sync_summary,
};
use crate::config::{ConfigLoader, MemlogConfig};
use crate::error::ApiError;
use crate::hook::{run_hook, HookOutcome};
use crate::source::{fetch_observed_content_blocking, BlockSource, LettaClient};
use crate::store::Metadata;
use console::Term;
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace, loaded config and the history API.
pub struct RunContext {
    api: Arc<HistoryApi>,
    config: MemlogConfig,
    workspace_root: PathBuf,
    logs_dir: PathBuf,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        let logs_dir = config.logs_dir(&workspace_root);
        debug!(logs_dir = %logs_dir.display(), "Using block store");

        Ok(Self {
            api: Arc::new(HistoryApi::open(&logs_dir)),
            config,
            workspace_root,
            logs_dir,
        })
    }

    pub fn api(&self) -> &HistoryApi {
        &self.api
    }

    pub fn config(&self) -> &MemlogConfig {
        &self.config
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Execute a CLI command via the single route table. `None` is hook mode.
    pub fn execute(&self, command: Option<&Commands>) -> Result<String, ApiError> {
        match command {
            None | Some(Commands::Hook) => Ok(self.handle_hook()),
            Some(Commands::List { format }) => self.handle_list(format),
            Some(Commands::Show { name }) => self.api.current_content(name),
            Some(Commands::History {
                name,
                plain,
                format,
            }) => self.handle_history(name.as_deref(), *plain, format),
            Some(Commands::Record {
                name,
                file,
                description,
            }) => self.handle_record(name, file.as_deref(), description.as_deref()),
            Some(Commands::Sync { agent_id }) => self.handle_sync(agent_id),
            Some(Commands::Debug { agent_id }) => self.handle_debug(agent_id),
        }
    }

    fn handle_hook(&self) -> String {
        match run_hook(std::io::stdin().lock(), &self.config, &self.workspace_root) {
            HookOutcome::Skipped(reason) => debug!(reason = %reason, "Hook skipped"),
            HookOutcome::Synced(summary) => debug!(?summary, "Hook synced"),
        }
        String::new()
    }

    fn handle_list(&self, format: &str) -> Result<String, ApiError> {
        let blocks = self.api.list_blocks()?;
        Ok(match format {
            "json" => format_block_list_json(&blocks),
            _ => format_block_list_text(&blocks),
        })
    }

    fn handle_history(
        &self,
        name: Option<&str>,
        plain: bool,
        format: &str,
    ) -> Result<String, ApiError> {
        let term = Term::stdout();
        let interactive = term.is_term() && !plain && format != "json";

        let name = match name {
            Some(name) => name.to_string(),
            None if interactive => match self.select_block()? {
                Some(name) => name,
                None => return Ok("No memory blocks tracked yet.".to_string()),
            },
            None => {
                return Err(ApiError::InvalidUsage(
                    "a block name is required outside an interactive terminal".to_string(),
                ))
            }
        };

        let versions = self.api.version_history(&name)?;
        if format == "json" {
            return Ok(format_history_json(&name, &versions));
        }
        if !interactive || versions.len() <= 1 {
            return Ok(format_history_text(&name, &versions, term.is_term()));
        }

        run_history_view(&term, &name, &versions).map_err(|e| {
            ApiError::TerminalError(format!("history viewer: {}", e))
        })?;
        Ok(String::new())
    }

    fn select_block(&self) -> Result<Option<String>, ApiError> {
        use dialoguer::Select;

        let names = self.api.block_names()?;
        if names.is_empty() {
            return Ok(None);
        }
        let selection = Select::new()
            .with_prompt("Memory block")
            .items(&names)
            .default(0)
            .interact_opt()
            .map_err(|e| ApiError::TerminalError(format!("failed to read selection: {}", e)))?;
        Ok(selection.map(|i| names[i].clone()))
    }

    fn handle_record(
        &self,
        name: &str,
        file: Option<&Path>,
        description: Option<&str>,
    ) -> Result<String, ApiError> {
        let content = match file {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| ApiError::StorageError(e.into()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|e| ApiError::StorageError(e.into()))?;
                buf
            }
        };

        let mut metadata = Metadata::new();
        if let Some(description) = description {
            metadata.insert("description".to_string(), description.to_string());
        }

        Ok(match self.api.record_observation(name, &content, &metadata)? {
            RecordOutcome::Initialized => format!("Started tracking '{}'.", name),
            RecordOutcome::Unchanged => format!("No changes to '{}'.", name),
            RecordOutcome::Recorded { hunks } => {
                format!("Recorded change to '{}' ({} hunk(s)).", name, hunks)
            }
        })
    }

    fn handle_sync(&self, agent_id: &str) -> Result<String, ApiError> {
        let client = LettaClient::new(&self.config.letta.resolve())?;
        let blocks = block_on(client.fetch_blocks(agent_id))??;
        info!(agent_id, blocks = blocks.len(), "Fetched memory blocks");

        let observations = blocks.into_iter().map(|mut observation: Observation| {
            observation
                .metadata
                .insert("agent_id".to_string(), agent_id.to_string());
            observation
        });
        let summary = self.api.record_observations(observations);
        Ok(format_sync_summary(agent_id, &summary))
    }

    fn handle_debug(&self, agent_id: &str) -> Result<String, ApiError> {
        let letta = self.config.letta.resolve();
        let blocks = match LettaClient::new(&letta) {
            Ok(client) => fetch_observed_content_blocking(&client, agent_id),
            Err(_) => Vec::new(),
        };
        Ok(format_debug_report(agent_id, &letta, &blocks))
    }
}

fn block_on<F: Future>(future: F) -> Result<F::Output, ApiError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ApiError::SourceError(format!("Failed to start async runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}
