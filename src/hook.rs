//! Post-tool-use hook
//!
//! The agent runtime calls memlog after every tool invocation with a small JSON
//! event on stdin. A successful tool call triggers one observation cycle for the
//! agent. Nothing here may fail the calling tool, so every problem ends up as a
//! [`HookOutcome::Skipped`] plus a log line.

use crate::api::{HistoryApi, SyncSummary};
use crate::config::MemlogConfig;
use crate::source::{fetch_observed_content_blocking, BlockSource, LettaClient};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Hook payload. Every field is optional so that unexpected payloads parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookEvent {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    #[serde(default)]
    pub tool_result: Option<ToolResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolResult {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Skipped(String),
    Synced(SyncSummary),
}

impl HookEvent {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Agent to observe, when the event calls for a cycle.
    pub fn agent_to_observe(&self) -> Option<&str> {
        let succeeded = self
            .tool_result
            .as_ref()
            .and_then(|r| r.status.as_deref())
            == Some("success");
        if !succeeded {
            return None;
        }
        self.agent_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Block store directory for this event.
    pub fn storage_root(&self, config: &MemlogConfig, workspace: &Path) -> PathBuf {
        match &self.working_directory {
            Some(dir) if !dir.as_os_str().is_empty() => config.logs_dir(dir),
            _ => config.logs_dir(workspace),
        }
    }
}

/// Run one observation cycle for `event` against `source`.
pub fn handle_hook(
    event: &HookEvent,
    config: &MemlogConfig,
    workspace: &Path,
    source: &dyn BlockSource,
) -> HookOutcome {
    let Some(agent_id) = event.agent_to_observe() else {
        debug!("Hook event does not call for an observation");
        return HookOutcome::Skipped("not a successful tool call for an agent".to_string());
    };

    let root = event.storage_root(config, workspace);
    let observations = fetch_observed_content_blocking(source, agent_id)
        .into_iter()
        .map(|mut observation| {
            observation
                .metadata
                .insert("agent_id".to_string(), agent_id.to_string());
            observation
        });

    let summary = HistoryApi::open(&root).record_observations(observations);
    info!(
        agent_id,
        root = %root.display(),
        initialized = summary.initialized,
        recorded = summary.recorded,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "Observation cycle finished"
    );
    HookOutcome::Synced(summary)
}

/// Read a hook event from `input` and observe through the Letta API.
pub fn run_hook<R: Read>(mut input: R, config: &MemlogConfig, workspace: &Path) -> HookOutcome {
    let mut raw = String::new();
    if let Err(e) = input.read_to_string(&mut raw) {
        warn!(error = %e, "Failed to read hook input");
        return HookOutcome::Skipped("unreadable input".to_string());
    }
    let event = match HookEvent::parse(&raw) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Ignoring hook input that is not valid JSON");
            return HookOutcome::Skipped("invalid JSON".to_string());
        }
    };
    if event.agent_to_observe().is_none() {
        return HookOutcome::Skipped("not a successful tool call for an agent".to_string());
    }

    let client = match LettaClient::new(&config.letta.resolve()) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Cannot reach Letta; skipping cycle");
            return HookOutcome::Skipped(e.to_string());
        }
    };
    handle_hook(&event, config, workspace, &client)
}
