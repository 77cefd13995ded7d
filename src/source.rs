//! Block Sources
//!
//! Where observed block content comes from. The Letta service is the only
//! remote source; tests substitute their own [`BlockSource`].

use crate::api::Observation;
use crate::config::ResolvedLetta;
use crate::error::ApiError;
use crate::store::Metadata;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Produces the current content of every block of an agent.
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn fetch_blocks(&self, agent_id: &str) -> Result<Vec<Observation>, ApiError>;
}

/// Letta core-memory block as returned by the REST API
#[derive(Debug, Deserialize)]
struct LettaBlock {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP client for `GET /v1/agents/{agent_id}/core-memory/blocks`
pub struct LettaClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LettaClient {
    /// Build a client from resolved credentials. Fails when no API key was found.
    pub fn new(letta: &ResolvedLetta) -> Result<Self, ApiError> {
        let (api_key, _) = letta.api_key.clone().ok_or_else(|| {
            ApiError::SourceError(
                "No Letta API key found (set LETTA_API_KEY or letta.api_key)".to_string(),
            )
        })?;
        let timeout = Duration::from_secs(letta.timeout_secs);
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::SourceError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: letta.base_url.clone(),
            api_key,
        })
    }

    fn blocks_url(&self, agent_id: &str) -> String {
        format!("{}/v1/agents/{}/core-memory/blocks", self.base_url, agent_id)
    }
}

#[async_trait]
impl BlockSource for LettaClient {
    async fn fetch_blocks(&self, agent_id: &str) -> Result<Vec<Observation>, ApiError> {
        let url = self.blocks_url(agent_id);
        debug!(url = %url, "Fetching memory blocks");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::SourceError(match status.as_u16() {
                401 | 403 => format!("Authentication failed: {}", error_text),
                404 => format!("Agent '{}' not found", agent_id),
                _ => format!("Request failed with status {}: {}", status, error_text),
            }));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::SourceError(format!("Failed to parse response: {}", e)))?;
        observations_from_body(body)
    }
}

fn map_http_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::SourceError(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::SourceError(format!("Connection error: {}", error))
    } else {
        ApiError::SourceError(format!("HTTP error: {}", error))
    }
}

/// Turn the response body into observations, skipping unlabeled blocks.
fn observations_from_body(body: serde_json::Value) -> Result<Vec<Observation>, ApiError> {
    if !body.is_array() {
        return Err(ApiError::SourceError(
            "Expected a JSON array of blocks".to_string(),
        ));
    }
    let blocks: Vec<LettaBlock> = serde_json::from_value(body)
        .map_err(|e| ApiError::SourceError(format!("Unexpected block shape: {}", e)))?;

    Ok(blocks
        .into_iter()
        .filter_map(|block| {
            let name = block.label.filter(|label| !label.is_empty())?;
            let mut metadata = Metadata::new();
            if let Some(description) = block.description {
                metadata.insert("description".to_string(), description);
            }
            Some(Observation {
                name,
                content: block.value.unwrap_or_default(),
                metadata,
            })
        })
        .collect())
}

/// Fetch an agent's blocks, treating every failure as "nothing observed".
pub async fn fetch_observed_content(source: &dyn BlockSource, agent_id: &str) -> Vec<Observation> {
    match source.fetch_blocks(agent_id).await {
        Ok(blocks) => blocks,
        Err(e) => {
            warn!(agent_id, error = %e, "Could not fetch memory blocks; skipping cycle");
            Vec::new()
        }
    }
}

/// Blocking wrapper over [`fetch_observed_content`] for synchronous callers.
pub fn fetch_observed_content_blocking(source: &dyn BlockSource, agent_id: &str) -> Vec<Observation> {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime.block_on(fetch_observed_content(source, agent_id)),
        Err(e) => {
            warn!(error = %e, "Failed to start async runtime");
            Vec::new()
        }
    }
}

/// Show only the ends of a secret.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
