//! History API
//!
//! The operations the engine exposes: record an observed block, list tracked
//! blocks, read the current content, and reconstruct the full version history.

use crate::error::{ApiError, StorageError};
use crate::history::{reconstruct, Version};
use crate::patch::diff;
use crate::store::{validate_metadata, BlockStore, FsBlockStore, Metadata, Snapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Block content as seen on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub name: String,
    pub content: String,
    pub metadata: Metadata,
}

/// Effect of recording one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First observation; snapshot created, nothing logged.
    Initialized,
    /// Content identical to the snapshot; nothing written.
    Unchanged,
    /// Patch logged and snapshot replaced.
    Recorded { hunks: usize },
}

/// Counts for a batch of observations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub initialized: usize,
    pub unchanged: usize,
    pub recorded: usize,
    pub failed: usize,
}

/// Listing row for one tracked block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub name: String,
    /// Content length in characters.
    pub size: usize,
    pub history_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// History API service
pub struct HistoryApi {
    store: Arc<dyn BlockStore + Send + Sync>,
}

impl HistoryApi {
    pub fn new(store: Arc<dyn BlockStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// API over a filesystem store rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Self {
        Self::new(Arc::new(FsBlockStore::new(root)))
    }

    /// Record the observed `content` of block `name`.
    ///
    /// The first observation only creates the snapshot. Later observations log
    /// a patch and replace the snapshot when the content differs, and do
    /// nothing otherwise, so repeating a call is harmless.
    ///
    /// The log entry is appended before the snapshot is replaced. If the
    /// snapshot write fails the entry is cut from the log again, so the log
    /// always ends at the stored snapshot.
    pub fn record_observation(
        &self,
        name: &str,
        content: &str,
        metadata: &Metadata,
    ) -> Result<RecordOutcome, ApiError> {
        validate_metadata(metadata)?;

        let Some(previous) = self.store.read_snapshot(name)? else {
            self.store
                .write_snapshot(&Snapshot::new(name, content, metadata.clone()))?;
            info!(block = name, "Block initialized");
            return Ok(RecordOutcome::Initialized);
        };

        if previous.content == content {
            debug!(block = name, "Block unchanged");
            return Ok(RecordOutcome::Unchanged);
        }

        let patch = diff(&previous.content, content);
        let hunks = patch.len();
        let log_len = self.store.log_len(name)?;
        self.store.append_log(name, &patch, metadata)?;
        if let Err(e) = self
            .store
            .write_snapshot(&Snapshot::new(name, content, metadata.clone()))
        {
            if let Err(rollback) = self.store.truncate_log(name, log_len) {
                error!(block = name, error = %rollback, "Failed to roll back log entry");
            }
            return Err(e.into());
        }

        let (inserted, deleted) = patch.line_stats();
        info!(block = name, hunks, inserted, deleted, "Block change recorded");
        Ok(RecordOutcome::Recorded { hunks })
    }

    /// Record a batch. A failing block is logged and counted; the rest of the
    /// batch is still processed.
    pub fn record_observations<I>(&self, observations: I) -> SyncSummary
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut summary = SyncSummary::default();
        for observation in observations {
            match self.record_observation(&observation.name, &observation.content, &observation.metadata) {
                Ok(RecordOutcome::Initialized) => summary.initialized += 1,
                Ok(RecordOutcome::Unchanged) => summary.unchanged += 1,
                Ok(RecordOutcome::Recorded { .. }) => summary.recorded += 1,
                Err(e) => {
                    warn!(block = %observation.name, error = %e, "Failed to record block");
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// All tracked blocks, sorted by name. Unreadable snapshots are skipped.
    pub fn list_blocks(&self) -> Result<Vec<BlockSummary>, ApiError> {
        let mut blocks = Vec::new();
        for name in self.store.list_snapshots()? {
            let snapshot = match self.store.read_snapshot(&name) {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) => continue,
                Err(e) => {
                    warn!(block = %name, error = %e, "Skipping unreadable snapshot");
                    continue;
                }
            };
            blocks.push(BlockSummary {
                history_count: self.store.count_log(&name)?,
                size: snapshot.content.chars().count(),
                updated_at: snapshot.updated_at,
                name,
            });
        }
        Ok(blocks)
    }

    /// Names of every tracked block.
    pub fn block_names(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.store.list_snapshots()?)
    }

    /// Current snapshot, or [`ApiError::BlockNotFound`].
    pub fn snapshot(&self, name: &str) -> Result<Snapshot, ApiError> {
        match self.store.read_snapshot(name)? {
            Some(snapshot) => Ok(snapshot),
            None => Err(ApiError::BlockNotFound {
                name: name.to_string(),
                available: self.block_names().unwrap_or_default(),
            }),
        }
    }

    pub fn current_content(&self, name: &str) -> Result<String, ApiError> {
        Ok(self.snapshot(name)?.content)
    }

    /// Every version of `name`, oldest first, current last.
    ///
    /// A log that cannot be parsed or replayed against the snapshot is reported
    /// as [`ApiError::CorruptHistory`]; a partial history is never returned.
    pub fn version_history(&self, name: &str) -> Result<Vec<Version>, ApiError> {
        let snapshot = self.snapshot(name)?;
        let log = self.store.read_log(name).map_err(|e| match e {
            StorageError::MalformedPatch { source, .. } => ApiError::CorruptHistory {
                name: name.to_string(),
                source,
            },
            other => ApiError::StorageError(other),
        })?;

        reconstruct(&snapshot, &log).map_err(|source| {
            warn!(block = name, error = %source, "History reconstruction failed");
            ApiError::CorruptHistory {
                name: name.to_string(),
                source,
            }
        })
    }
}
