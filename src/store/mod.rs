//! Block Store
//!
//! Per-block persistence: one current [`Snapshot`] that is overwritten in place,
//! and one append-only log of [`LogEntry`] patches. Entries are immutable once
//! appended and are read back in insertion order.

pub mod persistence;

pub use persistence::FsBlockStore;

use crate::error::StorageError;
use crate::patch::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque provenance attached to snapshots and log entries.
pub type Metadata = BTreeMap<String, String>;

/// Keys the on-disk records use for their own fields. Metadata is flattened
/// next to them, so these names cannot be metadata keys.
pub const RESERVED_METADATA_KEYS: &[&str] =
    &["block_name", "content", "updated_at", "timestamp", "diff"];

/// Most recently observed content of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SnapshotRecord")]
pub struct Snapshot {
    #[serde(rename = "block_name")]
    pub name: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub metadata: Metadata,
}

/// Snapshot as found on disk. Older files carry non-string metadata such as
/// `"description": null`.
#[derive(Deserialize)]
struct SnapshotRecord {
    block_name: String,
    content: String,
    updated_at: DateTime<Utc>,
    #[serde(flatten)]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl From<SnapshotRecord> for Snapshot {
    fn from(record: SnapshotRecord) -> Self {
        Self {
            name: record.block_name,
            content: record.content,
            updated_at: record.updated_at,
            metadata: metadata_from_json(record.metadata),
        }
    }
}

/// Read stored metadata values as strings: `null` becomes the empty string
/// and other non-string values keep their JSON text.
pub(crate) fn metadata_from_json(raw: BTreeMap<String, serde_json::Value>) -> Metadata {
    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}

impl Snapshot {
    pub fn new(name: impl Into<String>, content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            updated_at: Utc::now(),
            metadata,
        }
    }
}

/// One recorded change of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub patch: Patch,
    pub metadata: Metadata,
}

/// Persistence surface for block snapshots and logs
pub trait BlockStore {
    /// Current snapshot, or `None` if the block was never observed.
    fn read_snapshot(&self, name: &str) -> Result<Option<Snapshot>, StorageError>;

    /// Replace the snapshot for `snapshot.name`. Always a full overwrite.
    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), StorageError>;

    /// All log entries, oldest first. A missing log is an empty log.
    fn read_log(&self, name: &str) -> Result<Vec<LogEntry>, StorageError>;

    /// Append `patch` stamped with the current time. Empty patches are not
    /// written and yield `None`.
    fn append_log(
        &self,
        name: &str,
        patch: &Patch,
        metadata: &Metadata,
    ) -> Result<Option<LogEntry>, StorageError>;

    /// Number of log entries, without decoding them.
    fn count_log(&self, name: &str) -> Result<usize, StorageError>;

    /// Size of the log in bytes; 0 when there is no log.
    fn log_len(&self, name: &str) -> Result<u64, StorageError>;

    /// Cut the log back to `len` bytes, dropping entries appended after a
    /// [`BlockStore::log_len`] reading.
    fn truncate_log(&self, name: &str, len: u64) -> Result<(), StorageError>;

    /// Names of all blocks with a snapshot, sorted.
    fn list_snapshots(&self) -> Result<Vec<String>, StorageError>;
}

/// Block names become file stems, so they must be a single path component.
pub fn validate_block_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if invalid {
        return Err(StorageError::InvalidBlockName(name.to_string()));
    }
    Ok(())
}

/// Reject metadata keys that would collide with record fields on disk.
pub fn validate_metadata(metadata: &Metadata) -> Result<(), StorageError> {
    match metadata
        .keys()
        .find(|key| RESERVED_METADATA_KEYS.contains(&key.as_str()))
    {
        Some(key) => Err(StorageError::ReservedMetadataKey(key.clone())),
        None => Ok(()),
    }
}
