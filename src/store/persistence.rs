//! Filesystem implementation of the block store
//!
//! Layout under the storage root:
//!
//! ```text
//! {root}/{name}.json    current snapshot (pretty JSON)
//! {root}/{name}.jsonl   change log, one JSON object per line
//! ```
//!
//! Snapshots are written to a temporary file and renamed into place, so a
//! reader never observes a half-written snapshot. Log lines are appended with a
//! single write. There is no cross-process locking: two writers racing on the
//! same block may interleave their snapshot/log updates.

use crate::error::StorageError;
use crate::patch::{self, Patch};
use crate::store::{
    metadata_from_json, validate_block_name, validate_metadata, BlockStore, LogEntry, Metadata,
    Snapshot,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SNAPSHOT_EXT: &str = "json";
const LOG_EXT: &str = "jsonl";

/// Log line as written.
#[derive(Debug, Serialize)]
struct LogLine<'a> {
    timestamp: DateTime<Utc>,
    diff: String,
    #[serde(flatten)]
    metadata: &'a Metadata,
}

/// Log line as read back; metadata values may be any JSON value.
#[derive(Debug, Deserialize)]
struct LogRecord {
    timestamp: DateTime<Utc>,
    diff: String,
    #[serde(flatten)]
    metadata: BTreeMap<String, serde_json::Value>,
}

/// Block store rooted at a directory. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FsBlockStore {
    root: PathBuf,
}

impl FsBlockStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root path of this storage
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_block_name(name)?;
        Ok(self.root.join(format!("{}.{}", name, SNAPSHOT_EXT)))
    }

    pub fn log_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_block_name(name)?;
        Ok(self.root.join(format!("{}.{}", name, LOG_EXT)))
    }

    fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to create storage directory {:?}: {}", self.root, e),
            ))
        })
    }
}

impl BlockStore for FsBlockStore {
    fn read_snapshot(&self, name: &str) -> Result<Option<Snapshot>, StorageError> {
        let path = self.snapshot_path(name)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let snapshot: Snapshot = serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: path.clone(),
            line: e.line(),
            reason: e.to_string(),
        })?;
        if snapshot.name != name {
            return Err(StorageError::Corrupt {
                path,
                line: 1,
                reason: format!("snapshot belongs to block '{}'", snapshot.name),
            });
        }
        Ok(Some(snapshot))
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let path = self.snapshot_path(&snapshot.name)?;
        validate_metadata(&snapshot.metadata)?;
        self.ensure_root()?;

        let serialized = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        // Per-process temp name so concurrent writers never share a temp file.
        let temp_path = self.root.join(format!(
            ".{}.{}.{}.tmp",
            snapshot.name,
            SNAPSHOT_EXT,
            std::process::id()
        ));
        fs::write(&temp_path, serialized.as_bytes()).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to write snapshot to {:?}: {}", temp_path, e),
            ))
        })?;

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file to {:?}: {}", path, e),
            ))
        })?;

        debug!(block = %snapshot.name, bytes = snapshot.content.len(), "Snapshot written");
        Ok(())
    }

    fn read_log(&self, name: &str) -> Result<Vec<LogEntry>, StorageError> {
        let path = self.log_path(name)?;
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = index + 1;

            let record: LogRecord =
                serde_json::from_str(&line).map_err(|e| StorageError::Corrupt {
                    path: path.clone(),
                    line: line_no,
                    reason: e.to_string(),
                })?;
            let patch = patch::parse(&record.diff).map_err(|source| StorageError::MalformedPatch {
                path: path.clone(),
                line: line_no,
                source,
            })?;

            if let Some(last) = entries.last().map(|e: &LogEntry| e.timestamp) {
                if record.timestamp < last {
                    warn!(
                        block = name,
                        line = line_no,
                        "Log entry timestamp precedes the previous entry"
                    );
                }
            }

            entries.push(LogEntry {
                timestamp: record.timestamp,
                patch,
                metadata: metadata_from_json(record.metadata),
            });
        }
        Ok(entries)
    }

    fn append_log(
        &self,
        name: &str,
        patch: &Patch,
        metadata: &Metadata,
    ) -> Result<Option<LogEntry>, StorageError> {
        let path = self.log_path(name)?;
        if patch.is_empty() {
            debug!(block = name, "Empty patch not appended");
            return Ok(None);
        }
        validate_metadata(metadata)?;
        self.ensure_root()?;

        let entry = LogEntry {
            timestamp: Utc::now(),
            patch: patch.clone(),
            metadata: metadata.clone(),
        };
        let record = LogLine {
            timestamp: entry.timestamp,
            diff: patch::serialize(patch),
            metadata,
        };
        let mut line = serde_json::to_string(&record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("Failed to open log {:?}: {}", path, e),
                ))
            })?;
        let len_before = file.metadata()?.len();
        if let Err(e) = file.write_all(line.as_bytes()) {
            // Never leave a partial line behind.
            let _ = file.set_len(len_before);
            return Err(StorageError::IoError(e));
        }

        debug!(block = name, hunks = patch.len(), "Log entry appended");
        Ok(Some(entry))
    }

    fn count_log(&self, name: &str) -> Result<usize, StorageError> {
        let path = self.log_path(name)?;
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let mut count = 0;
        for line in BufReader::new(file).lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn log_len(&self, name: &str) -> Result<u64, StorageError> {
        let path = self.log_path(name)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    fn truncate_log(&self, name: &str, len: u64) -> Result<(), StorageError> {
        let path = self.log_path(name)?;
        let file = match OpenOptions::new().write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound && len == 0 => return Ok(()),
            Err(e) => return Err(StorageError::IoError(e)),
        };
        if file.metadata()?.len() > len {
            file.set_len(len)?;
            warn!(block = name, len, "Log truncated");
        }
        Ok(())
    }

    fn list_snapshots(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_block_name(stem).is_ok() && path.is_file() {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
