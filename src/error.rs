//! Error types for the memory block history engine.

use std::path::PathBuf;
use thiserror::Error;

/// Patch codec and applier errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// Patch text does not follow the hunk grammar.
    #[error("Malformed patch at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// A hunk does not fit the text it is applied to.
    #[error("Patch does not apply at hunk {hunk}: {reason}")]
    Mismatch { hunk: usize, reason: String },
}

impl PatchError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        PatchError::Malformed {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(hunk: usize, reason: impl Into<String>) -> Self {
        PatchError::Mismatch {
            hunk,
            reason: reason.into(),
        }
    }
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid block name: {0:?}")]
    InvalidBlockName(String),

    #[error("Metadata key {0:?} is reserved by the storage layout")]
    ReservedMetadataKey(String),

    #[error("Corrupt record in {path:?} at line {line}: {reason}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Unparseable patch in {path:?} at line {line}: {source}")]
    MalformedPatch {
        path: PathBuf,
        line: usize,
        #[source]
        source: PatchError,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced by the history API and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Memory block '{name}' not found")]
    BlockNotFound { name: String, available: Vec<String> },

    #[error("History is corrupted for block '{name}': {source}")]
    CorruptHistory {
        name: String,
        #[source]
        source: PatchError,
    },

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Block source error: {0}")]
    SourceError(String),

    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    #[error("Terminal error: {0}")]
    TerminalError(String),
}

impl ApiError {
    /// True when the stored snapshot and log can no longer be reconciled.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            ApiError::CorruptHistory { .. }
                | ApiError::StorageError(StorageError::MalformedPatch { .. })
                | ApiError::StorageError(StorageError::Corrupt { .. })
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
