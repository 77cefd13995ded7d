//! Version history
//!
//! Historical versions are never stored. They are derived from the current
//! snapshot by undoing logged patches, newest first.

pub mod navigate;
pub mod reconstruct;

pub use navigate::{navigate, NavEvent, NavOutcome};
pub use reconstruct::reconstruct;

use crate::patch::Patch;
use chrono::{DateTime, Utc};
use std::fmt;

/// When a version was current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStamp {
    /// The live snapshot.
    Current,
    /// Replaced by the change logged at this time.
    At(DateTime<Utc>),
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionStamp::Current => write!(f, "current"),
            VersionStamp::At(ts) => write!(f, "{}", ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        }
    }
}

/// One reconstructed state of a block.
///
/// `patch` is the logged change that turned this content into the next
/// version; the current version has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub content: String,
    pub timestamp: VersionStamp,
    pub patch: Option<Patch>,
}

impl Version {
    pub fn is_current(&self) -> bool {
        self.timestamp == VersionStamp::Current
    }
}
