//! Rebuild every historical version from the current snapshot and the log.

use crate::error::PatchError;
use crate::history::{Version, VersionStamp};
use crate::patch::{apply, Direction};
use crate::store::{LogEntry, Snapshot};

/// All versions of a block, oldest first, current last.
///
/// Walks `log` from newest to oldest, undoing each patch on the running
/// content. The result always holds `log.len() + 1` versions. The first patch
/// that does not apply aborts the walk; no partial history is returned.
pub fn reconstruct(snapshot: &Snapshot, log: &[LogEntry]) -> Result<Vec<Version>, PatchError> {
    let current = Version {
        content: snapshot.content.clone(),
        timestamp: VersionStamp::Current,
        patch: None,
    };

    let (mut versions, _) = log.iter().rev().try_fold(
        (vec![current], snapshot.content.clone()),
        |(mut versions, content), entry| {
            let previous = apply(&content, &entry.patch, Direction::Reverse)?;
            versions.push(Version {
                content: previous.clone(),
                timestamp: VersionStamp::At(entry.timestamp),
                patch: Some(entry.patch.clone()),
            });
            Ok::<_, PatchError>((versions, previous))
        },
    )?;

    versions.reverse();
    Ok(versions)
}
