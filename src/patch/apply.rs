//! Patch application in either direction.

use crate::error::PatchError;
use crate::patch::{split_lines, OpKind, Patch};
use std::borrow::Cow;

/// Which way a patch is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// old -> new
    Forward,
    /// new -> old
    Reverse,
}

/// Apply `patch` to `content`.
///
/// Every hunk must fall inside `content`, after the previous hunk, and its
/// context/delete lines must match the lines they consume. Anything else is a
/// [`PatchError::Mismatch`]: the text and the patch have diverged.
///
/// Line comparison ignores the `\n` terminator so patches recorded with a
/// forced trailing newline still apply; the emitted text always keeps the
/// terminators of the lines it copies.
pub fn apply(content: &str, patch: &Patch, direction: Direction) -> Result<String, PatchError> {
    let patch = match direction {
        Direction::Forward => Cow::Borrowed(patch),
        Direction::Reverse => Cow::Owned(patch.inverted()),
    };

    let lines = split_lines(content);
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0usize;

    for (index, hunk) in patch.hunks.iter().enumerate() {
        let number = index + 1;
        let pos = if hunk.old_count == 0 {
            hunk.old_start
        } else {
            hunk.old_start.checked_sub(1).ok_or_else(|| {
                PatchError::mismatch(number, "non-empty range starts at line 0")
            })?
        };

        if pos < cursor {
            return Err(PatchError::mismatch(
                number,
                format!(
                    "starts at line {} but the previous hunk ended at line {}",
                    hunk.old_start, cursor
                ),
            ));
        }
        if pos + hunk.old_count > lines.len() {
            return Err(PatchError::mismatch(
                number,
                format!(
                    "range {},{} exceeds the {} line(s) of the text",
                    hunk.old_start,
                    hunk.old_count,
                    lines.len()
                ),
            ));
        }
        if hunk.consumed_old() != hunk.old_count {
            return Err(PatchError::mismatch(
                number,
                format!(
                    "header declares {} line(s) but the body consumes {}",
                    hunk.old_count,
                    hunk.consumed_old()
                ),
            ));
        }
        if hunk.produced_new() != hunk.new_count {
            return Err(PatchError::mismatch(
                number,
                format!(
                    "header declares {} new line(s) but the body produces {}",
                    hunk.new_count,
                    hunk.produced_new()
                ),
            ));
        }

        lines[cursor..pos].iter().for_each(|line| out.push_str(line));

        let mut at = pos;
        for op in &hunk.ops {
            match op.kind {
                OpKind::Insert => out.push_str(&op.text),
                OpKind::Context | OpKind::Delete => {
                    let line = lines[at];
                    if strip_terminator(line) != strip_terminator(&op.text) {
                        return Err(PatchError::mismatch(
                            number,
                            format!(
                                "line {} is {:?}, patch expects {:?}",
                                at + 1,
                                line,
                                op.text
                            ),
                        ));
                    }
                    if op.kind == OpKind::Context {
                        out.push_str(line);
                    }
                    at += 1;
                }
            }
        }
        cursor = at;
    }

    lines[cursor..].iter().for_each(|line| out.push_str(line));
    Ok(out)
}

fn strip_terminator(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}
