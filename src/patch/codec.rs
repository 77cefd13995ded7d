//! Textual patch form
//!
//! ```text
//! @@ -old_start,old_count +new_start,new_count @@
//!  context line
//! -deleted line
//! +inserted line
//! \ No newline at end of file
//! ```
//!
//! The no-newline marker follows any op whose text lacks a terminator, which
//! keeps [`serialize`] and [`parse`] byte-exact inverses. [`parse`] also
//! accepts `--- a/<name>` / `+++ b/<name>` file headers before the first hunk
//! and the abbreviated `-start` range form (count of one), as written by
//! classic unified-diff tools.

use crate::error::PatchError;
use crate::patch::{Hunk, LineOp, OpKind, Patch};

pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Render a patch in unified-diff hunk form (no file headers).
pub fn serialize(patch: &Patch) -> String {
    let mut out = String::new();
    for hunk in &patch.hunks {
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
        ));
        for op in &hunk.ops {
            out.push(op.kind.prefix());
            out.push_str(&op.text);
            if !op.text.ends_with('\n') {
                out.push('\n');
                out.push_str(NO_NEWLINE_MARKER);
                out.push('\n');
            }
        }
    }
    out
}

/// Parse unified-diff hunk text. Any deviation from the grammar is a
/// [`PatchError::Malformed`]; no partially-built patch is ever returned.
pub fn parse(text: &str) -> Result<Patch, PatchError> {
    let mut hunks = Vec::new();
    let mut current: Option<PendingHunk> = None;

    for (index, raw) in text.split_inclusive('\n').enumerate() {
        let line_no = index + 1;

        if raw.starts_with("@@") {
            if let Some(pending) = current.take() {
                hunks.push(pending.finish()?);
            }
            current = Some(PendingHunk::open(parse_header(raw, line_no)?, line_no));
            continue;
        }

        let Some(pending) = current.as_mut() else {
            if hunks.is_empty() && (raw.starts_with("--- ") || raw.starts_with("+++ ")) {
                continue;
            }
            return Err(PatchError::malformed(
                line_no,
                "expected a hunk header starting with '@@'",
            ));
        };

        let mut chars = raw.chars();
        let kind = match chars.next() {
            Some(' ') => OpKind::Context,
            Some('-') => OpKind::Delete,
            Some('+') => OpKind::Insert,
            Some('\\') => {
                pending.strip_last_terminator(line_no)?;
                continue;
            }
            _ => {
                return Err(PatchError::malformed(
                    line_no,
                    format!("unknown line prefix in {:?}", raw.trim_end()),
                ))
            }
        };
        pending.push(LineOp::new(kind, chars.as_str()), line_no)?;
    }

    if let Some(pending) = current.take() {
        hunks.push(pending.finish()?);
    }
    Ok(Patch::new(hunks))
}

struct PendingHunk {
    hunk: Hunk,
    header_line: usize,
    old_left: usize,
    new_left: usize,
}

impl PendingHunk {
    fn open(hunk: Hunk, header_line: usize) -> Self {
        Self {
            old_left: hunk.old_count,
            new_left: hunk.new_count,
            hunk,
            header_line,
        }
    }

    fn push(&mut self, op: LineOp, line_no: usize) -> Result<(), PatchError> {
        let takes_old = op.kind != OpKind::Insert;
        let takes_new = op.kind != OpKind::Delete;
        if (takes_old && self.old_left == 0) || (takes_new && self.new_left == 0) {
            return Err(PatchError::malformed(
                line_no,
                "hunk has more lines than its header declares",
            ));
        }
        if takes_old {
            self.old_left -= 1;
        }
        if takes_new {
            self.new_left -= 1;
        }
        self.hunk.ops.push(op);
        Ok(())
    }

    fn strip_last_terminator(&mut self, line_no: usize) -> Result<(), PatchError> {
        match self.hunk.ops.last_mut() {
            Some(op) if op.text.ends_with('\n') => {
                op.text.pop();
                Ok(())
            }
            _ => Err(PatchError::malformed(
                line_no,
                "no-newline marker without a preceding line",
            )),
        }
    }

    fn finish(self) -> Result<Hunk, PatchError> {
        if self.old_left != 0 || self.new_left != 0 {
            return Err(PatchError::malformed(
                self.header_line,
                format!(
                    "hunk is missing {} old and {} new line(s) declared by its header",
                    self.old_left, self.new_left
                ),
            ));
        }
        Ok(self.hunk)
    }
}

fn parse_header(raw: &str, line_no: usize) -> Result<Hunk, PatchError> {
    let line = raw.trim_end_matches('\n');
    let body = line
        .strip_prefix("@@ ")
        .ok_or_else(|| PatchError::malformed(line_no, "hunk header must start with '@@ '"))?;
    let (ranges, _section) = body
        .split_once(" @@")
        .ok_or_else(|| PatchError::malformed(line_no, "hunk header is missing closing '@@'"))?;

    let mut parts = ranges.split(' ');
    let old = parts
        .next()
        .and_then(|p| p.strip_prefix('-'))
        .ok_or_else(|| PatchError::malformed(line_no, "expected '-start,count' old range"))?;
    let new = parts
        .next()
        .and_then(|p| p.strip_prefix('+'))
        .ok_or_else(|| PatchError::malformed(line_no, "expected '+start,count' new range"))?;
    if parts.next().is_some() {
        return Err(PatchError::malformed(line_no, "unexpected text in hunk header"));
    }

    let (old_start, old_count) = parse_range(old, line_no)?;
    let (new_start, new_count) = parse_range(new, line_no)?;
    Ok(Hunk {
        old_start,
        old_count,
        new_start,
        new_count,
        ops: Vec::new(),
    })
}

fn parse_range(range: &str, line_no: usize) -> Result<(usize, usize), PatchError> {
    let (start, count) = match range.split_once(',') {
        Some((start, count)) => (parse_number(start, line_no)?, parse_number(count, line_no)?),
        None => (parse_number(range, line_no)?, 1),
    };
    if start == 0 && count != 0 {
        return Err(PatchError::malformed(
            line_no,
            format!("range {:?} starts at line 0 but is not empty", range),
        ));
    }
    Ok((start, count))
}

fn parse_number(digits: &str, line_no: usize) -> Result<usize, PatchError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PatchError::malformed(
            line_no,
            format!("non-numeric range value {:?}", digits),
        ));
    }
    digits
        .parse()
        .map_err(|_| PatchError::malformed(line_no, format!("range value {:?} is too large", digits)))
}
