//! Line-oriented patches
//!
//! A [`Patch`] is an ordered list of [`Hunk`]s, each describing a localized edit
//! between an "old" and a "new" text in unified-diff terms. Patches are produced
//! by [`diff`], stored through [`codec`], and replayed by [`apply`].
//!
//! Lines keep their `\n` terminator. A final line without a terminator is still
//! a line, which is what lets a patch reproduce its input byte for byte.

pub mod apply;
pub mod codec;
pub mod diff;

pub use apply::{apply, Direction};
pub use codec::{parse, serialize};
pub use diff::{diff, DEFAULT_CONTEXT};

/// Kind of a single line operation inside a hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Context,
    Delete,
    Insert,
}

impl OpKind {
    /// Unified-diff line prefix for this kind.
    pub fn prefix(self) -> char {
        match self {
            OpKind::Context => ' ',
            OpKind::Delete => '-',
            OpKind::Insert => '+',
        }
    }

    fn inverted(self) -> Self {
        match self {
            OpKind::Context => OpKind::Context,
            OpKind::Delete => OpKind::Insert,
            OpKind::Insert => OpKind::Delete,
        }
    }
}

/// One line of a hunk. `text` includes the line terminator when the line had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOp {
    pub kind: OpKind,
    pub text: String,
}

impl LineOp {
    pub fn new(kind: OpKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A contiguous region of change with its surrounding context.
///
/// Starts are 1-based. When a count is zero the start names the line *after
/// which* the change applies, so an insertion into empty text is `-0,0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub ops: Vec<LineOp>,
}

impl Hunk {
    /// Number of lines the ops consume from the old text.
    pub fn consumed_old(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind != OpKind::Insert)
            .count()
    }

    /// Number of lines the ops produce in the new text.
    pub fn produced_new(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind != OpKind::Delete)
            .count()
    }

    fn inverted(&self) -> Hunk {
        Hunk {
            old_start: self.new_start,
            old_count: self.new_count,
            new_start: self.old_start,
            new_count: self.old_count,
            ops: self
                .ops
                .iter()
                .map(|op| LineOp::new(op.kind.inverted(), op.text.clone()))
                .collect(),
        }
    }
}

/// Ordered hunks. An empty patch means "no change".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub hunks: Vec<Hunk>,
}

impl Patch {
    pub fn new(hunks: Vec<Hunk>) -> Self {
        Self { hunks }
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hunks.len()
    }

    /// The patch that undoes this one: insertions and deletions swap roles,
    /// and so do the old and new ranges.
    pub fn inverted(&self) -> Patch {
        Patch {
            hunks: self.hunks.iter().map(Hunk::inverted).collect(),
        }
    }

    /// (inserted, deleted) line totals, used for summaries.
    pub fn line_stats(&self) -> (usize, usize) {
        self.hunks
            .iter()
            .flat_map(|h| h.ops.iter())
            .fold((0, 0), |(ins, del), op| match op.kind {
                OpKind::Insert => (ins + 1, del),
                OpKind::Delete => (ins, del + 1),
                OpKind::Context => (ins, del),
            })
    }
}

/// Split text into lines, keeping each `\n` terminator.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}
