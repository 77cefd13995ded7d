//! Line diff: Myers shortest edit script grouped into unified-diff hunks.
//!
//! The script comes from the linear-space variant of Myers' algorithm
//! (divide at the middle snake), and every contiguous run of changes is
//! normalized so its deletions come before its insertions. Both steps are deterministic, so equal inputs always produce
//! the same patch.

use crate::patch::{split_lines, Hunk, LineOp, OpKind, Patch};
use std::ops::{Index, IndexMut, Range};

/// Unchanged lines kept on each side of a change.
pub const DEFAULT_CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Equal { old: usize, new: usize },
    Delete { old: usize },
    Insert { new: usize },
}

impl Edit {
    fn is_change(&self) -> bool {
        !matches!(self, Edit::Equal { .. })
    }
}

/// Compute the patch turning `old` into `new` with [`DEFAULT_CONTEXT`] lines
/// of context.
pub fn diff(old: &str, new: &str) -> Patch {
    diff_with_context(old, new, DEFAULT_CONTEXT)
}

/// Compute the patch turning `old` into `new`, keeping up to `context`
/// unchanged lines around each change.
pub fn diff_with_context(old: &str, new: &str, context: usize) -> Patch {
    if old == new {
        return Patch::default();
    }

    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let edits = normalize_runs(edit_script(&old_lines, &new_lines));

    group_hunks(&edits, &old_lines, &new_lines, context)
}

fn edit_script(a: &[&str], b: &[&str]) -> Vec<Edit> {
    let mut edits = Vec::with_capacity(a.len().max(b.len()));
    let mut vf = Frontier::new(a.len() + b.len());
    let mut vb = Frontier::new(a.len() + b.len());
    conquer(a, 0..a.len(), b, 0..b.len(), &mut vf, &mut vb, &mut edits);
    edits
}

/// Furthest-reaching `x` for each diagonal `k`, indexable by negative `k`.
struct Frontier {
    offset: isize,
    v: Vec<usize>,
}

impl Frontier {
    fn new(total_len: usize) -> Self {
        let max_d = max_d(total_len);
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d],
        }
    }
}

impl Index<isize> for Frontier {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Frontier {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn max_d(total_len: usize) -> usize {
    (total_len + 1) / 2 + 1
}

fn common_prefix(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[&str], b: &[&str]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Linear-space Myers: split at the middle snake and recurse on both halves,
/// so memory stays proportional to the input instead of to `(N + M) * D`.
fn conquer(
    a: &[&str],
    mut old: Range<usize>,
    b: &[&str],
    mut new: Range<usize>,
    vf: &mut Frontier,
    vb: &mut Frontier,
    out: &mut Vec<Edit>,
) {
    let prefix = common_prefix(&a[old.clone()], &b[new.clone()]);
    out.extend((0..prefix).map(|i| Edit::Equal {
        old: old.start + i,
        new: new.start + i,
    }));
    old.start += prefix;
    new.start += prefix;

    let suffix = common_suffix(&a[old.clone()], &b[new.clone()]);
    old.end -= suffix;
    new.end -= suffix;

    if old.is_empty() {
        out.extend(new.clone().map(|line| Edit::Insert { new: line }));
    } else if new.is_empty() {
        out.extend(old.clone().map(|line| Edit::Delete { old: line }));
    } else if let Some((x, y)) = middle_snake(a, old.clone(), b, new.clone(), vf, vb) {
        conquer(a, old.start..x, b, new.start..y, vf, vb, out);
        conquer(a, x..old.end, b, y..new.end, vf, vb, out);
    } else {
        out.extend(old.clone().map(|line| Edit::Delete { old: line }));
        out.extend(new.clone().map(|line| Edit::Insert { new: line }));
    }

    out.extend((0..suffix).map(|i| Edit::Equal {
        old: old.end + i,
        new: new.end + i,
    }));
}

/// Point where the forward and backward searches meet, in absolute line
/// indices of `a` and `b`.
fn middle_snake(
    a: &[&str],
    old: Range<usize>,
    b: &[&str],
    new: Range<usize>,
    vf: &mut Frontier,
    vb: &mut Frontier,
) -> Option<(usize, usize)> {
    let n = old.len();
    let m = new.len();
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    vf[1] = 0;
    vb[1] = 0;

    for d in 0..max_d(n + m) as isize {
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix(&a[old.start + x..old.end], &b[new.start + y..new.end]);
            }
            vf[k] = x;
            if odd && (k - delta).abs() < d && vf[k] + vb[-(k - delta)] >= n {
                return Some((old.start + x0, new.start + y0));
            }
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            if x < n && y < m {
                let advance = common_suffix(
                    &a[old.start..old.start + n - x],
                    &b[new.start..new.start + m - y],
                );
                x += advance;
                y += advance;
            }
            vb[k] = x;
            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Some((old.start + n - x, new.start + m - y));
            }
        }
    }
    None
}

/// Reorder each run of consecutive changes so deletions precede insertions.
fn normalize_runs(edits: Vec<Edit>) -> Vec<Edit> {
    let mut out = Vec::with_capacity(edits.len());
    let mut deletes = Vec::new();
    let mut inserts = Vec::new();

    for edit in edits {
        match edit {
            Edit::Delete { .. } => deletes.push(edit),
            Edit::Insert { .. } => inserts.push(edit),
            Edit::Equal { .. } => {
                out.append(&mut deletes);
                out.append(&mut inserts);
                out.push(edit);
            }
        }
    }
    out.append(&mut deletes);
    out.append(&mut inserts);
    out
}

fn group_hunks(edits: &[Edit], old_lines: &[&str], new_lines: &[&str], context: usize) -> Patch {
    let changes: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_change())
        .map(|(i, _)| i)
        .collect();

    let Some((&first, rest)) = changes.split_first() else {
        return Patch::default();
    };

    // Lines of old/new text that precede each edit.
    let mut old_before = Vec::with_capacity(edits.len());
    let mut new_before = Vec::with_capacity(edits.len());
    let (mut old_pos, mut new_pos) = (0usize, 0usize);
    for edit in edits {
        old_before.push(old_pos);
        new_before.push(new_pos);
        match edit {
            Edit::Equal { .. } => {
                old_pos += 1;
                new_pos += 1;
            }
            Edit::Delete { .. } => old_pos += 1,
            Edit::Insert { .. } => new_pos += 1,
        }
    }

    let mut groups = Vec::new();
    let (mut group_start, mut group_end) = (first, first);
    for &change in rest {
        if change - group_end - 1 > 2 * context {
            groups.push((group_start, group_end));
            group_start = change;
        }
        group_end = change;
    }
    groups.push((group_start, group_end));

    let hunks = groups
        .into_iter()
        .map(|(start, end)| {
            let lo = start.saturating_sub(context);
            let hi = (end + context + 1).min(edits.len());
            let ops: Vec<LineOp> = edits[lo..hi]
                .iter()
                .map(|edit| match *edit {
                    Edit::Equal { old, .. } => LineOp::new(OpKind::Context, old_lines[old]),
                    Edit::Delete { old } => LineOp::new(OpKind::Delete, old_lines[old]),
                    Edit::Insert { new } => LineOp::new(OpKind::Insert, new_lines[new]),
                })
                .collect();

            let old_count = ops.iter().filter(|op| op.kind != OpKind::Insert).count();
            let new_count = ops.iter().filter(|op| op.kind != OpKind::Delete).count();
            Hunk {
                old_start: range_start(old_before[lo], old_count),
                old_count,
                new_start: range_start(new_before[lo], new_count),
                new_count,
                ops,
            }
        })
        .collect();

    Patch::new(hunks)
}

fn range_start(lines_before: usize, count: usize) -> usize {
    if count == 0 {
        lines_before
    } else {
        lines_before + 1
    }
}
