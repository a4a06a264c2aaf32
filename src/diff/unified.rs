//! Unified-diff rendering with context hunks.
//!
//! Output follows the classic envelope: `---` / `+++` path headers, then
//! `@@ -l,c +l,c @@` hunks with ` `/`-`/`+` prefixed lines. Counts are
//! always written, and a zero-length side anchors on the line before the
//! change (`-0,0` for an insertion at the top).

use ahash::AHashMap;

use crate::diff::myers::{diff_lines, Edit};
use crate::diff::text::{normalize_newlines, split_lines, whitespace_key};
use crate::options::DiffOptions;

/// Compute a unified diff between two texts.
///
/// `old_path` and `new_path` are the header paths exactly as they should
/// appear (prefix already applied, or `/dev/null`). The result always
/// carries the two header lines; hunks follow only when the texts differ.
pub fn compute_diff(
    old_path: &str,
    new_path: &str,
    old_text: &str,
    new_text: &str,
    options: &DiffOptions,
) -> String {
    let old_norm = normalize_newlines(old_text);
    let new_norm = normalize_newlines(new_text);
    let old_lines = split_lines(&old_norm);
    let new_lines = split_lines(&new_norm);

    let (old_ids, new_ids) = intern(&old_lines, &new_lines, options.ignore_whitespace());
    let edits = diff_lines(&old_ids, &new_ids);
    let hunks = build_hunks(&old_lines, &new_lines, &edits, options.context);

    let mut out = String::new();
    out.push_str("--- ");
    out.push_str(old_path);
    out.push_str("\n+++ ");
    out.push_str(new_path);
    out.push('\n');
    for hunk in &hunks {
        hunk.render(&mut out);
    }
    out
}

/// True when a rendered patch contains at least one hunk.
pub(crate) fn has_hunks(patch: &str) -> bool {
    patch.lines().any(|line| line.starts_with("@@"))
}

/// Assign stable identifiers to lines; equal keys get equal identifiers.
fn intern(old: &[&str], new: &[&str], ignore_whitespace: bool) -> (Vec<u32>, Vec<u32>) {
    let mut table: AHashMap<String, u32> = AHashMap::new();
    let mut id_of = |line: &str| -> u32 {
        let key = if ignore_whitespace {
            whitespace_key(line)
        } else {
            line.to_string()
        };
        let next = table.len() as u32;
        *table.entry(key).or_insert(next)
    };
    let old_ids = old.iter().map(|line| id_of(line)).collect();
    let new_ids = new.iter().map(|line| id_of(line)).collect();
    (old_ids, new_ids)
}

struct Hunk {
    old_start: usize,
    old_count: usize,
    new_start: usize,
    new_count: usize,
    lines: Vec<String>,
}

impl Hunk {
    fn render(&self, out: &mut String) {
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            self.old_start, self.old_count, self.new_start, self.new_count
        ));
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Group changes into context hunks.
///
/// Change groups whose surrounding context windows would touch (gap of at
/// most `2 * context` kept lines) merge into one hunk.
fn build_hunks(old: &[&str], new: &[&str], edits: &[Edit], context: usize) -> Vec<Hunk> {
    // Position of each edit in the old/new line sequences.
    let mut positions = Vec::with_capacity(edits.len());
    let (mut oi, mut ni) = (0usize, 0usize);
    for edit in edits {
        positions.push((oi, ni));
        match edit {
            Edit::Keep => {
                oi += 1;
                ni += 1;
            }
            Edit::Delete => oi += 1,
            Edit::Insert => ni += 1,
        }
    }

    let change_indices: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, e)| **e != Edit::Keep)
        .map(|(idx, _)| idx)
        .collect();
    if change_indices.is_empty() {
        return Vec::new();
    }

    let mut groups: Vec<(usize, usize)> = Vec::new();
    let mut start = change_indices[0];
    let mut last = change_indices[0];
    for &idx in &change_indices[1..] {
        if idx - last - 1 <= 2 * context {
            last = idx;
        } else {
            groups.push((start, last));
            start = idx;
            last = idx;
        }
    }
    groups.push((start, last));

    let mut hunks = Vec::with_capacity(groups.len());
    for (first, last) in groups {
        let hunk_start = first.saturating_sub(context);
        let hunk_end = (last + context).min(edits.len() - 1);

        let (old_anchor, new_anchor) = positions[hunk_start];
        let mut old_count = 0usize;
        let mut new_count = 0usize;
        let mut lines = Vec::with_capacity(hunk_end - hunk_start + 1);
        for idx in hunk_start..=hunk_end {
            let (o, n) = positions[idx];
            match edits[idx] {
                Edit::Keep => {
                    lines.push(format!(" {}", old[o]));
                    old_count += 1;
                    new_count += 1;
                }
                Edit::Delete => {
                    lines.push(format!("-{}", old[o]));
                    old_count += 1;
                }
                Edit::Insert => {
                    lines.push(format!("+{}", new[n]));
                    new_count += 1;
                }
            }
        }

        hunks.push(Hunk {
            old_start: if old_count > 0 { old_anchor + 1 } else { old_anchor },
            old_count,
            new_start: if new_count > 0 { new_anchor + 1 } else { new_anchor },
            new_count,
            lines,
        });
    }
    hunks
}
