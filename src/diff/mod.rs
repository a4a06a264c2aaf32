//! Per-file and tree-level change computation.
//!
//! # Scope
//! Classify each path in the union of two file mappings, decide
//! text-vs-binary treatment, and compute unified patches for textual
//! changes. Rendering the git-style envelope around these records is the
//! formatter's job.
//!
//! # Invariants
//! - Tree diffs enumerate the sorted (byte-lexicographic) union of paths.
//! - Byte-identical files short-circuit before any decoding.
//! - A textual change that produces no hunks is reported as unchanged.

pub(crate) mod myers;
pub mod text;
pub mod unified;

use serde::Serialize;

use crate::binary_ext::is_binary_path;
use crate::filemap::FileMap;
use crate::options::DiffOptions;

pub use text::decode_bytes;
pub use unified::compute_diff;

pub(crate) use unified::has_hunks;

/// Change classification for one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Unchanged,
}

/// Per-file change record.
#[derive(Clone, Debug, Serialize)]
pub struct FileDiff {
    pub path: String,
    pub status: FileStatus,
    pub is_binary: bool,
    /// Unified patch text; absent for binary treatment and for paths with
    /// no textual change.
    pub patch: Option<String>,
}

/// Sorted union of the paths of both mappings.
pub(crate) fn sorted_union<'a>(left: &'a FileMap, right: &'a FileMap) -> Vec<&'a str> {
    let mut paths: Vec<&str> = left.keys().chain(right.keys()).collect();
    paths.sort_unstable();
    paths.dedup();
    paths
}

/// Length-first equality with a short-circuit byte scan.
#[inline]
pub(crate) fn bytes_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a == b
}

/// Compute the change record for one path.
pub fn compute_file_diff(
    path: &str,
    left: Option<&[u8]>,
    right: Option<&[u8]>,
    options: &DiffOptions,
) -> FileDiff {
    let is_binary = is_binary_path(path);
    let unchanged = |patch: Option<String>| FileDiff {
        path: path.to_string(),
        status: FileStatus::Unchanged,
        is_binary,
        patch,
    };

    let (status, old_header, new_header, old_bytes, new_bytes) = match (left, right) {
        (None, None) => return unchanged(None),
        (Some(a), Some(b)) => {
            if bytes_equal(a, b) {
                return unchanged(None);
            }
            (
                FileStatus::Modified,
                format!("{}{path}", options.old_prefix()),
                format!("{}{path}", options.new_prefix()),
                a,
                b,
            )
        }
        (None, Some(b)) => (
            FileStatus::Added,
            "/dev/null".to_string(),
            format!("{}{path}", options.new_prefix()),
            &[][..],
            b,
        ),
        (Some(a), None) => (
            FileStatus::Deleted,
            format!("{}{path}", options.old_prefix()),
            "/dev/null".to_string(),
            a,
            &[][..],
        ),
    };

    if is_binary && !options.text {
        return FileDiff {
            path: path.to_string(),
            status,
            is_binary,
            patch: None,
        };
    }

    let old_text = decode_bytes(old_bytes);
    let new_text = decode_bytes(new_bytes);
    let patch = compute_diff(&old_header, &new_header, &old_text, &new_text, options);

    if status == FileStatus::Modified && !has_hunks(&patch) {
        // Differs only in bytes the line diff cannot see (line endings,
        // invalid UTF-8 runs); not a change worth printing.
        return unchanged(None);
    }

    FileDiff {
        path: path.to_string(),
        status,
        is_binary,
        patch: Some(patch),
    }
}

/// Compute change records for every path in the union of both mappings.
pub fn compute_tree_diff(
    left: &FileMap,
    right: &FileMap,
    options: &DiffOptions,
) -> Vec<FileDiff> {
    sorted_union(left, right)
        .into_iter()
        .map(|path| compute_file_diff(path, left.get(path), right.get(path), options))
        .collect()
}
