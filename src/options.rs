//! Options accepted by the diff entry points.

use serde::{Deserialize, Serialize};

/// Rendering and comparison options for tree diffs.
///
/// Field names mirror the wire shape front-ends pass through, so the type
/// deserializes directly from a `{"nameOnly": true, ...}` options object.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiffOptions {
    /// Emit only the newline-separated list of changed paths.
    pub name_only: bool,
    /// Unified-diff context line count.
    pub context: usize,
    /// Whitespace-insensitive comparison.
    pub ignore_all_space: bool,
    /// Whitespace-insensitive comparison; equivalent to `ignore_all_space`.
    pub ignore_space_change: bool,
    /// Drop the `a/` / `b/` path prefixes.
    pub no_prefix: bool,
    /// Source-side path prefix.
    pub src_prefix: String,
    /// Destination-side path prefix.
    pub dst_prefix: String,
    /// Force text treatment of paths classified as binary.
    pub text: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            name_only: false,
            context: 3,
            ignore_all_space: false,
            ignore_space_change: false,
            no_prefix: false,
            src_prefix: "a/".to_string(),
            dst_prefix: "b/".to_string(),
            text: false,
        }
    }
}

impl DiffOptions {
    /// Effective source prefix after `no_prefix` is applied.
    #[inline]
    pub(crate) fn old_prefix(&self) -> &str {
        if self.no_prefix {
            ""
        } else {
            &self.src_prefix
        }
    }

    /// Effective destination prefix after `no_prefix` is applied.
    #[inline]
    pub(crate) fn new_prefix(&self) -> &str {
        if self.no_prefix {
            ""
        } else {
            &self.dst_prefix
        }
    }

    /// True when either whitespace flag requests insensitive matching.
    ///
    /// Both flags collapse whitespace runs identically; they are accepted
    /// separately for command-line parity.
    #[inline]
    pub(crate) fn ignore_whitespace(&self) -> bool {
        self.ignore_all_space || self.ignore_space_change
    }
}
