//! Git-style output assembly and aggregate statistics.
//!
//! # Invariants
//! - Output enumerates the sorted union of both mappings' paths.
//! - Every emitted block ends with exactly one newline; blocks are joined
//!   by a single `\n`, which renders as one blank line between blocks.
//! - The index line always uses the zero-blob placeholder
//!   `0000000..0000000`.

use crate::binary_ext::is_binary_path;
use crate::diff::text::decode_bytes;
use crate::diff::{bytes_equal, compute_diff, has_hunks, sorted_union, FileStatus};
use crate::filemap::FileMap;
use crate::options::DiffOptions;

/// Rendered diff plus aggregate counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatResult {
    pub output: String,
    pub files_changed: usize,
    pub files_added: usize,
    pub files_deleted: usize,
}

/// Render the full diff between two file mappings.
pub fn format_diff(left: &FileMap, right: &FileMap, options: &DiffOptions) -> FormatResult {
    let mut blocks: Vec<String> = Vec::new();
    let mut changed_paths: Vec<&str> = Vec::new();
    let mut files_changed = 0usize;
    let mut files_added = 0usize;
    let mut files_deleted = 0usize;

    let src = options.old_prefix();
    let dst = options.new_prefix();

    for path in sorted_union(left, right) {
        let old = left.get(path);
        let new = right.get(path);
        let status = match (old, new) {
            (Some(a), Some(b)) if bytes_equal(a, b) => continue,
            (Some(_), Some(_)) => FileStatus::Modified,
            (None, Some(_)) => FileStatus::Added,
            (Some(_), None) => FileStatus::Deleted,
            (None, None) => continue,
        };
        match status {
            FileStatus::Added => files_added += 1,
            FileStatus::Deleted => files_deleted += 1,
            _ => {}
        }

        if options.name_only {
            changed_paths.push(path);
            files_changed += 1;
            continue;
        }

        if is_binary_path(path) && !options.text {
            blocks.push(binary_block(path, status, src, dst));
            files_changed += 1;
            continue;
        }

        let (old_header, new_header) = match status {
            FileStatus::Added => ("/dev/null".to_string(), format!("{dst}{path}")),
            FileStatus::Deleted => (format!("{src}{path}"), "/dev/null".to_string()),
            _ => (format!("{src}{path}"), format!("{dst}{path}")),
        };
        let old_text = old.map(decode_bytes).unwrap_or_default();
        let new_text = new.map(decode_bytes).unwrap_or_default();
        let patch = compute_diff(&old_header, &new_header, &old_text, &new_text, options);
        if !has_hunks(&patch) {
            continue;
        }

        let mut block = format!("diff --git {src}{path} {dst}{path}\n");
        match status {
            FileStatus::Added => {
                block.push_str("new file mode 100644\nindex 0000000..0000000\n");
            }
            FileStatus::Deleted => {
                block.push_str("deleted file mode 100644\nindex 0000000..0000000\n");
            }
            _ => block.push_str("index 0000000..0000000 100644\n"),
        }
        block.push_str(patch.strip_suffix('\n').unwrap_or(&patch));
        block.push('\n');
        blocks.push(block);
        files_changed += 1;
    }

    let output = if options.name_only {
        if changed_paths.is_empty() {
            String::new()
        } else {
            let mut out = changed_paths.join("\n");
            out.push('\n');
            out
        }
    } else {
        blocks.join("\n")
    };

    FormatResult {
        output,
        files_changed,
        files_added,
        files_deleted,
    }
}

fn binary_block(path: &str, status: FileStatus, src: &str, dst: &str) -> String {
    let mut block = format!("diff --git {src}{path} {dst}{path}\n");
    match status {
        FileStatus::Added => {
            block.push_str("new file mode 100644\nindex 0000000..0000000\n");
            block.push_str(&format!("Binary files /dev/null and {dst}{path} differ\n"));
        }
        FileStatus::Deleted => {
            block.push_str("deleted file mode 100644\nindex 0000000..0000000\n");
            block.push_str(&format!("Binary files {src}{path} and /dev/null differ\n"));
        }
        _ => {
            block.push_str("index 0000000..0000000 100644\n");
            block.push_str(&format!(
                "Binary files {src}{path} and {dst}{path} differ\n"
            ));
        }
    }
    block
}
