//! Git-compatible unified diffs between packaged tarballs, computed
//! entirely in memory.
//!
//! The pipeline acquires two gzip-compressed tar archives (HTTP(S), S3,
//! inline bytes, or local file), streams them through decompression and
//! tar extraction into ordered path→bytes mappings, and renders a
//! byte-stable git-style unified diff over the sorted union of paths:
//!
//! acquire → decompress → extract → per-file diff → format
//!
//! Both archive sides run concurrently and join fail-fast. There is no
//! filesystem requirement beyond the optional file transport, no write
//! side effects, and a hard 20 MiB per-archive acquisition cap enforced on
//! both declared and actually consumed bytes. Every failure is a
//! [`DiffError`] with a pipeline phase, a fixed HTTP status, and
//! credential-redacted diagnostics.
//!
//! ```no_run
//! use pkgdiff::{diff, DiffOptions, SourceConfig, Auth};
//!
//! let left = SourceConfig::Url {
//!     source: "https://registry.example/pkg/-/pkg-1.0.0.tgz".into(),
//!     auth: Auth::None,
//! };
//! let right = SourceConfig::Url {
//!     source: "https://registry.example/pkg/-/pkg-1.1.0.tgz".into(),
//!     auth: Auth::None,
//! };
//! let patch = diff(&left, &right, &DiffOptions::default())?;
//! print!("{patch}");
//! # Ok::<(), pkgdiff::DiffError>(())
//! ```

pub mod acquire;
pub mod archive;
pub mod binary_ext;
pub mod diff;
pub mod error;
pub mod filemap;
pub mod format;
pub mod options;
pub mod pipeline;
pub mod sanitize;

pub use acquire::{
    acquire, AcquiredStream, Auth, InlineData, SourceConfig, MAX_TARBALL_SIZE,
};
pub use archive::{
    decompress, extract, extract_with, EntryHeader, ExtractOptions, PACKAGE_PREFIX,
};
pub use binary_ext::{
    binary_extensions, is_binary_extension, is_binary_path, should_print_patch,
};
pub use diff::{
    compute_diff, compute_file_diff, compute_tree_diff, decode_bytes, FileDiff, FileStatus,
};
pub use error::{ensure, is_diff_error, DiffError, Phase};
pub use filemap::FileMap;
pub use format::{format_diff, FormatResult};
pub use options::DiffOptions;
pub use pipeline::{diff, diff_with_stats, extract_package};
pub use sanitize::sanitize_credentials;
