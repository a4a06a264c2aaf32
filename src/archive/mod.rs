//! Archive handling: streaming gzip decompression and tar extraction.
//!
//! # Scope
//! This module turns an acquired compressed byte stream into an ordered
//! in-memory path→bytes mapping. It recognizes regular-file, directory,
//! hard-link, and symlink tar entries; links are rejected, everything else
//! non-file is drained.

pub mod extract;
pub mod gzip;
pub(crate) mod tar;

#[cfg(test)]
pub(crate) mod testutil;

pub use extract::{extract, extract_with, EntryHeader, ExtractOptions, PACKAGE_PREFIX};
pub use gzip::{decompress, is_gzip_magic, GzipStream, GZIP_MAGIC};
