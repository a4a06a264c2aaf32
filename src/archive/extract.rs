//! Tar extraction into an in-memory file mapping.
//!
//! # Invariants
//! - Symlink and hard-link entries abort extraction; an archive is either
//!   fully link-free or rejected.
//! - Extracted paths never start with `package/` and are never empty.
//! - Entry order in the resulting map follows tar stream order.
//!
//! # Design Notes
//! - Entry bodies are gathered in bounded chunks and concatenated, with a
//!   fast path when a body fits a single chunk.
//! - Non-file entries are drained, not skipped-by-seek: the stream is not
//!   seekable and draining keeps block alignment.

use std::io::Read;

use crate::archive::tar::{read_exact_payload, skip_fully, TarCursor, TarEntryMeta, TarNext};
use crate::error::{DiffError, Phase};
use crate::filemap::FileMap;

/// Top-level directory conventionally wrapping packaged archives.
pub const PACKAGE_PREFIX: &str = "package/";

/// Gather chunk size for entry bodies.
const BODY_CHUNK_LEN: usize = 64 * 1024;

/// Header fields exposed to entry filters.
#[derive(Clone, Copy, Debug)]
pub struct EntryHeader {
    /// Entry payload size in bytes.
    pub size: u64,
    /// Raw tar type flag.
    pub typeflag: u8,
}

/// Tooling knobs for [`extract_with`].
///
/// The plain [`extract`] path strips the `package/` prefix and keeps every
/// regular file.
pub struct ExtractOptions {
    /// Strip one leading `package/` from entry paths.
    pub strip_prefix: bool,
    /// Keep only entries for which the predicate returns true.
    pub filter: Option<Box<dyn FnMut(&str, &EntryHeader) -> bool + Send>>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strip_prefix: true,
            filter: None,
        }
    }
}

/// Extract a tar byte stream into a [`FileMap`].
pub fn extract<R: Read>(input: R) -> Result<FileMap, DiffError> {
    extract_with(input, ExtractOptions::default())
}

/// Extract with explicit prefix-stripping and filtering behavior.
pub fn extract_with<R: Read>(
    mut input: R,
    mut options: ExtractOptions,
) -> Result<FileMap, DiffError> {
    let mut cursor = TarCursor::new();
    let mut map = FileMap::new();
    let mut entries_seen = 0u64;

    loop {
        let (name, header, is_file, pad) = match cursor.next_entry(&mut input)? {
            TarNext::End => break,
            TarNext::Entry(meta) => {
                if meta.is_symlink() || meta.is_hardlink() {
                    return Err(link_rejection(&meta));
                }
                let name = String::from_utf8_lossy(meta.name).into_owned();
                let header = EntryHeader {
                    size: meta.size,
                    typeflag: meta.typeflag,
                };
                (name, header, meta.is_regular(), meta.pad)
            }
        };
        entries_seen += 1;

        if !is_file {
            // Directories and other non-file kinds carry no extractable
            // content; drain to stay block-aligned.
            skip_fully(&mut input, header.size + pad)?;
            continue;
        }

        let path = match target_path(&name, options.strip_prefix) {
            Some(path) => path,
            None => {
                skip_fully(&mut input, header.size + pad)?;
                continue;
            }
        };

        if let Some(filter) = options.filter.as_mut() {
            if !filter(&path, &header) {
                skip_fully(&mut input, header.size + pad)?;
                continue;
            }
        }

        let body = read_entry_body(&mut input, header.size)?;
        skip_fully(&mut input, pad)?;
        map.insert(path, body);
    }

    tracing::debug!(entries = entries_seen, files = map.len(), "archive extracted");
    Ok(map)
}

/// Resolve the stored path for an entry, or `None` to drop it.
fn target_path(name: &str, strip_prefix: bool) -> Option<String> {
    let path = if strip_prefix {
        name.strip_prefix(PACKAGE_PREFIX).unwrap_or(name)
    } else {
        name
    };
    if path.is_empty() {
        return None;
    }
    Some(path.to_string())
}

fn link_rejection(meta: &TarEntryMeta<'_>) -> DiffError {
    let name = String::from_utf8_lossy(meta.name);
    let target = if meta.linkname.is_empty() {
        "(unknown)".into()
    } else {
        String::from_utf8_lossy(meta.linkname)
    };
    DiffError::new(
        Phase::Tar,
        format!("Symlinks are not supported: {name} -> {target}"),
    )
}

/// Read an entry body by gathering bounded chunks.
///
/// A body that fits one chunk is returned without copying.
fn read_entry_body<R: Read>(input: &mut R, size: u64) -> Result<Vec<u8>, DiffError> {
    let mut chunks: Vec<Vec<u8>> = Vec::new();
    let mut remaining = size;
    while remaining > 0 {
        let step = remaining.min(BODY_CHUNK_LEN as u64) as usize;
        let mut chunk = vec![0u8; step];
        read_exact_payload(input, &mut chunk)?;
        chunks.push(chunk);
        remaining -= step as u64;
    }
    match chunks.len() {
        0 => Ok(Vec::new()),
        1 => Ok(chunks.pop().expect("one gathered chunk")),
        _ => {
            let mut body = Vec::with_capacity(size as usize);
            for chunk in &chunks {
                body.extend_from_slice(chunk);
            }
            Ok(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::testutil::{tar_dir, tar_entry, tar_finish, tar_symlink};
    use std::io::Cursor;

    fn build(entries: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
        let mut tar = Vec::new();
        entries(&mut tar);
        tar_finish(&mut tar);
        tar
    }

    #[test]
    fn strips_the_package_prefix() {
        let tar = build(|tar| {
            tar_entry(tar, "package/index.js", b"const x = 1;\n");
            tar_entry(tar, "package/lib/util.js", b"ok");
        });
        let map = extract(Cursor::new(tar)).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["index.js", "lib/util.js"]);
        assert_eq!(map.get("index.js"), Some(b"const x = 1;\n".as_slice()));
    }

    #[test]
    fn keeps_paths_outside_the_package_directory() {
        let tar = build(|tar| {
            tar_entry(tar, "README.md", b"top-level");
            tar_entry(tar, "package/inner.txt", b"inner");
        });
        let map = extract(Cursor::new(tar)).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["README.md", "inner.txt"]);
    }

    #[test]
    fn drops_entries_that_strip_to_nothing() {
        let tar = build(|tar| {
            tar_entry(tar, "package/", b"");
            tar_entry(tar, "package/kept.txt", b"k");
        });
        let map = extract(Cursor::new(tar)).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains("kept.txt"));
    }

    #[test]
    fn directories_are_drained_without_extraction() {
        let tar = build(|tar| {
            tar_dir(tar, "package/lib/");
            tar_entry(tar, "package/lib/a.js", b"a");
        });
        let map = extract(Cursor::new(tar)).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["lib/a.js"]);
    }

    #[test]
    fn symlink_entries_are_rejected() {
        let tar = build(|tar| {
            tar_entry(tar, "package/index.js", b"real");
            tar_symlink(tar, "package/link.js", "index.js");
        });
        let err = extract(Cursor::new(tar)).unwrap_err();
        assert_eq!(err.phase(), Phase::Tar);
        assert!(err.message().contains("Symlinks are not supported"));
        assert!(err.message().contains("link.js"));
        assert!(err.message().contains("index.js"));
    }

    #[test]
    fn symlink_without_target_reports_unknown() {
        let tar = build(|tar| {
            tar_symlink(tar, "package/dangling", "");
        });
        let err = extract(Cursor::new(tar)).unwrap_err();
        assert!(err.message().contains("-> (unknown)"));
    }

    #[test]
    fn collisions_keep_the_last_writer() {
        let tar = build(|tar| {
            tar_entry(tar, "package/dup.txt", b"first");
            tar_entry(tar, "package/dup.txt", b"second");
        });
        let map = extract(Cursor::new(tar)).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("dup.txt"), Some(b"second".as_slice()));
    }

    #[test]
    fn empty_input_extracts_to_an_empty_map() {
        let map = extract(Cursor::new(Vec::new())).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn filter_drops_unmatched_entries() {
        let tar = build(|tar| {
            tar_entry(tar, "package/keep.js", b"k");
            tar_entry(tar, "package/skip.md", b"s");
        });
        let options = ExtractOptions {
            strip_prefix: true,
            filter: Some(Box::new(|path, _hdr| path.ends_with(".js"))),
        };
        let map = extract_with(Cursor::new(tar), options).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["keep.js"]);
    }

    #[test]
    fn prefix_stripping_can_be_disabled() {
        let tar = build(|tar| {
            tar_entry(tar, "package/raw.txt", b"r");
        });
        let options = ExtractOptions {
            strip_prefix: false,
            filter: None,
        };
        let map = extract_with(Cursor::new(tar), options).unwrap();
        assert!(map.contains("package/raw.txt"));
    }

    #[test]
    fn large_bodies_cross_chunk_boundaries_intact() {
        let big: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let tar = build(|tar| {
            tar_entry(tar, "package/big.bin", &big);
        });
        let map = extract(Cursor::new(tar)).unwrap();
        assert_eq!(map.get("big.bin"), Some(big.as_slice()));
    }
}
