//! End-to-end pipeline tests over in-memory archives.
//!
//! Archives are synthesized as gzip'd tar bytes and fed through the inline
//! transport, so the full acquire → decompress → extract → diff → format
//! path runs without touching the network or the filesystem.

mod common;

use common::{gz, tar_entry, tar_finish, tar_symlink, targz};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pkgdiff::{
    diff, diff_with_stats, extract_package, DiffOptions, InlineData, Phase, SourceConfig,
    MAX_TARBALL_SIZE,
};

fn inline(bytes: Vec<u8>) -> SourceConfig {
    SourceConfig::Inline {
        data: InlineData::Bytes(bytes),
    }
}

#[test]
fn identical_archives_produce_an_empty_diff() {
    let archive = targz(&[
        ("package/index.js", b"const x = 1;\n"),
        ("package/package.json", b"{\"name\":\"t\"}\n"),
    ]);
    let output = diff(
        &inline(archive.clone()),
        &inline(archive.clone()),
        &DiffOptions::default(),
    )
    .unwrap();
    assert_eq!(output, "");

    let stats = diff_with_stats(
        &inline(archive.clone()),
        &inline(archive),
        &DiffOptions::default(),
    )
    .unwrap();
    assert_eq!(stats.files_changed, 0);
    assert_eq!(stats.files_added, 0);
    assert_eq!(stats.files_deleted, 0);
}

#[test]
fn modified_file_shows_removed_and_added_lines() {
    let left = targz(&[("package/index.js", b"const x = 1;")]);
    let right = targz(&[("package/index.js", b"const x = 2;")]);
    let output = diff(&inline(left), &inline(right), &DiffOptions::default()).unwrap();
    assert!(output.contains("diff --git a/index.js b/index.js"));
    assert!(output.contains("-const x = 1;"));
    assert!(output.contains("+const x = 2;"));
}

#[test]
fn added_and_deleted_files_are_counted_and_marked() {
    let left = targz(&[
        ("package/deleted.js", b"a"),
        ("package/unchanged.js", b"s"),
    ]);
    let right = targz(&[("package/added.js", b"b"), ("package/unchanged.js", b"s")]);
    let stats = diff_with_stats(&inline(left), &inline(right), &DiffOptions::default()).unwrap();
    assert_eq!(stats.files_added, 1);
    assert_eq!(stats.files_deleted, 1);
    assert!(stats.output.contains("new file mode 100644"));
    assert!(stats.output.contains("deleted file mode 100644"));
}

#[test]
fn binary_files_get_the_binary_block_unless_text_is_forced() {
    let left = targz(&[("package/image.png", &[0x89u8, 0x50, 0x0a, 0x01][..])]);
    let right = targz(&[("package/image.png", &[0x89u8, 0x50, 0x0a, 0x02][..])]);

    let output = diff(
        &inline(left.clone()),
        &inline(right.clone()),
        &DiffOptions::default(),
    )
    .unwrap();
    assert!(output.contains("Binary files a/image.png and b/image.png differ"));
    assert!(!output.contains("@@"));

    let forced = DiffOptions {
        text: true,
        ..DiffOptions::default()
    };
    let output = diff(&inline(left), &inline(right), &forced).unwrap();
    assert!(!output.contains("Binary files"));
    assert!(output.lines().any(|line| line.starts_with('-')));
    assert!(output.lines().any(|line| line.starts_with('+')));
}

#[test]
fn name_only_lists_exactly_the_changed_paths() {
    let left = targz(&[("package/index.js", b"1\n"), ("package/same.js", b"s\n")]);
    let right = targz(&[("package/index.js", b"2\n"), ("package/same.js", b"s\n")]);
    let options = DiffOptions {
        name_only: true,
        ..DiffOptions::default()
    };
    let output = diff(&inline(left), &inline(right), &options).unwrap();
    assert_eq!(output, "index.js\n");
}

#[test]
fn oversized_inline_archives_fail_the_size_gate() {
    let bytes = vec![0u8; (MAX_TARBALL_SIZE + 1) as usize];
    let err = extract_package(&inline(bytes)).unwrap_err();
    assert_eq!(err.phase(), Phase::Size);
    assert_eq!(err.status(), 413);
    assert!(err.message().contains("exceeds limit"));
}

#[test]
fn symlink_entries_fail_extraction() {
    let mut tar = Vec::new();
    tar_entry(&mut tar, "package/index.js", b"real\n");
    tar_symlink(&mut tar, "package/link.js", "index.js");
    tar_finish(&mut tar);

    let err = extract_package(&inline(gz(&tar))).unwrap_err();
    assert_eq!(err.phase(), Phase::Tar);
    assert_eq!(err.status(), 422);
    assert!(err.message().contains("Symlinks are not supported"));
    assert!(err.message().contains("link.js"));
}

#[test]
fn extracted_paths_lose_the_package_prefix() {
    let archive = targz(&[
        ("package/index.js", b"a"),
        ("package/lib/util.js", b"b"),
        ("top-level.txt", b"c"),
    ]);
    let files = extract_package(&inline(archive)).unwrap();
    for path in files.keys() {
        assert!(!path.is_empty());
        assert!(!path.starts_with("package/"), "{path}");
    }
    assert!(files.contains("index.js"));
    assert!(files.contains("lib/util.js"));
    assert!(files.contains("top-level.txt"));
}

#[test]
fn base64_inline_archives_are_accepted() {
    let archive = targz(&[("package/a.txt", b"hello\n")]);
    let encoded = STANDARD.encode(&archive);
    let files = extract_package(&SourceConfig::Inline {
        data: InlineData::Base64(encoded),
    })
    .unwrap();
    assert_eq!(files.get("a.txt"), Some(b"hello\n".as_slice()));
}

#[test]
fn corrupt_base64_fails_fetch() {
    let err = extract_package(&SourceConfig::Inline {
        data: InlineData::Base64("!!!not base64!!!".into()),
    })
    .unwrap_err();
    assert_eq!(err.phase(), Phase::Fetch);
    assert!(err.message().contains("Invalid base64 data"));
}

#[test]
fn an_empty_gzip_member_extracts_to_an_empty_archive() {
    let files = extract_package(&inline(gz(b""))).unwrap();
    assert!(files.is_empty());
}

#[test]
fn corrupt_gzip_fails_decompression() {
    let mut archive = targz(&[("package/a.txt", b"payload payload payload")]);
    let mid = archive.len() / 2;
    archive[mid] ^= 0xff;
    archive[mid + 1] ^= 0xff;
    let err = extract_package(&inline(archive)).unwrap_err();
    assert_eq!(err.phase(), Phase::Decompress);
    assert_eq!(err.status(), 422);
}

#[test]
fn output_blocks_follow_the_sorted_union_of_paths() {
    let left = targz(&[
        ("package/zebra.txt", b"1\n"),
        ("package/alpha.txt", b"1\n"),
        ("package/mike.txt", b"1\n"),
    ]);
    let right = targz(&[
        ("package/zebra.txt", b"2\n"),
        ("package/alpha.txt", b"2\n"),
        ("package/mike.txt", b"2\n"),
    ]);
    let output = diff(&inline(left), &inline(right), &DiffOptions::default()).unwrap();
    let positions: Vec<usize> = ["a/alpha.txt", "a/mike.txt", "a/zebra.txt"]
        .iter()
        .map(|needle| output.find(*needle).unwrap())
        .collect();
    assert!(positions[0] < positions[1]);
    assert!(positions[1] < positions[2]);
}

#[test]
fn crlf_normalization_suppresses_line_ending_only_changes() {
    let left = targz(&[("package/notes.txt", b"alpha\r\nbeta\r\n")]);
    let right = targz(&[("package/notes.txt", b"alpha\nbeta\n")]);
    let stats = diff_with_stats(&inline(left), &inline(right), &DiffOptions::default()).unwrap();
    assert_eq!(stats.output, "");
    assert_eq!(stats.files_changed, 0);
}

#[test]
fn whitespace_flags_suppress_whitespace_only_changes() {
    let left = targz(&[("package/code.js", b"let  x = 1;\n")]);
    let right = targz(&[("package/code.js", b"let x =  1;\n")]);

    let plain = diff_with_stats(
        &inline(left.clone()),
        &inline(right.clone()),
        &DiffOptions::default(),
    )
    .unwrap();
    assert_eq!(plain.files_changed, 1);

    let relaxed = DiffOptions {
        ignore_all_space: true,
        ..DiffOptions::default()
    };
    let stats = diff_with_stats(&inline(left), &inline(right), &relaxed).unwrap();
    assert_eq!(stats.output, "");
    assert_eq!(stats.files_changed, 0);
}

#[test]
fn file_transport_round_trips_through_the_pipeline() {
    use std::io::Write;

    let dir = tempfile::TempDir::new().unwrap();
    let left_path = dir.path().join("left.tgz");
    let right_path = dir.path().join("right.tgz");
    std::fs::File::create(&left_path)
        .unwrap()
        .write_all(&targz(&[("package/x.txt", b"one\n")]))
        .unwrap();
    std::fs::File::create(&right_path)
        .unwrap()
        .write_all(&targz(&[("package/x.txt", b"two\n")]))
        .unwrap();

    let output = diff(
        &SourceConfig::File { path: left_path },
        &SourceConfig::File { path: right_path },
        &DiffOptions::default(),
    )
    .unwrap();
    assert!(output.contains("-one"));
    assert!(output.contains("+two"));
}
