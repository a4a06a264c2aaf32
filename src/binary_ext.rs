//! Path-extension classification for binary content.
//!
//! The table is the canonical binary-extension list (images, audio, video,
//! archives, executables, fonts, office documents, ...) plus `wasm` and
//! `node`, which show up in published packages and must not be rendered as
//! text. It is built once at first use into a process-global read-only set;
//! [`binary_extensions`] hands out an independent copy so callers cannot
//! reach the master.
//!
//! Extension semantics follow the dotfile convention: the extension is the
//! lowercased suffix after the final `.` of the final path component, so
//! `.gitignore` has extension `gitignore` and a name without a dot has no
//! extension at all.

use std::sync::OnceLock;

use ahash::AHashSet;

/// Canonical list of file extensions treated as binary.
static BINARY_EXTENSIONS: &[&str] = &[
    "3dm", "3ds", "3g2", "3gp", "7z", "a", "aac", "adp", "afdesign", "afphoto", "afpub", "ai",
    "aif", "aiff", "alz", "ape", "apk", "appimage", "ar", "arj", "asf", "au", "avi", "bak",
    "baml", "bh", "bin", "bk", "bmp", "btif", "bz2", "bzip2", "cab", "caf", "cgm", "class",
    "cmx", "cpio", "cr2", "cur", "dat", "dcm", "deb", "dex", "djvu", "dll", "dmg", "dng",
    "doc", "docm", "docx", "dot", "dotm", "dra", "dsk", "dts", "dtshd", "dvb", "dwg", "dxf",
    "ecelp4800", "ecelp7470", "ecelp9600", "egg", "eol", "eot", "epub", "exe", "f4v", "fbs",
    "fh", "fla", "flac", "flatpak", "fli", "flv", "fpx", "fst", "fvt", "g3", "gh", "gif",
    "graffle", "gz", "gzip", "h261", "h263", "h264", "icns", "ico", "ief", "img", "ipa",
    "iso", "jar", "jpeg", "jpg", "jpgv", "jpm", "jxr", "key", "ktx", "lha", "lib", "lvp",
    "lz", "lzh", "lzma", "lzo", "m3u", "m4a", "m4v", "mar", "mdi", "mht", "mid", "midi",
    "mj2", "mka", "mkv", "mmr", "mng", "mobi", "mov", "movie", "mp3", "mp4", "mp4a", "mpeg",
    "mpg", "mpga", "mxu", "nef", "npx", "numbers", "nupkg", "o", "odp", "ods", "odt", "oga",
    "ogg", "ogv", "otf", "ott", "pages", "pbm", "pcx", "pdb", "pdf", "pea", "pgm", "pic",
    "png", "pnm", "pot", "potm", "potx", "ppa", "ppam", "ppm", "pps", "ppsm", "ppsx", "ppt",
    "pptm", "pptx", "psd", "pya", "pyc", "pyo", "pyv", "qt", "rar", "ras", "raw", "resources",
    "rgb", "rip", "rlc", "rmf", "rmvb", "rpm", "rtf", "rz", "s3m", "s7z", "scpt", "sgi",
    "shar", "sil", "sketch", "slk", "smv", "snap", "snk", "so", "stl", "sub", "suo", "swf",
    "tar", "tbz", "tbz2", "tga", "tgz", "thmx", "tif", "tiff", "tlz", "ttc", "ttf", "txz",
    "udf", "uvh", "uvi", "uvm", "uvp", "uvs", "uvu", "viv", "vob", "war", "wav", "wax",
    "wbmp", "wdp", "weba", "webm", "webp", "whl", "wim", "wm", "wma", "wmv", "wmx", "woff",
    "woff2", "wrm", "wvx", "xbm", "xif", "xla", "xlam", "xls", "xlsb", "xlsm", "xlsx", "xlt",
    "xltm", "xltx", "xm", "xmind", "xpi", "xpm", "xwd", "xz", "z", "zip", "zipx",
];

/// Extensions added on top of the canonical list.
static EXTRA_EXTENSIONS: &[&str] = &["wasm", "node"];

fn extension_set() -> &'static AHashSet<&'static str> {
    static SET: OnceLock<AHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut set =
            AHashSet::with_capacity(BINARY_EXTENSIONS.len() + EXTRA_EXTENSIONS.len());
        set.extend(BINARY_EXTENSIONS.iter().copied());
        set.extend(EXTRA_EXTENSIONS.iter().copied());
        set
    })
}

/// Independent copy of the full extension list (canonical + additions).
pub fn binary_extensions() -> Vec<&'static str> {
    let mut out = Vec::with_capacity(BINARY_EXTENSIONS.len() + EXTRA_EXTENSIONS.len());
    out.extend_from_slice(BINARY_EXTENSIONS);
    out.extend_from_slice(EXTRA_EXTENSIONS);
    out
}

/// Case-insensitive membership test against the extension table.
///
/// The input is an extension without a leading dot; dotted forms are never
/// members.
pub fn is_binary_extension(ext: &str) -> bool {
    if ext.is_empty() {
        return false;
    }
    if ext.bytes().any(|b| b.is_ascii_uppercase()) {
        return extension_set().contains(ext.to_ascii_lowercase().as_str());
    }
    extension_set().contains(ext)
}

/// True when the path's extension classifies it as binary content.
///
/// Empty paths and paths with no extension are text.
pub fn is_binary_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let name = path.rsplit('/').next().unwrap_or(path);
    let ext = match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => return false,
    };
    is_binary_extension(ext)
}

/// Whether a textual patch should be produced for `path`.
///
/// The `text` option overrides binary classification.
pub fn should_print_patch(path: &str, options: &crate::options::DiffOptions) -> bool {
    options.text || !is_binary_path(path)
}
