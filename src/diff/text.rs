//! Text decoding and line handling for the differ.

use std::borrow::Cow;

/// Lenient UTF-8 decode: malformed sequences become U+FFFD, never errors.
pub fn decode_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Normalize line endings: CRLF first, then any remaining lone CR.
pub(crate) fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Split into lines without terminators; a trailing newline does not
/// produce a phantom empty line.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<&str> = text.split('\n').collect();
    if text.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Matching key for whitespace-insensitive comparison: whitespace runs
/// collapse to a single space and ends are trimmed.
pub(crate) fn whitespace_key(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_run = false;
    for ch in line.chars() {
        if ch.is_whitespace() {
            in_run = true;
            continue;
        }
        if in_run && !out.is_empty() {
            out.push(' ');
        }
        in_run = false;
        out.push(ch);
    }
    out
}
