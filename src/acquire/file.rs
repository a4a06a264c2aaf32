//! Local-file transport.
//!
//! # Design Notes
//! - OS errors map onto stable messages so front-ends can present them
//!   without inspecting error kinds.
//! - Reads go through a 64 KiB buffered reader; the file is never mapped
//!   or slurped whole.

use std::fs;
use std::io::BufReader;
use std::path::Path;

use crate::acquire::stream::{SizeLimitedRead, SourceRead};
use crate::acquire::{check_declared_size, AcquiredStream, MAX_TARBALL_SIZE};
use crate::error::{DiffError, Phase};

const FILE_CHUNK_LEN: usize = 64 * 1024;

/// Acquire an archive from the local filesystem.
pub(crate) fn acquire_file(path: &Path) -> Result<AcquiredStream, DiffError> {
    let display = path.display().to_string();
    let meta = fs::metadata(path).map_err(|err| stat_error(err, &display))?;

    if meta.is_dir() {
        return Err(DiffError::new(
            Phase::Fetch,
            format!("Path is a directory, not a file: {display}"),
        ));
    }
    if !meta.is_file() {
        return Err(DiffError::new(
            Phase::Fetch,
            format!("Not a regular file: {display}"),
        ));
    }
    check_declared_size(meta.len())?;

    let file = fs::File::open(path).map_err(|err| stat_error(err, &display))?;
    let reader = SizeLimitedRead::new(
        SourceRead::new(
            BufReader::with_capacity(FILE_CHUNK_LEN, file),
            format!("Error reading {display}"),
        ),
        MAX_TARBALL_SIZE,
    );
    Ok(AcquiredStream {
        reader: Box::new(reader),
        declared_size: Some(meta.len()),
    })
}

fn stat_error(err: std::io::Error, display: &str) -> DiffError {
    match err.kind() {
        std::io::ErrorKind::NotFound => {
            DiffError::new(Phase::Fetch, format!("File not found: {display}"))
        }
        std::io::ErrorKind::PermissionDenied => {
            DiffError::new(Phase::Fetch, format!("Permission denied: {display}"))
        }
        _ => DiffError::with_cause(Phase::Fetch, format!("Failed to read {display}"), &err),
    }
}
