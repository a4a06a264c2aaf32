//! Inline transport: archive bytes supplied directly by the caller.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::acquire::stream::SizeLimitedRead;
use crate::acquire::{check_declared_size, AcquiredStream, InlineData, MAX_TARBALL_SIZE};
use crate::error::{DiffError, Phase};

/// Acquire from raw bytes or a base64 string.
pub(crate) fn acquire_inline(data: &InlineData) -> Result<AcquiredStream, DiffError> {
    let bytes = match data {
        InlineData::Bytes(bytes) => bytes.clone(),
        InlineData::Base64(text) => STANDARD
            .decode(text.trim().as_bytes())
            .map_err(|err| DiffError::with_cause(Phase::Fetch, "Invalid base64 data", &err))?,
    };
    let len = bytes.len() as u64;
    check_declared_size(len)?;
    Ok(AcquiredStream {
        reader: Box::new(SizeLimitedRead::new(Cursor::new(bytes), MAX_TARBALL_SIZE)),
        declared_size: Some(len),
    })
}
