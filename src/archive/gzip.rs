//! Streaming gzip decompression.
//!
//! # Invariants
//! - The stream is read sequentially; no seeking, no full-input buffering.
//! - `MultiGzDecoder` treats concatenated members as a single stream; an
//!   empty member (header + trailer only) yields zero bytes without error.
//!
//! # Design Notes
//! - Errors already tagged by an upstream adapter (size limiter, network
//!   wrapper, cancel guard) pass through unchanged; anything else raised
//!   during a read originates in the decoder and is reported as invalid
//!   gzip data.

use std::io::{self, Read};

use flate2::read::MultiGzDecoder;

use crate::error::{self, DiffError, Phase};

/// gzip magic bytes (RFC 1952).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// True when `header` starts with the gzip magic.
#[inline]
pub fn is_gzip_magic(header: &[u8]) -> bool {
    header.len() >= 2 && header[0] == GZIP_MAGIC[0] && header[1] == GZIP_MAGIC[1]
}

/// Read wrapper that counts bytes consumed from the inner reader.
///
/// # Guarantees
/// - `bytes()` is monotonic and saturating.
pub(crate) struct CountedRead<R> {
    inner: R,
    bytes: u64,
}

impl<R> CountedRead<R> {
    #[inline]
    pub fn new(inner: R) -> Self {
        Self { inner, bytes: 0 }
    }

    #[inline]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    #[inline]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CountedRead<R> {
    #[inline]
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(dst)?;
        self.bytes = self.bytes.saturating_add(n as u64);
        Ok(n)
    }
}

/// Streaming gzip decoder over an acquired byte stream.
///
/// Reads yield decompressed tar bytes; corruption is reported as a typed
/// decompression failure carrying the decoder's error as cause.
pub struct GzipStream<R: Read> {
    dec: MultiGzDecoder<CountedRead<R>>,
}

impl<R: Read> GzipStream<R> {
    #[inline]
    pub fn new(reader: R) -> Self {
        Self {
            dec: MultiGzDecoder::new(CountedRead::new(reader)),
        }
    }

    /// Compressed bytes consumed from the source so far.
    #[inline]
    pub fn total_compressed(&self) -> u64 {
        self.dec.get_ref().bytes()
    }

    #[inline]
    pub fn into_inner(self) -> R {
        self.dec.into_inner().into_inner()
    }
}

impl<R: Read> Read for GzipStream<R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        match self.dec.read(dst) {
            Ok(n) => Ok(n),
            // Upstream adapters tag their failures; keep those phases.
            Err(err) if error::from_io(&err).is_some() => Err(err),
            Err(err) => Err(error::to_io(DiffError::with_cause(
                Phase::Decompress,
                "Invalid gzip data",
                &err,
            ))),
        }
    }
}

/// Wrap a compressed byte stream in a streaming gzip decoder.
pub fn decompress<R: Read>(input: R) -> GzipStream<R> {
    GzipStream::new(input)
}
