//! Read adapters shared by the acquisition transports.
//!
//! Both adapters smuggle typed errors through `io::Error` so phases survive
//! the `Read` boundary between acquisition and extraction.

use std::io::{self, Read};

use crate::error::{self, DiffError, Phase};

/// Enforces a hard cap on bytes consumed from a source stream.
///
/// The cap guards against upstreams that understate (or omit) their
/// declared size: the declared-size gate alone only checks what the server
/// claims.
pub(crate) struct SizeLimitedRead<R> {
    inner: R,
    limit: u64,
    consumed: u64,
}

impl<R> SizeLimitedRead<R> {
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            consumed: 0,
        }
    }
}

impl<R: Read> Read for SizeLimitedRead<R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if self.consumed > self.limit {
            return Err(overrun(self.limit));
        }
        let n = self.inner.read(dst)?;
        self.consumed = self.consumed.saturating_add(n as u64);
        if self.consumed > self.limit {
            return Err(overrun(self.limit));
        }
        Ok(n)
    }
}

fn overrun(limit: u64) -> io::Error {
    error::to_io(DiffError::new(
        Phase::Size,
        format!("Archive stream exceeds limit of {limit} bytes"),
    ))
}

/// Tags source read failures with a fetch-phase context message.
///
/// Without this, a network error surfacing mid-decompression would be
/// misattributed to the decoder.
pub(crate) struct SourceRead<R> {
    inner: R,
    context: String,
}

impl<R> SourceRead<R> {
    pub fn new(inner: R, context: String) -> Self {
        Self { inner, context }
    }
}

impl<R: Read> Read for SourceRead<R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(dst) {
            Ok(n) => Ok(n),
            Err(err) if error::from_io(&err).is_some() => Err(err),
            Err(err) => Err(error::to_io(DiffError::with_cause(
                Phase::Fetch,
                self.context.clone(),
                &err,
            ))),
        }
    }
}
