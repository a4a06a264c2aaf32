//! End-to-end composition: acquire → decompress → extract → diff → format.
//!
//! # Concurrency
//! The two archive sides run on scoped OS threads and join fail-fast: the
//! first side to error records its failure and trips a shared cancel flag;
//! the peer side observes the flag at its next stream read and unwinds.
//! The recorded error is always the original one, never the cancellation
//! artifact, and no partial output is ever produced.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;

use crate::acquire::{acquire, SourceConfig};
use crate::archive::{decompress, extract};
use crate::error::{self, DiffError, Phase};
use crate::filemap::FileMap;
use crate::format::{format_diff, FormatResult};
use crate::options::DiffOptions;

/// Compute the unified diff between two archives.
pub fn diff(
    left: &SourceConfig,
    right: &SourceConfig,
    options: &DiffOptions,
) -> Result<String, DiffError> {
    Ok(diff_with_stats(left, right, options)?.output)
}

/// Compute the unified diff plus aggregate statistics.
pub fn diff_with_stats(
    left: &SourceConfig,
    right: &SourceConfig,
    options: &DiffOptions,
) -> Result<FormatResult, DiffError> {
    let (left_files, right_files) = extract_pair(left, right)?;
    tracing::debug!(
        left_files = left_files.len(),
        right_files = right_files.len(),
        "archives extracted, formatting"
    );
    Ok(format_diff(&left_files, &right_files, options))
}

/// Acquire, decompress, and extract a single archive.
pub fn extract_package(config: &SourceConfig) -> Result<FileMap, DiffError> {
    let acquired = acquire(config)?;
    extract(decompress(acquired.reader))
}

/// First-error slot plus cooperative cancel flag shared by both sides.
struct Canceller {
    cancelled: AtomicBool,
    first_error: Mutex<Option<DiffError>>,
}

impl Canceller {
    fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            first_error: Mutex::new(None),
        }
    }

    /// Record a failure; only the first one sticks. Always trips the flag.
    fn fail(&self, err: DiffError) {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_none() {
            *slot = Some(err);
        }
        drop(slot);
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn take(&self) -> Option<DiffError> {
        self.first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// Read guard that aborts a side once the peer has failed.
struct CancelGuardRead<'a, R> {
    inner: R,
    canceller: &'a Canceller,
}

impl<R: Read> Read for CancelGuardRead<'_, R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if self.canceller.is_cancelled() {
            return Err(error::to_io(cancelled_error()));
        }
        self.inner.read(dst)
    }
}

fn cancelled_error() -> DiffError {
    DiffError::new(Phase::Fetch, "Cancelled after the peer archive failed")
}

fn run_side(config: &SourceConfig, canceller: &Canceller) -> Option<FileMap> {
    let result = (|| {
        let acquired = acquire(config)?;
        if canceller.is_cancelled() {
            return Err(cancelled_error());
        }
        let guarded = CancelGuardRead {
            inner: acquired.reader,
            canceller,
        };
        extract(decompress(guarded))
    })();
    match result {
        Ok(files) => Some(files),
        Err(err) => {
            canceller.fail(err);
            None
        }
    }
}

/// Run both sides concurrently with a fail-fast join.
fn extract_pair(
    left: &SourceConfig,
    right: &SourceConfig,
) -> Result<(FileMap, FileMap), DiffError> {
    let canceller = Canceller::new();

    let (left_files, right_files) = thread::scope(|scope| {
        let left_side = scope.spawn(|| run_side(left, &canceller));
        let right_side = scope.spawn(|| run_side(right, &canceller));
        (
            join_side(left_side, &canceller),
            join_side(right_side, &canceller),
        )
    });

    if let Some(err) = canceller.take() {
        return Err(err);
    }
    match (left_files, right_files) {
        (Some(left_files), Some(right_files)) => Ok((left_files, right_files)),
        _ => Err(DiffError::new(
            Phase::Diff,
            "Archive side finished without a result or an error",
        )),
    }
}

fn join_side(
    handle: thread::ScopedJoinHandle<'_, Option<FileMap>>,
    canceller: &Canceller,
) -> Option<FileMap> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => {
            canceller.fail(DiffError::new(Phase::Diff, "Archive worker panicked"));
            None
        }
    }
}
