//! One compress-or-decompress job from a source file to a destination file.
//!
//! [`perform_file_op`] wires the file primitives to the stream driver and
//! renders the `Compressing 'src': 42%…` line on stderr. [`run_jobs`] runs a
//! list of jobs and reports whether all of them succeeded.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli::constants::display_level;
use crate::codec::{Algorithm, Operation};
use crate::config::StreamConfig;
use crate::displaylevel;
use crate::stream::{ProgressSnapshot, StreamDriver, StreamError, StreamStats};

use super::file_io::{create_dst_file, open_src_file, source_size};

// ---------------------------------------------------------------------------
// Job and error types
// ---------------------------------------------------------------------------

/// What to do, with which algorithm, from where to where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub operation: Operation,
    pub algorithm: Algorithm,
    pub src: PathBuf,
    pub dst: PathBuf,
}

/// Why a file job failed.
#[derive(Debug, thiserror::Error)]
pub enum FileOpError {
    #[error("could not open source file: {}: {source}", path.display())]
    NotReadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("not a regular file: {}", path.display())]
    NotRegularFile { path: PathBuf },
    #[error("could not obtain source size: {}: {source}", path.display())]
    StatUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not create destination file: {}: {source}", path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The session itself failed: codec setup, a codec error, or a read or write.
    #[error("{}: {source}", path.display())]
    Stream {
        path: PathBuf,
        #[source]
        source: StreamError,
    },
}

impl FileOpError {
    /// Opening, sizing, creating, reading or writing failed.
    pub fn is_io(&self) -> bool {
        match self {
            FileOpError::Stream { source, .. } => source.is_io(),
            _ => true,
        }
    }

    /// The codec rejected the data or misbehaved.
    pub fn is_codec(&self) -> bool {
        !self.is_io()
    }
}

// ---------------------------------------------------------------------------
// Progress rendering
// ---------------------------------------------------------------------------

/// Redraws the progress line when the whole percentage changes.
struct ProgressLine {
    label: String,
    shown: Option<u32>,
    last: ProgressSnapshot,
}

impl ProgressLine {
    fn new(job: &FileJob, total: u64) -> Self {
        Self {
            label: format!("{} '{}'", job.operation.verb(), job.src.display()),
            shown: None,
            last: ProgressSnapshot { consumed: 0, total },
        }
    }

    fn update(&mut self, snapshot: &ProgressSnapshot) -> io::Result<()> {
        self.last = *snapshot;
        if display_level() < 2 {
            return Ok(());
        }
        let percent = snapshot.percent();
        if self.shown == Some(percent) {
            return Ok(());
        }
        self.shown = Some(percent);
        let mut err = io::stderr().lock();
        write!(err, "{}: {}%\u{2026}\r", self.label, percent)?;
        err.flush()
    }

    fn finish(&self) {
        displaylevel!(2, "{}: {}%.\n", self.label, self.last.percent());
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Runs one job end to end.
///
/// The source is opened and sized and the codec built before the destination
/// is created, so a job that fails early leaves no destination behind. Once
/// streaming has begun, a failure leaves the partial destination in place.
pub fn perform_file_op(job: &FileJob, config: &StreamConfig) -> Result<StreamStats, FileOpError> {
    let mut src = open_src_file(&job.src)?;
    let total = source_size(&src, &job.src)?;
    let transform = job
        .algorithm
        .transform(job.operation)
        .map_err(|e| FileOpError::Stream {
            path: job.src.clone(),
            source: StreamError::Codec(e),
        })?;
    let mut dst = create_dst_file(&job.dst)?;

    displaylevel!(
        4,
        "{} {} -> {} ({}, {} bytes)\n",
        job.operation,
        job.src.display(),
        job.dst.display(),
        job.algorithm,
        total
    );

    let mut line = ProgressLine::new(job, total);
    let result = StreamDriver::new(*config).run(&mut src, &mut dst, transform, total, |snapshot| {
        line.update(snapshot)
    });
    line.finish();

    let stats = result.map_err(|source| FileOpError::Stream {
        path: job.src.clone(),
        source,
    })?;
    displaylevel!(
        3,
        "{}: {} bytes -> {} bytes in {} calls\n",
        job.src.display(),
        stats.bytes_in,
        stats.bytes_out,
        stats.calls
    );
    Ok(stats)
}

/// Runs every job, reporting failures as they happen.
///
/// A failed job does not stop the ones after it; the result is `true` only
/// if all of them succeeded.
pub fn run_jobs(jobs: &[FileJob], config: &StreamConfig) -> bool {
    jobs.iter()
        .map(|job| match perform_file_op(job, config) {
            Ok(_) => true,
            Err(e) => {
                displaylevel!(1, "error: {}\n", e);
                false
            }
        })
        .fold(true, |all, ok| all && ok)
}
