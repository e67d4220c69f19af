//! The stream driver: pushes a source of arbitrary length through a
//! [`Transform`] one buffer at a time.
//!
//! One call to [`StreamDriver::run`] is one session. The loop refills the
//! input half only once the transform has taken every byte of it, writes
//! whatever the transform produced before calling it again, and reports
//! progress after each call. The transform is owned by the call, so its codec
//! state is released on every exit path.

use std::io::{self, Read, Write};

use crate::codec::{CodecError, Status, Transform};
use crate::config::StreamConfig;

use super::buffer::{InputBuffer, OutputBuffer};
use super::progress::{Progress, ProgressSnapshot};

/// Byte and call counts of a completed session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Bytes read from the source.
    pub bytes_in: u64,
    /// Bytes written to the destination.
    pub bytes_out: u64,
    /// Transform invocations.
    pub calls: u64,
}

/// Why a session stopped before the transform finished.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The transform kept asking to continue without consuming or producing.
    #[error("codec made no progress in {calls} consecutive calls")]
    Stalled { calls: u32 },
    /// The transform claimed more bytes than it was offered.
    #[error(
        "codec reported {consumed} bytes consumed and {produced} produced, \
         but was given {available} input bytes and {space} bytes of room"
    )]
    InvalidStep {
        consumed: usize,
        produced: usize,
        available: usize,
        space: usize,
    },
    /// The transform finished early: before the last chunk, or with input left over.
    #[error("codec finished with {unconsumed} input bytes unconsumed (last chunk seen: {finalize})")]
    PrematureFinish { unconsumed: usize, finalize: bool },
}

impl StreamError {
    /// `true` for source and destination failures.
    pub fn is_io(&self) -> bool {
        matches!(self, StreamError::Read(_) | StreamError::Write(_))
    }
}

/// Runs stream sessions with a fixed [`StreamConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamDriver {
    config: StreamConfig,
}

impl StreamDriver {
    pub fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Drives `transform` over all of `src`, writing its output to `dst`.
    ///
    /// `total` is the source size used for progress; `on_progress` sees a
    /// snapshot after every transform call, and its errors are ignored. The
    /// destination is flushed on success. On failure whatever was already
    /// written stays written.
    pub fn run<R, W, T, F>(
        &self,
        src: &mut R,
        dst: &mut W,
        mut transform: T,
        total: u64,
        on_progress: F,
    ) -> Result<StreamStats, StreamError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
        T: Transform,
        F: FnMut(&ProgressSnapshot) -> io::Result<()>,
    {
        let mut input = InputBuffer::new(self.config.effective_input_capacity());
        let mut output = OutputBuffer::new(self.config.effective_output_capacity());
        let stall_limit = self.config.effective_stall_limit();
        let mut progress = Progress::new(total, on_progress);
        let mut stats = StreamStats::default();
        let mut finalize = false;
        let mut idle_calls = 0u32;

        loop {
            if input.is_consumed() && !finalize {
                let n = input.refill(src).map_err(StreamError::Read)?;
                stats.bytes_in += n as u64;
                finalize = n < input.capacity();
            }

            let available = input.unconsumed().len();
            let space = output.spare_mut().len();
            let step = transform.process(input.unconsumed(), output.spare_mut(), finalize)?;
            stats.calls += 1;
            if step.consumed > available || step.produced > space {
                return Err(StreamError::InvalidStep {
                    consumed: step.consumed,
                    produced: step.produced,
                    available,
                    space,
                });
            }
            input.consume(step.consumed);
            output.advance(step.produced);

            if !output.is_empty() {
                dst.write_all(output.filled()).map_err(StreamError::Write)?;
                stats.bytes_out += output.filled().len() as u64;
                output.clear();
            }
            progress.update(stats.bytes_in);

            match step.status {
                Status::Finished => {
                    if !finalize || !input.is_consumed() {
                        return Err(StreamError::PrematureFinish {
                            unconsumed: input.unconsumed().len(),
                            finalize,
                        });
                    }
                    break;
                }
                Status::Continue if step.is_idle() => {
                    idle_calls += 1;
                    if idle_calls >= stall_limit {
                        return Err(StreamError::Stalled { calls: idle_calls });
                    }
                }
                Status::Continue => idle_calls = 0,
            }
        }

        dst.flush().map_err(StreamError::Write)?;
        Ok(stats)
    }
}
