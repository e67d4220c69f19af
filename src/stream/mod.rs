//! Streaming engine: the working buffer pair, the driver loop and progress
//! reporting, plus in-memory helpers built on them.

pub mod buffer;
pub mod driver;
pub mod progress;

pub use buffer::{InputBuffer, OutputBuffer};
pub use driver::{StreamDriver, StreamError, StreamStats};
pub use progress::{Progress, ProgressSnapshot};

use crate::codec::{Algorithm, Operation};
use crate::config::StreamConfig;

/// Runs one session over an in-memory slice and returns the output.
pub fn transform_bytes(
    operation: Operation,
    algorithm: Algorithm,
    data: &[u8],
    config: &StreamConfig,
) -> Result<Vec<u8>, StreamError> {
    let transform = algorithm.transform(operation)?;
    let mut src = data;
    let mut out = Vec::with_capacity(data.len() / 2 + 64);
    StreamDriver::new(*config).run(&mut src, &mut out, transform, data.len() as u64, |_| Ok(()))?;
    Ok(out)
}

pub fn compress_bytes(algorithm: Algorithm, data: &[u8]) -> Result<Vec<u8>, StreamError> {
    transform_bytes(Operation::Compress, algorithm, data, &StreamConfig::default())
}

pub fn decompress_bytes(algorithm: Algorithm, data: &[u8]) -> Result<Vec<u8>, StreamError> {
    transform_bytes(Operation::Decompress, algorithm, data, &StreamConfig::default())
}
