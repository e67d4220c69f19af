// zapple: streaming single-file compression and decompression.
//
// Layers, leaves first:
//   codec  - the `Transform` trait and one adapter per algorithm
//   stream - buffer pair, driver loop, progress
//   io     - file primitives and file jobs
//   cli    - argument parsing and the display level

pub mod config;
pub mod xxhash;
pub mod codec;
pub mod stream;
pub mod io;
pub mod cli;

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use codec::{Algorithm, CodecError, Operation, Status, Step, Transform};
pub use config::StreamConfig;
pub use io::{perform_file_op, run_jobs, FileJob, FileOpError};
pub use stream::{compress_bytes, decompress_bytes, transform_bytes, StreamDriver, StreamError, StreamStats};
