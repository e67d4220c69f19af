//! File-level surface: opening the source, creating the destination and
//! running a compress or decompress job between them.

pub mod file_io;
pub mod file_op;

pub use file_io::{create_dst_file, open_src_file, source_size};
pub use file_op::{perform_file_op, run_jobs, FileJob, FileOpError};
