//! File primitives for one stream session.
//!
//! - [`open_src_file`]: opens the source for reading, rejecting directories.
//! - [`source_size`]: the source length used for progress.
//! - [`create_dst_file`]: creates the destination, truncating an existing file.
//!
//! Every failure names the path it concerns. Handles close on drop.

use std::fs::File;
use std::path::Path;

use super::file_op::FileOpError;
use crate::displaylevel;

// ---------------------------------------------------------------------------
// Source file
// ---------------------------------------------------------------------------

/// Opens `path` for reading.
///
/// A directory is refused with [`FileOpError::NotRegularFile`] before any
/// open is attempted; every other failure is [`FileOpError::NotReadable`].
pub fn open_src_file(path: &Path) -> Result<File, FileOpError> {
    if path.is_dir() {
        return Err(FileOpError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| FileOpError::NotReadable {
        path: path.to_path_buf(),
        source,
    })?;
    displaylevel!(4, "opened source {}\n", path.display());
    Ok(file)
}

/// Size in bytes of an opened source.
pub fn source_size(file: &File, path: &Path) -> Result<u64, FileOpError> {
    let meta = file.metadata().map_err(|source| FileOpError::StatUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() {
        return Err(FileOpError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }
    Ok(meta.len())
}

// ---------------------------------------------------------------------------
// Destination file
// ---------------------------------------------------------------------------

/// Creates `path` for writing. An existing file is truncated.
pub fn create_dst_file(path: &Path) -> Result<File, FileOpError> {
    let file = File::create(path).map_err(|source| FileOpError::CreateFailed {
        path: path.to_path_buf(),
        source,
    })?;
    displaylevel!(4, "created destination {}\n", path.display());
    Ok(file)
}
