//! Incremental codecs behind one push-style interface.
//!
//! Every algorithm is exposed as a [`Transform`]: the stream driver offers a
//! slice of input and a window of output space, and the transform reports how
//! much of each it used. Backends with a native incremental API (`flate2`,
//! `xz2`) map onto it directly; block-oriented backends stage whole blocks
//! through [`staging`].

pub mod deflate;
pub mod lz4_block;
pub mod lz4_frame;
pub mod lzfse;
pub mod staging;
pub mod types;
pub mod xz;

use std::fmt;
use std::str::FromStr;

use crate::config::{LZMA_PRESET, ZLIB_LEVEL};

pub use types::{CodecError, Operation, Status, Step};

/// One direction of one algorithm, driven a chunk at a time.
///
/// Contract for `process`:
/// * `consumed <= input.len()` and `produced <= output.len()`; the consumed
///   bytes are the front of `input`, the produced bytes the front of `output`.
/// * `finalize` is `true` when `input` holds the last bytes of the stream.
///   Once set, the caller keeps passing `true` on every later call.
/// * `Finished` is returned only after `finalize` was seen and every output
///   byte has been produced. Malformed input, a truncated stream or bytes
///   after the end marker are reported as `Err`.
pub trait Transform {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError>;
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        (**self).process(input, output, finalize)
    }
}

impl<T: Transform + ?Sized> Transform for &mut T {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        (**self).process(input, output, finalize)
    }
}

/// Compression algorithms selectable with `-a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// LZ4 blocks in the `bv41` container.
    Lz4,
    /// Standard LZ4 frame.
    Lz4Raw,
    Lzfse,
    /// `.xz` container with the LZMA2 filter.
    Lzma,
    /// Raw DEFLATE.
    Zlib,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Lz4,
        Algorithm::Lz4Raw,
        Algorithm::Lzfse,
        Algorithm::Lzma,
        Algorithm::Zlib,
    ];

    /// Name accepted by `-a`.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Lz4 => "lz4",
            Algorithm::Lz4Raw => "lz4_raw",
            Algorithm::Lzfse => "lzfse",
            Algorithm::Lzma => "lzma",
            Algorithm::Zlib => "zlib",
        }
    }

    /// File extension for this algorithm's output: a dot and the name.
    pub fn path_ext(self) -> &'static str {
        match self {
            Algorithm::Lz4 => ".lz4",
            Algorithm::Lz4Raw => ".lz4_raw",
            Algorithm::Lzfse => ".lzfse",
            Algorithm::Lzma => ".lzma",
            Algorithm::Zlib => ".zlib",
        }
    }

    /// Fresh transform for `operation`, ready for the first chunk.
    pub fn transform(self, operation: Operation) -> Result<Box<dyn Transform>, CodecError> {
        let t: Box<dyn Transform> = match (self, operation) {
            (Algorithm::Lz4, Operation::Compress) => Box::new(lz4_block::Lz4BlockEncoder::new()),
            (Algorithm::Lz4, Operation::Decompress) => Box::new(lz4_block::Lz4BlockDecoder::new()),
            (Algorithm::Lz4Raw, Operation::Compress) => Box::new(lz4_frame::Lz4FrameEncoder::new()),
            (Algorithm::Lz4Raw, Operation::Decompress) => Box::new(lz4_frame::Lz4FrameDecoder::new()),
            (Algorithm::Lzfse, Operation::Compress) => Box::new(lzfse::LzfseStreamEncoder::new()),
            (Algorithm::Lzfse, Operation::Decompress) => Box::new(lzfse::LzfseStreamDecoder::new()),
            (Algorithm::Lzma, Operation::Compress) => Box::new(xz::XzEncoder::new(LZMA_PRESET)?),
            (Algorithm::Lzma, Operation::Decompress) => Box::new(xz::XzDecoder::new()?),
            (Algorithm::Zlib, Operation::Compress) => Box::new(deflate::DeflateEncoder::new(ZLIB_LEVEL)),
            (Algorithm::Zlib, Operation::Decompress) => Box::new(deflate::DeflateDecoder::new()),
        };
        Ok(t)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognised `-a` value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid compression algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAlgorithm(s.to_owned()))
    }
}
