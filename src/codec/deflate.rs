//! `zlib` algorithm: raw DEFLATE (RFC 1951) without the zlib header or
//! Adler-32 trailer, the same bit stream macOS produces for `COMPRESSION_ZLIB`.
//!
//! Both directions map directly onto `flate2`'s low-level `Compress` /
//! `Decompress` objects, whose consume/produce counters already follow the
//! transform contract.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress};

use super::staging::{decoder_status, ended_step};
use super::types::{CodecError, Status, Step};
use super::Transform;

const NAME: &str = "zlib";

pub struct DeflateEncoder {
    inner: Compress,
    finished: bool,
}

impl DeflateEncoder {
    pub fn new(level: u32) -> Self {
        Self {
            inner: Compress::new(Compression::new(level.min(9)), false),
            finished: false,
        }
    }
}

impl Transform for DeflateEncoder {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        if self.finished {
            return Ok(Step::new(0, 0, Status::Finished));
        }
        let (in_before, out_before) = (self.inner.total_in(), self.inner.total_out());
        let flush = if finalize {
            FlushCompress::Finish
        } else {
            FlushCompress::None
        };
        let status = self
            .inner
            .compress(input, output, flush)
            .map_err(|e| CodecError::backend(NAME, e))?;
        let consumed = (self.inner.total_in() - in_before) as usize;
        let produced = (self.inner.total_out() - out_before) as usize;

        if finalize && matches!(status, flate2::Status::StreamEnd) {
            self.finished = true;
            return Ok(Step::new(consumed, produced, Status::Finished));
        }
        Ok(Step::new(consumed, produced, Status::Continue))
    }
}

pub struct DeflateDecoder {
    inner: Decompress,
    ended: bool,
}

impl DeflateDecoder {
    pub fn new() -> Self {
        Self {
            inner: Decompress::new(false),
            ended: false,
        }
    }
}

impl Default for DeflateDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for DeflateDecoder {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        if self.ended {
            return ended_step(NAME, input, finalize);
        }
        let (in_before, out_before) = (self.inner.total_in(), self.inner.total_out());
        let status = self
            .inner
            .decompress(input, output, FlushDecompress::None)
            .map_err(|e| CodecError::corrupt(NAME, e.to_string()))?;
        let consumed = (self.inner.total_in() - in_before) as usize;
        let produced = (self.inner.total_out() - out_before) as usize;

        if matches!(status, flate2::Status::StreamEnd) {
            self.ended = true;
            if consumed < input.len() {
                return Err(CodecError::TrailingData { algorithm: NAME });
            }
        }
        // Inflate fills the window before it stops, so spare room means nothing is held back.
        let drained = self.ended || produced < output.len();
        let status = decoder_status(NAME, finalize, consumed == input.len(), drained, self.ended)?;
        Ok(Step::new(consumed, produced, status))
    }
}
