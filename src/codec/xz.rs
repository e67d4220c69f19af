//! `lzma` algorithm: the `.xz` container (LZMA2 filter, CRC64 check).
//!
//! Backed by liblzma through `xz2::stream::Stream`, which exposes the
//! classic `lzma_code` loop. The decoder runs in concatenated mode so several
//! `.xz` streams back to back decode as one, as the `xz` tool does; in that
//! mode liblzma only reports the end after `LZMA_FINISH`, which lines up with
//! the finalize flag.

use xz2::stream::{Action, Check, Stream, CONCATENATED};

use super::staging::{decoder_status, ended_step};
use super::types::{CodecError, Status, Step};
use super::Transform;

const NAME: &str = "lzma";

pub struct XzEncoder {
    stream: Stream,
    finished: bool,
}

impl XzEncoder {
    pub fn new(preset: u32) -> Result<Self, CodecError> {
        let stream = Stream::new_easy_encoder(preset.min(9), Check::Crc64).map_err(|e| {
            CodecError::Init {
                algorithm: NAME,
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            stream,
            finished: false,
        })
    }
}

impl Transform for XzEncoder {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        if self.finished {
            return Ok(Step::new(0, 0, Status::Finished));
        }
        let (in_before, out_before) = (self.stream.total_in(), self.stream.total_out());
        let action = if finalize { Action::Finish } else { Action::Run };
        let status = self
            .stream
            .process(input, output, action)
            .map_err(|e| CodecError::backend(NAME, e))?;
        let consumed = (self.stream.total_in() - in_before) as usize;
        let produced = (self.stream.total_out() - out_before) as usize;

        if finalize && matches!(status, xz2::stream::Status::StreamEnd) {
            self.finished = true;
            return Ok(Step::new(consumed, produced, Status::Finished));
        }
        Ok(Step::new(consumed, produced, Status::Continue))
    }
}

pub struct XzDecoder {
    stream: Stream,
    ended: bool,
}

impl XzDecoder {
    pub fn new() -> Result<Self, CodecError> {
        let stream = Stream::new_stream_decoder(u64::MAX, CONCATENATED).map_err(|e| {
            CodecError::Init {
                algorithm: NAME,
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            stream,
            ended: false,
        })
    }
}

impl Transform for XzDecoder {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        if self.ended {
            return ended_step(NAME, input, finalize);
        }
        let (in_before, out_before) = (self.stream.total_in(), self.stream.total_out());
        let action = if finalize { Action::Finish } else { Action::Run };
        let status = self
            .stream
            .process(input, output, action)
            .map_err(|e| CodecError::corrupt(NAME, e.to_string()))?;
        let consumed = (self.stream.total_in() - in_before) as usize;
        let produced = (self.stream.total_out() - out_before) as usize;

        if matches!(status, xz2::stream::Status::StreamEnd) {
            self.ended = true;
            if consumed < input.len() {
                return Err(CodecError::TrailingData { algorithm: NAME });
            }
        }
        let drained = self.ended || produced < output.len();
        let status = decoder_status(NAME, finalize, consumed == input.len(), drained, self.ended)?;
        Ok(Step::new(consumed, produced, status))
    }
}
