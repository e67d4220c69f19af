//! `lz4` algorithm: LZ4 blocks in the `bv41` block container used by the
//! macOS Compression framework.
//!
//! ```text
//! "bv41" | decoded size u32le | encoded size u32le | LZ4 block
//! "bv4-" | size u32le         | raw bytes
//! "bv4$"                                              end of stream
//! ```
//!
//! The encoder emits independent blocks of [`LZ4_BLOCK_SIZE`] bytes and falls
//! back to a raw block when LZ4 does not shrink the data. The decoder also
//! accepts blocks that reference the previous 64 KiB of output.

use crate::config::{KB, LZ4_BLOCK_SIZE, MAX_DECODE_BLOCK};

use super::staging::{decoder_status, le_u32, Gather, Pending};
use super::types::{CodecError, Status, Step};
use super::Transform;

const NAME: &str = "lz4";

const MAGIC_COMPRESSED: &[u8; 4] = b"bv41";
const MAGIC_RAW: &[u8; 4] = b"bv4-";
const MAGIC_END: &[u8; 4] = b"bv4$";

const DICT_SIZE: usize = 64 * KB;

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

pub struct Lz4BlockEncoder {
    stage: Vec<u8>,
    block_size: usize,
    pending: Pending,
    ended: bool,
}

impl Lz4BlockEncoder {
    pub fn new() -> Self {
        Self::with_block_size(LZ4_BLOCK_SIZE)
    }

    pub fn with_block_size(block_size: usize) -> Self {
        let block_size = block_size.clamp(1, MAX_DECODE_BLOCK);
        Self {
            stage: Vec::with_capacity(block_size),
            block_size,
            pending: Pending::default(),
            ended: false,
        }
    }

    fn flush_block(&mut self) {
        let packed = lz4_flex::block::compress(&self.stage);
        if packed.len() < self.stage.len() {
            self.pending.push(MAGIC_COMPRESSED);
            self.pending.push(&(self.stage.len() as u32).to_le_bytes());
            self.pending.push(&(packed.len() as u32).to_le_bytes());
            self.pending.push(&packed);
        } else {
            self.pending.push(MAGIC_RAW);
            self.pending.push(&(self.stage.len() as u32).to_le_bytes());
            self.pending.push(&self.stage);
        }
        self.stage.clear();
    }
}

impl Default for Lz4BlockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Lz4BlockEncoder {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        let mut consumed = 0;
        let mut produced = 0;
        loop {
            produced += self.pending.drain_into(&mut output[produced..]);
            if !self.pending.is_empty() {
                break;
            }
            if consumed < input.len() {
                let take = (self.block_size - self.stage.len()).min(input.len() - consumed);
                self.stage.extend_from_slice(&input[consumed..consumed + take]);
                consumed += take;
                if self.stage.len() == self.block_size {
                    self.flush_block();
                }
                continue;
            }
            if finalize && !self.ended {
                if !self.stage.is_empty() {
                    self.flush_block();
                }
                self.pending.push(MAGIC_END);
                self.ended = true;
                continue;
            }
            break;
        }
        let status = if self.ended && self.pending.is_empty() {
            Status::Finished
        } else {
            Status::Continue
        };
        Ok(Step::new(consumed, produced, status))
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Magic,
    CompressedHeader,
    CompressedPayload { decoded: usize },
    RawHeader,
    RawPayload { remaining: usize },
    Ended,
}

pub struct Lz4BlockDecoder {
    state: State,
    gather: Gather,
    pending: Pending,
    // Tail of the decoded output, for blocks that match into earlier data.
    window: Vec<u8>,
    scratch: Vec<u8>,
}

impl Lz4BlockDecoder {
    pub fn new() -> Self {
        let mut gather = Gather::default();
        gather.expect(4);
        Self {
            state: State::Magic,
            gather,
            pending: Pending::default(),
            window: Vec::with_capacity(DICT_SIZE),
            scratch: Vec::new(),
        }
    }

    fn remember(&mut self, bytes: &[u8]) {
        if bytes.len() >= DICT_SIZE {
            self.window.clear();
            self.window.extend_from_slice(&bytes[bytes.len() - DICT_SIZE..]);
            return;
        }
        self.window.extend_from_slice(bytes);
        if self.window.len() > DICT_SIZE {
            let excess = self.window.len() - DICT_SIZE;
            self.window.drain(..excess);
        }
    }

    fn expect_magic(&mut self) {
        self.gather.expect(4);
        self.state = State::Magic;
    }

    /// Acts on a fully gathered header or payload.
    fn complete(&mut self) -> Result<(), CodecError> {
        match self.state {
            State::Magic => {
                let mut magic = [0u8; 4];
                magic.copy_from_slice(self.gather.bytes());
                match &magic {
                    MAGIC_COMPRESSED => {
                        self.gather.expect(8);
                        self.state = State::CompressedHeader;
                    }
                    MAGIC_RAW => {
                        self.gather.expect(4);
                        self.state = State::RawHeader;
                    }
                    MAGIC_END => {
                        self.gather.reset();
                        self.state = State::Ended;
                    }
                    _ => {
                        return Err(CodecError::corrupt(
                            NAME,
                            format!("unknown block magic {magic:02x?}"),
                        ))
                    }
                }
            }
            State::CompressedHeader => {
                let decoded = le_u32(self.gather.bytes(), 0) as usize;
                let encoded = le_u32(self.gather.bytes(), 4) as usize;
                if encoded == 0 || encoded > MAX_DECODE_BLOCK || decoded > MAX_DECODE_BLOCK {
                    return Err(CodecError::corrupt(
                        NAME,
                        format!("implausible block sizes ({encoded} -> {decoded} bytes)"),
                    ));
                }
                self.gather.expect(encoded);
                self.state = State::CompressedPayload { decoded };
            }
            State::CompressedPayload { decoded } => {
                self.scratch.clear();
                self.scratch.resize(decoded, 0);
                let n = lz4_flex::block::decompress_into_with_dict(
                    self.gather.bytes(),
                    &mut self.scratch,
                    &self.window,
                )
                .map_err(|e| CodecError::corrupt(NAME, e.to_string()))?;
                if n != decoded {
                    return Err(CodecError::corrupt(
                        NAME,
                        format!("block decoded to {n} bytes, header announced {decoded}"),
                    ));
                }
                let block = std::mem::take(&mut self.scratch);
                self.remember(&block);
                self.pending.push(&block);
                self.scratch = block;
                self.expect_magic();
            }
            State::RawHeader => {
                let remaining = le_u32(self.gather.bytes(), 0) as usize;
                if remaining == 0 {
                    self.expect_magic();
                } else {
                    self.gather.reset();
                    self.state = State::RawPayload { remaining };
                }
            }
            State::RawPayload { .. } | State::Ended => {}
        }
        Ok(())
    }

    fn advance(&mut self, input: &[u8]) -> Result<usize, CodecError> {
        if let State::RawPayload { remaining } = self.state {
            let take = remaining.min(input.len());
            self.remember(&input[..take]);
            self.pending.push(&input[..take]);
            if take == remaining {
                self.expect_magic();
            } else {
                self.state = State::RawPayload {
                    remaining: remaining - take,
                };
            }
            return Ok(take);
        }
        let n = self.gather.fill(input);
        if self.gather.is_complete() {
            self.complete()?;
        }
        Ok(n)
    }
}

impl Default for Lz4BlockDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Lz4BlockDecoder {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        let mut consumed = 0;
        let mut produced = 0;
        loop {
            produced += self.pending.drain_into(&mut output[produced..]);
            if !self.pending.is_empty() || consumed == input.len() {
                break;
            }
            if self.state == State::Ended {
                return Err(CodecError::TrailingData { algorithm: NAME });
            }
            consumed += self.advance(&input[consumed..])?;
        }
        let status = decoder_status(
            NAME,
            finalize,
            consumed == input.len(),
            self.pending.is_empty(),
            self.state == State::Ended,
        )?;
        Ok(Step::new(consumed, produced, status))
    }
}
