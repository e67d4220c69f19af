//! `lzfse` algorithm, backed by `lzfse_rust`'s buffer engine.
//!
//! An LZFSE stream is a run of self-delimiting blocks closed by `bvx$`:
//!
//! ```text
//! "bvx-" | n_raw u32le | raw bytes
//! "bvxn" | n_raw u32le | n_payload u32le | LZVN payload
//! "bvx2" | n_raw u32le | packed header (header_size in the low 32 bits
//!          of the third u64) | literal and L/M/D payloads
//! "bvx$"
//! ```
//!
//! The encoder compresses input in fixed stages and splices the per-stage
//! streams into one by dropping their end markers. The decoder cuts the input
//! at block boundaries. Matches may reach back into earlier blocks, so each
//! compressed block is decoded behind a stored block replaying the last
//! [`HISTORY_SIZE`] bytes of output. Memory stays bounded by one block plus
//! that history no matter how large the stream is.

use crate::config::{KB, LZFSE_STAGE_SIZE, MAX_DECODE_BLOCK};

use super::staging::{decoder_status, le_u32, le_u64, Gather, Pending};
use super::types::{CodecError, Status, Step};
use super::Transform;

const NAME: &str = "lzfse";

const MAGIC_RAW: &[u8; 4] = b"bvx-";
const MAGIC_LZVN: &[u8; 4] = b"bvxn";
const MAGIC_V1: &[u8; 4] = b"bvx1";
const MAGIC_V2: &[u8; 4] = b"bvx2";
const MAGIC_END: &[u8; 4] = b"bvx$";

const LZVN_HEADER_SIZE: usize = 12;
const V2_FIXED_HEADER_SIZE: usize = 32;

/// Covers the largest match distance either block type can encode (262139).
pub const HISTORY_SIZE: usize = 256 * KB;

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

pub struct LzfseStreamEncoder {
    stage: Vec<u8>,
    stage_size: usize,
    encoded: Vec<u8>,
    pending: Pending,
    ended: bool,
}

impl LzfseStreamEncoder {
    pub fn new() -> Self {
        Self::with_stage_size(LZFSE_STAGE_SIZE)
    }

    pub fn with_stage_size(stage_size: usize) -> Self {
        let stage_size = stage_size.clamp(1, MAX_DECODE_BLOCK);
        Self {
            stage: Vec::with_capacity(stage_size),
            stage_size,
            encoded: Vec::new(),
            pending: Pending::default(),
            ended: false,
        }
    }

    fn flush_stage(&mut self) -> Result<(), CodecError> {
        self.encoded.clear();
        lzfse_rust::encode_bytes(&self.stage, &mut self.encoded)
            .map_err(|e| CodecError::backend(NAME, e))?;
        let body = self
            .encoded
            .strip_suffix(MAGIC_END)
            .ok_or_else(|| CodecError::backend(NAME, "encoder output lacks an end-of-stream block"))?;
        self.pending.push(body);
        self.stage.clear();
        Ok(())
    }
}

impl Default for LzfseStreamEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for LzfseStreamEncoder {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        let mut consumed = 0;
        let mut produced = 0;
        loop {
            produced += self.pending.drain_into(&mut output[produced..]);
            if !self.pending.is_empty() {
                break;
            }
            if consumed < input.len() {
                let take = (self.stage_size - self.stage.len()).min(input.len() - consumed);
                self.stage.extend_from_slice(&input[consumed..consumed + take]);
                consumed += take;
                if self.stage.len() == self.stage_size {
                    self.flush_stage()?;
                }
                continue;
            }
            if finalize && !self.ended {
                if !self.stage.is_empty() {
                    self.flush_stage()?;
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
    RawHeader,
    Raw { remaining: usize },
    LzvnHeader,
    V2Header,
    Block { n_raw: usize },
    Ended,
}

pub struct LzfseStreamDecoder {
    state: State,
    gather: Gather,
    pending: Pending,
    history: Vec<u8>,
    framed: Vec<u8>,
    decoded: Vec<u8>,
}

impl LzfseStreamDecoder {
    pub fn new() -> Self {
        let mut gather = Gather::default();
        gather.expect(4);
        Self {
            state: State::Magic,
            gather,
            pending: Pending::default(),
            history: Vec::with_capacity(HISTORY_SIZE),
            framed: Vec::new(),
            decoded: Vec::new(),
        }
    }

    fn remember(&mut self, bytes: &[u8]) {
        if bytes.len() >= HISTORY_SIZE {
            self.history.clear();
            self.history.extend_from_slice(&bytes[bytes.len() - HISTORY_SIZE..]);
            return;
        }
        self.history.extend_from_slice(bytes);
        if self.history.len() > HISTORY_SIZE {
            let excess = self.history.len() - HISTORY_SIZE;
            self.history.drain(..excess);
        }
    }

    fn expect_magic(&mut self) {
        self.gather.expect(4);
        self.state = State::Magic;
    }

    fn check_sizes(n_raw: usize, block_len: usize) -> Result<(), CodecError> {
        if n_raw > MAX_DECODE_BLOCK || block_len > MAX_DECODE_BLOCK {
            return Err(CodecError::corrupt(
                NAME,
                format!("implausible block sizes ({block_len} -> {n_raw} bytes)"),
            ));
        }
        Ok(())
    }

    fn read_magic(&mut self) -> Result<(), CodecError> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(self.gather.bytes());
        match &magic {
            MAGIC_END => {
                self.gather.reset();
                self.state = State::Ended;
            }
            MAGIC_RAW => {
                self.gather.expect(4);
                self.state = State::RawHeader;
            }
            MAGIC_LZVN => {
                self.gather.expect_more(LZVN_HEADER_SIZE - 4);
                self.state = State::LzvnHeader;
            }
            MAGIC_V2 => {
                self.gather.expect_more(V2_FIXED_HEADER_SIZE - 4);
                self.state = State::V2Header;
            }
            MAGIC_V1 => {
                return Err(CodecError::corrupt(
                    NAME,
                    "blocks with uncompressed v1 headers are not supported",
                ))
            }
            _ => {
                return Err(CodecError::corrupt(
                    NAME,
                    format!("unknown block magic {magic:02x?}"),
                ))
            }
        }
        Ok(())
    }

    fn read_v2_header(&mut self) -> Result<(), CodecError> {
        let header = self.gather.bytes();
        let n_raw = le_u32(header, 4) as usize;
        let n_literal_payload = ((le_u64(header, 8) >> 20) & 0xF_FFFF) as usize;
        let n_lmd_payload = ((le_u64(header, 16) >> 40) & 0xF_FFFF) as usize;
        let header_size = (le_u64(header, 24) & 0xFFFF_FFFF) as usize;
        if header_size < V2_FIXED_HEADER_SIZE {
            return Err(CodecError::corrupt(
                NAME,
                format!("block header size {header_size} is too small"),
            ));
        }
        let rest = header_size - V2_FIXED_HEADER_SIZE + n_literal_payload + n_lmd_payload;
        Self::check_sizes(n_raw, rest + V2_FIXED_HEADER_SIZE)?;
        self.gather.expect_more(rest);
        self.state = State::Block { n_raw };
        Ok(())
    }

    fn decode_block(&mut self, n_raw: usize) -> Result<(), CodecError> {
        // The engine wants a complete stream: history as a stored block, then
        // the block itself, then the end marker.
        let replay = self.history.len();
        self.framed.clear();
        if replay > 0 {
            self.framed.extend_from_slice(MAGIC_RAW);
            self.framed.extend_from_slice(&(replay as u32).to_le_bytes());
            self.framed.extend_from_slice(&self.history);
        }
        self.framed.extend_from_slice(self.gather.bytes());
        self.framed.extend_from_slice(MAGIC_END);

        self.decoded.clear();
        lzfse_rust::decode_bytes(&self.framed, &mut self.decoded)
            .map_err(|e| CodecError::corrupt(NAME, e.to_string()))?;
        if self.decoded.len() != replay + n_raw {
            return Err(CodecError::corrupt(
                NAME,
                format!(
                    "block decoded to {} bytes, header announced {n_raw}",
                    self.decoded.len().saturating_sub(replay)
                ),
            ));
        }
        let decoded = std::mem::take(&mut self.decoded);
        self.remember(&decoded[replay..]);
        self.pending.push(&decoded[replay..]);
        self.decoded = decoded;
        self.expect_magic();
        Ok(())
    }

    /// Acts on a fully gathered header or block.
    fn complete(&mut self) -> Result<(), CodecError> {
        match self.state {
            State::Magic => self.read_magic()?,
            State::RawHeader => {
                let remaining = le_u32(self.gather.bytes(), 0) as usize;
                if remaining == 0 {
                    self.expect_magic();
                } else {
                    self.gather.reset();
                    self.state = State::Raw { remaining };
                }
            }
            State::LzvnHeader => {
                let n_raw = le_u32(self.gather.bytes(), 4) as usize;
                let n_payload = le_u32(self.gather.bytes(), 8) as usize;
                Self::check_sizes(n_raw, n_payload + LZVN_HEADER_SIZE)?;
                self.gather.expect_more(n_payload);
                self.state = State::Block { n_raw };
            }
            State::V2Header => self.read_v2_header()?,
            State::Block { n_raw } => self.decode_block(n_raw)?,
            State::Raw { .. } | State::Ended => {}
        }
        Ok(())
    }

    fn advance(&mut self, input: &[u8]) -> Result<usize, CodecError> {
        if let State::Raw { remaining } = self.state {
            let take = remaining.min(input.len());
            self.remember(&input[..take]);
            self.pending.push(&input[..take]);
            if take == remaining {
                self.expect_magic();
            } else {
                self.state = State::Raw {
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

    // Header-only blocks complete without consuming more input.
    fn ready(&self) -> bool {
        matches!(self.state, State::Block { .. }) && self.gather.is_complete()
    }
}

impl Default for LzfseStreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for LzfseStreamDecoder {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        let mut consumed = 0;
        let mut produced = 0;
        loop {
            produced += self.pending.drain_into(&mut output[produced..]);
            if !self.pending.is_empty() {
                break;
            }
            if self.ready() {
                self.complete()?;
                continue;
            }
            if consumed == input.len() {
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
