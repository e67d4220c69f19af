//! `lz4_raw` algorithm: the standard LZ4 frame format, as written by the
//! `lz4` command-line tool.
//!
//! ```text
//! magic 0x184D2204 | FLG | BD | [content size u64] | HC
//! { block size u32 (bit 31 = stored) | data | [block checksum] }*
//! 0u32 end mark | [content checksum]
//! ```
//!
//! The encoder writes independent 64 KiB blocks with a content checksum. The
//! decoder accepts anything the reference tool produces: linked or independent
//! blocks, block and content checksums, a content size field, skippable frames
//! and several frames back to back. Dictionary ids are rejected.
//!
//! Apple's `COMPRESSION_LZ4_RAW` is a bare LZ4 block with no framing and no
//! length, which cannot be cut into chunks. Files written here carry frame
//! headers and do not interoperate with that format, in either direction.

use crate::config::{KB, LZ4_BLOCK_SIZE, MB};
use crate::xxhash::{descriptor_checksum, xxh32_oneshot, Xxh32State};

use super::staging::{decoder_status, le_u32, le_u64, Gather, Pending};
use super::types::{CodecError, Status, Step};
use super::Transform;

const NAME: &str = "lz4_raw";

const FRAME_MAGIC: u32 = 0x184D_2204;
const SKIPPABLE_MAGIC: u32 = 0x184D_2A50;
const SKIPPABLE_MASK: u32 = 0xFFFF_FFF0;

const FLG_VERSION: u8 = 0b01 << 6;
const FLG_INDEPENDENT: u8 = 1 << 5;
const FLG_BLOCK_CHECKSUM: u8 = 1 << 4;
const FLG_CONTENT_SIZE: u8 = 1 << 3;
const FLG_CONTENT_CHECKSUM: u8 = 1 << 2;
const FLG_RESERVED: u8 = 1 << 1;
const FLG_DICT_ID: u8 = 1;
const BD_RESERVED: u8 = 0x8F;

const STORED_BLOCK: u32 = 0x8000_0000;

const DICT_SIZE: usize = 64 * KB;

fn block_max_for_id(id: u8) -> Option<usize> {
    match id {
        4 => Some(64 * KB),
        5 => Some(256 * KB),
        6 => Some(MB),
        7 => Some(4 * MB),
        _ => None,
    }
}

fn id_for_block_max(size: usize) -> u8 {
    match size {
        s if s <= 64 * KB => 4,
        s if s <= 256 * KB => 5,
        s if s <= MB => 6,
        _ => 7,
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

pub struct Lz4FrameEncoder {
    stage: Vec<u8>,
    block_size: usize,
    pending: Pending,
    content_hash: Xxh32State,
    header_written: bool,
    ended: bool,
}

impl Lz4FrameEncoder {
    pub fn new() -> Self {
        Self {
            stage: Vec::with_capacity(LZ4_BLOCK_SIZE),
            block_size: LZ4_BLOCK_SIZE.min(4 * MB),
            pending: Pending::default(),
            content_hash: Xxh32State::new(0),
            header_written: false,
            ended: false,
        }
    }

    fn write_header(&mut self) {
        let flg = FLG_VERSION | FLG_INDEPENDENT | FLG_CONTENT_CHECKSUM;
        let bd = id_for_block_max(self.block_size) << 4;
        self.pending.push(&FRAME_MAGIC.to_le_bytes());
        self.pending.push(&[flg, bd, descriptor_checksum(&[flg, bd])]);
        self.header_written = true;
    }

    fn flush_block(&mut self) {
        self.content_hash.update(&self.stage);
        let packed = lz4_flex::block::compress(&self.stage);
        if packed.len() < self.stage.len() {
            self.pending.push(&(packed.len() as u32).to_le_bytes());
            self.pending.push(&packed);
        } else {
            self.pending
                .push(&(self.stage.len() as u32 | STORED_BLOCK).to_le_bytes());
            self.pending.push(&self.stage);
        }
        self.stage.clear();
    }

    fn write_trailer(&mut self) {
        if !self.stage.is_empty() {
            self.flush_block();
        }
        self.pending.push(&0u32.to_le_bytes());
        self.pending.push(&self.content_hash.digest().to_le_bytes());
        self.ended = true;
    }
}

impl Default for Lz4FrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Lz4FrameEncoder {
    fn process(&mut self, input: &[u8], output: &mut [u8], finalize: bool) -> Result<Step, CodecError> {
        if !self.header_written {
            self.write_header();
        }
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
                self.write_trailer();
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
    Descriptor,
    DescriptorTail,
    BlockSize,
    BlockData { size: usize, stored: bool },
    ContentChecksum,
    SkipSize,
    Skip { remaining: usize },
}

#[derive(Debug, Clone, Copy)]
struct FrameInfo {
    independent: bool,
    block_checksum: bool,
    content_checksum: bool,
    content_size: Option<u64>,
    block_max: usize,
}

impl FrameInfo {
    const EMPTY: FrameInfo = FrameInfo {
        independent: true,
        block_checksum: false,
        content_checksum: false,
        content_size: None,
        block_max: 0,
    };
}

pub struct Lz4FrameDecoder {
    state: State,
    gather: Gather,
    pending: Pending,
    frame: FrameInfo,
    content_hash: Xxh32State,
    decoded_in_frame: u64,
    frames: u64,
    // Tail of the frame's output, for linked blocks.
    window: Vec<u8>,
    scratch: Vec<u8>,
}

impl Lz4FrameDecoder {
    pub fn new() -> Self {
        let mut gather = Gather::default();
        gather.expect(4);
        Self {
            state: State::Magic,
            gather,
            pending: Pending::default(),
            frame: FrameInfo::EMPTY,
            content_hash: Xxh32State::new(0),
            decoded_in_frame: 0,
            frames: 0,
            window: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// At a frame boundary with at least one frame behind us.
    fn at_end(&self) -> bool {
        self.state == State::Magic && self.gather.is_empty() && self.frames > 0
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

    fn next_frame(&mut self) {
        self.frames += 1;
        self.gather.expect(4);
        self.state = State::Magic;
    }

    fn read_descriptor(&mut self) -> Result<(), CodecError> {
        let flg = self.gather.bytes()[0];
        let bd = self.gather.bytes()[1];
        if flg & 0b1100_0000 != FLG_VERSION {
            return Err(CodecError::corrupt(
                NAME,
                format!("unsupported frame version {}", flg >> 6),
            ));
        }
        if flg & FLG_RESERVED != 0 || bd & BD_RESERVED != 0 {
            return Err(CodecError::corrupt(NAME, "reserved descriptor bits are set"));
        }
        if flg & FLG_DICT_ID != 0 {
            return Err(CodecError::corrupt(NAME, "frames with a dictionary id are not supported"));
        }
        let block_max = block_max_for_id((bd >> 4) & 0x07).ok_or_else(|| {
            CodecError::corrupt(NAME, format!("invalid block size id {}", (bd >> 4) & 0x07))
        })?;
        self.frame = FrameInfo {
            independent: flg & FLG_INDEPENDENT != 0,
            block_checksum: flg & FLG_BLOCK_CHECKSUM != 0,
            content_checksum: flg & FLG_CONTENT_CHECKSUM != 0,
            content_size: None,
            block_max,
        };
        let content_size_len = if flg & FLG_CONTENT_SIZE != 0 { 8 } else { 0 };
        self.gather.expect_more(content_size_len + 1);
        self.state = State::DescriptorTail;
        Ok(())
    }

    fn check_descriptor(&mut self) -> Result<(), CodecError> {
        let bytes = self.gather.bytes();
        let (descriptor, hc) = bytes.split_at(bytes.len() - 1);
        if descriptor_checksum(descriptor) != hc[0] {
            return Err(CodecError::corrupt(NAME, "frame header checksum mismatch"));
        }
        if descriptor.len() == 10 {
            self.frame.content_size = Some(le_u64(descriptor, 2));
        }
        self.content_hash = Xxh32State::new(0);
        self.decoded_in_frame = 0;
        self.window.clear();
        self.gather.expect(4);
        self.state = State::BlockSize;
        Ok(())
    }

    fn read_block_size(&mut self) -> Result<(), CodecError> {
        let raw = le_u32(self.gather.bytes(), 0);
        if raw == 0 {
            if let Some(expected) = self.frame.content_size {
                if expected != self.decoded_in_frame {
                    return Err(CodecError::corrupt(
                        NAME,
                        format!(
                            "frame declares {expected} bytes but decoded {}",
                            self.decoded_in_frame
                        ),
                    ));
                }
            }
            if self.frame.content_checksum {
                self.gather.expect(4);
                self.state = State::ContentChecksum;
            } else {
                self.next_frame();
            }
            return Ok(());
        }
        let stored = raw & STORED_BLOCK != 0;
        let size = (raw & !STORED_BLOCK) as usize;
        if size > self.frame.block_max {
            return Err(CodecError::corrupt(
                NAME,
                format!("block of {size} bytes exceeds the frame maximum {}", self.frame.block_max),
            ));
        }
        let checksum_len = if self.frame.block_checksum { 4 } else { 0 };
        self.gather.expect(size + checksum_len);
        self.state = State::BlockData { size, stored };
        Ok(())
    }

    fn decode_block(&mut self, size: usize, stored: bool) -> Result<(), CodecError> {
        let frame = self.frame;
        let bytes = self.gather.bytes();
        let data = &bytes[..size];
        if frame.block_checksum && xxh32_oneshot(data, 0) != le_u32(bytes, size) {
            return Err(CodecError::corrupt(NAME, "block checksum mismatch"));
        }
        self.scratch.clear();
        if stored {
            self.scratch.extend_from_slice(data);
        } else {
            self.scratch.resize(frame.block_max, 0);
            let n = if frame.independent {
                lz4_flex::block::decompress_into(data, &mut self.scratch)
            } else {
                lz4_flex::block::decompress_into_with_dict(data, &mut self.scratch, &self.window)
            }
            .map_err(|e| CodecError::corrupt(NAME, e.to_string()))?;
            self.scratch.truncate(n);
        }

        let block = std::mem::take(&mut self.scratch);
        self.content_hash.update(&block);
        self.decoded_in_frame += block.len() as u64;
        if !frame.independent {
            self.remember(&block);
        }
        self.pending.push(&block);
        self.scratch = block;

        self.gather.expect(4);
        self.state = State::BlockSize;
        Ok(())
    }

    /// Acts on a fully gathered header, block or checksum.
    fn complete(&mut self) -> Result<(), CodecError> {
        match self.state {
            State::Magic => {
                let magic = le_u32(self.gather.bytes(), 0);
                if magic == FRAME_MAGIC {
                    self.gather.expect(2);
                    self.state = State::Descriptor;
                } else if magic & SKIPPABLE_MASK == SKIPPABLE_MAGIC {
                    self.gather.expect(4);
                    self.state = State::SkipSize;
                } else {
                    return Err(CodecError::corrupt(
                        NAME,
                        format!("unknown frame magic {magic:#010x}"),
                    ));
                }
            }
            State::Descriptor => self.read_descriptor()?,
            State::DescriptorTail => self.check_descriptor()?,
            State::BlockSize => self.read_block_size()?,
            State::BlockData { size, stored } => self.decode_block(size, stored)?,
            State::ContentChecksum => {
                if le_u32(self.gather.bytes(), 0) != self.content_hash.digest() {
                    return Err(CodecError::corrupt(NAME, "content checksum mismatch"));
                }
                self.next_frame();
            }
            State::SkipSize => {
                let remaining = le_u32(self.gather.bytes(), 0) as usize;
                if remaining == 0 {
                    self.next_frame();
                } else {
                    self.gather.reset();
                    self.state = State::Skip { remaining };
                }
            }
            State::Skip { .. } => {}
        }
        Ok(())
    }

    fn advance(&mut self, input: &[u8]) -> Result<usize, CodecError> {
        if let State::Skip { remaining } = self.state {
            let take = remaining.min(input.len());
            if take == remaining {
                self.next_frame();
            } else {
                self.state = State::Skip {
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

    // A stored block of length zero completes without consuming input.
    fn ready(&self) -> bool {
        matches!(self.state, State::BlockData { .. }) && self.gather.is_complete()
    }
}

impl Default for Lz4FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Lz4FrameDecoder {
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
            consumed += self.advance(&input[consumed..])?;
        }
        let status = decoder_status(
            NAME,
            finalize,
            consumed == input.len(),
            self.pending.is_empty(),
            self.at_end(),
        )?;
        Ok(Step::new(consumed, produced, status))
    }
}
