//! Byte staging shared by the block-oriented adapters (LZ4 containers, LZFSE).
//!
//! Those backends work on whole blocks, while the driver hands out arbitrary
//! input slices and output windows. [`Gather`] accumulates input until a
//! header or block is complete; [`Pending`] holds encoded/decoded bytes until
//! the driver's output window has room for them.

use super::types::{CodecError, Status, Step};

/// Bytes produced by a block codec that the driver has not collected yet.
#[derive(Debug, Default)]
pub struct Pending {
    buf: Vec<u8>,
    pos: usize,
}

impl Pending {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.compact();
        self.buf.extend_from_slice(bytes);
    }

    /// Copies as much as fits into `out`; returns the number of bytes copied.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let n = self.len().min(out.len());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        if self.pos == self.buf.len() {
            self.buf.clear();
            self.pos = 0;
        }
        n
    }

    fn compact(&mut self) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }
}

/// Accumulates input until `want` bytes are available.
#[derive(Debug, Default)]
pub struct Gather {
    buf: Vec<u8>,
    want: usize,
}

impl Gather {
    /// Discards anything gathered so far and waits for `want` fresh bytes.
    pub fn expect(&mut self, want: usize) {
        self.buf.clear();
        self.want = want;
    }

    /// Keeps the gathered bytes and waits for `extra` more.
    pub fn expect_more(&mut self, extra: usize) {
        self.want += extra;
    }

    /// Takes up to the missing number of bytes from `input`; returns how many.
    pub fn fill(&mut self, input: &[u8]) -> usize {
        let n = (self.want - self.buf.len()).min(input.len());
        self.buf.extend_from_slice(&input[..n]);
        n
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.buf.len() == self.want
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.want = 0;
    }
}

/// Little-endian `u32` at `offset`. Callers guarantee the slice is long enough.
#[inline]
pub fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
pub fn le_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

/// Status of a decoder call once its work loop has stopped.
///
/// The stream may only finish when the caller has signalled the last chunk,
/// every input byte was taken and every decoded byte was handed out. At that
/// point a decoder that has not seen its end marker is looking at a
/// truncated stream.
pub fn decoder_status(
    algorithm: &'static str,
    finalize: bool,
    input_exhausted: bool,
    pending_empty: bool,
    ended: bool,
) -> Result<Status, CodecError> {
    if !(finalize && input_exhausted && pending_empty) {
        return Ok(Status::Continue);
    }
    if ended {
        Ok(Status::Finished)
    } else {
        Err(CodecError::Truncated { algorithm })
    }
}

/// Step for a decoder call made after its end-of-stream marker.
pub fn ended_step(algorithm: &'static str, input: &[u8], finalize: bool) -> Result<Step, CodecError> {
    if !input.is_empty() {
        return Err(CodecError::TrailingData { algorithm });
    }
    let status = if finalize { Status::Finished } else { Status::Continue };
    Ok(Step::new(0, 0, status))
}
