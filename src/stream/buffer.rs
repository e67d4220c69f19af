//! The working buffer pair: fixed-capacity staging between the source, the
//! transform and the destination.
//!
//! Both halves are allocated once per session and never grow. The input half
//! tracks `len` (valid bytes) and `pos` (bytes handed to the transform); the
//! output half tracks `filled`.

use std::io::{self, Read};

/// Source-side half of the working buffer pair.
#[derive(Debug)]
pub struct InputBuffer {
    data: Box<[u8]>,
    len: usize,
    pos: usize,
}

impl InputBuffer {
    /// Allocates `capacity` bytes (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity.max(1)].into_boxed_slice(),
            len: 0,
            pos: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Valid bytes not yet handed to the transform.
    #[inline]
    pub fn unconsumed(&self) -> &[u8] {
        &self.data[self.pos..self.len]
    }

    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.pos == self.len
    }

    /// Marks `n` more bytes as consumed. `n` never exceeds `unconsumed().len()`.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len - self.pos);
        self.pos += n;
    }

    /// Replaces the contents with the next chunk of `src`.
    ///
    /// Reads until the buffer is full or `src` reports end of file, retrying
    /// interrupted reads. Returns the chunk length; anything shorter than
    /// [`capacity`](Self::capacity) means the source is exhausted.
    pub fn refill<R: Read + ?Sized>(&mut self, src: &mut R) -> io::Result<usize> {
        self.len = 0;
        self.pos = 0;
        while self.len < self.data.len() {
            match src.read(&mut self.data[self.len..]) {
                Ok(0) => break,
                Ok(n) => self.len += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(self.len)
    }
}

/// Destination-side half of the working buffer pair.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Box<[u8]>,
    filled: usize,
}

impl OutputBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity.max(1)].into_boxed_slice(),
            filled: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Room the transform may write into.
    #[inline]
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.filled..]
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.data.len() - self.filled);
        self.filled += n;
    }

    #[inline]
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.filled = 0;
    }
}
