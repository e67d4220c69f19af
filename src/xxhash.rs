//! XXH32 helpers for the LZ4 frame format, on top of `xxhash-rust`.
//!
//! The frame format hashes three things with seed 0: the frame descriptor
//! (of which only the second byte is stored), each block when block checksums
//! are enabled, and the whole decoded content.

pub use xxhash_rust::xxh32::Xxh32 as Xxh32State;

/// One-shot XXH32.
///
/// `xxh32_oneshot(b"", 0)` == `0x02CC5D05`.
#[inline]
pub fn xxh32_oneshot(data: &[u8], seed: u32) -> u32 {
    xxhash_rust::xxh32::xxh32(data, seed)
}

/// Header checksum byte (`HC`) of an LZ4 frame descriptor.
///
/// `descriptor` runs from the FLG byte up to, but excluding, the checksum.
#[inline]
pub fn descriptor_checksum(descriptor: &[u8]) -> u8 {
    ((xxh32_oneshot(descriptor, 0) >> 8) & 0xFF) as u8
}
