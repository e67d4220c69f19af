// Integration tests: malformed, truncated and hand-built compressed streams.
//
// Damaged input must surface as `StreamError::Codec`, never as a panic or as
// silently shortened output. Hand-built streams check the container layouts
// byte for byte.

use zapple::codec::{Algorithm, CodecError};
use zapple::stream::{compress_bytes, decompress_bytes, StreamError};
use zapple::xxhash::{descriptor_checksum, xxh32_oneshot};

fn sample() -> Vec<u8> {
    let mut data = b"malformed streams must be rejected, not half-decoded. ".repeat(300);
    data.extend((0..4000u32).map(|i| (i.wrapping_mul(0x9E37_79B9) >> 11) as u8));
    data
}

fn codec_error(alg: Algorithm, data: &[u8]) -> CodecError {
    match decompress_bytes(alg, data) {
        Err(StreamError::Codec(e)) => e,
        Err(other) => panic!("{alg}: expected a codec error, got {other}"),
        Ok(out) => panic!("{alg}: decoded {} bytes from a damaged stream", out.len()),
    }
}

fn lz4_frame_header(flg: u8, content_size: Option<u64>) -> Vec<u8> {
    let mut descriptor = vec![flg, 0x40];
    if let Some(size) = content_size {
        descriptor.extend_from_slice(&size.to_le_bytes());
    }
    let mut header = 0x184D_2204u32.to_le_bytes().to_vec();
    header.extend_from_slice(&descriptor);
    header.push(descriptor_checksum(&descriptor));
    header
}

fn stored_block(frame: &mut Vec<u8>, data: &[u8]) {
    frame.extend_from_slice(&(0x8000_0000u32 | data.len() as u32).to_le_bytes());
    frame.extend_from_slice(data);
}

// ── Bad leading bytes ────────────────────────────────────────────────────────

#[test]
fn unknown_magic_is_corrupt() {
    for (alg, stream) in [
        (Algorithm::Lz4, &b"bv4X\0\0\0\0"[..]),
        (Algorithm::Lz4Raw, &b"\x05\x22\x4d\x18\x60\x40\x82"[..]),
        (Algorithm::Lzfse, &b"bvxZ\0\0\0\0"[..]),
    ] {
        let err = codec_error(alg, stream);
        assert!(matches!(err, CodecError::Corrupt { .. }), "{alg}: {err}");
    }
}

#[test]
fn damaged_headers_are_codec_errors() {
    // Raw DEFLATE has no header to damage.
    let data = sample();
    for alg in [Algorithm::Lz4, Algorithm::Lz4Raw, Algorithm::Lzfse, Algorithm::Lzma] {
        let mut packed = compress_bytes(alg, &data).unwrap();
        packed[0] ^= 0xFF;
        packed[1] ^= 0xFF;
        codec_error(alg, &packed);
    }
}

#[test]
fn reserved_deflate_block_type_is_corrupt() {
    // BFINAL set, BTYPE 11.
    let err = codec_error(Algorithm::Zlib, &[0x07, 0x00, 0x00, 0x00]);
    assert!(matches!(err, CodecError::Corrupt { .. }), "{err}");
}

// ── Truncation ───────────────────────────────────────────────────────────────

#[test]
fn truncated_streams_are_rejected() {
    let data = sample();
    for alg in Algorithm::ALL {
        let packed = compress_bytes(alg, &data).unwrap();
        for cut in [packed.len() / 2, packed.len() - 1] {
            let err = codec_error(alg, &packed[..cut]);
            if alg != Algorithm::Lzma {
                assert!(matches!(err, CodecError::Truncated { .. }), "{alg} cut at {cut}: {err}");
            }
        }
    }
}

#[test]
fn empty_input_is_not_a_stream() {
    for alg in Algorithm::ALL {
        codec_error(alg, b"");
    }
}

// ── Trailing bytes ───────────────────────────────────────────────────────────

#[test]
fn bytes_after_the_end_marker_are_rejected() {
    let data = sample();
    for alg in Algorithm::ALL {
        let mut packed = compress_bytes(alg, &data).unwrap();
        packed.extend_from_slice(b"trailing garbage");
        let err = codec_error(alg, &packed);
        if matches!(alg, Algorithm::Lz4 | Algorithm::Lzfse | Algorithm::Zlib) {
            assert!(matches!(err, CodecError::TrailingData { .. }), "{alg}: {err}");
        }
    }
}

// ── Hand-built containers ────────────────────────────────────────────────────

#[test]
fn lz4_container_with_raw_block_decodes() {
    let mut stream = b"bv4-".to_vec();
    stream.extend_from_slice(&5u32.to_le_bytes());
    stream.extend_from_slice(b"hello");
    stream.extend_from_slice(b"bv4$");
    assert_eq!(decompress_bytes(Algorithm::Lz4, &stream).unwrap(), b"hello");
}

#[test]
fn lz4_compressed_block_with_zero_payload_is_corrupt() {
    let mut stream = b"bv41".to_vec();
    stream.extend_from_slice(&16u32.to_le_bytes());
    stream.extend_from_slice(&0u32.to_le_bytes());
    stream.extend_from_slice(b"bv4$");
    let err = codec_error(Algorithm::Lz4, &stream);
    assert!(matches!(err, CodecError::Corrupt { .. }), "{err}");
}

#[test]
fn lzfse_container_with_raw_block_decodes() {
    let mut stream = b"bvx-".to_vec();
    stream.extend_from_slice(&6u32.to_le_bytes());
    stream.extend_from_slice(b"stored");
    stream.extend_from_slice(b"bvx$");
    assert_eq!(decompress_bytes(Algorithm::Lzfse, &stream).unwrap(), b"stored");
}

#[test]
fn lzfse_v1_blocks_are_unsupported() {
    let mut stream = b"bvx1".to_vec();
    stream.extend_from_slice(&[0u8; 64]);
    let err = codec_error(Algorithm::Lzfse, &stream);
    assert!(matches!(err, CodecError::Corrupt { .. }), "{err}");
}

#[test]
fn lz4_frame_with_stored_blocks_decodes() {
    let mut frame = lz4_frame_header(0x60, None);
    stored_block(&mut frame, b"first ");
    stored_block(&mut frame, b"second");
    frame.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(decompress_bytes(Algorithm::Lz4Raw, &frame).unwrap(), b"first second");
}

#[test]
fn lz4_frame_content_checksum_is_verified() {
    let mut frame = lz4_frame_header(0x64, None);
    stored_block(&mut frame, b"checked");
    frame.extend_from_slice(&0u32.to_le_bytes());
    let good = xxh32_oneshot(b"checked", 0);

    let mut ok = frame.clone();
    ok.extend_from_slice(&good.to_le_bytes());
    assert_eq!(decompress_bytes(Algorithm::Lz4Raw, &ok).unwrap(), b"checked");

    let mut bad = frame;
    bad.extend_from_slice(&(good ^ 1).to_le_bytes());
    let err = codec_error(Algorithm::Lz4Raw, &bad);
    assert!(matches!(err, CodecError::Corrupt { .. }), "{err}");
}

#[test]
fn lz4_frame_content_size_mismatch_is_corrupt() {
    let mut frame = lz4_frame_header(0x68, Some(10));
    stored_block(&mut frame, b"short");
    frame.extend_from_slice(&0u32.to_le_bytes());
    let err = codec_error(Algorithm::Lz4Raw, &frame);
    assert!(matches!(err, CodecError::Corrupt { .. }), "{err}");
}

#[test]
fn lz4_frame_header_checksum_is_verified() {
    let mut frame = lz4_frame_header(0x60, None);
    frame[6] ^= 0x55;
    frame.extend_from_slice(&0u32.to_le_bytes());
    let err = codec_error(Algorithm::Lz4Raw, &frame);
    assert!(matches!(err, CodecError::Corrupt { .. }), "{err}");
}

#[test]
fn lz4_frames_concatenate_and_skippable_frames_are_ignored() {
    let first = compress_bytes(Algorithm::Lz4Raw, b"one, ").unwrap();
    let second = compress_bytes(Algorithm::Lz4Raw, b"two").unwrap();

    let mut stream = first;
    stream.extend_from_slice(&0x184D_2A5Au32.to_le_bytes());
    stream.extend_from_slice(&3u32.to_le_bytes());
    stream.extend_from_slice(b"xyz");
    stream.extend_from_slice(&second);

    assert_eq!(decompress_bytes(Algorithm::Lz4Raw, &stream).unwrap(), b"one, two");
}
