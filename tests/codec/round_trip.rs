// Integration tests: property-based round trips for every algorithm.
//
// Arbitrary payloads go through compress then decompress with the default
// stream configuration and with a tight buffer pair. Both must reproduce the
// payload exactly.

use proptest::collection::vec;
use proptest::prelude::*;

use zapple::codec::{Algorithm, Operation};
use zapple::config::StreamConfig;
use zapple::stream::{compress_bytes, decompress_bytes, transform_bytes};

fn tight() -> StreamConfig {
    StreamConfig {
        input_capacity: 97,
        output_capacity: 61,
        ..StreamConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn arbitrary_bytes_round_trip(data in vec(any::<u8>(), 0..4096)) {
        for alg in Algorithm::ALL {
            let packed = compress_bytes(alg, &data).unwrap();
            let unpacked = decompress_bytes(alg, &packed).unwrap();
            prop_assert_eq!(&unpacked, &data, "{}", alg);
        }
    }

    #[test]
    fn repetitive_bytes_round_trip_through_small_buffers(
        seed in vec(any::<u8>(), 1..48),
        repeats in 1usize..200,
    ) {
        let data = seed.repeat(repeats);
        let cfg = tight();
        for alg in Algorithm::ALL {
            let packed = transform_bytes(Operation::Compress, alg, &data, &cfg).unwrap();
            let unpacked = transform_bytes(Operation::Decompress, alg, &packed, &cfg).unwrap();
            prop_assert_eq!(&unpacked, &data, "{}", alg);
        }
    }
}

#[test]
fn empty_input_round_trips() {
    for alg in Algorithm::ALL {
        let packed = compress_bytes(alg, b"").unwrap();
        assert!(decompress_bytes(alg, &packed).unwrap().is_empty(), "{alg}");
    }
}

#[test]
fn multi_block_input_round_trips() {
    // Larger than one lz4 block and one lzfse stage, so several units are written.
    let mut data = Vec::with_capacity(3 * 1024 * 1024);
    for i in 0..(3 * 1024 * 1024 / 4) as u32 {
        data.extend_from_slice(&(i / 7).to_le_bytes());
    }
    for alg in Algorithm::ALL {
        let packed = compress_bytes(alg, &data).unwrap();
        assert!(packed.len() < data.len(), "{alg}");
        assert_eq!(decompress_bytes(alg, &packed).unwrap(), data, "{alg}");
    }
}

fn word_salad(len: usize) -> Vec<u8> {
    const WORDS: [&[u8]; 16] = [
        b"stream ", b"block ", b"window ", b"match ", b"literal ", b"offset ", b"header ", b"stage ",
        b"buffer ", b"marker ", b"chunk ", b"codec ", b"frame ", b"payload ", b"length ", b"distance ",
    ];
    let mut state = 0x0BAD_5EEDu32;
    let mut out = Vec::with_capacity(len + 16);
    while out.len() < len {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.extend_from_slice(WORDS[(state >> 28) as usize]);
    }
    out.truncate(len);
    out
}

#[test]
fn lzfse_blocks_referencing_earlier_blocks_decode() {
    let data = word_salad(1 << 20);

    let mut reference = Vec::new();
    lzfse_rust::encode_bytes(&data, &mut reference).unwrap();
    assert_eq!(decompress_bytes(Algorithm::Lzfse, &reference).unwrap(), data);

    let packed = compress_bytes(Algorithm::Lzfse, &data).unwrap();
    assert_eq!(decompress_bytes(Algorithm::Lzfse, &packed).unwrap(), data);
}

#[test]
fn word_text_round_trips_for_every_algorithm() {
    let data = word_salad(1 << 20);
    for alg in Algorithm::ALL {
        let packed = compress_bytes(alg, &data).unwrap();
        assert_eq!(decompress_bytes(alg, &packed).unwrap(), data, "{alg}");
    }
}

#[test]
fn incompressible_input_round_trips() {
    let mut state = 0x2545_f491_u32;
    let data: Vec<u8> = (0..200_000)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect();
    for alg in Algorithm::ALL {
        let packed = compress_bytes(alg, &data).unwrap();
        assert_eq!(decompress_bytes(alg, &packed).unwrap(), data, "{alg}");
    }
}
