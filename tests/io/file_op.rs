// Integration tests for src/io/file_op.rs: file jobs end to end.
//
// Coverage:
//   - perform_file_op: round trip per algorithm through real files
//   - early failures (missing source, directory source, uncreatable
//     destination) leave no destination behind
//   - a codec failure after streaming began keeps the partial destination
//   - run_jobs: every job runs, the result is the AND of all outcomes

use std::fs;
use std::path::Path;

use zapple::cli::constants::{set_display_level, LEVEL_ERRORS};
use zapple::codec::{Algorithm, Operation};
use zapple::config::StreamConfig;
use zapple::io::{perform_file_op, run_jobs, FileJob, FileOpError};

fn quiet() {
    set_display_level(LEVEL_ERRORS);
}

fn job(operation: Operation, algorithm: Algorithm, src: &Path, dst: &Path) -> FileJob {
    FileJob {
        operation,
        algorithm,
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
    }
}

fn sample() -> Vec<u8> {
    let mut data = b"file jobs stream from one path to another. ".repeat(2000);
    data.extend((0..10_000u32).map(|i| (i.wrapping_mul(0x0101_0F0F) >> 7) as u8));
    data
}

#[test]
fn every_algorithm_round_trips_through_files() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("input.bin");
    let data = sample();
    fs::write(&original, &data).unwrap();

    for alg in Algorithm::ALL {
        let packed = dir.path().join(format!("input{}", alg.path_ext()));
        let restored = dir.path().join(format!("restored-{alg}.bin"));

        let stats = perform_file_op(&job(Operation::Compress, alg, &original, &packed), &StreamConfig::default())
            .unwrap();
        assert_eq!(stats.bytes_in, data.len() as u64, "{alg}");
        assert_eq!(stats.bytes_out, fs::metadata(&packed).unwrap().len(), "{alg}");

        perform_file_op(&job(Operation::Decompress, alg, &packed, &restored), &StreamConfig::default())
            .unwrap();
        assert_eq!(fs::read(&restored).unwrap(), data, "{alg}");
    }
}

#[test]
fn small_buffers_give_the_same_file() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("input.bin");
    let packed = dir.path().join("input.lzfse");
    let restored = dir.path().join("restored.bin");
    let data = sample();
    fs::write(&original, &data).unwrap();

    let cfg = StreamConfig::with_buffer_size(333);
    perform_file_op(&job(Operation::Compress, Algorithm::Lzfse, &original, &packed), &cfg).unwrap();
    perform_file_op(&job(Operation::Decompress, Algorithm::Lzfse, &packed, &restored), &cfg).unwrap();
    assert_eq!(fs::read(&restored).unwrap(), data);
}

#[test]
fn empty_file_round_trips() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("empty");
    let packed = dir.path().join("empty.lzma");
    let restored = dir.path().join("restored");
    fs::write(&original, b"").unwrap();

    perform_file_op(&job(Operation::Compress, Algorithm::Lzma, &original, &packed), &StreamConfig::default())
        .unwrap();
    assert!(fs::metadata(&packed).unwrap().len() > 0);
    perform_file_op(&job(Operation::Decompress, Algorithm::Lzma, &packed, &restored), &StreamConfig::default())
        .unwrap();
    assert_eq!(fs::read(&restored).unwrap(), b"");
}

#[test]
fn missing_source_creates_no_destination() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let dst = dir.path().join("out.zlib");
    let err = perform_file_op(
        &job(Operation::Compress, Algorithm::Zlib, &dir.path().join("absent"), &dst),
        &StreamConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FileOpError::NotReadable { .. }), "{err}");
    assert!(err.is_io());
    assert!(!dst.exists());
}

#[test]
fn directory_source_creates_no_destination() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let dst = dir.path().join("out.lz4");
    let err = perform_file_op(
        &job(Operation::Compress, Algorithm::Lz4, dir.path(), &dst),
        &StreamConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FileOpError::NotRegularFile { .. }), "{err}");
    assert!(!dst.exists());
}

#[test]
fn uncreatable_destination_is_reported() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("input.bin");
    fs::write(&src, b"payload").unwrap();
    let dst = dir.path().join("no-such-dir").join("out.lz4");
    let err = perform_file_op(&job(Operation::Compress, Algorithm::Lz4, &src, &dst), &StreamConfig::default())
        .unwrap_err();
    assert!(matches!(err, FileOpError::CreateFailed { .. }), "{err}");
    assert!(err.is_io());
}

#[test]
fn corrupt_input_is_a_codec_failure_and_keeps_the_partial_output() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("bogus.lz4");
    let dst = dir.path().join("bogus.out");
    fs::write(&src, b"bv4-\x03\x00\x00\x00abcNOPE").unwrap();

    // The first read ends after the raw block, so its bytes are written
    // before the bad magic is seen.
    let cfg = StreamConfig::with_buffer_size(11);
    let err = perform_file_op(&job(Operation::Decompress, Algorithm::Lz4, &src, &dst), &cfg).unwrap_err();
    assert!(err.is_codec(), "{err}");
    assert!(matches!(err, FileOpError::Stream { .. }));
    assert!(err.to_string().contains("bogus.lz4"), "{err}");
    assert_eq!(fs::read(&dst).unwrap(), b"abc");
}

#[test]
fn existing_destination_is_truncated() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("input.bin");
    let packed = dir.path().join("input.zlib");
    let dst = dir.path().join("restored.bin");
    fs::write(&src, b"short").unwrap();
    fs::write(&dst, vec![b'x'; 10_000]).unwrap();

    perform_file_op(&job(Operation::Compress, Algorithm::Zlib, &src, &packed), &StreamConfig::default()).unwrap();
    perform_file_op(&job(Operation::Decompress, Algorithm::Zlib, &packed, &dst), &StreamConfig::default()).unwrap();
    assert_eq!(fs::read(&dst).unwrap(), b"short");
}

#[test]
fn run_jobs_continues_past_failures() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.bin");
    fs::write(&good, b"fine").unwrap();
    let jobs = [
        job(Operation::Compress, Algorithm::Lz4, &dir.path().join("absent"), &dir.path().join("a.lz4")),
        job(Operation::Compress, Algorithm::Lz4, &good, &dir.path().join("good.lz4")),
    ];
    assert!(!run_jobs(&jobs, &StreamConfig::default()));
    assert!(dir.path().join("good.lz4").exists());
}

#[test]
fn run_jobs_succeeds_when_every_job_does() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("good.bin");
    fs::write(&src, b"fine").unwrap();
    let jobs: Vec<FileJob> = Algorithm::ALL
        .into_iter()
        .map(|alg| job(Operation::Compress, alg, &src, &dir.path().join(format!("good{}", alg.path_ext()))))
        .collect();
    assert!(run_jobs(&jobs, &StreamConfig::default()));
    assert!(run_jobs(&[], &StreamConfig::default()));
}
