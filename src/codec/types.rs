//! Shared vocabulary of the codec layer: the direction of a session, the
//! result of one transform call, and the codec error taxonomy.

use std::fmt;

/// Direction of a stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Compress,
    Decompress,
}

impl Operation {
    /// Present participle used in progress lines ("Compressing 'a.txt': 42%").
    pub fn verb(self) -> &'static str {
        match self {
            Operation::Compress => "Compressing",
            Operation::Decompress => "Decompressing",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Compress => f.write_str("compress"),
            Operation::Decompress => f.write_str("decompress"),
        }
    }
}

/// Whether the transform still has work to do after a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// More output may be pending for the current input, or more input is needed.
    Continue,
    /// Every output byte of the whole stream has been emitted.
    Finished,
}

/// Outcome of one [`Transform::process`](super::Transform::process) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Bytes taken from the front of the input slice.
    pub consumed: usize,
    /// Bytes written to the front of the output slice.
    pub produced: usize,
    pub status: Status,
}

impl Step {
    pub fn new(consumed: usize, produced: usize, status: Status) -> Self {
        Self {
            consumed,
            produced,
            status,
        }
    }

    /// `true` when the call neither consumed nor produced anything.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.consumed == 0 && self.produced == 0
    }
}

/// Failures reported by a codec adapter.
///
/// The driver does not interpret these beyond "the stream is unusable"; the
/// variants exist so messages stay specific.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The backend refused to set up its state.
    #[error("unable to initialize the {algorithm} codec: {reason}")]
    Init { algorithm: &'static str, reason: String },
    /// The compressed input is malformed.
    #[error("corrupt {algorithm} stream: {reason}")]
    Corrupt { algorithm: &'static str, reason: String },
    /// The input ended before the end-of-stream marker.
    #[error("truncated {algorithm} stream")]
    Truncated { algorithm: &'static str },
    /// Bytes follow the end-of-stream marker.
    #[error("unexpected data after the end of the {algorithm} stream")]
    TrailingData { algorithm: &'static str },
    /// The backend failed for a reason unrelated to the input bytes.
    #[error("{algorithm} codec failure: {reason}")]
    Backend { algorithm: &'static str, reason: String },
}

impl CodecError {
    pub fn corrupt(algorithm: &'static str, reason: impl Into<String>) -> Self {
        CodecError::Corrupt {
            algorithm,
            reason: reason.into(),
        }
    }

    pub fn backend(algorithm: &'static str, reason: impl fmt::Display) -> Self {
        CodecError::Backend {
            algorithm,
            reason: reason.to_string(),
        }
    }
}
