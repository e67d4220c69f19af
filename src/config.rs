// config.rs: compile-time defaults and the runtime stream configuration.
//
// Nothing here is read from the environment or from files: the only
// user-facing knobs are algorithm and direction, chosen on the command line.
// `StreamConfig` exists so library callers and tests can shrink or grow the
// working buffers without touching the codec adapters.

pub const KB: usize = 1 << 10;
pub const MB: usize = 1 << 20;

// Capacity of each half of the working buffer pair.
pub const BUFFER_SIZE: usize = 32 * KB;

// Consecutive `Continue` calls with zero bytes consumed and produced that the
// driver tolerates before declaring the transform stalled.
pub const STALL_LIMIT: u32 = 16;

// Uncompressed bytes per block in both LZ4 containers.
pub const LZ4_BLOCK_SIZE: usize = 64 * KB;

// Uncompressed bytes the LZFSE encoder stages before emitting blocks.
pub const LZFSE_STAGE_SIZE: usize = 512 * KB;

// Largest block any decoder will stage. Headers announcing more are corrupt.
pub const MAX_DECODE_BLOCK: usize = 4 * MB;

// xz preset (0–9) and DEFLATE level (0–9) used when compressing.
pub const LZMA_PRESET: u32 = 6;
pub const ZLIB_LEVEL: u32 = 5;

/// Sizing and guard settings for one stream session.
///
/// Capacities are clamped to at least one byte when buffers are allocated;
/// the input and output halves need not match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Bytes requested from the source per read.
    pub input_capacity: usize,
    /// Bytes the transform may produce per call.
    pub output_capacity: usize,
    /// See [`STALL_LIMIT`].
    pub stall_limit: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            input_capacity: BUFFER_SIZE,
            output_capacity: BUFFER_SIZE,
            stall_limit: STALL_LIMIT,
        }
    }
}

impl StreamConfig {
    /// Same capacity for both buffers.
    pub fn with_buffer_size(size: usize) -> Self {
        Self {
            input_capacity: size,
            output_capacity: size,
            ..Self::default()
        }
    }

    pub fn effective_input_capacity(&self) -> usize {
        self.input_capacity.max(1)
    }

    pub fn effective_output_capacity(&self) -> usize {
        self.output_capacity.max(1)
    }

    /// A limit of zero would abort on the first idle call; keep at least one.
    pub fn effective_stall_limit(&self) -> u32 {
        self.stall_limit.max(1)
    }
}
