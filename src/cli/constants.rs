// cli/constants.rs: program identity and the process-wide display level.
//
// Every diagnostic in the crate goes through `display!` / `displaylevel!`,
// which write to stderr and check the level below.

use std::sync::atomic::{AtomicU32, Ordering};

// ── Identity ──────────────────────────────────────────────────────────────────
pub const PROGRAM_NAME: &str = "zapple";

// ── Display levels ────────────────────────────────────────────────────────────
//
// 0 = silent; 1 = errors only (`-q`); 2 = progress (default);
// 3 = per-file summary (`-v`); 4 = debug (`-vv`)
pub const LEVEL_ERRORS: u32 = 1;
pub const LEVEL_DEFAULT: u32 = 2;
pub const LEVEL_MAX: u32 = 4;

pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(LEVEL_DEFAULT);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Level selected by the command-line flags: `-q` pins it to errors only,
/// each `-v` adds one, up to [`LEVEL_MAX`].
pub fn level_for_flags(quiet: bool, verbose: u8) -> u32 {
    if quiet {
        LEVEL_ERRORS
    } else {
        (LEVEL_DEFAULT + u32::from(verbose)).min(LEVEL_MAX)
    }
}

// ── Display macros ────────────────────────────────────────────────────────────

/// Print to stderr unconditionally.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Print to stderr when the display level is at least `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
