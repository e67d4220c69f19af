//! Command-line interface for the `zapple` binary.
//!
//! | Submodule     | Responsibility |
//! |---------------|----------------|
//! | [`constants`] | Program name, the process-wide display level, `display!` / `displaylevel!`. |
//! | [`args`]      | `clap` parsing plus the usage rules, producing a [`args::ParsedArgs`]. |
//!
//! Typical call sequence: `parse_args` → `set_display_level` → `io::run_jobs`.

pub mod constants;
pub mod args;
