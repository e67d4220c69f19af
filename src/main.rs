//! Binary entry point for the `zapple` command-line tool.
//!
//! # Control flow
//!
//! 1. [`parse_args`] turns the command line into a validated [`ParsedArgs`]
//!    (or help / version text).
//! 2. The display level is set from `-q` / `-v`.
//! 3. [`run`] hands the job to the I/O layer and maps the outcome to an exit
//!    code: 0 on success, 1 on any usage, I/O or codec failure.

use zapple::cli::args::{parse_args, ParseOutcome, ParsedArgs};
use zapple::cli::constants::{set_display_level, PROGRAM_NAME};
use zapple::config::StreamConfig;
use zapple::io::run_jobs;

/// Runs the parsed job; returns the process exit code.
fn run(args: ParsedArgs) -> i32 {
    set_display_level(args.display_level);
    zapple::displaylevel!(4, "*** {} v{} ***\n", PROGRAM_NAME, env!("CARGO_PKG_VERSION"));

    let jobs = [args.job];
    if run_jobs(&jobs, &StreamConfig::default()) {
        0
    } else {
        1
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let args = match parse_args() {
        Ok(ParseOutcome::Run(a)) => a,
        Ok(ParseOutcome::Info(text)) => {
            print!("{text}");
            std::process::exit(0);
        }
        Err(e) => {
            zapple::display!("error: {}\n", e);
            std::process::exit(1);
        }
    };

    let exit_code = run(args);
    std::process::exit(exit_code);
}
