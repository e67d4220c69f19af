//! Command-line argument parsing for `zapple`.
//!
//! `clap` handles the token level (option values, `--help`, `--version`,
//! unknown flags). [`ParsedArgs::from_cli`] then applies the usage rules in a
//! fixed order, so that the first problem found is the one reported:
//!
//! 1. an algorithm is required and must be known;
//! 2. exactly one of `-c` / `-d` is required;
//! 3. an output path is required;
//! 4. positional paths are not accepted.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::{ArgAction, Parser};

use crate::cli::constants::level_for_flags;
use crate::codec::{Algorithm, Operation};
use crate::io::FileJob;

/// Raw command line as `clap` sees it.
#[derive(Debug, Parser)]
#[command(
    name = "zapple",
    version,
    about = "Compress or decompress a file with lz4, lz4_raw, lzfse, lzma or zlib."
)]
pub struct Cli {
    /// Compression algorithm: lz4, lz4_raw, lzfse, lzma or zlib.
    #[arg(short = 'a', value_name = "ALG")]
    pub algorithm: Option<String>,

    /// Compress SRC.
    #[arg(short = 'c', value_name = "SRC")]
    pub compress: Option<PathBuf>,

    /// Decompress SRC.
    #[arg(short = 'd', value_name = "SRC")]
    pub decompress: Option<PathBuf>,

    /// Destination file; created or truncated.
    #[arg(short = 'o', value_name = "DST")]
    pub output: Option<PathBuf>,

    /// Suppress progress output.
    #[arg(short = 'q')]
    pub quiet: bool,

    /// More diagnostics; repeatable.
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(value_name = "PATH", hide = true)]
    pub paths: Vec<PathBuf>,
}

/// Validated command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub job: FileJob,
    pub display_level: u32,
}

impl ParsedArgs {
    /// Applies the usage rules to what `clap` parsed.
    pub fn from_cli(cli: Cli) -> anyhow::Result<ParsedArgs> {
        let algorithm: Algorithm = match cli.algorithm.as_deref() {
            Some(name) => name.parse()?,
            None => bail!("algorithm (-a) option required."),
        };

        let (operation, src) = match (cli.compress, cli.decompress) {
            (Some(_), Some(_)) => bail!("-c and -d cannot both be specified."),
            (Some(src), None) => (Operation::Compress, src),
            (None, Some(src)) => (Operation::Decompress, src),
            (None, None) => bail!("either compress (-c) or decompress (-d) option required."),
        };

        let dst = cli
            .output
            .ok_or_else(|| anyhow!("output (-o) option required."))?;

        if !cli.paths.is_empty() {
            bail!("path list is not yet handled.");
        }

        Ok(ParsedArgs {
            job: FileJob {
                operation,
                algorithm,
                src,
                dst,
            },
            display_level: level_for_flags(cli.quiet, cli.verbose),
        })
    }
}

/// Outcome of parsing a command line.
#[derive(Debug)]
pub enum ParseOutcome {
    /// Run this job.
    Run(ParsedArgs),
    /// `--help` or `--version` was requested; the text is ready to print.
    Info(String),
}

/// Parses `args` (program name first).
///
/// `clap`'s own usage errors are returned as errors like the validation
/// failures, so every usage problem ends the same way.
pub fn parse_args_from<I, T>(args: I) -> anyhow::Result<ParseOutcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(ParseOutcome::Run(ParsedArgs::from_cli(cli)?)),
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                Ok(ParseOutcome::Info(e.render().to_string()))
            }
            _ => Err(anyhow!(e.render().to_string().trim_end().to_owned())),
        },
    }
}

/// Parses the process arguments.
pub fn parse_args() -> anyhow::Result<ParseOutcome> {
    parse_args_from(std::env::args_os())
}
