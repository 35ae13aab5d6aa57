//! Command-line arguments for `yangcheck`.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "yangcheck",
    version,
    about = "Validate YANG and YIN modules against the language grammar."
)]
pub struct YangArgs {
    /// Module files, or directories to scan for .yang and .yin files.
    #[arg(required_unless_present = "list_errors")]
    pub files: Vec<PathBuf>,

    /// Print every error code with its level and message template, then exit.
    #[arg(short = 'e', long)]
    pub list_errors: bool,

    /// Show the error code instead of the message in each report line.
    #[arg(long)]
    pub print_error_code: bool,

    /// Report errors up to and including this level.
    #[arg(short, long, value_name = "LEVEL")]
    pub level: Option<u8>,

    /// Require substatements in canonical order.
    #[arg(long)]
    pub canonical: bool,

    /// Module search directories, separated like PATH.
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<String>,

    /// YAML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print reported errors as a JSON array.
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long)]
    pub debug: bool,
}
