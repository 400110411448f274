//! # buildpatch CLI
//!
//! This is the binary entry point for the `buildpatch` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging for the chosen `--log-level`.
//! - Dispatching to the matching command and turning library errors into
//!   a non-zero exit status.
//!
//! All resolution logic lives in the `buildpatch` library crate; the binary
//! only reads configuration files and prints results.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
