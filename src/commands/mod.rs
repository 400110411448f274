//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `buildpatch` command-line tool, one file per subcommand.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `buildpatch` library to do the work.
//!
//! `load_config` is shared by the commands that read a configuration file.

pub mod completions;
pub mod resolve;
pub mod tree;
pub mod validate;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use buildpatch::config::{self, Config};
use buildpatch::defaults;

/// Parse the configuration file and return it with its base directory.
///
/// The base directory is canonicalized so that relative `build-dir` and
/// `output-dir` values resolve the same way from any working directory.
pub(crate) fn load_config(config_path: &Path) -> Result<(Config, PathBuf)> {
    if !config_path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path.display());
    }

    let config = config::from_file(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let base_dir = defaults::config_base_dir(config_path);
    let base_dir = base_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve directory {}", base_dir.display()))?;

    Ok((config, base_dir))
}
