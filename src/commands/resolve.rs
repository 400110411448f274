//! # Resolve Command Implementation
//!
//! Runs a complete resolution pass over a `.buildpatch.yaml` configuration:
//! discovery, output relocation, evaluation dependencies, deferred patch
//! scheduling and finally evaluation of every project. The resolved tree is
//! printed as text, YAML or JSON.
//!
//! The command exits non-zero when the pass aborts (unknown project, cycle,
//! invalid configuration) or when any project failed to configure or patch.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::fs;
use std::path::PathBuf;

use buildpatch::defaults;
use buildpatch::output::OutputConfig;
use buildpatch::phases::orchestrator;
use buildpatch::summary::Summary;

use super::load_config;

/// Output format for the resolved tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Yaml,
    Json,
}

/// Resolve the build tree and apply all patches
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path to the .buildpatch.yaml configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = defaults::CONFIG_ENV_VAR,
        default_value = defaults::CONFIG_FILE_NAME
    )]
    pub config: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the result to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Treat patches naming unknown projects as errors
    #[arg(long)]
    pub strict: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `resolve` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ResolveArgs, color_flag: &str) -> Result<()> {
    let (mut config, base_dir) = load_config(&args.config)?;
    config.strict |= args.strict;

    let resolution = orchestrator::execute_resolve(&config, &base_dir)
        .with_context(|| format!("Failed to resolve {}", args.config.display()))?;
    let summary = Summary::from_resolution(&resolution);

    // Files never get emoji
    let out = if args.output.is_some() {
        OutputConfig { use_color: false }
    } else {
        OutputConfig::from_env_and_flag(color_flag)
    };
    let rendered = match args.format {
        OutputFormat::Text => summary.render_text(&out),
        OutputFormat::Yaml => serde_yaml::to_string(&summary)?,
        OutputFormat::Json => serde_json::to_string_pretty(&summary)? + "\n",
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !args.quiet {
                println!("Wrote resolved tree to {}", path.display());
            }
        }
        None if !args.quiet => print!("{}", rendered),
        None => {}
    }

    if !summary.is_success() {
        if args.quiet {
            for failure in &summary.failures {
                eprintln!("{}", failure);
            }
        }
        anyhow::bail!(
            "{} project(s) failed to configure",
            summary.failures.len()
        );
    }

    Ok(())
}
