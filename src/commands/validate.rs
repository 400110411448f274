//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a
//! `.buildpatch.yaml` configuration without configuring any project.
//!
//! ## Functionality
//!
//! - **Configuration Validation**: Parses the configuration file, including
//!   every glob and regex matcher in the patch table.
//! - **Discovery**: Runs project discovery and reports what was found.
//! - **Cycle Detection**: Computes the evaluation order and reports cycles.
//! - **Patch Targets**: Reports exact-match patches that name no project and
//!   pattern patches that match nothing.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use buildpatch::config;
use buildpatch::defaults;
use buildpatch::output::{emoji, status, OutputConfig};
use buildpatch::phases::orchestrator;

/// Validate a .buildpatch.yaml configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the .buildpatch.yaml configuration file to validate.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = defaults::CONFIG_ENV_VAR,
        default_value = defaults::CONFIG_FILE_NAME
    )]
    pub config: PathBuf,

    /// Use strict validation (fail on warnings).
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config_path = &args.config;
    println!(
        "{} Validating configuration: {}",
        emoji(&out, "🔍", "[SCAN]"),
        config_path.display()
    );

    let (config, base_dir) = match super::load_config(config_path) {
        Ok(loaded) => {
            println!("{} Configuration file parsed successfully", status(&out, true));
            loaded
        }
        Err(e) => {
            println!(
                "{} Configuration parsing failed: {:#}",
                status(&out, false),
                e
            );
            return Err(anyhow::anyhow!("Configuration parsing failed: {:#}", e));
        }
    };

    let mut has_warnings = false;
    let mut has_errors = false;

    // Discovery, relocation and dependency registration
    let plan = match orchestrator::plan(&config, &base_dir) {
        Ok(plan) => plan,
        Err(e) => {
            println!("{} {}", status(&out, false), e);
            println!("\n{} Validation Result:", emoji(&out, "🎯", "[RESULT]"));
            println!("{} Configuration has errors that must be fixed", status(&out, false));
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    };
    let tree = plan.resolver.tree();

    println!("\n{} Configuration Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Root project: {}", tree.root.name());
    println!("   Root output: {}", tree.root.output_dir().display());
    println!("   Subprojects: {}", tree.children().len());
    println!("   Patch rules: {}", plan.rules.len());
    println!("   Evaluation dependencies: {}", tree.dependencies().len());

    // Cycle detection
    println!(
        "\n{} Checking evaluation order...",
        emoji(&out, "🔄", "[CHECK]")
    );
    match plan.resolver.evaluation_order() {
        Ok(order) => {
            println!("{} No circular dependencies detected", status(&out, true));
            println!("   Evaluation order: {}", order.order.join(", "));
        }
        Err(e) => {
            println!("{} {}", status(&out, false), e);
            has_errors = true;
        }
    }

    // Patch targets
    println!(
        "\n{} Checking patch targets...",
        emoji(&out, "🔍", "[SCAN]")
    );
    for rule in &plan.rules {
        let targets = tree
            .children()
            .iter()
            .filter(|child| rule.matches(child.name()))
            .count();

        match rule.matcher.exact_name() {
            Some(name) if targets == 0 => {
                if config.strict {
                    println!(
                        "{} Patch '{}' targets unknown project '{}'",
                        status(&out, false),
                        rule.name,
                        name
                    );
                    has_errors = true;
                } else {
                    println!(
                        "{} Patch '{}' targets unknown project '{}'",
                        emoji(&out, "⚠️", "[WARN]"),
                        rule.name,
                        name
                    );
                    has_warnings = true;
                }
            }
            None if targets == 0 => {
                println!(
                    "{} Patch '{}' matches no project",
                    emoji(&out, "⚠️", "[WARN]"),
                    rule.name
                );
                has_warnings = true;
            }
            _ => {
                println!(
                    "{} Patch '{}' -> {} project(s)",
                    status(&out, true),
                    rule.name,
                    targets
                );
            }
        }
    }

    // Final result
    println!("\n{} Validation Result:", emoji(&out, "🎯", "[RESULT]"));

    if has_errors {
        println!("{} Configuration has errors that must be fixed", status(&out, false));
        return Err(anyhow::anyhow!("Configuration validation failed"));
    }

    if has_warnings && args.strict {
        println!("{} Configuration has warnings (strict mode enabled)", status(&out, false));
        return Err(anyhow::anyhow!(
            "Configuration validation failed (strict mode)"
        ));
    }

    if has_warnings {
        println!(
            "{} Configuration is valid with warnings",
            emoji(&out, "⚠️", "[WARN]")
        );
    } else {
        println!("{} Configuration is valid", status(&out, true));
    }

    Ok(())
}
