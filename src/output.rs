//! # Output Configuration
//!
//! Controls whether CLI output uses emoji markers or plain bracketed tags.
//!
//! The decision honours, in order:
//! - `--color=never|always|auto`
//! - `NO_COLOR` (any value disables, per https://no-color.org/)
//! - `CLICOLOR=0` disables, `CLICOLOR_FORCE=1` forces
//! - `TERM=dumb` disables
//! - otherwise whatever the terminal reports via the `console` crate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use buildpatch::output::{emoji, status, OutputConfig};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{} Checking patch targets...", emoji(&out, "🔍", "[SCAN]"));
//! println!("{} Configuration is valid", status(&out, true));
//! ```

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Emit emoji markers instead of bracketed tags
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from the `--color` flag and the environment.
    ///
    /// # Arguments
    /// * `color_flag` - `always`, `never` or `auto`, case-insensitive. Any
    ///   other value is treated as `auto`.
    ///
    /// # Behavior
    /// - `always` turns markers on even when `NO_COLOR` is set
    /// - `never` turns them off
    /// - `auto` consults the environment and then the terminal
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Pick the emoji or its plain-text stand-in.
///
/// # Arguments
/// * `config` - Decides between the two forms
/// * `emoji_str` - Shown when markers are enabled
/// * `plain` - Shown otherwise, usually a bracketed tag such as `[SCAN]`
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Success or error marker for a check line.
///
/// # Arguments
/// * `config` - Decides between emoji and tag
/// * `ok` - `✅`/`[OK]` when true, `❌`/`[ERR]` when false
pub fn status(config: &OutputConfig, ok: bool) -> &'static str {
    if ok {
        emoji(config, "✅", "[OK]")
    } else {
        emoji(config, "❌", "[ERR]")
    }
}
