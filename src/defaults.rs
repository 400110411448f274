//! Default values for buildpatch configuration.
//!
//! This module provides centralized default values used across the library
//! and the commands, ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Configuration file looked up in the current directory
pub const CONFIG_FILE_NAME: &str = ".buildpatch.yaml";

/// Environment variable that overrides the configuration file path
pub const CONFIG_ENV_VAR: &str = "BUILDPATCH_CONFIG";

/// Root project name when neither the config nor its directory provides one
pub const DEFAULT_ROOT_NAME: &str = "root";

/// Default output directory of the root, relative to the config directory
pub const DEFAULT_ROOT_OUTPUT: &str = "build";

/// Marker file that identifies a subproject directory during discovery
pub fn default_marker() -> String {
    "project.yaml".to_string()
}

/// How deep below the discovery root a subproject directory may be
pub fn default_max_depth() -> usize {
    3
}

/// Returns the directory a configuration file's relative paths are taken against.
///
/// This is the directory containing the file, or `.` for a bare file name.
pub fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
