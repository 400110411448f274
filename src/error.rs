//! # Error Handling
//!
//! This module defines the centralized error type for the `buildpatch`
//! library. It uses the `thiserror` library to build an `Error` enum that
//! covers every failure mode of a resolution pass, with messages that name the
//! project or rule involved.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum for all errors raised by the library.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The variants fall into three groups:
//!
//! - Graph errors: cycles in evaluation dependencies, unknown or duplicate
//!   project names. A cycle is fatal to the whole pass.
//! - Per-project errors: a project's own configuration phase failed, or a
//!   patch rule body failed. These abort only the affected project's
//!   remaining deferred callbacks.
//! - Input errors: configuration parsing, discovery, and wrapped library
//!   errors (I/O, regex, glob).
//! - Call-order errors: relocation or dependency registration after the
//!   configuration pass has started.

use thiserror::Error;

/// Main error type for buildpatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the `.buildpatch.yaml` configuration file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A circular dependency was detected between project evaluations.
    #[error("Cycle detected in evaluation dependencies: {cycle}")]
    CycleDetected { cycle: String },

    /// A dependency or patch rule referenced a project that was not discovered.
    #[error("Unknown project '{name}' referenced by {context}")]
    UnknownProject { name: String, context: String },

    /// Two discovered projects share the same name.
    #[error("Duplicate project name: {name}")]
    DuplicateProject { name: String },

    /// A project's own configuration phase failed.
    #[error("Configuration of project '{project}' failed: {message}")]
    Configure { project: String, message: String },

    /// A patch rule body failed on a project.
    #[error("Patch '{rule}' failed on project '{project}': {message}")]
    Mutation {
        project: String,
        rule: String,
        message: String,
    },

    /// A project name cannot be used as a directory under the root output.
    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    /// The tree was reshaped after the configuration pass started.
    #[error("Cannot {operation}: the configuration pass has already started")]
    ConfigurationStarted { operation: String },

    /// An error occurred while discovering project descriptors.
    #[error("Project discovery error: {message}")]
    Discovery { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
