//! # Patch Rules
//!
//! A [`PatchRule`] pairs a [`NameMatcher`] with a [`Mutation`]. Rules are kept
//! in an ordered table and evaluated once per project; adding a patch for a
//! new subproject means appending a row, not adding a branch.
//!
//! Mutations built from [`Edit`]s are idempotent by construction: applying the
//! same edits to an already-patched project converges to the same state.
//! Custom closures must uphold the same contract themselves.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use glob::Pattern;
use regex::Regex;

use crate::error::{Error, Result};
use crate::settings::{ProjectSettings, Setting};

/// Predicate over a project name
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// Exact name equality
    Exact(String),
    /// Shell-style glob such as `flutter_*`
    Glob(Pattern),
    /// Regular expression, unanchored unless the pattern anchors itself
    Regex(Regex),
}

impl NameMatcher {
    pub fn exact(name: impl Into<String>) -> Self {
        NameMatcher::Exact(name.into())
    }

    pub fn glob(pattern: &str) -> Result<Self> {
        Ok(NameMatcher::Glob(Pattern::new(pattern)?))
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(NameMatcher::Regex(Regex::new(pattern)?))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Exact(expected) => expected == name,
            NameMatcher::Glob(pattern) => pattern.matches(name),
            NameMatcher::Regex(regex) => regex.is_match(name),
        }
    }

    /// The single project name this matcher can select, if it is exact.
    pub fn exact_name(&self) -> Option<&str> {
        match self {
            NameMatcher::Exact(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for NameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameMatcher::Exact(name) => write!(f, "{}", name),
            NameMatcher::Glob(pattern) => write!(f, "glob:{}", pattern.as_str()),
            NameMatcher::Regex(regex) => write!(f, "regex:{}", regex.as_str()),
        }
    }
}

/// One declarative change to a project's settings
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Fail unless the extension (and optionally the field) is present
    Require {
        extension: String,
        field: Option<String>,
    },
    /// Override the output directory. A relative path is joined onto the
    /// parent of the project's current output directory. After relocation
    /// that parent is the relocated root; otherwise it is wherever the
    /// project's default output lives.
    OutputDir(PathBuf),
    Set {
        extension: String,
        field: String,
        value: Setting,
    },
    Unset {
        extension: String,
        field: String,
    },
}

impl Edit {
    pub fn set(extension: &str, field: &str, value: impl Into<Setting>) -> Self {
        Edit::Set {
            extension: extension.to_string(),
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn unset(extension: &str, field: &str) -> Self {
        Edit::Unset {
            extension: extension.to_string(),
            field: field.to_string(),
        }
    }

    /// Parse `extension` or `extension.field` into a `Require` edit
    pub fn require(target: &str) -> Self {
        match target.split_once('.') {
            Some((extension, field)) => Edit::Require {
                extension: extension.to_string(),
                field: Some(field.to_string()),
            },
            None => Edit::Require {
                extension: target.to_string(),
                field: None,
            },
        }
    }

    fn apply(&self, settings: &mut ProjectSettings) -> std::result::Result<(), String> {
        match self {
            Edit::Require {
                extension,
                field: None,
            } => {
                if !settings.has_extension(extension) {
                    return Err(format!("extension '{}' is not registered", extension));
                }
            }
            Edit::Require {
                extension,
                field: Some(field),
            } => {
                if settings.get(extension, field).is_none() {
                    return Err(format!("field '{}.{}' is not set", extension, field));
                }
            }
            Edit::OutputDir(dir) => {
                let target = if dir.is_absolute() {
                    dir.clone()
                } else {
                    match settings.output_dir.parent() {
                        Some(parent) => parent.join(dir),
                        None => dir.clone(),
                    }
                };
                settings.output_dir = target;
            }
            Edit::Set {
                extension,
                field,
                value,
            } => {
                settings.set(extension, field, value.clone());
            }
            Edit::Unset { extension, field } => {
                settings.unset(extension, field);
            }
        }
        Ok(())
    }
}

/// Signature of a hand-written mutation body
pub type MutationFn =
    dyn Fn(&str, &mut ProjectSettings) -> std::result::Result<(), String> + Send + Sync;

/// The body of a patch rule
#[derive(Clone)]
pub enum Mutation {
    Edits(Vec<Edit>),
    Custom(Arc<MutationFn>),
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Edits(edits) => f.debug_tuple("Edits").field(edits).finish(),
            Mutation::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A named (matcher, mutation) pair
#[derive(Debug, Clone)]
pub struct PatchRule {
    pub name: String,
    pub matcher: NameMatcher,
    pub mutation: Mutation,
}

impl PatchRule {
    pub fn new(name: impl Into<String>, matcher: NameMatcher, edits: Vec<Edit>) -> Self {
        Self {
            name: name.into(),
            matcher,
            mutation: Mutation::Edits(edits),
        }
    }

    pub fn custom<F>(name: impl Into<String>, matcher: NameMatcher, body: F) -> Self
    where
        F: Fn(&str, &mut ProjectSettings) -> std::result::Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            matcher,
            mutation: Mutation::Custom(Arc::new(body)),
        }
    }

    pub fn matches(&self, project: &str) -> bool {
        self.matcher.matches(project)
    }

    /// Run the rule body against one project's settings.
    ///
    /// A failing body leaves the settings exactly as they were before the
    /// call. Returns whether anything changed.
    pub fn apply(&self, project: &str, settings: &mut ProjectSettings) -> Result<bool> {
        let before = settings.clone();

        let outcome = match &self.mutation {
            Mutation::Edits(edits) => edits.iter().try_for_each(|edit| edit.apply(settings)),
            Mutation::Custom(body) => body(project, settings),
        };

        match outcome {
            Ok(()) => Ok(*settings != before),
            Err(message) => {
                *settings = before;
                Err(Error::Mutation {
                    project: project.to_string(),
                    rule: self.name.clone(),
                    message,
                })
            }
        }
    }
}
