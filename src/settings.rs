//! # Project Settings
//!
//! The mutable part of a project: its output directory and its named
//! configuration extensions. An extension (for example `android` or `kotlin`)
//! is a flat mapping of field names to [`Setting`] values.
//!
//! Patch rules and configuration phases only ever receive a
//! `&mut ProjectSettings`, so they cannot reach other projects or the
//! project's own callback queue.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Setting {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Bool(value) => write!(f, "{}", value),
            Setting::Integer(value) => write!(f, "{}", value),
            Setting::Text(value) => write!(f, "{:?}", value),
        }
    }
}

impl From<bool> for Setting {
    fn from(value: bool) -> Self {
        Setting::Bool(value)
    }
}

impl From<i64> for Setting {
    fn from(value: i64) -> Self {
        Setting::Integer(value)
    }
}

impl From<i32> for Setting {
    fn from(value: i32) -> Self {
        Setting::Integer(i64::from(value))
    }
}

impl From<&str> for Setting {
    fn from(value: &str) -> Self {
        Setting::Text(value.to_string())
    }
}

impl From<String> for Setting {
    fn from(value: String) -> Self {
        Setting::Text(value)
    }
}

/// Field name to value mapping for one extension
pub type Extension = BTreeMap<String, Setting>;

/// Extension name to extension mapping
pub type Extensions = BTreeMap<String, Extension>;

/// Output directory and extensions owned by a single project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectSettings {
    pub output_dir: PathBuf,
    pub extensions: Extensions,
}

impl ProjectSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extensions: Extensions::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.contains_key(extension)
    }

    /// Look up `extension.field`
    pub fn get(&self, extension: &str, field: &str) -> Option<&Setting> {
        self.extensions.get(extension)?.get(field)
    }

    /// Set `extension.field`, creating the extension if needed.
    ///
    /// Returns `true` when the stored value changed.
    pub fn set(&mut self, extension: &str, field: &str, value: impl Into<Setting>) -> bool {
        let value = value.into();
        let ext = self.extensions.entry(extension.to_string()).or_default();
        match ext.get(field) {
            Some(existing) if *existing == value => false,
            _ => {
                ext.insert(field.to_string(), value);
                true
            }
        }
    }

    /// Remove `extension.field`. Returns `true` when something was removed.
    pub fn unset(&mut self, extension: &str, field: &str) -> bool {
        self.extensions
            .get_mut(extension)
            .map(|ext| ext.remove(field).is_some())
            .unwrap_or(false)
    }

    /// Load a project's own extensions on top of the current ones.
    pub fn merge_extensions(&mut self, extensions: &Extensions) {
        for (name, fields) in extensions {
            let ext = self.extensions.entry(name.clone()).or_default();
            for (field, value) in fields {
                ext.insert(field.clone(), value.clone());
            }
        }
    }
}
