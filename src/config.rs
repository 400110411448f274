//! # Configuration Schema and Parsing
//!
//! This module defines the data structures behind the `.buildpatch.yaml`
//! configuration file and the logic for parsing it. Every literal a root build
//! script would hard-code (the redirected build directory, evaluation
//! dependencies, per-subproject patches) is expressed here as data.
//!
//! ## Example
//!
//! ```yaml
//! root:
//!   name: android
//! build-dir: ../../build
//! projects:
//!   - name: app
//! evaluation:
//!   depends-on-all: app
//! patches:
//!   - match: isar_flutter_libs
//!     set:
//!       android:
//!         namespace: dev.isar.isar_flutter_libs
//! ```
//!
//! ## Key Components
//!
//! - **`Config`**: The whole file.
//! - **`PatchConfig`**: One row of the patch table. `to_rule` compiles it into
//!   a [`PatchRule`] whose edits run in a fixed order: `require`, `output-dir`,
//!   `set`, `unset`.
//! - **`MatchConfig`**: A bare string for an exact name, or `{glob: ...}` /
//!   `{regex: ...}`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::phases::ProjectDescriptor;
use crate::rules::{Edit, NameMatcher, PatchRule};
use crate::settings::Setting;

/// The root project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RootConfig {
    /// Defaults to the name of the directory holding the config file
    #[serde(default)]
    pub name: Option<String>,
    /// Defaults to `build`, relative to the config directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// Directory scan for subproject marker files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DiscoverConfig {
    /// Directory to scan, relative to the config directory
    pub path: PathBuf,
    #[serde(default = "defaults::default_marker")]
    pub marker: String,
    #[serde(default = "defaults::default_max_depth")]
    pub max_depth: usize,
}

/// `project` evaluates after `after`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyConfig {
    pub project: String,
    pub after: String,
}

/// Evaluation ordering constraints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Every other subproject evaluates after this one
    #[serde(default)]
    pub depends_on_all: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,
}

/// How a patch selects projects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchConfig {
    Exact(String),
    Glob { glob: String },
    Regex { regex: String },
}

impl MatchConfig {
    pub fn to_matcher(&self) -> Result<NameMatcher> {
        match self {
            MatchConfig::Exact(name) => Ok(NameMatcher::exact(name.clone())),
            MatchConfig::Glob { glob } => NameMatcher::glob(glob),
            MatchConfig::Regex { regex } => NameMatcher::regex(regex),
        }
    }
}

/// One row of the patch table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PatchConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "match")]
    pub matcher: MatchConfig,
    /// `extension` or `extension.field` entries that must already exist
    #[serde(default)]
    pub require: Vec<String>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub set: BTreeMap<String, BTreeMap<String, Setting>>,
    #[serde(default)]
    pub unset: BTreeMap<String, Vec<String>>,
}

impl PatchConfig {
    fn is_empty(&self) -> bool {
        self.require.is_empty()
            && self.output_dir.is_none()
            && self.set.is_empty()
            && self.unset.is_empty()
    }

    /// Compile this row into a patch rule. `index` is the row's position and
    /// names the rule when no `name` is given.
    pub fn to_rule(&self, index: usize) -> Result<PatchRule> {
        let matcher = self.matcher.to_matcher()?;
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("{} (#{})", matcher, index + 1));

        let mut edits: Vec<Edit> = self
            .require
            .iter()
            .map(|target| Edit::require(target))
            .collect();
        if let Some(dir) = &self.output_dir {
            edits.push(Edit::OutputDir(dir.clone()));
        }
        for (extension, fields) in &self.set {
            for (field, value) in fields {
                edits.push(Edit::set(extension, field, value.clone()));
            }
        }
        for (extension, fields) in &self.unset {
            for field in fields {
                edits.push(Edit::unset(extension, field));
            }
        }

        Ok(PatchRule::new(name, matcher, edits))
    }
}

/// The complete `.buildpatch.yaml` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub root: RootConfig,
    /// Relocation target, relative to the root's default output directory
    #[serde(default)]
    pub build_dir: Option<PathBuf>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub projects: Vec<ProjectDescriptor>,
    #[serde(default)]
    pub discover: Option<DiscoverConfig>,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub patches: Vec<PatchConfig>,
}

impl Config {
    /// Compile the patch table, in declaration order
    pub fn rules(&self) -> Result<Vec<PatchRule>> {
        self.patches
            .iter()
            .enumerate()
            .map(|(index, patch)| patch.to_rule(index))
            .collect()
    }

    /// Root project name, falling back to the config directory name
    pub fn root_name(&self, base_dir: &Path) -> String {
        self.root
            .name
            .clone()
            .or_else(|| {
                base_dir
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| defaults::DEFAULT_ROOT_NAME.to_string())
    }

    fn validate(&self) -> Result<()> {
        for (index, patch) in self.patches.iter().enumerate() {
            if patch.is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("patch #{} does nothing", index + 1),
                    hint: Some(
                        "Add at least one of 'require', 'output-dir', 'set' or 'unset'"
                            .to_string(),
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Parses a YAML string into a `Config`.
///
/// An empty document yields the default configuration.
pub fn parse(yaml_content: &str) -> Result<Config> {
    if yaml_content.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml_content).map_err(|e| {
        let message = e.to_string();
        let hint = message.contains("unknown field").then(|| {
            "Top-level keys are: root, build-dir, strict, projects, discover, evaluation, patches"
                .to_string()
        });
        Error::ConfigParse { message, hint }
    })?;
    config.validate()?;
    Ok(config)
}

/// Read and parse a configuration file
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
