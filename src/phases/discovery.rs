//! Phase 1: Discovery
//!
//! This is the first phase of a resolution pass. Projects are never created by
//! buildpatch; they are discovered from an external project-description
//! collaborator, modeled by the [`ProjectSource`] trait.
//!
//! ## Sources
//!
//! - **`StaticSource`**: descriptors listed inline in `.buildpatch.yaml`.
//! - **`DirectorySource`**: walks a directory and treats every directory that
//!   contains a marker file (default `project.yaml`) as a subproject. The
//!   marker file carries the project's own extensions.
//!
//! Descriptors from all sources are concatenated in source order and turned
//! into a [`BuildTree`] by [`build_tree`]. Duplicate names are rejected.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::{BuildTree, ProjectNode};
use crate::error::{Error, Result};
use crate::path::resolve_path;
use crate::settings::Extensions;

/// What a project-description collaborator reports about one subproject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectDescriptor {
    pub name: String,
    /// Default output directory before relocation
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// The project's own configuration, loaded during its configuration phase
    #[serde(default)]
    pub extensions: Extensions,
}

impl ProjectDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_dir: None,
            extensions: Extensions::new(),
        }
    }
}

/// External collaborator that lists the subprojects of a build
pub trait ProjectSource {
    fn discover(&self) -> Result<Vec<ProjectDescriptor>>;
}

/// Descriptors known up front
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    descriptors: Vec<ProjectDescriptor>,
}

impl StaticSource {
    pub fn new(descriptors: Vec<ProjectDescriptor>) -> Self {
        Self { descriptors }
    }
}

impl ProjectSource for StaticSource {
    fn discover(&self) -> Result<Vec<ProjectDescriptor>> {
        Ok(self.descriptors.clone())
    }
}

/// Contents of a marker file found by [`DirectorySource`]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ProjectManifest {
    /// Overrides the directory name
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
    #[serde(default)]
    extensions: Extensions,
}

/// Scans a directory tree for subproject marker files
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    marker: String,
    max_depth: usize,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, marker: impl Into<String>, max_depth: usize) -> Self {
        Self {
            root: root.into(),
            marker: marker.into(),
            max_depth,
        }
    }

    fn read_manifest(&self, path: &Path) -> Result<ProjectManifest> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(ProjectManifest::default());
        }
        serde_yaml::from_str(&content).map_err(|e| Error::Discovery {
            message: format!("invalid project manifest {}: {}", path.display(), e),
        })
    }
}

impl ProjectSource for DirectorySource {
    fn discover(&self) -> Result<Vec<ProjectDescriptor>> {
        if !self.root.is_dir() {
            return Err(Error::Discovery {
                message: format!("{} is not a directory", self.root.display()),
            });
        }

        let mut descriptors = Vec::new();

        // The marker sits one level below the project directory.
        let walker = WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(self.max_depth + 1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| Error::Discovery {
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() || entry.file_name() != self.marker.as_str() {
                continue;
            }

            let Some(project_dir) = entry.path().parent() else {
                continue;
            };
            let manifest = self.read_manifest(entry.path())?;
            let name = match manifest.name {
                Some(name) => name,
                None => project_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| Error::Discovery {
                        message: format!("cannot name project at {}", project_dir.display()),
                    })?,
            };
            let output_dir = match manifest.output_dir {
                Some(dir) => resolve_path(project_dir, &dir),
                None => project_dir.join("build"),
            };

            debug!("Discovered project '{}' at {}", name, project_dir.display());
            descriptors.push(ProjectDescriptor {
                name,
                output_dir: Some(output_dir),
                extensions: manifest.extensions,
            });
        }

        Ok(descriptors)
    }
}

/// Collect descriptors from every source, in order
pub fn discover_all(sources: &[&dyn ProjectSource]) -> Result<Vec<ProjectDescriptor>> {
    let mut descriptors = Vec::new();
    for source in sources {
        descriptors.extend(source.discover()?);
    }
    Ok(descriptors)
}

/// Build the tree for a root project and its discovered subprojects.
///
/// A descriptor without an output directory defaults to
/// `<base_dir>/<name>/build`; relative ones are taken against `base_dir`.
pub fn build_tree(
    root: ProjectNode,
    base_dir: &Path,
    descriptors: &[ProjectDescriptor],
) -> Result<BuildTree> {
    let children = descriptors
        .iter()
        .map(|descriptor| {
            let output_dir = match &descriptor.output_dir {
                Some(dir) => resolve_path(base_dir, dir),
                None => base_dir.join(&descriptor.name).join("build"),
            };
            ProjectNode::new(descriptor.name.clone(), output_dir)
        })
        .collect();

    let tree = BuildTree::new(root, children)?;
    info!(
        "Discovered {} subprojects under '{}'",
        tree.children().len(),
        tree.root.name()
    );
    Ok(tree)
}
