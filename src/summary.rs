//! # Resolution Summary
//!
//! A serializable snapshot of a finished pass, used by the `resolve` command
//! for its `text`, `yaml` and `json` output formats.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::output::{emoji, OutputConfig};
use crate::phases::orchestrator::Resolution;
use crate::phases::{NodeState, ProjectNode};
use crate::settings::Extensions;

/// Final state of one project
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectSummary {
    pub name: String,
    pub output_dir: PathBuf,
    pub state: String,
    pub extensions: Extensions,
    pub applied: Vec<String>,
}

/// Final state of the whole tree
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Summary {
    pub root: ProjectSummary,
    pub order: Vec<String>,
    pub projects: Vec<ProjectSummary>,
    pub warnings: Vec<String>,
    pub failures: Vec<String>,
}

fn state_label(state: NodeState) -> &'static str {
    match state {
        NodeState::Discovered => "discovered",
        NodeState::Configured => "configured",
        NodeState::Failed => "failed",
    }
}

impl Summary {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        let project = |node: &ProjectNode| ProjectSummary {
            name: node.name().to_string(),
            output_dir: node.output_dir().to_path_buf(),
            state: state_label(node.state()).to_string(),
            extensions: node.settings().extensions.clone(),
            applied: resolution
                .report
                .applied_to(node.name())
                .into_iter()
                .map(str::to_string)
                .collect(),
        };

        Self {
            root: project(&resolution.tree.root),
            order: resolution.report.order.clone(),
            projects: resolution.tree.children().iter().map(project).collect(),
            warnings: resolution.report.warnings.clone(),
            failures: resolution
                .report
                .failures
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable rendering, projects in evaluation order
    pub fn render_text(&self, out: &OutputConfig) -> String {
        let mut text = String::new();
        let _ = writeln!(
            text,
            "{} Root '{}' -> {}",
            emoji(out, "📦", "[ROOT]"),
            self.root.name,
            self.root.output_dir.display()
        );

        let ordered = self
            .order
            .iter()
            .filter_map(|name| self.projects.iter().find(|p| &p.name == name))
            .chain(self.projects.iter().filter(|p| !self.order.contains(&p.name)));
        for project in ordered {
            let marker = if project.state == "failed" {
                emoji(out, "❌", "[FAIL]")
            } else {
                emoji(out, "✅", "[OK]")
            };
            let _ = writeln!(
                text,
                "{} {} -> {}",
                marker,
                project.name,
                project.output_dir.display()
            );
            for (extension, fields) in &project.extensions {
                for (field, value) in fields {
                    let _ = writeln!(text, "     {}.{} = {}", extension, field, value);
                }
            }
            if !project.applied.is_empty() {
                let _ = writeln!(text, "     patches: {}", project.applied.join(", "));
            }
        }

        for warning in &self.warnings {
            let _ = writeln!(text, "{} {}", emoji(out, "⚠️", "[WARN]"), warning);
        }
        for failure in &self.failures {
            let _ = writeln!(text, "{} {}", emoji(out, "❌", "[ERR]"), failure);
        }
        text
    }
}
