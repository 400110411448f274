//! Implementation of the phases of a buildpatch resolution pass.
//!
//! ## Overview
//!
//! A resolution pass follows 5 phases:
//! 1. Discovery - Collect project descriptors and build the `BuildTree`
//! 2. Relocation - Redirect every output directory under one shared root
//! 3. Ordering - Register evaluation dependencies and compute the evaluation order
//! 4. Scheduling - Queue matching patch rules on each project (deferred)
//! 5. Evaluation - Configure each project, then drain its deferred callbacks
//!
//! Relocation always happens before any patch is evaluated, and a cycle found
//! in phase 3 aborts the pass before a single callback runs.

use std::collections::HashSet;
use std::mem;
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};
use crate::rules::PatchRule;
use crate::settings::ProjectSettings;

// Phase modules
pub mod discovery;
pub mod evaluation;
pub mod orchestrator;
pub mod ordering;
pub mod relocation;
pub mod scheduling;

pub use discovery::{ProjectDescriptor, ProjectSource};
pub use evaluation::{ConfigurationPhase, DescriptorPhase};

/// Where a project is in its configuration lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Discovered, own configuration not yet loaded
    Discovered,
    /// Own configuration loaded; deferred callbacks have been drained
    Configured,
    /// Own configuration or one of its patches failed
    Failed,
}

/// A single project in the build tree
#[derive(Debug)]
pub struct ProjectNode {
    name: String,
    settings: ProjectSettings,
    state: NodeState,
    pending: Vec<Arc<PatchRule>>,
}

impl ProjectNode {
    /// Create a discovered project with its default output directory.
    ///
    /// The node starts in [`NodeState::Discovered`] with no extensions and an
    /// empty callback queue.
    pub fn new(name: impl Into<String>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            settings: ProjectSettings::new(output_dir.as_ref()),
            state: NodeState::Discovered,
            pending: Vec::new(),
        }
    }

    /// The project's unique name within its tree
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output directory and extensions as they currently stand
    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// Mutable access for configuration phases and relocation.
    ///
    /// Patch rules never go through this; they receive the settings from
    /// the node's own callback queue.
    pub fn settings_mut(&mut self) -> &mut ProjectSettings {
        &mut self.settings
    }

    /// Shorthand for `settings().output_dir()`
    pub fn output_dir(&self) -> &Path {
        &self.settings.output_dir
    }

    /// Where the project is in its configuration lifecycle
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Names of the rules still waiting for this project to be configured
    pub fn pending_rules(&self) -> Vec<&str> {
        self.pending.iter().map(|rule| rule.name.as_str()).collect()
    }

    /// Register a callback to run once this project's own configuration is
    /// complete.
    ///
    /// If the project is already configured the callback runs immediately.
    /// A failed project drops it.
    pub fn after_evaluate(&mut self, rule: Arc<PatchRule>, report: &mut ResolutionReport) {
        match self.state {
            NodeState::Discovered => {
                debug!("Deferring patch '{}' on project '{}'", rule.name, self.name);
                self.pending.push(rule);
            }
            NodeState::Configured => {
                self.run_callback(&rule, report);
            }
            NodeState::Failed => {
                debug!(
                    "Dropping patch '{}' on failed project '{}'",
                    rule.name, self.name
                );
                report.aborted.push(AbortedPatch::new(&self.name, &rule.name));
            }
        }
    }

    /// Mark the own configuration phase complete and drain pending callbacks
    /// in registration order.
    ///
    /// The first failing callback marks the project failed and drops the
    /// callbacks queued after it.
    pub fn on_configured(&mut self, report: &mut ResolutionReport) {
        if self.state != NodeState::Discovered {
            return;
        }
        self.state = NodeState::Configured;

        let pending = mem::take(&mut self.pending);
        let mut queue = pending.iter();
        for rule in queue.by_ref() {
            if !self.run_callback(rule, report) {
                break;
            }
        }
        for rule in queue {
            report.aborted.push(AbortedPatch::new(&self.name, &rule.name));
        }
    }

    /// Mark the own configuration phase as failed, dropping pending callbacks
    pub fn fail(&mut self, error: Error, report: &mut ResolutionReport) {
        self.state = NodeState::Failed;
        for rule in mem::take(&mut self.pending) {
            report.aborted.push(AbortedPatch::new(&self.name, &rule.name));
        }
        report.failures.push(error);
    }

    fn run_callback(&mut self, rule: &PatchRule, report: &mut ResolutionReport) -> bool {
        match rule.apply(&self.name, &mut self.settings) {
            Ok(changed) => {
                debug!(
                    "Applied patch '{}' to project '{}' (changed: {})",
                    rule.name, self.name, changed
                );
                report.applied.push(AppliedPatch {
                    project: self.name.clone(),
                    rule: rule.name.clone(),
                    changed,
                });
                true
            }
            Err(error) => {
                self.state = NodeState::Failed;
                report.failures.push(error);
                false
            }
        }
    }
}

/// The root project and the subprojects it aggregates
#[derive(Debug)]
pub struct BuildTree {
    /// Aggregating root project, evaluated after all children
    pub root: ProjectNode,
    children: Vec<ProjectNode>,
    /// Evaluation dependencies as `(dependent, dependency)` pairs
    dependencies: Vec<(String, String)>,
}

impl BuildTree {
    /// Build a tree from a root and the subprojects it aggregates.
    ///
    /// # Behavior
    ///
    /// - Every child name must be usable as a single directory name under the
    ///   root output: not empty, not `.` or `..`, and free of path
    ///   separators. Otherwise `Error::InvalidProjectName`.
    /// - Names must be unique across the root and all children. Otherwise
    ///   `Error::DuplicateProject`.
    pub fn new(root: ProjectNode, children: Vec<ProjectNode>) -> Result<Self> {
        let mut seen = HashSet::new();
        seen.insert(root.name.clone());
        for child in &children {
            validate_child_name(&child.name)?;
            if !seen.insert(child.name.clone()) {
                return Err(Error::DuplicateProject {
                    name: child.name.clone(),
                });
            }
        }

        Ok(Self {
            root,
            children,
            dependencies: Vec::new(),
        })
    }

    /// Subprojects in declaration order
    pub fn children(&self) -> &[ProjectNode] {
        &self.children
    }

    /// Subprojects in declaration order, mutably. The set itself is fixed.
    pub fn children_mut(&mut self) -> &mut [ProjectNode] {
        &mut self.children
    }

    /// Look up a subproject by name
    pub fn child(&self, name: &str) -> Option<&ProjectNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Look up a subproject by name, mutably
    pub fn child_mut(&mut self, name: &str) -> Option<&mut ProjectNode> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// Look up the root or a child by name
    pub fn node_mut(&mut self, name: &str) -> Option<&mut ProjectNode> {
        if self.root.name == name {
            Some(&mut self.root)
        } else {
            self.child_mut(name)
        }
    }

    /// Whether `name` is a subproject. The root does not count.
    pub fn contains_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Whether any project has left [`NodeState::Discovered`].
    ///
    /// From that point on the outputs and the evaluation order are frozen.
    pub fn configuration_started(&self) -> bool {
        std::iter::once(&self.root)
            .chain(&self.children)
            .any(|node| node.state != NodeState::Discovered)
    }

    /// Whether any subproject has completed its own configuration
    pub(crate) fn any_child_configured(&self) -> bool {
        self.children
            .iter()
            .any(|child| child.state == NodeState::Configured)
    }

    /// All registered evaluation dependencies as `(dependent, dependency)`
    pub fn dependencies(&self) -> &[(String, String)] {
        &self.dependencies
    }

    /// Dependencies registered for `dependent`, in registration order
    pub fn dependencies_of<'a>(&'a self, dependent: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependencies
            .iter()
            .filter(move |(from, _)| from == dependent)
            .map(|(_, to)| to.as_str())
    }

    /// Record an edge; returns `false` when it was already present
    pub(crate) fn add_dependency(&mut self, dependent: &str, dependency: &str) -> bool {
        let edge = (dependent.to_string(), dependency.to_string());
        if self.dependencies.contains(&edge) {
            false
        } else {
            self.dependencies.push(edge);
            true
        }
    }
}

fn validate_child_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name == "." || name == ".." {
        "must not be '.' or '..'"
    } else if name.contains(['/', '\\']) {
        "must not contain path separators"
    } else {
        return Ok(());
    };
    Err(Error::InvalidProjectName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Evaluation order: dependencies before dependents, the root last
#[derive(Debug, Clone)]
pub struct EvaluationOrder {
    pub order: Vec<String>,
}

impl EvaluationOrder {
    pub fn new(order: Vec<String>) -> Self {
        Self { order }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of projects, root included
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Zero-based position of `name`, if it is part of the order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|entry| entry == name)
    }
}

/// A patch rule that ran on a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPatch {
    pub project: String,
    pub rule: String,
    /// Whether the project's settings differ after the rule ran
    pub changed: bool,
}

/// A deferred callback that never ran because its project failed first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortedPatch {
    pub project: String,
    pub rule: String,
}

impl AbortedPatch {
    fn new(project: &str, rule: &str) -> Self {
        Self {
            project: project.to_string(),
            rule: rule.to_string(),
        }
    }
}

/// Outcome of scheduling and evaluation
#[derive(Debug, Default)]
pub struct ResolutionReport {
    /// Evaluation order, empty until the evaluation phase has run
    pub order: Vec<String>,
    pub applied: Vec<AppliedPatch>,
    pub aborted: Vec<AbortedPatch>,
    pub warnings: Vec<String>,
    /// Per-project failures; each one stopped only its own project
    pub failures: Vec<Error>,
}

impl ResolutionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of patch applications that changed a project
    pub fn changes(&self) -> usize {
        self.applied.iter().filter(|patch| patch.changed).count()
    }

    /// Rule names applied to `project`, in application order
    pub fn applied_to(&self, project: &str) -> Vec<&str> {
        self.applied
            .iter()
            .filter(|patch| patch.project == project)
            .map(|patch| patch.rule.as_str())
            .collect()
    }

    /// Fold a later report into this one
    pub fn merge(&mut self, other: ResolutionReport) {
        if !other.order.is_empty() {
            self.order = other.order;
        }
        self.applied.extend(other.applied);
        self.aborted.extend(other.aborted);
        self.warnings.extend(other.warnings);
        self.failures.extend(other.failures);
    }
}
