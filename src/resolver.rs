//! # Deferred Configuration Resolver
//!
//! [`DeferredConfigResolver`] owns a [`BuildTree`] and exposes the
//! registration API a root build description calls once during its own
//! setup:
//!
//! ```
//! use buildpatch::phases::{BuildTree, DescriptorPhase, ProjectNode};
//! use buildpatch::resolver::DeferredConfigResolver;
//! use buildpatch::rules::{Edit, NameMatcher, PatchRule};
//!
//! let tree = BuildTree::new(
//!     ProjectNode::new("root", "/repo/android/build"),
//!     vec![ProjectNode::new("alpha", "/repo/alpha/build")],
//! )
//! .unwrap();
//!
//! let mut resolver = DeferredConfigResolver::new(tree);
//! resolver.relocate_outputs("/repo/build").unwrap();
//! resolver
//!     .apply_deferred(&[PatchRule::new(
//!         "alpha-namespace",
//!         NameMatcher::exact("alpha"),
//!         vec![Edit::set("android", "namespace", "com.example.alpha")],
//!     )])
//!     .unwrap();
//! let report = resolver.configure(&mut DescriptorPhase::default()).unwrap();
//!
//! assert!(report.is_success());
//! let alpha = resolver.tree().child("alpha").unwrap();
//! assert_eq!(alpha.output_dir(), std::path::Path::new("/repo/build/alpha"));
//! ```

use std::path::Path;

use crate::error::Result;
use crate::phases::{
    evaluation, ordering, relocation, scheduling, BuildTree, ConfigurationPhase, EvaluationOrder,
    ResolutionReport,
};
use crate::rules::PatchRule;

/// Registration API over a single build tree
#[derive(Debug)]
pub struct DeferredConfigResolver {
    tree: BuildTree,
    strict: bool,
}

impl DeferredConfigResolver {
    /// Wrap a discovered tree. Unknown exact-match targets only warn.
    pub fn new(tree: BuildTree) -> Self {
        Self {
            tree,
            strict: false,
        }
    }

    /// Treat exact-match rules that name no subproject as errors
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The tree in its current state
    pub fn tree(&self) -> &BuildTree {
        &self.tree
    }

    /// Give up the resolver and keep the resolved tree
    pub fn into_tree(self) -> BuildTree {
        self.tree
    }

    /// Point the root output at `new_root_output` and every child at
    /// `new_root_output/<name>`.
    ///
    /// Fails with `Error::ConfigurationStarted` once any project has been
    /// configured; patched output directories are left alone.
    pub fn relocate_outputs(&mut self, new_root_output: impl AsRef<Path>) -> Result<()> {
        relocation::relocate_outputs(&mut self.tree, new_root_output.as_ref())
    }

    /// Evaluate `dependent` after `dependency`.
    ///
    /// # Arguments
    ///
    /// * `dependent` - Subproject that must wait
    /// * `dependency` - Subproject evaluated first
    ///
    /// Both must be subprojects, and the configuration pass must not have
    /// started yet.
    pub fn register_evaluation_dependency(
        &mut self,
        dependent: &str,
        dependency: &str,
    ) -> Result<()> {
        ordering::register_evaluation_dependency(&mut self.tree, dependent, dependency)
    }

    /// Evaluate every other subproject after `dependency`
    pub fn register_evaluation_dependency_for_all(&mut self, dependency: &str) -> Result<()> {
        ordering::register_evaluation_dependency_for_all(&mut self.tree, dependency)
    }

    /// Queue every matching rule on its subprojects, to run after each
    /// subproject's own configuration
    pub fn apply_deferred(&mut self, rules: &[PatchRule]) -> Result<ResolutionReport> {
        scheduling::apply_deferred(&mut self.tree, rules, self.strict)
    }

    /// Dependencies first, root last. Fails on a dependency cycle.
    pub fn evaluation_order(&self) -> Result<EvaluationOrder> {
        ordering::execute(&self.tree)
    }

    /// Run the configuration pass, draining deferred callbacks per project
    pub fn configure(&mut self, phase: &mut dyn ConfigurationPhase) -> Result<ResolutionReport> {
        evaluation::configure(&mut self.tree, phase)
    }
}
