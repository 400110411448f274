//! Phase 5: Evaluation
//!
//! Walks the projects in evaluation order. For each one the external
//! [`ConfigurationPhase`] loads the project's own configuration; once that
//! returns, the project's deferred callbacks are drained in registration
//! order. Patches therefore always observe a fully loaded project.
//!
//! The order is computed first, so a dependency cycle aborts the pass before
//! any project is configured or patched. Failures after that point are local:
//! a project whose configuration or patch fails stops its own callbacks and the
//! pass moves on to the next project.

use std::collections::HashMap;

use log::info;

use super::{ordering, BuildTree, NodeState, ProjectDescriptor, ResolutionReport};
use crate::error::{Error, Result};
use crate::settings::{Extensions, ProjectSettings};

/// External collaborator that loads a project's own configuration
pub trait ConfigurationPhase {
    fn configure(&mut self, project: &str, settings: &mut ProjectSettings) -> Result<()>;
}

impl<F> ConfigurationPhase for F
where
    F: FnMut(&str, &mut ProjectSettings) -> Result<()>,
{
    fn configure(&mut self, project: &str, settings: &mut ProjectSettings) -> Result<()> {
        self(project, settings)
    }
}

/// Loads each project's own extensions from its discovery descriptor
#[derive(Debug, Clone, Default)]
pub struct DescriptorPhase {
    own: HashMap<String, Extensions>,
}

impl DescriptorPhase {
    pub fn new(descriptors: &[ProjectDescriptor]) -> Self {
        let own = descriptors
            .iter()
            .map(|d| (d.name.clone(), d.extensions.clone()))
            .collect();
        Self { own }
    }

    /// Also load own extensions for a project that has no descriptor, such as the root
    pub fn with_project(mut self, name: impl Into<String>, extensions: Extensions) -> Self {
        self.own.insert(name.into(), extensions);
        self
    }
}

impl ConfigurationPhase for DescriptorPhase {
    fn configure(&mut self, project: &str, settings: &mut ProjectSettings) -> Result<()> {
        if let Some(extensions) = self.own.get(project) {
            settings.merge_extensions(extensions);
        }
        Ok(())
    }
}

/// Execute Phase 5: configure every project and run its deferred callbacks
pub fn configure(
    tree: &mut BuildTree,
    phase: &mut dyn ConfigurationPhase,
) -> Result<ResolutionReport> {
    let order = ordering::execute(tree)?;
    let mut report = ResolutionReport::default();

    for name in &order.order {
        let Some(node) = tree.node_mut(name) else {
            continue;
        };
        if node.state() != NodeState::Discovered {
            continue;
        }

        match phase.configure(name, node.settings_mut()) {
            Ok(()) => node.on_configured(&mut report),
            Err(error) => {
                let error = match error {
                    Error::Configure { .. } => error,
                    other => Error::Configure {
                        project: name.clone(),
                        message: other.to_string(),
                    },
                };
                node.fail(error, &mut report);
            }
        }
    }

    info!(
        "Configured {} projects: {} patches applied, {} failures",
        order.len(),
        report.applied.len(),
        report.failures.len()
    );
    report.order = order.order;
    Ok(report)
}
