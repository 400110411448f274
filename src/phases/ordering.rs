//! Phase 3: Determining Evaluation Order
//!
//! Evaluation dependencies are ordering constraints only: "evaluate `dependent`
//! after `dependency`". They never move data between projects.
//!
//! ## Process
//!
//! 1.  **Depth-First Traversal**: Children are visited in declaration order.
//!     Each child's dependencies are visited before the child itself
//!     (post-order), so dependencies always precede their dependents.
//!
//! 2.  **Cycle Detection**: The current traversal path is tracked. Reaching a
//!     project that is already on the path means the constraints form a
//!     cycle, which is reported as `alpha -> beta -> alpha`.
//!
//! 3.  **Root Last**: The aggregating root is appended after every child.
//!
//! The traversal is deterministic for a given declaration and registration
//! order. Dependencies can only be registered before the configuration pass
//! starts; afterwards registration fails with `Error::ConfigurationStarted`.

use std::collections::HashSet;

use log::debug;

use super::{BuildTree, EvaluationOrder};
use crate::error::{Error, Result};

/// Declare that `dependent` must be evaluated after `dependency`.
///
/// Both names must be discovered subprojects. Cycles are not rejected here;
/// they surface from [`execute`] before any deferred callback runs.
pub fn register_evaluation_dependency(
    tree: &mut BuildTree,
    dependent: &str,
    dependency: &str,
) -> Result<()> {
    ensure_not_started(tree)?;
    for (name, role) in [(dependent, "dependent"), (dependency, "dependency")] {
        if !tree.contains_child(name) {
            return Err(Error::UnknownProject {
                name: name.to_string(),
                context: format!(
                    "evaluation {} of '{}' -> '{}'",
                    role, dependent, dependency
                ),
            });
        }
    }

    if tree.add_dependency(dependent, dependency) {
        debug!("'{}' evaluates after '{}'", dependent, dependency);
    }
    Ok(())
}

/// Make every other subproject evaluate after `dependency`
pub fn register_evaluation_dependency_for_all(
    tree: &mut BuildTree,
    dependency: &str,
) -> Result<()> {
    ensure_not_started(tree)?;
    if !tree.contains_child(dependency) {
        return Err(Error::UnknownProject {
            name: dependency.to_string(),
            context: "evaluation dependency for all subprojects".to_string(),
        });
    }

    let dependents: Vec<String> = tree
        .children()
        .iter()
        .map(|child| child.name().to_string())
        .filter(|name| name != dependency)
        .collect();
    for dependent in dependents {
        register_evaluation_dependency(tree, &dependent, dependency)?;
    }
    Ok(())
}

fn ensure_not_started(tree: &BuildTree) -> Result<()> {
    if tree.configuration_started() {
        return Err(Error::ConfigurationStarted {
            operation: "register evaluation dependencies".to_string(),
        });
    }
    Ok(())
}

/// Execute Phase 3: compute the evaluation order
///
/// Returns `Error::CycleDetected` if the registered dependencies form a cycle.
pub fn execute(tree: &BuildTree) -> Result<EvaluationOrder> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut path = Vec::new();

    for child in tree.children() {
        visit(tree, child.name(), &mut path, &mut visited, &mut order)?;
    }
    order.push(tree.root.name().to_string());

    Ok(EvaluationOrder::new(order))
}

fn visit(
    tree: &BuildTree,
    name: &str,
    path: &mut Vec<String>,
    visited: &mut HashSet<String>,
    order: &mut Vec<String>,
) -> Result<()> {
    if visited.contains(name) {
        return Ok(());
    }

    if let Some(start) = path.iter().position(|entry| entry == name) {
        let mut cycle: Vec<&str> = path[start..].iter().map(String::as_str).collect();
        cycle.push(name);
        return Err(Error::CycleDetected {
            cycle: cycle.join(" -> "),
        });
    }

    path.push(name.to_string());
    for dependency in tree.dependencies_of(name) {
        visit(tree, dependency, path, visited, order)?;
    }
    path.pop();

    visited.insert(name.to_string());
    order.push(name.to_string());
    Ok(())
}
