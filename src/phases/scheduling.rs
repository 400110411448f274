//! Phase 4: Scheduling Deferred Patches
//!
//! Every subproject is checked against every patch rule, rules in declaration
//! order. A matching rule is not applied right away: it is queued on the
//! project and runs after the project's own configuration phase completes.
//! Queues are per project, so one project's callbacks never wait on another's.
//!
//! An exact-match rule that names no discovered subproject is reported as a
//! warning, or as `Error::UnknownProject` in strict mode. In strict mode the
//! check happens before anything is queued.
//!
//! Callbacks on an already configured project run immediately. In that case
//! the evaluation order is checked first, so a dependency cycle fails the call
//! before any callback runs.

use std::sync::Arc;

use log::warn;

use super::{ordering, BuildTree, ResolutionReport};
use crate::error::{Error, Result};
use crate::rules::PatchRule;

/// Execute Phase 4: queue matching rules on each subproject
pub fn apply_deferred(
    tree: &mut BuildTree,
    rules: &[PatchRule],
    strict: bool,
) -> Result<ResolutionReport> {
    if tree.any_child_configured() {
        ordering::execute(tree)?;
    }
    let mut report = ResolutionReport::default();

    for rule in rules {
        let Some(target) = rule.matcher.exact_name() else {
            continue;
        };
        if tree.contains_child(target) {
            continue;
        }
        if strict {
            return Err(Error::UnknownProject {
                name: target.to_string(),
                context: format!("patch rule '{}'", rule.name),
            });
        }
        let message = format!(
            "Patch rule '{}' targets unknown project '{}'; skipping",
            rule.name, target
        );
        warn!("{}", message);
        report.warnings.push(message);
    }

    let rules: Vec<Arc<PatchRule>> = rules.iter().cloned().map(Arc::new).collect();
    for child in tree.children_mut() {
        for rule in &rules {
            if rule.matches(child.name()) {
                child.after_evaluate(Arc::clone(rule), &mut report);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::{NodeState, ProjectNode};
    use crate::rules::{Edit, NameMatcher};

    fn tree() -> BuildTree {
        BuildTree::new(
            ProjectNode::new("root", "/build"),
            vec![
                ProjectNode::new("alpha", "/build/alpha"),
                ProjectNode::new("beta", "/build/beta"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rules_are_deferred() {
        let mut tree = tree();
        let rules = vec![PatchRule::new(
            "alpha-ns",
            NameMatcher::exact("alpha"),
            vec![Edit::set("android", "namespace", "com.example.alpha")],
        )];

        let report = apply_deferred(&mut tree, &rules, false).unwrap();

        assert!(report.applied.is_empty());
        let alpha = tree.child("alpha").unwrap();
        assert_eq!(alpha.pending_rules(), vec!["alpha-ns"]);
        assert!(alpha.settings().extensions.is_empty());
        assert!(tree.child("beta").unwrap().pending_rules().is_empty());
    }

    #[test]
    fn test_glob_rule_queues_on_every_match_in_declaration_order() {
        let mut tree = tree();
        let rules = vec![
            PatchRule::new("all", NameMatcher::glob("*").unwrap(), vec![]),
            PatchRule::new("beta-only", NameMatcher::exact("beta"), vec![]),
        ];

        apply_deferred(&mut tree, &rules, false).unwrap();

        assert_eq!(tree.child("alpha").unwrap().pending_rules(), vec!["all"]);
        assert_eq!(
            tree.child("beta").unwrap().pending_rules(),
            vec!["all", "beta-only"]
        );
        assert!(tree.root.pending_rules().is_empty());
    }

    #[test]
    fn test_unknown_target_warns() {
        testing_logger::setup();
        let mut tree = tree();
        let rules = vec![PatchRule::new("ghost-ns", NameMatcher::exact("ghost"), vec![])];

        let report = apply_deferred(&mut tree, &rules, false).unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("ghost"));
        testing_logger::validate(|captured_logs| {
            let warnings: Vec<_> = captured_logs
                .iter()
                .filter(|log| log.level == log::Level::Warn)
                .collect();
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].body.contains("unknown project 'ghost'"));
        });
    }

    #[test]
    fn test_unknown_target_strict_schedules_nothing() {
        let mut tree = tree();
        let rules = vec![
            PatchRule::new("alpha-ns", NameMatcher::exact("alpha"), vec![]),
            PatchRule::new("ghost-ns", NameMatcher::exact("ghost"), vec![]),
        ];

        let err = apply_deferred(&mut tree, &rules, true).unwrap_err();
        assert!(matches!(err, Error::UnknownProject { ref name, .. } if name == "ghost"));
        assert!(tree.child("alpha").unwrap().pending_rules().is_empty());
    }

    #[test]
    fn test_apply_deferred_on_configured_tree_runs_immediately() {
        let mut tree = tree();
        let mut report = ResolutionReport::default();
        for child in tree.children_mut() {
            child.on_configured(&mut report);
        }

        let rules = vec![PatchRule::new(
            "beta-sdk",
            NameMatcher::exact("beta"),
            vec![Edit::set("android", "compileSdk", 36)],
        )];
        let report = apply_deferred(&mut tree, &rules, false).unwrap();

        assert_eq!(report.applied_to("beta"), vec!["beta-sdk"]);
        assert_eq!(report.changes(), 1);
        assert_eq!(tree.child("beta").unwrap().state(), NodeState::Configured);
    }

    #[test]
    fn test_apply_deferred_on_configured_tree_checks_cycles() {
        let mut tree = tree();
        tree.add_dependency("alpha", "beta");
        tree.add_dependency("beta", "alpha");
        let mut report = ResolutionReport::default();
        for child in tree.children_mut() {
            child.on_configured(&mut report);
        }

        let rules = vec![PatchRule::new(
            "alpha-sdk",
            NameMatcher::exact("alpha"),
            vec![Edit::set("android", "compileSdk", 36)],
        )];
        let err = apply_deferred(&mut tree, &rules, false).unwrap_err();

        assert!(matches!(err, Error::CycleDetected { .. }));
        assert!(tree.child("alpha").unwrap().settings().extensions.is_empty());
    }
}
