//! Property-based tests for relocation and patch application.
//!
//! These tests use proptest to generate random trees and rule tables and
//! verify that invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::path::{Component, Path, PathBuf};

    use crate::path::{child_output_dir, normalize_path};
    use crate::phases::{
        evaluation, relocation, scheduling, BuildTree, DescriptorPhase, ProjectNode,
    };
    use crate::rules::{Edit, NameMatcher, PatchRule};
    use crate::settings::ProjectSettings;
    use proptest::prelude::*;

    fn tree_from(names: &[String], original_dirs: &[String]) -> BuildTree {
        let children = names
            .iter()
            .zip(original_dirs.iter().cycle())
            .map(|(name, dir)| ProjectNode::new(name.clone(), format!("/{}/{}/build", dir, name)))
            .collect();
        BuildTree::new(ProjectNode::new("root", "/root/build"), children).unwrap()
    }

    fn resolved_settings(tree: &BuildTree) -> Vec<(String, ProjectSettings)> {
        tree.children()
            .iter()
            .map(|child| (child.name().to_string(), child.settings().clone()))
            .collect()
    }

    // ============================================================================
    // normalize_path property tests
    // ============================================================================

    proptest! {
        /// Property: normalizing twice gives the same result as normalizing once
        #[test]
        fn normalize_path_is_idempotent(
            input in "(/)?([a-z]{1,4}|\\.|\\.\\.)(/([a-z]{1,4}|\\.|\\.\\.)){0,6}",
        ) {
            let once = normalize_path(Path::new(&input));
            let twice = normalize_path(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: a normalized absolute path never contains `.` or `..`
        #[test]
        fn normalize_path_absolute_has_no_dots(
            input in "/([a-z]{1,4}|\\.|\\.\\.)(/([a-z]{1,4}|\\.|\\.\\.)){0,6}",
        ) {
            let normalized = normalize_path(Path::new(&input));
            prop_assert!(normalized.is_absolute());
            for component in normalized.components() {
                prop_assert!(
                    !matches!(component, Component::CurDir | Component::ParentDir),
                    "{:?} kept a dot component",
                    normalized
                );
            }
        }
    }

    // ============================================================================
    // relocation property tests
    // ============================================================================

    proptest! {
        /// Property: every child ends up at `<root>/<name>`, whatever it started with
        #[test]
        fn relocation_derives_child_dirs_from_root(
            names in prop::collection::btree_set("[a-z_]{1,12}", 1..8),
            dirs in prop::collection::vec("[a-z]{1,6}", 1..4),
            root in "/[a-z]{1,6}(/[a-z]{1,6}){0,3}",
        ) {
            let names: Vec<String> = names.into_iter().filter(|n| n != "root").collect();
            let mut tree = tree_from(&names, &dirs);
            relocation::relocate_outputs(&mut tree, Path::new(&root)).unwrap();

            prop_assert_eq!(tree.root.output_dir(), Path::new(&root));
            for child in tree.children() {
                prop_assert_eq!(
                    child.output_dir().to_path_buf(),
                    child_output_dir(Path::new(&root), child.name())
                );
            }

            let first = resolved_settings(&tree);
            relocation::relocate_outputs(&mut tree, Path::new(&root)).unwrap();
            prop_assert_eq!(first, resolved_settings(&tree));
        }
    }

    // ============================================================================
    // patch application property tests
    // ============================================================================

    proptest! {
        /// Property: rules that target distinct projects commute
        #[test]
        fn disjoint_rules_commute(
            values in prop::collection::vec(0i64..100, 2..6),
            seed in any::<u64>(),
        ) {
            let names: Vec<String> = (0..values.len()).map(|i| format!("lib{}", i)).collect();
            let rules: Vec<PatchRule> = names
                .iter()
                .zip(&values)
                .map(|(name, value)| {
                    PatchRule::new(
                        format!("{}-sdk", name),
                        NameMatcher::exact(name.clone()),
                        vec![Edit::set("android", "compileSdk", *value)],
                    )
                })
                .collect();

            let mut permuted = rules.clone();
            let len = permuted.len();
            permuted.rotate_left((seed as usize) % len);
            if seed % 2 == 0 {
                permuted.reverse();
            }

            let mut in_order = tree_from(&names, &["pub".to_string()]);
            scheduling::apply_deferred(&mut in_order, &rules, false).unwrap();
            evaluation::configure(&mut in_order, &mut DescriptorPhase::default()).unwrap();

            let mut shuffled = tree_from(&names, &["pub".to_string()]);
            scheduling::apply_deferred(&mut shuffled, &permuted, false).unwrap();
            evaluation::configure(&mut shuffled, &mut DescriptorPhase::default()).unwrap();

            prop_assert_eq!(resolved_settings(&in_order), resolved_settings(&shuffled));
        }

        /// Property: rules on the same project apply in declaration order
        #[test]
        fn same_project_rules_apply_in_order(values in prop::collection::vec(0i64..100, 1..6)) {
            let names = vec!["beta".to_string()];
            let rules: Vec<PatchRule> = values
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    PatchRule::new(
                        format!("rule{}", i),
                        NameMatcher::exact("beta"),
                        vec![Edit::set("android", "compileSdk", *value)],
                    )
                })
                .collect();

            let mut tree = tree_from(&names, &["pub".to_string()]);
            scheduling::apply_deferred(&mut tree, &rules, false).unwrap();
            evaluation::configure(&mut tree, &mut DescriptorPhase::default()).unwrap();

            let mut expected = ProjectSettings::new(PathBuf::from("/pub/beta/build"));
            for rule in &rules {
                rule.apply("beta", &mut expected).unwrap();
            }
            prop_assert_eq!(tree.child("beta").unwrap().settings(), &expected);
        }

        /// Property: applying the same rule table again changes nothing
        #[test]
        fn reapplying_rules_is_a_noop(
            values in prop::collection::vec(0i64..100, 1..5),
            namespace in "[a-z]{1,8}(\\.[a-z]{1,8}){1,3}",
        ) {
            let names: Vec<String> = (0..values.len()).map(|i| format!("lib{}", i)).collect();
            let mut rules: Vec<PatchRule> = names
                .iter()
                .zip(&values)
                .map(|(name, value)| {
                    PatchRule::new(
                        format!("{}-sdk", name),
                        NameMatcher::exact(name.clone()),
                        vec![Edit::set("android", "compileSdk", *value)],
                    )
                })
                .collect();
            rules.push(PatchRule::new(
                "all-namespace",
                NameMatcher::glob("lib*").unwrap(),
                vec![Edit::set("android", "namespace", namespace.as_str())],
            ));

            let mut tree = tree_from(&names, &["pub".to_string()]);
            scheduling::apply_deferred(&mut tree, &rules, false).unwrap();
            evaluation::configure(&mut tree, &mut DescriptorPhase::default()).unwrap();
            let patched = resolved_settings(&tree);

            let again = scheduling::apply_deferred(&mut tree, &rules, false).unwrap();
            prop_assert_eq!(again.changes(), 0);
            prop_assert_eq!(again.applied.len(), rules.len() - 1 + names.len());
            prop_assert_eq!(patched, resolved_settings(&tree));
        }
    }
}
