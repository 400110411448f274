//! Orchestrator for the complete resolution pass
//!
//! This module coordinates all phases to provide a clean API from a parsed
//! [`Config`] to a patched [`BuildTree`].

use std::path::Path;

use log::info;

use super::discovery::{self, DirectorySource, ProjectSource, StaticSource};
use super::{BuildTree, DescriptorPhase, ProjectNode, ResolutionReport};
use crate::config::Config;
use crate::defaults;
use crate::error::Result;
use crate::path::resolve_path;
use crate::resolver::DeferredConfigResolver;
use crate::rules::PatchRule;

/// Everything set up for a pass, before any project is configured
#[derive(Debug)]
pub struct Plan {
    pub resolver: DeferredConfigResolver,
    pub rules: Vec<PatchRule>,
    pub phase: DescriptorPhase,
}

/// The result of a complete pass
#[derive(Debug)]
pub struct Resolution {
    pub tree: BuildTree,
    pub report: ResolutionReport,
}

/// Execute Phases 1-3: discover, relocate, register dependencies
///
/// Relative paths in `config` are taken against `base_dir`, the directory
/// holding the configuration file.
pub fn plan(config: &Config, base_dir: &Path) -> Result<Plan> {
    // Phase 1: Discovery
    let mut sources: Vec<Box<dyn ProjectSource>> =
        vec![Box::new(StaticSource::new(config.projects.clone()))];
    if let Some(discover) = &config.discover {
        sources.push(Box::new(DirectorySource::new(
            resolve_path(base_dir, &discover.path),
            discover.marker.clone(),
            discover.max_depth,
        )));
    }
    let sources: Vec<&dyn ProjectSource> = sources.iter().map(|source| source.as_ref()).collect();
    let descriptors = discovery::discover_all(&sources)?;

    let root_output = resolve_path(
        base_dir,
        config
            .root
            .output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(defaults::DEFAULT_ROOT_OUTPUT)),
    );
    let root = ProjectNode::new(config.root_name(base_dir), &root_output);
    let tree = discovery::build_tree(root, base_dir, &descriptors)?;

    let mut resolver = DeferredConfigResolver::new(tree).with_strict(config.strict);

    // Phase 2: Relocation
    if let Some(build_dir) = &config.build_dir {
        resolver.relocate_outputs(resolve_path(&root_output, build_dir))?;
    }

    // Phase 3: Evaluation dependencies
    if let Some(dependency) = &config.evaluation.depends_on_all {
        resolver.register_evaluation_dependency_for_all(dependency)?;
    }
    for dependency in &config.evaluation.dependencies {
        resolver.register_evaluation_dependency(&dependency.project, &dependency.after)?;
    }

    let rules = config.rules()?;
    let phase = DescriptorPhase::new(&descriptors);

    Ok(Plan {
        resolver,
        rules,
        phase,
    })
}

/// Execute the complete pass (Phases 1-5)
///
/// Returns an error for anything fatal (discovery, unknown dependency,
/// cycle). Per-project failures are collected in the report instead.
pub fn execute_resolve(config: &Config, base_dir: &Path) -> Result<Resolution> {
    let Plan {
        mut resolver,
        rules,
        mut phase,
    } = plan(config, base_dir)?;

    // Phase 4: Scheduling
    let mut report = resolver.apply_deferred(&rules)?;

    // Phase 5: Evaluation
    report.merge(resolver.configure(&mut phase)?);

    info!(
        "Resolution finished: {} of {} patch applications changed settings",
        report.changes(),
        report.applied.len()
    );

    Ok(Resolution {
        tree: resolver.into_tree(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::error::Error;
    use crate::settings::Setting;
    use std::path::PathBuf;

    const CONFIG: &str = r#"
root:
  name: android
build-dir: ../../build
projects:
  - name: app
  - name: flutter_media_metadata
    extensions:
      android:
        namespace: upstream.media
  - name: isar_flutter_libs
evaluation:
  depends-on-all: app
patches:
  - match: flutter_media_metadata
    require: [android]
    set:
      android:
        namespace: com.alexmercerind.flutter_media_metadata
        compileSdk: 36
  - match: isar_flutter_libs
    set:
      android:
        namespace: dev.isar.isar_flutter_libs
"#;

    #[test]
    fn test_execute_resolve() {
        let config = config::parse(CONFIG).unwrap();
        let resolution = execute_resolve(&config, Path::new("/work/demo/android")).unwrap();
        let tree = &resolution.tree;

        assert!(resolution.report.is_success());
        assert_eq!(tree.root.name(), "android");
        assert_eq!(tree.root.output_dir(), Path::new("/work/demo/build"));
        assert_eq!(
            tree.child("isar_flutter_libs").unwrap().output_dir(),
            PathBuf::from("/work/demo/build/isar_flutter_libs")
        );
        assert_eq!(
            tree.child("flutter_media_metadata")
                .unwrap()
                .settings()
                .get("android", "namespace"),
            Some(&Setting::from("com.alexmercerind.flutter_media_metadata"))
        );
        assert_eq!(resolution.report.order[0], "app");
        assert_eq!(resolution.report.order.last().map(String::as_str), Some("android"));
        assert!(tree.child("app").unwrap().settings().extensions.is_empty());
    }

    #[test]
    fn test_plan_does_not_configure() {
        let config = config::parse(CONFIG).unwrap();
        let plan = plan(&config, Path::new("/work/demo/android")).unwrap();
        assert_eq!(plan.rules.len(), 2);
        let media = plan.resolver.tree().child("flutter_media_metadata").unwrap();
        assert!(media.settings().extensions.is_empty());
    }

    #[test]
    fn test_unknown_dependency_is_fatal() {
        let config = config::parse(
            "projects:\n  - name: app\nevaluation:\n  depends-on-all: ghost\n",
        )
        .unwrap();
        let result = execute_resolve(&config, Path::new("/work"));
        assert!(matches!(result, Err(Error::UnknownProject { .. })));
    }

    #[test]
    fn test_cycle_is_fatal() {
        let yaml = r#"
projects:
  - name: alpha
  - name: beta
evaluation:
  dependencies:
    - project: alpha
      after: beta
    - project: beta
      after: alpha
"#;
        let config = config::parse(yaml).unwrap();
        let result = execute_resolve(&config, Path::new("/work"));
        assert!(matches!(result, Err(Error::CycleDetected { .. })));
    }

    #[test]
    fn test_mutation_failure_is_reported() {
        let yaml = r#"
projects:
  - name: alpha
  - name: beta
patches:
  - match: alpha
    require: [android]
  - match: beta
    set:
      kotlin:
        jvmTarget: JVM_17
"#;
        let config = config::parse(yaml).unwrap();
        let resolution = execute_resolve(&config, Path::new("/work")).unwrap();
        assert_eq!(resolution.report.failures.len(), 1);
        assert_eq!(resolution.report.applied_to("beta").len(), 1);
    }
}
