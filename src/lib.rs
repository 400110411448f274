//! # buildpatch
//!
//! Deferred, per-subproject overrides for a build tree: a root project
//! redirects every subproject's output directory and patches named
//! subprojects' configuration (namespaces, SDK levels, Java/Kotlin targets)
//! only after each subproject's own configuration has loaded.
//!
//! ## Quick Example
//!
//! ```
//! use buildpatch::config;
//! use buildpatch::phases::orchestrator;
//! use buildpatch::settings::Setting;
//! use std::path::Path;
//!
//! let config = config::parse(r#"
//! root:
//!   name: android
//! build-dir: ../../build
//! projects:
//!   - name: alpha
//!   - name: beta
//! patches:
//!   - match: alpha
//!     set:
//!       android:
//!         namespace: com.example.alpha
//! "#).unwrap();
//!
//! let resolution =
//!     orchestrator::execute_resolve(&config, Path::new("/work/app/android")).unwrap();
//! let alpha = resolution.tree.child("alpha").unwrap();
//!
//! assert_eq!(alpha.output_dir(), Path::new("/work/app/build/alpha"));
//! assert_eq!(
//!     alpha.settings().get("android", "namespace"),
//!     Some(&Setting::from("com.example.alpha"))
//! );
//! assert!(resolution.tree.child("beta").unwrap().settings().extensions.is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: the `.buildpatch.yaml` schema.
//! - **Settings (`settings`)**: a project's output directory and extensions.
//! - **Patch rules (`rules`)**: (name matcher, mutation) rows of the patch table.
//! - **Phases (`phases`)**: discovery, relocation, ordering, scheduling and
//!   evaluation, plus the tree and node types they share.
//! - **Resolver (`resolver`)**: the registration API over one build tree.
//!
//! ## Execution Flow
//!
//! 1.  **Discovery**: collect project descriptors and build the tree.
//! 2.  **Relocation**: redirect all output directories under one root.
//! 3.  **Ordering**: register evaluation dependencies; reject cycles.
//! 4.  **Scheduling**: queue matching patches on each subproject.
//! 5.  **Evaluation**: configure each project, then drain its queue.

pub mod config;
pub mod defaults;
pub mod error;
pub mod output;
pub mod path;
pub mod phases;
pub mod resolver;
pub mod rules;
pub mod settings;
pub mod summary;

#[cfg(test)]
mod path_proptest;
