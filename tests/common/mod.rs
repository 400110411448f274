//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::ALPHA_BETA);
//!     fixture.command_with_config("resolve").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Two subprojects, one namespace patch, outputs relocated to `out/`.
    pub const ALPHA_BETA: &str = r#"
root:
  name: android
build-dir: ../out
projects:
  - name: alpha
  - name: beta
patches:
  - name: alpha-namespace
    match: alpha
    set:
      android:
        namespace: com.example.alpha
"#;

    /// Two rules on the same subproject, applied in declaration order.
    pub const JAVA_17: &str = r#"
root:
  name: android
projects:
  - name: alpha
  - name: beta
patches:
  - name: source-17
    match: beta
    set:
      compileOptions:
        sourceCompatibility: VERSION_17
  - name: target-17
    match: beta
    set:
      compileOptions:
        targetCompatibility: VERSION_17
"#;

    /// `alpha` and `beta` each evaluate after the other.
    pub const CYCLE: &str = r#"
projects:
  - name: alpha
  - name: beta
evaluation:
  dependencies:
    - project: alpha
      after: beta
    - project: beta
      after: alpha
patches:
  - match: alpha
    set:
      android:
        namespace: com.example.alpha
"#;

    /// A patch naming a project that does not exist.
    pub const UNKNOWN_TARGET: &str = r#"
projects:
  - name: alpha
patches:
  - match: ghost
    set:
      android:
        compileSdk: 36
"#;

    /// A patch whose `require` cannot be satisfied on `alpha`.
    pub const FAILING_PATCH: &str = r#"
projects:
  - name: alpha
  - name: beta
patches:
  - name: needs-android
    match: alpha
    require: [android]
  - name: beta-kotlin
    match: beta
    set:
      kotlin:
        jvmTarget: JVM_17
"#;

    /// Subprojects found by scanning `packages/` for marker files.
    pub const DISCOVER: &str = r#"
root:
  name: android
build-dir: ../out
discover:
  path: packages
patches:
  - match:
      glob: "flutter_*"
    set:
      android:
        compileSdk: 36
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "projects: [unclosed\n";
}

/// A test fixture that provides a temporary directory with optional config.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.buildpatch.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".buildpatch.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a subproject marker file at `<dir>/project.yaml`.
    #[allow(dead_code)]
    pub fn with_project(self, dir: &str, content: &str) -> Self {
        self.temp_dir
            .child(dir)
            .child("project.yaml")
            .write_str(content)
            .expect("Failed to write project marker");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The temporary directory with symlinks resolved, as the CLI reports it.
    #[allow(dead_code)]
    pub fn canonical_path(&self) -> PathBuf {
        self.temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory")
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join(".buildpatch.yaml")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command running in this fixture's directory with plain output.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("buildpatch");
        cmd.current_dir(self.path())
            .env_remove("BUILDPATCH_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }

    /// Create a command for `subcommand` with the config file path argument.
    #[allow(dead_code)]
    pub fn command_with_config(&self, subcommand: &str) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg(subcommand).arg("--config").arg(self.config_path());
        cmd
    }
}
