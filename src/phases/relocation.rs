//! Phase 2: Relocation
//!
//! Redirects the root's output directory and derives every child's output
//! directory from it as `<new root output>/<child name>`. Relocating again to
//! the same root is a no-op, whatever the previous output directories were.
//!
//! Relocation must happen before the configuration pass. Once any project has
//! been configured its output directory may already carry a patched value, so
//! relocating is rejected with `Error::ConfigurationStarted`.

use std::path::Path;

use log::info;

use super::BuildTree;
use crate::error::{Error, Result};
use crate::path::child_output_dir;

/// Execute Phase 2: point all outputs at `new_root_output`
pub fn relocate_outputs(tree: &mut BuildTree, new_root_output: &Path) -> Result<()> {
    if tree.configuration_started() {
        return Err(Error::ConfigurationStarted {
            operation: "relocate outputs".to_string(),
        });
    }

    info!("Relocating build outputs to {}", new_root_output.display());

    tree.root.settings_mut().output_dir = new_root_output.to_path_buf();
    for child in tree.children_mut() {
        let target = child_output_dir(new_root_output, child.name());
        child.settings_mut().output_dir = target;
    }
    Ok(())
}
