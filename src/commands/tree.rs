//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays the build
//! tree after relocation and patch scheduling but before any project is
//! configured.
//!
//! Each subproject line shows its output directory, its position in the
//! evaluation order, the projects it evaluates after, and the patches queued
//! on it.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::{Context, Result};
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::path::PathBuf;

use buildpatch::defaults;
use buildpatch::phases::orchestrator;
use buildpatch::phases::{BuildTree, EvaluationOrder, ProjectNode};

use super::load_config;

/// Display the build tree
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Path to the .buildpatch.yaml configuration file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = defaults::CONFIG_ENV_VAR,
        default_value = defaults::CONFIG_FILE_NAME
    )]
    pub config: PathBuf,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs) -> Result<()> {
    let config_path = &args.config;
    println!("🌳 Build tree for: {}", config_path.display());

    let (config, base_dir) = load_config(config_path)?;

    let mut plan = orchestrator::plan(&config, &base_dir)
        .map_err(|e| anyhow::anyhow!("Failed to build project tree: {}", e))?;
    plan.resolver
        .apply_deferred(&plan.rules)
        .context("Failed to schedule patches")?;
    let order = plan
        .resolver
        .evaluation_order()
        .context("Failed to compute evaluation order")?;

    let tree_root = build_tree_node(plan.resolver.tree(), &order);
    print_tree(&tree_root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

fn node_label(node: &ProjectNode, order: &EvaluationOrder) -> String {
    let mut label = format!("{} -> {}", node.name(), node.output_dir().display());
    if let Some(position) = order.position(node.name()) {
        label.push_str(&format!(" [#{}]", position + 1));
    }
    label
}

/// Build the display tree: the root with one leaf per subproject
fn build_tree_node(tree: &BuildTree, order: &EvaluationOrder) -> TreeNode {
    let children = tree
        .children()
        .iter()
        .map(|child| {
            let mut label = node_label(child, order);
            let after: Vec<&str> = tree.dependencies_of(child.name()).collect();
            if !after.is_empty() {
                label.push_str(&format!(" after: {}", after.join(", ")));
            }
            let pending = child.pending_rules();
            if !pending.is_empty() {
                label.push_str(&format!(" patches: {}", pending.join(", ")));
            }
            TreeNode {
                label,
                children: vec![],
            }
        })
        .collect();

    TreeNode {
        label: node_label(&tree.root, order),
        children,
    }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
