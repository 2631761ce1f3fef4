//! Tree building from repository entries with extension and folder filters

use crate::domain::RepositoryEntry;

pub mod filter;
pub mod tree;

pub use filter::{lower_extension, ExtensionFilter, FilterConfig, IgnoredFolders};
pub use tree::{compare_names, FileLeaf, TreeNode};

/// Selectable tree: folder ignoring plus extension exclusion.
pub fn build_selectable_tree(entries: &[RepositoryEntry], filter: &FilterConfig) -> TreeNode {
    TreeNode::build(entries, filter)
}

/// Overview tree: folder ignoring only, so every extension stays visible.
pub fn build_overview_tree(entries: &[RepositoryEntry], filter: &FilterConfig) -> TreeNode {
    TreeNode::build(entries, &filter.folders_only())
}
