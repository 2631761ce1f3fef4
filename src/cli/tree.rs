//! Tree command: the selectable tree with derived folder states

use anyhow::Result;
use clap::Args;
use console::style;
use std::collections::{BTreeMap, HashSet};

use super::common::{apply_selection_edits, open_workspace, RepoArgs, SelectionArgs};
use crate::config::CliOverrides;
use crate::scan::TreeNode;
use crate::selection::{Selection, TriState};
use crate::utils::format_file_size;

#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

pub fn run(args: TreeArgs) -> Result<()> {
    let extra = CliOverrides { auto_prefetch: Some(false), ..CliOverrides::default() };
    let mut workspace = open_workspace(&args.repo, extra)?;
    apply_selection_edits(&mut workspace.controller, &args.selection)?;

    let controller = &workspace.controller;
    let session = controller.session();
    let tree = session.tree();
    let cached: HashSet<String> = controller.cached_paths().into_iter().collect();
    let view = TreeView { selection: session.selection(), states: session.folder_states(), cached: &cached };

    if let Some(repo) = session.repository() {
        println!("Repository: {}", style(&repo.key).bold());
    }
    let mut lines = Vec::new();
    view.write(tree, 0, &mut lines);
    for line in lines {
        println!("{line}");
    }
    println!();
    println!("Selected: {} of {} files", session.selection().len(), tree.file_count());
    Ok(())
}

struct TreeView<'a> {
    selection: &'a Selection,
    states: BTreeMap<String, TriState>,
    cached: &'a HashSet<String>,
}

impl TreeView<'_> {
    fn write(&self, node: &TreeNode, depth: usize, out: &mut Vec<String>) {
        let pad = "  ".repeat(depth);
        for file in &node.files {
            let marker = if self.selection.contains(&file.full_path) {
                TriState::Checked.marker()
            } else {
                TriState::Unchecked.marker()
            };
            let mut line =
                format!("{pad}{marker} {} ({})", file.name, format_file_size(file.size_bytes));
            if self.cached.contains(&file.full_path) {
                line.push_str(&format!(" {}", style("cached").green()));
            }
            out.push(line);
        }
        for folder in &node.folders {
            let state = self.states.get(&folder.path).copied().unwrap_or(TriState::Unchecked);
            out.push(format!("{pad}{} {}/", state.marker(), style(&folder.name).blue()));
            self.write(folder, depth + 1, out);
        }
    }
}
