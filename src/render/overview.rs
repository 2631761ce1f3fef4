//! Plain-text repository overview included at the top of every prompt.

use crate::domain::{EntryKind, RepositoryEntry};
use crate::scan::{build_overview_tree, FilterConfig, IgnoredFolders, TreeNode};
use std::collections::BTreeSet;

const INDENT: &str = "  ";

/// Render the overview block for `entries` under the folder rules in `filter`.
///
/// Extension exclusion never applies here. The output depends only on the
/// entries and the ignore list, so equal inputs give byte-identical text.
pub fn render_overview(entries: &[RepositoryEntry], filter: &FilterConfig) -> String {
    let tree = build_overview_tree(entries, filter);
    let found = ignored_folders_found(entries, &filter.ignored);

    let names: Vec<&str> = filter.ignored.names().collect();
    let names = if names.is_empty() { "none".to_string() } else { names.join(", ") };
    let found = if found.is_empty() {
        "none found".to_string()
    } else {
        found.into_iter().collect::<Vec<_>>().join(", ")
    };

    let mut out = String::from("Repository Overview:\n");
    out.push_str(&format!("Ignored folder names: {names}\n"));
    out.push_str(&format!("Ignored folders found: {found}\n"));
    out.push_str("```\n");
    write_node(&tree, 0, &mut out);
    out.push_str("```");
    out
}

/// Folder paths cut at the first ignored segment, e.g. `web/node_modules/`.
pub fn ignored_folders_found(entries: &[RepositoryEntry], ignored: &IgnoredFolders) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for entry in entries {
        let Some(idx) = ignored.first_match(&entry.path) else {
            continue;
        };
        let segments: Vec<&str> = entry.path.split('/').collect();
        let is_folder = idx + 1 < segments.len() || entry.kind == EntryKind::Tree;
        if is_folder {
            found.insert(format!("{}/", segments[..=idx].join("/")));
        }
    }
    found
}

fn write_node(node: &TreeNode, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    for file in &node.files {
        out.push_str(&format!("{pad}- {}\n", file.name));
    }
    for folder in &node.folders {
        out.push_str(&format!("{pad}{}/\n", folder.name));
        write_node(folder, depth + 1, out);
    }
}
