//! File selection with derived tri-state folder status.
//!
//! Only the set of selected file paths is stored. Folder state is always
//! recomputed from that set and the current tree, so it cannot drift out of
//! step with the file checkboxes.

use crate::scan::tree::{ancestor_folders, TreeNode};
use std::collections::{BTreeMap, HashSet};

/// Derived checkbox state of a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    Unchecked,
    Checked,
    Indeterminate,
}

impl TriState {
    /// Zero descendants is always unchecked, never indeterminate.
    pub fn from_counts(selected: usize, total: usize) -> Self {
        if total == 0 || selected == 0 {
            TriState::Unchecked
        } else if selected >= total {
            TriState::Checked
        } else {
            TriState::Indeterminate
        }
    }

    pub fn checked(self) -> bool {
        self == TriState::Checked
    }

    pub fn indeterminate(self) -> bool {
        self == TriState::Indeterminate
    }

    pub fn marker(self) -> &'static str {
        match self {
            TriState::Unchecked => "[ ]",
            TriState::Checked => "[x]",
            TriState::Indeterminate => "[~]",
        }
    }
}

/// Selected file paths, iterated in the order they were selected.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    order: Vec<String>,
    members: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.members.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn paths(&self) -> Vec<String> {
        self.order.clone()
    }

    fn insert(&mut self, path: &str) -> bool {
        if self.members.insert(path.to_string()) {
            self.order.push(path.to_string());
            true
        } else {
            false
        }
    }

    fn remove_many(&mut self, paths: &HashSet<String>) {
        self.members.retain(|p| !paths.contains(p));
        self.order.retain(|p| !paths.contains(p));
    }

    /// Select every visible file, in tree display order.
    pub fn select_all(&mut self, tree: &TreeNode) {
        self.order.clear();
        self.members.clear();
        for path in tree.file_paths() {
            self.insert(&path);
        }
    }

    /// Clear the selection, returning what was selected.
    pub fn deselect_all(&mut self) -> Vec<String> {
        self.members.clear();
        std::mem::take(&mut self.order)
    }

    /// Returns `true` when the selection changed.
    pub fn toggle_file(&mut self, path: &str, checked: bool) -> bool {
        if checked {
            self.insert(path)
        } else if self.members.contains(path) {
            let removed: HashSet<String> = std::iter::once(path.to_string()).collect();
            self.remove_many(&removed);
            true
        } else {
            false
        }
    }

    /// Apply `checked` to every descendant file of `folder`.
    ///
    /// Returns the paths whose selection actually changed.
    pub fn toggle_folder(&mut self, folder: &TreeNode, checked: bool) -> Vec<String> {
        let descendants = folder.file_paths();
        if checked {
            descendants.into_iter().filter(|p| self.insert(p)).collect()
        } else {
            let removed: Vec<String> =
                descendants.into_iter().filter(|p| self.members.contains(p)).collect();
            let set: HashSet<String> = removed.iter().cloned().collect();
            self.remove_many(&set);
            removed
        }
    }

    /// Drop selected paths that are not in `tree`, returning them.
    pub fn retain_visible(&mut self, tree: &TreeNode) -> Vec<String> {
        let visible: HashSet<String> = tree.file_paths().into_iter().collect();
        let removed: Vec<String> =
            self.order.iter().filter(|p| !visible.contains(*p)).cloned().collect();
        let set: HashSet<String> = removed.iter().cloned().collect();
        self.remove_many(&set);
        removed
    }

    pub fn folder_state(&self, folder: &TreeNode) -> TriState {
        let (selected, total) = self.count(folder);
        TriState::from_counts(selected, total)
    }

    fn count(&self, folder: &TreeNode) -> (usize, usize) {
        let own_selected = folder.files.iter().filter(|f| self.contains(&f.full_path)).count();
        folder.folders.iter().fold((own_selected, folder.files.len()), |(sel, tot), child| {
            let (s, t) = self.count(child);
            (sel + s, tot + t)
        })
    }

    /// State of every folder in `tree`, computed in one bottom-up pass.
    pub fn folder_states(&self, tree: &TreeNode) -> BTreeMap<String, TriState> {
        let mut states = BTreeMap::new();
        self.fill_states(tree, &mut states);
        states
    }

    fn fill_states(&self, node: &TreeNode, states: &mut BTreeMap<String, TriState>) -> (usize, usize) {
        let mut selected = node.files.iter().filter(|f| self.contains(&f.full_path)).count();
        let mut total = node.files.len();
        for child in &node.folders {
            let (s, t) = self.fill_states(child, states);
            selected += s;
            total += t;
        }
        if !node.path.is_empty() {
            states.insert(node.path.clone(), TriState::from_counts(selected, total));
        }
        (selected, total)
    }

    /// States of the folders above `path`, nearest first, after a toggle.
    pub fn ancestor_states(&self, tree: &TreeNode, path: &str) -> Vec<(String, TriState)> {
        ancestor_folders(path)
            .into_iter()
            .filter_map(|folder_path| {
                let folder = tree.find_folder(&folder_path)?;
                Some((folder_path, self.folder_state(folder)))
            })
            .collect()
    }
}
