//! Nested folder/file tree built from flat repository entries.

use crate::domain::RepositoryEntry;
use crate::scan::filter::FilterConfig;
use std::cmp::Ordering;

/// A file in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLeaf {
    pub name: String,
    pub full_path: String,
    pub size_bytes: u64,
    pub content_hash: String,
}

/// A folder with its files and subfolders, both kept in name order.
///
/// The root node has an empty `name` and `path`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub files: Vec<FileLeaf>,
    pub folders: Vec<TreeNode>,
}

impl TreeNode {
    fn folder(name: &str, parent_path: &str) -> Self {
        let path =
            if parent_path.is_empty() { name.to_string() } else { format!("{parent_path}/{name}") };
        Self { name: name.to_string(), path, files: Vec::new(), folders: Vec::new() }
    }

    /// Build the tree of `blob` entries accepted by `filter`.
    pub fn build(entries: &[RepositoryEntry], filter: &FilterConfig) -> Self {
        let mut root = TreeNode::default();
        for entry in entries.iter().filter(|e| e.is_blob()) {
            if !filter.includes(&entry.path) {
                continue;
            }
            let parts: Vec<&str> = entry.path.split('/').filter(|p| !p.is_empty()).collect();
            let Some((file_name, dirs)) = parts.split_last() else {
                continue;
            };
            root.insert(
                dirs,
                FileLeaf {
                    name: file_name.to_string(),
                    full_path: entry.path.clone(),
                    size_bytes: entry.size_bytes,
                    content_hash: entry.content_hash.clone(),
                },
            );
        }
        root.sort_recursive();
        root
    }

    fn insert(&mut self, dirs: &[&str], leaf: FileLeaf) {
        let Some((first, rest)) = dirs.split_first() else {
            self.files.push(leaf);
            return;
        };
        let idx = match self.folders.iter().position(|f| f.name == *first) {
            Some(idx) => idx,
            None => {
                self.folders.push(TreeNode::folder(first, &self.path));
                self.folders.len() - 1
            }
        };
        self.folders[idx].insert(rest, leaf);
    }

    fn sort_recursive(&mut self) {
        self.files.sort_by(|a, b| compare_names(&a.name, &b.name));
        self.folders.sort_by(|a, b| compare_names(&a.name, &b.name));
        for folder in &mut self.folders {
            folder.sort_recursive();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }

    /// Number of descendant files.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.folders.iter().map(TreeNode::file_count).sum::<usize>()
    }

    /// Descendant files in display order: own files first, then each subfolder.
    pub fn files_in_order(&self) -> Vec<&FileLeaf> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a FileLeaf>) {
        out.extend(self.files.iter());
        for folder in &self.folders {
            folder.collect_files(out);
        }
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.files_in_order().into_iter().map(|f| f.full_path.clone()).collect()
    }

    /// Look up a folder by its full path. `""` is the root.
    pub fn find_folder(&self, path: &str) -> Option<&TreeNode> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Some(self);
        }
        let mut node = self;
        for part in path.split('/') {
            node = node.folders.iter().find(|f| f.name == part)?;
        }
        Some(node)
    }

    pub fn find_file(&self, path: &str) -> Option<&FileLeaf> {
        let (dir, name) = match path.rsplit_once('/') {
            Some((dir, name)) => (dir, name),
            None => ("", path),
        };
        self.find_folder(dir)?.files.iter().find(|f| f.name == name)
    }

    /// Every folder below this node, children before parents.
    pub fn folders_bottom_up(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        self.collect_bottom_up(&mut out);
        out
    }

    fn collect_bottom_up<'a>(&'a self, out: &mut Vec<&'a TreeNode>) {
        for folder in &self.folders {
            folder.collect_bottom_up(out);
            out.push(folder);
        }
    }
}

/// Name order used everywhere: case-insensitive first, then exact text so
/// names differing only by case still sort deterministically.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Folder paths from `path` up to the root, nearest first (root excluded).
pub fn ancestor_folders(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = path;
    while let Some((parent, _)) = current.rsplit_once('/') {
        out.push(parent.to_string());
        current = parent;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::filter::FilterConfig;

    fn entries() -> Vec<RepositoryEntry> {
        vec![
            RepositoryEntry::tree("src"),
            RepositoryEntry::blob("src/main.rs", "h1", 120),
            RepositoryEntry::blob("src/Lib.rs", "h2", 80),
            RepositoryEntry::blob("README.md", "h3", 30),
            RepositoryEntry::blob("docs/guide/intro.md", "h4", 10),
            RepositoryEntry::blob("build.rs", "h5", 5),
            RepositoryEntry::blob("node_modules/x/index.js", "h6", 5),
        ]
    }

    #[test]
    fn test_build_tree_nests_and_orders_entries() {
        let tree = TreeNode::build(&entries(), &FilterConfig::parse("", "node_modules"));
        let root_files: Vec<&str> = tree.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(root_files, vec!["build.rs", "README.md"]);

        let folders: Vec<&str> = tree.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(folders, vec!["docs", "src"]);

        let src = tree.find_folder("src").expect("src folder");
        let names: Vec<&str> = src.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Lib.rs", "main.rs"]);
        assert_eq!(tree.find_folder("docs/guide").map(|f| f.path.as_str()), Some("docs/guide"));
    }

    #[test]
    fn test_build_tree_applies_filters() {
        let tree = TreeNode::build(&entries(), &FilterConfig::parse("md", "node_modules"));
        assert!(tree.find_file("README.md").is_none());
        assert!(tree.find_folder("docs").is_none());
        assert!(tree.find_folder("node_modules").is_none());
        assert_eq!(tree.file_count(), 3);
    }

    #[test]
    fn test_files_in_order_lists_root_files_before_folders() {
        let tree = TreeNode::build(&entries(), &FilterConfig::parse("", "node_modules"));
        assert_eq!(
            tree.file_paths(),
            vec!["build.rs", "README.md", "docs/guide/intro.md", "src/Lib.rs", "src/main.rs"]
        );
    }

    #[test]
    fn test_folders_bottom_up_visits_children_first() {
        let tree = TreeNode::build(&entries(), &FilterConfig::parse("", "node_modules"));
        let order: Vec<&str> = tree.folders_bottom_up().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(order, vec!["docs/guide", "docs", "src"]);
    }

    #[test]
    fn test_compare_names_is_case_insensitive_then_exact() {
        assert_eq!(compare_names("a", "B"), Ordering::Less);
        assert_eq!(compare_names("B", "b"), Ordering::Less);
        assert_eq!(compare_names("x", "x"), Ordering::Equal);
    }

    #[test]
    fn test_ancestor_folders() {
        assert_eq!(ancestor_folders("a/b/c.txt"), vec!["a/b", "a"]);
        assert!(ancestor_folders("c.txt").is_empty());
    }
}
