//! Local directory served as a repository.

use super::{Relay, RelayError, RepoLocator};
use crate::domain::RepositoryEntry;
use crate::utils::{decode_bytes, normalize_path};
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const FILE_SCHEME: &str = "file://";

pub struct LocalRelay {
    root: PathBuf,
}

impl LocalRelay {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }
        let canonical = path.canonicalize()?;
        if !canonical.is_dir() {
            anyhow::bail!("Path is not a directory: {}", path.display());
        }
        Ok(Self { root: canonical })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        if path.split('/').any(|seg| seg == "..") {
            return None;
        }
        let full = self.root.join(path);
        full.is_file().then_some(full)
    }
}

impl Relay for LocalRelay {
    /// Walks the directory (skipping `.git`). Content hashes are SHA-256 of
    /// the file bytes, so they change exactly when the content does.
    fn get_tree(&self, _locator: &RepoLocator) -> Result<Vec<RepositoryEntry>, RelayError> {
        let mut entries = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git");

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let Some(rel) = entry.path().strip_prefix(&self.root).ok().and_then(|p| p.to_str())
            else {
                continue;
            };
            let rel = normalize_path(rel);

            if entry.file_type().is_dir() {
                entries.push(RepositoryEntry::tree(&rel));
            } else if entry.file_type().is_file() {
                let bytes = match std::fs::read(entry.path()) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", rel, e);
                        continue;
                    }
                };
                let hash = format!("{:x}", Sha256::digest(&bytes));
                entries.push(RepositoryEntry::blob(&rel, &hash, bytes.len() as u64));
            }
        }
        Ok(entries)
    }

    fn get_file_download_url(
        &self,
        _locator: &RepoLocator,
        path: &str,
    ) -> Result<String, RelayError> {
        let full = self.resolve(path).ok_or_else(|| RelayError::NotFound(path.to_string()))?;
        Ok(format!("{FILE_SCHEME}{}", full.display()))
    }

    fn download(&self, url: &str) -> Result<String, RelayError> {
        let path = url
            .strip_prefix(FILE_SCHEME)
            .ok_or_else(|| RelayError::Malformed(format!("not a file URL: {url}")))?;
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RelayError::NotFound(path.to_string()),
            _ => RelayError::Transport(e.to_string()),
        })?;
        Ok(decode_bytes(&bytes).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryKind;
    use std::fs;
    use tempfile::TempDir;

    fn locator() -> RepoLocator {
        RepoLocator::new("local", "main", None)
    }

    #[test]
    fn tree_lists_dirs_and_files_and_skips_git() {
        let tmp = TempDir::new().expect("tmp");
        fs::create_dir_all(tmp.path().join("src")).expect("mkdir src");
        fs::create_dir_all(tmp.path().join(".git/objects")).expect("mkdir .git");
        fs::write(tmp.path().join("src/lib.rs"), "pub fn x() {}\n").expect("write lib");
        fs::write(tmp.path().join("README.md"), "# Demo\n").expect("write readme");
        fs::write(tmp.path().join(".git/HEAD"), "ref: refs/heads/main\n").expect("write head");

        let relay = LocalRelay::open(tmp.path()).expect("open");
        let entries = relay.get_tree(&locator()).expect("tree");
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "src", "src/lib.rs"]);
        assert_eq!(entries[1].kind, EntryKind::Tree);
        assert_eq!(entries[2].size_bytes, 14);
        assert_eq!(entries[2].content_hash.len(), 64);
    }

    #[test]
    fn content_hash_changes_with_content() {
        let tmp = TempDir::new().expect("tmp");
        let file = tmp.path().join("a.txt");
        fs::write(&file, "one").expect("write");
        let relay = LocalRelay::open(tmp.path()).expect("open");
        let before = relay.get_tree(&locator()).expect("tree")[0].content_hash.clone();
        fs::write(&file, "two").expect("rewrite");
        let after = relay.get_tree(&locator()).expect("tree")[0].content_hash.clone();
        assert_ne!(before, after);
    }

    #[test]
    fn download_round_trip_and_missing_file() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("a.txt"), "alpha").expect("write");
        let relay = LocalRelay::open(tmp.path()).expect("open");

        let url = relay.get_file_download_url(&locator(), "a.txt").expect("url");
        assert!(url.starts_with("file://"));
        assert_eq!(relay.download(&url).expect("download"), "alpha");

        let err = relay.get_file_download_url(&locator(), "missing.txt").expect_err("missing");
        assert_eq!(err, RelayError::NotFound("missing.txt".to_string()));
        assert!(relay.get_file_download_url(&locator(), "../a.txt").is_err());
    }

    #[test]
    fn open_rejects_files_and_missing_paths() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("file.txt"), "x").expect("write");
        assert!(LocalRelay::open(&tmp.path().join("file.txt")).is_err());
        assert!(LocalRelay::open(&tmp.path().join("nope")).is_err());
    }
}
