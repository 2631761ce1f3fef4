//! Backing stores for the persisted cache blob.

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Namespace of the persisted blob; bump when the blob shape changes.
pub const CACHE_NAMESPACE: &str = "cbf_cache_v1";

/// A single persisted text blob. No incremental API: callers read the whole
/// blob, modify it, and write it back.
pub trait BlobStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, contents: &str) -> Result<()>;
    fn describe(&self) -> String;
}

/// Blob kept in a JSON file on disk.
pub struct FileBlobStore {
    path: PathBuf,
}

impl FileBlobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<cache dir>/codebase-flattener/cbf_cache_v1.json`, or a file in the
    /// system temp dir when no cache dir can be determined.
    pub fn default_location() -> Self {
        let base = cache_root_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join("codebase-flattener").join(format!("{CACHE_NAMESPACE}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed reading cache file: {}", self.path.display())),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed creating cache directory: {}", parent.display())
            })?;
        }
        // Write a sibling file, then rename it over the blob.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .with_context(|| format!("Failed writing cache file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed replacing cache file: {}", self.path.display()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process blob, used by tests and `--no-cache` runs.
#[derive(Default)]
pub struct MemoryBlobStore {
    blob: RefCell<Option<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        Self { blob: RefCell::new(Some(contents.to_string())) }
    }

    pub fn contents(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.blob.borrow().clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        *self.blob.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

pub fn cache_root_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("LOCALAPPDATA").map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CACHE_HOME") {
            return Some(PathBuf::from(xdg));
        }
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_reads_none_when_missing() {
        let tmp = TempDir::new().expect("tmp");
        let store = FileBlobStore::new(tmp.path().join("nested/cache.json"));
        assert!(store.read().expect("read").is_none());
    }

    #[test]
    fn file_store_round_trips_and_creates_parents() {
        let tmp = TempDir::new().expect("tmp");
        let store = FileBlobStore::new(tmp.path().join("nested/cache.json"));
        store.write("{\"a\":{}}").expect("write");
        assert_eq!(store.read().expect("read").as_deref(), Some("{\"a\":{}}"));
        assert!(!tmp.path().join("nested/cache.json.tmp").exists());
    }

    #[test]
    fn default_location_uses_namespace() {
        let store = FileBlobStore::default_location();
        assert!(store.path().ends_with("codebase-flattener/cbf_cache_v1.json"));
    }
}
