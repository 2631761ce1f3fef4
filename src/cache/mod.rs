//! Persistent content cache keyed by (repository, branch, file path).
//!
//! The whole cache is one namespaced JSON blob shaped as
//! `{ "<owner>/<repo>@<branch>": { "<path>": { "sha", "content", "fetchedAt" } } }`.
//! Every mutation is a read-modify-write of that blob. A missing, unreadable
//! or corrupt blob reads as an empty cache, and write failures are logged
//! and dropped: the cache never fails the caller.

use crate::domain::CacheEntry;
use std::collections::BTreeMap;

pub mod store;

pub use store::{BlobStore, FileBlobStore, MemoryBlobStore, CACHE_NAMESPACE};

type CacheMap = BTreeMap<String, BTreeMap<String, CacheEntry>>;

/// Entry count and content size of one repository partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub repository_key: String,
    pub entries: usize,
    pub content_bytes: usize,
}

pub struct ContentCache {
    store: Box<dyn BlobStore>,
}

impl ContentCache {
    pub fn new(store: Box<dyn BlobStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBlobStore::new()))
    }

    pub fn describe(&self) -> String {
        self.store.describe()
    }

    fn load(&self) -> CacheMap {
        let raw = match self.store.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheMap::new(),
            Err(e) => {
                tracing::warn!("Cache read failed, treating as empty: {:#}", e);
                return CacheMap::new();
            }
        };
        match serde_json::from_str::<CacheMap>(&raw) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Cache blob at {} is corrupt, treating as empty: {}", self.describe(), e);
                CacheMap::new()
            }
        }
    }

    fn save(&self, map: &CacheMap) {
        let serialized = match serde_json::to_string(map) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Cache serialization failed: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.write(&serialized) {
            tracing::warn!("Cache write failed: {:#}", e);
        }
    }

    pub fn get(&self, repository_key: &str, path: &str) -> Option<CacheEntry> {
        self.load().get(repository_key)?.get(path).cloned()
    }

    pub fn put(&self, repository_key: &str, path: &str, entry: CacheEntry) {
        let mut map = self.load();
        map.entry(repository_key.to_string()).or_default().insert(path.to_string(), entry);
        self.save(&map);
    }

    /// Returns `true` when an entry existed.
    pub fn remove(&self, repository_key: &str, path: &str) -> bool {
        let mut map = self.load();
        let removed = map.get_mut(repository_key).and_then(|part| part.remove(path)).is_some();
        if removed {
            self.save(&map);
        }
        removed
    }

    /// Whether a stored entry exists with exactly this content hash.
    pub fn is_current(&self, repository_key: &str, path: &str, content_hash: &str) -> bool {
        self.get(repository_key, path).is_some_and(|e| e.content_hash == content_hash)
    }

    /// Paths among `candidates` with a current entry, in one blob read.
    pub fn current_paths<'a, I>(&self, repository_key: &str, candidates: I) -> Vec<String>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let map = self.load();
        let Some(partition) = map.get(repository_key) else {
            return Vec::new();
        };
        candidates
            .into_iter()
            .filter(|(path, hash)| partition.get(*path).is_some_and(|e| e.content_hash == *hash))
            .map(|(path, _)| path.to_string())
            .collect()
    }

    pub fn partitions(&self) -> Vec<PartitionSummary> {
        self.load()
            .into_iter()
            .map(|(key, entries)| PartitionSummary {
                repository_key: key,
                entries: entries.len(),
                content_bytes: entries.values().map(|e| e.content.len()).sum(),
            })
            .collect()
    }

    /// Remove one partition, returning how many entries it held.
    pub fn clear_partition(&self, repository_key: &str) -> usize {
        let mut map = self.load();
        match map.remove(repository_key) {
            Some(entries) => {
                self.save(&map);
                entries.len()
            }
            None => 0,
        }
    }

    pub fn clear_all(&self) -> usize {
        let map = self.load();
        let count = map.values().map(BTreeMap::len).sum();
        self.save(&CacheMap::new());
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use tempfile::TempDir;

    fn entry(hash: &str, content: &str) -> CacheEntry {
        CacheEntry {
            content_hash: hash.to_string(),
            content: content.to_string(),
            fetched_at_epoch_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn put_then_get_round_trips_and_remove_clears() {
        let cache = ContentCache::in_memory();
        cache.put("o/r@main", "a.txt", entry("h1", "alpha"));
        assert_eq!(cache.get("o/r@main", "a.txt"), Some(entry("h1", "alpha")));
        assert!(cache.get("o/r@dev", "a.txt").is_none());

        assert!(cache.remove("o/r@main", "a.txt"));
        assert!(cache.get("o/r@main", "a.txt").is_none());
        assert!(!cache.remove("o/r@main", "a.txt"));
    }

    #[test]
    fn corrupt_blob_reads_as_empty_and_is_replaced_on_write() {
        let cache = ContentCache::new(Box::new(MemoryBlobStore::with_contents("{not json")));
        assert!(cache.get("o/r@main", "a.txt").is_none());
        assert!(cache.partitions().is_empty());

        cache.put("o/r@main", "a.txt", entry("h1", "alpha"));
        assert!(cache.is_current("o/r@main", "a.txt", "h1"));
        assert!(!cache.is_current("o/r@main", "a.txt", "h2"));
    }

    struct FailingStore;

    impl BlobStore for FailingStore {
        fn read(&self) -> Result<Option<String>> {
            bail!("storage unavailable")
        }
        fn write(&self, _contents: &str) -> Result<()> {
            bail!("quota exceeded")
        }
        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[test]
    fn failing_store_degrades_to_no_op() {
        let cache = ContentCache::new(Box::new(FailingStore));
        cache.put("o/r@main", "a.txt", entry("h1", "alpha"));
        assert!(cache.get("o/r@main", "a.txt").is_none());
        assert!(!cache.remove("o/r@main", "a.txt"));
    }

    #[test]
    fn persisted_blob_survives_new_cache_instance() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("cache.json");
        ContentCache::new(Box::new(FileBlobStore::new(&path)))
            .put("o/r@main", "src/lib.rs", entry("h1", "pub fn x() {}"));

        let reopened = ContentCache::new(Box::new(FileBlobStore::new(&path)));
        assert_eq!(reopened.get("o/r@main", "src/lib.rs"), Some(entry("h1", "pub fn x() {}")));

        let raw = std::fs::read_to_string(&path).expect("read blob");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["o/r@main"]["src/lib.rs"]["sha"], "h1");
        assert_eq!(value["o/r@main"]["src/lib.rs"]["fetchedAt"], 1_700_000_000_000i64);
    }

    #[test]
    fn partitions_and_clearing() {
        let cache = ContentCache::in_memory();
        cache.put("o/a@main", "x", entry("h", "12345"));
        cache.put("o/a@main", "y", entry("h", "1"));
        cache.put("o/b@main", "z", entry("h", "12"));

        let parts = cache.partitions();
        assert_eq!(
            parts[0],
            PartitionSummary { repository_key: "o/a@main".to_string(), entries: 2, content_bytes: 6 }
        );
        assert_eq!(cache.current_paths("o/a@main", [("x", "h"), ("y", "other")]), vec!["x"]);

        assert_eq!(cache.clear_partition("o/a@main"), 2);
        assert_eq!(cache.clear_partition("o/a@main"), 0);
        assert_eq!(cache.clear_all(), 1);
        assert!(cache.partitions().is_empty());
    }
}
