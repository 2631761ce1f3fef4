//! Core domain types shared across the flattener.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use thiserror::Error;

/// Cap on cumulative bytes pulled in by the automatic pre-fetch.
pub const PREFETCH_MAX_BYTES: u64 = 2 * 1024 * 1024;

/// Cap on the number of files pulled in by the automatic pre-fetch.
pub const PREFETCH_MAX_FILES: usize = 200;

pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "dist",
    "build",
    ".git",
    "__pycache__",
    "venv",
    "env",
    "getid3",
    "media",
    "languages",
    "plugin-update-checker",
];

pub const DEFAULT_CUSTOM_INSTRUCTIONS: &str = "IMPORTANT CUSTOM INSTRUCTIONS FOR AI CHAT SESSION:
When providing code changes, indicate the relative path of the file or files that need changes.

For each file that needs changing:
- If you are only changing one line, provide just the updated line with context
- If you are changing more than one line, provide either entire updated functions or the entire updated code file

General notes:
- Provide minimal code changes. Avoid making unnecessary changes that will contribute to diff noise.
- Only add comments that are necessary for understanding the logical flow of the code.

If you are unable to complete the requested task due to lack of code context, include in your response a request to see additional code.

END CUSTOM INSTRUCTIONS";

/// Kind of a repository tree entry as reported by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Tree,
    Blob,
    /// Submodule commits and anything else the tree API may report.
    #[serde(other)]
    Other,
}

/// One path record from the remote source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(rename = "sha", default)]
    pub content_hash: String,
    #[serde(rename = "size", default)]
    pub size_bytes: u64,
}

impl RepositoryEntry {
    pub fn blob(path: &str, content_hash: &str, size_bytes: u64) -> Self {
        Self {
            path: path.to_string(),
            kind: EntryKind::Blob,
            content_hash: content_hash.to_string(),
            size_bytes,
        }
    }

    pub fn tree(path: &str) -> Self {
        Self {
            path: path.to_string(),
            kind: EntryKind::Tree,
            content_hash: String::new(),
            size_bytes: 0,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

/// Hash and size remembered per blob path for cache validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub content_hash: String,
    pub size_bytes: u64,
}

/// Persisted cache record. Field names match the on-disk blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "sha")]
    pub content_hash: String,
    pub content: String,
    #[serde(rename = "fetchedAt")]
    pub fetched_at_epoch_ms: i64,
}

impl CacheEntry {
    pub fn new(content_hash: &str, content: &str) -> Self {
        Self {
            content_hash: content_hash.to_string(),
            content: content.to_string(),
            fetched_at_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Per-file fetch indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Cached,
    Fetched,
    Error(String),
}

impl FetchStatus {
    pub fn label(&self) -> &str {
        match self {
            FetchStatus::Cached => "cached",
            FetchStatus::Fetched => "fetched",
            FetchStatus::Error(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchStatus::Error(_))
    }
}

/// Session content keyed by path, iterated in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentMap {
    order: Vec<String>,
    contents: HashMap<String, String>,
}

impl ContentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced path keeps its original position.
    pub fn insert(&mut self, path: &str, content: String) {
        if self.contents.insert(path.to_string(), content).is_none() {
            self.order.push(path.to_string());
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        let removed = self.contents.remove(path)?;
        self.order.retain(|p| p != path);
        Some(removed)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.contents.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|p| self.contents.get(p).map(|c| (p.as_str(), c.as_str())))
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.contents.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Errors surfaced to the user as a blocking notice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlattenError {
    #[error("Please enter a repository URL")]
    MissingRepositoryUrl,

    #[error("Please enter a query/request")]
    MissingQuery,

    #[error("No files selected")]
    NoFilesSelected,

    #[error("No file contents available. Please fetch selected files first.")]
    NoContentAvailable,

    #[error("No repository loaded")]
    NoRepositoryLoaded,

    #[error("Path not found in repository tree: {0}")]
    UnknownPath(String),

    #[error("Error: {0}")]
    Relay(String),
}

/// Runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub repo_url: Option<String>,
    pub path: Option<PathBuf>,
    pub branch: String,
    pub token: Option<String>,
    #[serde(deserialize_with = "deserialize_csv_list")]
    pub exclude_extensions: Vec<String>,
    #[serde(deserialize_with = "deserialize_csv_list")]
    pub ignore_dirs: Vec<String>,
    pub max_tokens: usize,
    pub custom_instructions: String,
    pub auto_prefetch: bool,
    pub prefetch_max_bytes: u64,
    pub prefetch_max_files: usize,
    pub relay_url: Option<String>,
    pub cache_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub abbreviations: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let mut abbreviations = BTreeMap::new();
        abbreviations.insert("codebase-flattener".to_string(), "cbf".to_string());
        Self {
            repo_url: None,
            path: None,
            branch: "main".to_string(),
            token: None,
            exclude_extensions: Vec::new(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect(),
            max_tokens: 128_000,
            custom_instructions: DEFAULT_CUSTOM_INSTRUCTIONS.to_string(),
            auto_prefetch: true,
            prefetch_max_bytes: PREFETCH_MAX_BYTES,
            prefetch_max_files: PREFETCH_MAX_FILES,
            relay_url: None,
            cache_file: None,
            output_dir: PathBuf::from("."),
            abbreviations,
        }
    }
}

/// Accept either `"a, b"` or `["a", "b"]`.
fn deserialize_csv_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CsvOrList {
        Csv(String),
        List(Vec<String>),
    }

    let items = match CsvOrList::deserialize(deserializer)? {
        CsvOrList::Csv(raw) => raw.split(',').map(str::to_string).collect::<Vec<_>>(),
        CsvOrList::List(list) => list,
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}
