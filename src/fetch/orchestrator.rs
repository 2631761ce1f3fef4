//! Sequential fetch of file contents through the cache and a relay.

use super::{Relay, RelayError, RepoLocator};
use crate::cache::ContentCache;
use crate::domain::{CacheEntry, ContentMap, FetchStatus, FileMeta};
use std::collections::{BTreeMap, HashMap};

/// Everything a fetch batch reads from the loaded repository.
pub struct FetchContext<'a> {
    pub relay: &'a dyn Relay,
    pub cache: &'a ContentCache,
    pub locator: &'a RepoLocator,
    pub repository_key: &'a str,
    pub files: &'a HashMap<String, FileMeta>,
}

/// Reported once per path, after it resolved or failed.
#[derive(Debug, Clone, Copy)]
pub struct FetchProgress<'p> {
    pub completed: usize,
    pub total: usize,
    pub path: &'p str,
    pub status: &'p FetchStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub total: usize,
    pub fetched: usize,
    pub cached: usize,
    /// `(path, reason)` for every file that failed.
    pub failed: Vec<(String, String)>,
}

impl FetchSummary {
    pub fn succeeded(&self) -> usize {
        self.fetched + self.cached
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn message(&self) -> String {
        if self.is_complete() {
            format!("Fetched {} files", self.total)
        } else {
            format!("Fetched {} of {} files", self.succeeded(), self.total)
        }
    }
}

/// Fetch `paths` one after another.
///
/// Each path is served from the cache when its stored hash matches the
/// tree's hash; a stale entry is evicted before the relay is asked. A failed
/// file records an error status and the batch moves on. `progress` is called
/// after every path, success or failure alike.
pub fn fetch_files(
    ctx: &FetchContext<'_>,
    paths: &[String],
    contents: &mut ContentMap,
    statuses: &mut BTreeMap<String, FetchStatus>,
    progress: &mut dyn FnMut(FetchProgress<'_>),
) -> FetchSummary {
    let mut summary = FetchSummary { total: paths.len(), ..FetchSummary::default() };

    for (index, path) in paths.iter().enumerate() {
        let status = match fetch_one(ctx, path) {
            Ok((content, status)) => {
                contents.insert(path, content);
                match status {
                    FetchStatus::Cached => summary.cached += 1,
                    _ => summary.fetched += 1,
                }
                status
            }
            Err(e) => {
                tracing::debug!("Fetch failed for {}: {}", path, e);
                let reason = e.reason();
                summary.failed.push((path.clone(), reason.clone()));
                FetchStatus::Error(reason)
            }
        };

        progress(FetchProgress { completed: index + 1, total: paths.len(), path, status: &status });
        statuses.insert(path.clone(), status);
    }

    tracing::info!("{}", summary.message());
    summary
}

fn fetch_one(ctx: &FetchContext<'_>, path: &str) -> Result<(String, FetchStatus), RelayError> {
    let expected = ctx.files.get(path).ok_or_else(|| RelayError::NotFound(path.to_string()))?;

    if let Some(entry) = ctx.cache.get(ctx.repository_key, path) {
        if entry.content_hash == expected.content_hash {
            tracing::debug!("Cache hit: {}", path);
            return Ok((entry.content, FetchStatus::Cached));
        }
        tracing::debug!("Evicting stale cache entry for {}", path);
        ctx.cache.remove(ctx.repository_key, path);
    }

    let url = ctx.relay.get_file_download_url(ctx.locator, path)?;
    let content = ctx.relay.download(&url)?;
    ctx.cache.put(ctx.repository_key, path, CacheEntry::new(&expected.content_hash, &content));
    tracing::debug!("Fetched {} ({} bytes)", path, content.len());
    Ok((content, FetchStatus::Fetched))
}
