//! Session state and the command dispatcher driving it.
//!
//! [`Session`] is the only place selection, content and fetch status live.
//! [`Controller`] owns a session together with the relay and cache, and maps
//! each user action ([`Command`]) onto one state change. Folder tri-states
//! are never stored; [`Session::folder_states`] derives them on every call.

use crate::cache::ContentCache;
use crate::domain::{Config, ContentMap, FetchStatus, FileMeta, FlattenError, RepositoryEntry};
use crate::fetch::{
    fetch_files, plan_prefetch, FetchContext, FetchProgress, FetchSummary, PrefetchCaps, Relay,
    RepoLocator,
};
use crate::render::{render_overview, PromptParts, PromptReport};
use crate::scan::{build_selectable_tree, FilterConfig, TreeNode};
use crate::selection::{Selection, TriState};
use crate::utils::repository_key;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A repository as returned by the relay, replaced wholesale on every load.
#[derive(Debug, Clone)]
pub struct LoadedRepository {
    pub locator: RepoLocator,
    pub key: String,
    pub entries: Vec<RepositoryEntry>,
    pub meta: HashMap<String, FileMeta>,
}

impl LoadedRepository {
    pub fn new(locator: RepoLocator, entries: Vec<RepositoryEntry>) -> Self {
        let key = repository_key(&locator.repo_url, &locator.branch);
        let meta = entries
            .iter()
            .filter(|e| e.is_blob())
            .map(|e| {
                let meta = FileMeta { content_hash: e.content_hash.clone(), size_bytes: e.size_bytes };
                (e.path.clone(), meta)
            })
            .collect();
        Self { locator, key, entries, meta }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    repository: Option<LoadedRepository>,
    filters: FilterConfig,
    tree: TreeNode,
    selection: Selection,
    contents: ContentMap,
    statuses: BTreeMap<String, FetchStatus>,
}

impl Session {
    pub fn new(filters: FilterConfig) -> Self {
        Self { filters, ..Self::default() }
    }

    pub fn repository(&self) -> Option<&LoadedRepository> {
        self.repository.as_ref()
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn contents(&self) -> &ContentMap {
        &self.contents
    }

    pub fn status(&self, path: &str) -> Option<&FetchStatus> {
        self.statuses.get(path)
    }

    pub fn statuses(&self) -> &BTreeMap<String, FetchStatus> {
        &self.statuses
    }

    pub fn folder_states(&self) -> BTreeMap<String, TriState> {
        self.selection.folder_states(&self.tree)
    }

    /// Overview text for the loaded repository, rebuilt on every call.
    pub fn overview(&self) -> Option<String> {
        self.repository.as_ref().map(|repo| render_overview(&repo.entries, &self.filters))
    }

    /// Selected paths with no content yet, in selection order.
    pub fn missing_contents(&self) -> Vec<String> {
        self.selection.iter().filter(|p| !self.contents.contains(p)).map(str::to_string).collect()
    }

    /// `(path, content)` for selected files, in content insertion order.
    pub fn selected_contents(&self) -> Vec<(&str, &str)> {
        self.contents.iter().filter(|(path, _)| self.selection.contains(path)).collect()
    }

    fn install(&mut self, repository: LoadedRepository) {
        self.tree = build_selectable_tree(&repository.entries, &self.filters);
        self.repository = Some(repository);
        self.contents.clear();
        self.statuses.clear();
        self.selection.select_all(&self.tree);
    }

    fn forget(&mut self, paths: &[String]) {
        for path in paths {
            self.contents.remove(path);
            self.statuses.remove(path);
        }
    }

    fn apply_filters(&mut self, filters: FilterConfig) -> Vec<String> {
        self.filters = filters;
        let Some(repo) = self.repository.as_ref() else {
            return Vec::new();
        };
        self.tree = build_selectable_tree(&repo.entries, &self.filters);
        let removed = self.selection.retain_visible(&self.tree);
        self.forget(&removed);
        removed
    }
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadRepository { repo_url: String, branch: String, token: Option<String> },
    SetFilters(FilterConfig),
    SelectAll,
    DeselectAll,
    ToggleFile { path: String, checked: bool },
    ToggleFolder { path: String, checked: bool },
    FetchSelected,
    AutoPrefetch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded { repository_key: String, files: usize, prefetch: Option<FetchSummary> },
    FiltersApplied { visible: usize, deselected: Vec<String> },
    SelectionChanged { changed: usize },
    Fetched(FetchSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub auto_prefetch: bool,
    pub prefetch: PrefetchCaps,
    pub max_tokens: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auto_prefetch: config.auto_prefetch,
            prefetch: PrefetchCaps {
                max_bytes: config.prefetch_max_bytes,
                max_files: config.prefetch_max_files,
            },
            max_tokens: config.max_tokens,
        }
    }
}

pub struct Controller {
    session: Session,
    relay: Box<dyn Relay>,
    cache: ContentCache,
    settings: ControllerSettings,
}

impl Controller {
    pub fn new(
        relay: Box<dyn Relay>,
        cache: ContentCache,
        settings: ControllerSettings,
        filters: FilterConfig,
    ) -> Self {
        Self { session: Session::new(filters), relay, cache, settings }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn dispatch(
        &mut self,
        command: Command,
        progress: &mut dyn FnMut(FetchProgress<'_>),
    ) -> Result<Outcome, FlattenError> {
        match command {
            Command::LoadRepository { repo_url, branch, token } => {
                self.load(&repo_url, &branch, token.as_deref(), progress)
            }
            Command::SetFilters(filters) => {
                let deselected = self.session.apply_filters(filters);
                Ok(Outcome::FiltersApplied { visible: self.session.tree.file_count(), deselected })
            }
            Command::SelectAll => {
                self.require_repository()?;
                let before = self.session.selection.len();
                self.session.selection.select_all(&self.session.tree);
                let changed = self.session.selection.len().abs_diff(before);
                Ok(Outcome::SelectionChanged { changed })
            }
            Command::DeselectAll => {
                self.require_repository()?;
                let removed = self.session.selection.deselect_all();
                self.session.contents.clear();
                self.session.statuses.clear();
                Ok(Outcome::SelectionChanged { changed: removed.len() })
            }
            Command::ToggleFile { path, checked } => self.toggle_file(&path, checked),
            Command::ToggleFolder { path, checked } => self.toggle_folder(&path, checked),
            Command::FetchSelected => {
                self.require_repository()?;
                if self.session.selection.is_empty() {
                    return Err(FlattenError::NoFilesSelected);
                }
                let paths = self.session.selection.paths();
                self.fetch(&paths, progress).map(Outcome::Fetched)
            }
            Command::AutoPrefetch => self.auto_prefetch(progress).map(Outcome::Fetched),
        }
    }

    fn require_repository(&self) -> Result<&LoadedRepository, FlattenError> {
        self.session.repository.as_ref().ok_or(FlattenError::NoRepositoryLoaded)
    }

    fn load(
        &mut self,
        repo_url: &str,
        branch: &str,
        token: Option<&str>,
        progress: &mut dyn FnMut(FetchProgress<'_>),
    ) -> Result<Outcome, FlattenError> {
        if repo_url.trim().is_empty() {
            return Err(FlattenError::MissingRepositoryUrl);
        }
        let branch = if branch.trim().is_empty() { "main" } else { branch };
        let locator = RepoLocator::new(repo_url, branch, token);

        let entries =
            self.relay.get_tree(&locator).map_err(|e| FlattenError::Relay(e.to_string()))?;
        let repository = LoadedRepository::new(locator, entries);
        let repository_key = repository.key.clone();
        self.session.install(repository);

        let files = self.session.tree.file_count();
        tracing::info!("Loaded {} ({} selectable files)", repository_key, files);

        let prefetch = if self.settings.auto_prefetch && files > 0 {
            Some(self.auto_prefetch(progress)?)
        } else {
            None
        };
        Ok(Outcome::Loaded { repository_key, files, prefetch })
    }

    fn toggle_file(&mut self, path: &str, checked: bool) -> Result<Outcome, FlattenError> {
        self.require_repository()?;
        if checked && self.session.tree.find_file(path).is_none() {
            return Err(FlattenError::UnknownPath(path.to_string()));
        }
        let changed = self.session.selection.toggle_file(path, checked);
        if changed && !checked {
            self.session.forget(&[path.to_string()]);
        }
        Ok(Outcome::SelectionChanged { changed: usize::from(changed) })
    }

    fn toggle_folder(&mut self, path: &str, checked: bool) -> Result<Outcome, FlattenError> {
        self.require_repository()?;
        let folder = self
            .session
            .tree
            .find_folder(path)
            .ok_or_else(|| FlattenError::UnknownPath(path.to_string()))?;
        let changed = self.session.selection.toggle_folder(folder, checked);
        if !checked {
            self.session.forget(&changed);
        }
        Ok(Outcome::SelectionChanged { changed: changed.len() })
    }

    /// Fetch the size-capped subset of the selection, in selection order.
    fn auto_prefetch(
        &mut self,
        progress: &mut dyn FnMut(FetchProgress<'_>),
    ) -> Result<FetchSummary, FlattenError> {
        let repo = self.require_repository()?;
        let candidates = self.session.selection.iter().filter_map(|path| {
            repo.meta.get(path).map(|meta| (path, meta.size_bytes))
        });
        let plan: HashSet<String> =
            plan_prefetch(candidates, self.settings.prefetch).into_iter().collect();
        let paths: Vec<String> =
            self.session.selection.iter().filter(|p| plan.contains(*p)).map(str::to_string).collect();
        self.fetch(&paths, progress)
    }

    fn fetch(
        &mut self,
        paths: &[String],
        progress: &mut dyn FnMut(FetchProgress<'_>),
    ) -> Result<FetchSummary, FlattenError> {
        let session = &mut self.session;
        let repo = session.repository.as_ref().ok_or(FlattenError::NoRepositoryLoaded)?;
        let ctx = FetchContext {
            relay: self.relay.as_ref(),
            cache: &self.cache,
            locator: &repo.locator,
            repository_key: &repo.key,
            files: &repo.meta,
        };
        Ok(fetch_files(&ctx, paths, &mut session.contents, &mut session.statuses, progress))
    }

    /// Build the prompt, fetching any selected file that has no content yet.
    ///
    /// An estimate above the token budget is logged; the prompt is still built.
    pub fn assemble(
        &mut self,
        query: &str,
        instructions: &str,
        progress: &mut dyn FnMut(FetchProgress<'_>),
    ) -> Result<PromptReport, FlattenError> {
        if query.trim().is_empty() {
            return Err(FlattenError::MissingQuery);
        }
        self.require_repository()?;
        if self.session.selection.is_empty() {
            return Err(FlattenError::NoFilesSelected);
        }

        let missing = self.session.missing_contents();
        if !missing.is_empty() {
            tracing::debug!("Fetching {} selected files before assembling", missing.len());
            self.fetch(&missing, progress)?;
        }

        let files = self.session.selected_contents();
        if files.is_empty() {
            return Err(FlattenError::NoContentAvailable);
        }
        let overview = self.session.overview().unwrap_or_default();
        let parts = PromptParts { query, overview: &overview, files, instructions };
        let report = PromptReport::build(&parts, self.settings.max_tokens);
        if let Some(warning) = report.budget_warning() {
            tracing::warn!("{}", warning);
        }
        Ok(report)
    }

    /// Token estimate for the current selection and contents.
    pub fn token_estimate(&self, query: &str, instructions: &str) -> usize {
        let overview = self.session.overview().unwrap_or_default();
        let parts = PromptParts {
            query,
            overview: &overview,
            files: self.session.selected_contents(),
            instructions,
        };
        parts.estimated_tokens()
    }

    /// Visible files whose cache entry matches the current tree hash.
    pub fn cached_paths(&self) -> Vec<String> {
        let Some(repo) = self.session.repository.as_ref() else {
            return Vec::new();
        };
        let leaves = self.session.tree.files_in_order();
        self.cache.current_paths(
            &repo.key,
            leaves.iter().map(|leaf| (leaf.full_path.as_str(), leaf.content_hash.as_str())),
        )
    }
}
