//! Arguments and setup shared by every repository subcommand.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::cache::{ContentCache, FileBlobStore};
use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::{Config, FlattenError};
use crate::fetch::endpoint::EndpointRelay;
use crate::fetch::github::GitHubRelay;
use crate::fetch::local::LocalRelay;
use crate::fetch::{FetchProgress, Relay};
use crate::scan::FilterConfig;
use crate::session::{Command, Controller, ControllerSettings, Outcome};

#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// GitHub repository URL (https://github.com/owner/repo)
    #[arg(short, long, value_name = "URL")]
    pub repo: Option<String>,

    /// Local directory to flatten instead of a remote repository
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Branch to read
    #[arg(short, long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// GitHub access token passed through to the API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Extensions to exclude (comma-separated; empty, `*` or `all` keeps everything)
    #[arg(short = 'x', long, value_name = "EXTS")]
    pub exclude_ext: Option<String>,

    /// Folder names to ignore anywhere in the tree (comma-separated)
    #[arg(short = 'i', long, value_name = "DIRS")]
    pub ignore_dirs: Option<String>,

    /// Relay endpoint to use instead of calling GitHub directly
    #[arg(long, value_name = "URL")]
    pub relay_url: Option<String>,

    /// Config file (default: discovered in the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Content cache file
    #[arg(long, value_name = "FILE")]
    pub cache_file: Option<PathBuf>,

    /// Keep fetched content in memory only
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Deselect everything, then select these files or folders
    #[arg(long, value_name = "PATH")]
    pub only: Vec<String>,

    /// Deselect a file or folder
    #[arg(long, value_name = "PATH")]
    pub deselect: Vec<String>,

    /// Select a file or folder
    #[arg(long, value_name = "PATH")]
    pub select: Vec<String>,
}

/// A loaded repository ready for commands.
pub struct Workspace {
    pub config: Config,
    pub controller: Controller,
}

impl RepoArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            repo_url: self.repo.clone(),
            path: self.path.clone(),
            branch: self.branch.clone(),
            token: self.token.clone(),
            exclude_extensions: self.exclude_ext.clone(),
            ignore_dirs: self.ignore_dirs.clone(),
            relay_url: self.relay_url.clone(),
            cache_file: self.cache_file.clone(),
            ..CliOverrides::default()
        }
    }

    /// Load config files and merge these arguments (plus `extra`) over them.
    pub fn resolve_config(&self, extra: CliOverrides) -> Result<Config> {
        if self.repo.is_some() && self.path.is_some() {
            anyhow::bail!("Cannot specify both --path and --repo");
        }
        let cwd = std::env::current_dir().context("Failed to read working directory")?;
        let file_config = load_config(&cwd, self.config.as_deref())?;
        let mut overrides = self.overrides();
        overrides.max_tokens = extra.max_tokens;
        overrides.output_dir = extra.output_dir;
        overrides.auto_prefetch = extra.auto_prefetch;
        Ok(merge_cli_with_config(file_config, overrides))
    }

    pub fn open_cache(&self, config: &Config) -> ContentCache {
        if self.no_cache {
            return ContentCache::in_memory();
        }
        let store = match &config.cache_file {
            Some(path) => FileBlobStore::new(path.clone()),
            None => FileBlobStore::default_location(),
        };
        ContentCache::new(Box::new(store))
    }
}

/// Resolve config, build the relay and cache, then load the repository.
pub fn open_workspace(args: &RepoArgs, extra: CliOverrides) -> Result<Workspace> {
    let config = args.resolve_config(extra)?;
    let (relay, repo_url) = build_relay(&config)?;
    let cache = args.open_cache(&config);
    tracing::debug!("Content cache: {}", cache.describe());

    let filters = FilterConfig::from_lists(&config.exclude_extensions, &config.ignore_dirs);
    let settings = ControllerSettings::from_config(&config);
    let mut controller = Controller::new(relay, cache, settings, filters);

    let bar = FetchBar::new();
    let outcome = controller.dispatch(
        Command::LoadRepository {
            repo_url,
            branch: config.branch.clone(),
            token: config.token.clone(),
        },
        &mut |p| bar.update(p),
    )?;
    bar.finish();

    if let Outcome::Loaded { repository_key, files, prefetch } = &outcome {
        tracing::info!("{}: {} files", repository_key, files);
        if let Some(summary) = prefetch {
            eprintln!("Pre-fetch: {}", summary.message());
        }
    }
    Ok(Workspace { config, controller })
}

fn build_relay(config: &Config) -> Result<(Box<dyn Relay>, String)> {
    if let Some(path) = &config.path {
        let relay = LocalRelay::open(path)?;
        let repo_url = relay.root().display().to_string();
        return Ok((Box::new(relay), repo_url));
    }
    let Some(repo_url) = config.repo_url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    else {
        return Err(FlattenError::MissingRepositoryUrl.into());
    };
    let relay: Box<dyn Relay> = match config.relay_url.as_deref() {
        Some(endpoint) => Box::new(EndpointRelay::new(endpoint)),
        None => Box::new(GitHubRelay::new()),
    };
    Ok((relay, repo_url.to_string()))
}

/// Apply `--only`, then `--deselect`, then `--select`.
pub fn apply_selection_edits(controller: &mut Controller, edits: &SelectionArgs) -> Result<()> {
    if !edits.only.is_empty() {
        controller.dispatch(Command::DeselectAll, &mut |_| {})?;
    }
    let steps = edits
        .only
        .iter()
        .map(|p| (p, true))
        .chain(edits.deselect.iter().map(|p| (p, false)))
        .chain(edits.select.iter().map(|p| (p, true)));
    for (path, checked) in steps {
        let command = path_command(controller, path, checked)?;
        controller.dispatch(command, &mut |_| {})?;
    }
    Ok(())
}

fn path_command(controller: &Controller, raw: &str, checked: bool) -> Result<Command> {
    let path = raw.trim().trim_matches('/').to_string();
    let tree = controller.session().tree();
    if tree.find_file(&path).is_some() {
        Ok(Command::ToggleFile { path, checked })
    } else if tree.find_folder(&path).is_some() {
        Ok(Command::ToggleFolder { path, checked })
    } else {
        Err(FlattenError::UnknownPath(raw.to_string()).into())
    }
}

/// Progress bar for a fetch batch, created on the first report.
pub struct FetchBar {
    bar: std::cell::OnceCell<ProgressBar>,
}

impl FetchBar {
    pub fn new() -> Self {
        Self { bar: std::cell::OnceCell::new() }
    }

    pub fn update(&self, progress: FetchProgress<'_>) {
        let bar = self.bar.get_or_init(|| {
            let bar = ProgressBar::new(progress.total as u64);
            let style = ProgressStyle::with_template("{bar:30} {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        });
        bar.set_position(progress.completed as u64);
        bar.set_message(format!("{} ({})", progress.path, progress.status.label()));
    }

    pub fn finish(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}

impl Default for FetchBar {
    fn default() -> Self {
        Self::new()
    }
}
