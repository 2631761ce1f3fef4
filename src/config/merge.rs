//! Merge CLI arguments over file configuration

use crate::cli::utils::parse_csv;
use crate::domain::Config;
use std::path::PathBuf;

/// Values given on the command line. `None` leaves the file value in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub repo_url: Option<String>,
    pub path: Option<PathBuf>,
    pub branch: Option<String>,
    pub token: Option<String>,
    pub exclude_extensions: Option<String>,
    pub ignore_dirs: Option<String>,
    pub relay_url: Option<String>,
    pub cache_file: Option<PathBuf>,
    pub max_tokens: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub auto_prefetch: Option<bool>,
}

pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    // A repository source on the command line replaces both file sources.
    if cli.repo_url.is_some() || cli.path.is_some() {
        config.repo_url = cli.repo_url;
        config.path = cli.path;
    }
    if let Some(branch) = cli.branch.filter(|b| !b.trim().is_empty()) {
        config.branch = branch;
    }
    if let Some(token) = cli.token.filter(|t| !t.trim().is_empty()) {
        config.token = Some(token);
    }
    if let Some(raw) = cli.exclude_extensions {
        config.exclude_extensions = parse_csv(&raw);
    }
    if let Some(raw) = cli.ignore_dirs {
        config.ignore_dirs = parse_csv(&raw);
    }
    if cli.relay_url.is_some() {
        config.relay_url = cli.relay_url;
    }
    if cli.cache_file.is_some() {
        config.cache_file = cli.cache_file;
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(auto_prefetch) = cli.auto_prefetch {
        config.auto_prefetch = auto_prefetch;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_win_over_file() {
        let file = Config {
            repo_url: Some("https://github.com/o/file".to_string()),
            branch: "dev".to_string(),
            ignore_dirs: vec!["vendor".to_string()],
            ..Config::default()
        };
        let merged = merge_cli_with_config(
            file,
            CliOverrides {
                path: Some(PathBuf::from("/tmp/work")),
                ignore_dirs: Some("target, node_modules".to_string()),
                max_tokens: Some(10),
                ..CliOverrides::default()
            },
        );
        assert!(merged.repo_url.is_none());
        assert_eq!(merged.path, Some(PathBuf::from("/tmp/work")));
        assert_eq!(merged.branch, "dev");
        assert_eq!(merged.ignore_dirs, vec!["target", "node_modules"]);
        assert_eq!(merged.max_tokens, 10);
    }

    #[test]
    fn empty_cli_keeps_file_values() {
        let file = Config { token: Some("abc".to_string()), ..Config::default() };
        let merged = merge_cli_with_config(
            file,
            CliOverrides { token: Some("  ".to_string()), ..CliOverrides::default() },
        );
        assert_eq!(merged.token.as_deref(), Some("abc"));
        assert!(merged.auto_prefetch);
    }

    #[test]
    fn empty_exclude_text_clears_file_list() {
        let file = Config { exclude_extensions: vec![".png".to_string()], ..Config::default() };
        let merged = merge_cli_with_config(
            file,
            CliOverrides { exclude_extensions: Some(String::new()), ..CliOverrides::default() },
        );
        assert!(merged.exclude_extensions.is_empty());
    }
}
