//! Path normalization and repository identifiers

use once_cell::sync::Lazy;
use regex::Regex;

static GITHUB_REPO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)github\.com/([^/]+)/([^/?]+)").expect("github repo pattern is valid")
});

pub fn normalize_path(path: &str) -> String {
    // Convert backslashes to forward slashes and normalize
    path.replace('\\', "/")
}

/// Extract `(owner, repo)` from a GitHub URL, dropping a trailing `.git`.
pub fn parse_github_repo(url: &str) -> Option<(String, String)> {
    let caps = GITHUB_REPO.captures(url)?;
    let owner = caps.get(1)?.as_str().to_string();
    let raw_repo = caps.get(2)?.as_str();
    let repo = if raw_repo.to_ascii_lowercase().ends_with(".git") {
        &raw_repo[..raw_repo.len() - 4]
    } else {
        raw_repo
    };
    Some((owner, repo.to_string()))
}

/// Cache partition key: `owner/repo@branch`.
///
/// URLs that are not GitHub URLs fall back to `<url>@<branch>`, with `repo`
/// and `main` standing in for empty inputs.
pub fn repository_key(repo_url: &str, branch: &str) -> String {
    match parse_github_repo(repo_url) {
        Some((owner, repo)) => format!("{owner}/{repo}@{branch}"),
        None => {
            let url = if repo_url.is_empty() { "repo" } else { repo_url };
            let branch = if branch.is_empty() { "main" } else { branch };
            format!("{url}@{branch}")
        }
    }
}

/// Bare repository name for display and file naming.
pub fn repository_name(repo_url: &str) -> String {
    if let Some((_, repo)) = parse_github_repo(repo_url) {
        return repo;
    }
    let normalized = normalize_path(repo_url);
    normalized
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("repo")
        .to_string()
}
