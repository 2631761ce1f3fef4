//! Direct GitHub relay: recursive tree API plus raw-content download URLs.

use super::http::{agent, download_text, encode_path, json_body};
use super::{Relay, RelayError, RepoLocator};
use crate::domain::RepositoryEntry;
use crate::utils::parse_github_repo;

const API_BASE: &str = "https://api.github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com";

pub struct GitHubRelay {
    agent: ureq::Agent,
    api_base: String,
    raw_base: String,
}

impl Default for GitHubRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubRelay {
    pub fn new() -> Self {
        Self::with_bases(API_BASE, RAW_BASE)
    }

    /// Point at a GitHub Enterprise or mock server.
    pub fn with_bases(api_base: &str, raw_base: &str) -> Self {
        Self {
            agent: agent(),
            api_base: api_base.trim_end_matches('/').to_string(),
            raw_base: raw_base.trim_end_matches('/').to_string(),
        }
    }

    fn owner_repo(locator: &RepoLocator) -> Result<(String, String), RelayError> {
        parse_github_repo(&locator.repo_url)
            .ok_or_else(|| RelayError::Reported("Invalid GitHub URL".to_string()))
    }

    pub fn tree_url(&self, locator: &RepoLocator) -> Result<String, RelayError> {
        let (owner, repo) = Self::owner_repo(locator)?;
        Ok(format!(
            "{}/repos/{owner}/{repo}/git/trees/{}?recursive=1",
            self.api_base,
            encode_path(&locator.branch)
        ))
    }
}

impl Relay for GitHubRelay {
    fn get_tree(&self, locator: &RepoLocator) -> Result<Vec<RepositoryEntry>, RelayError> {
        let url = self.tree_url(locator)?;
        let mut request = self.agent.get(&url).set("Accept", "application/vnd.github.v3+json");
        if let Some(token) = locator.token.as_deref() {
            request = request.set("Authorization", &format!("token {token}"));
        }

        tracing::debug!("GET {}", url);
        let body = json_body(request.call())?;
        parse_tree_body(body)
    }

    fn get_file_download_url(
        &self,
        locator: &RepoLocator,
        path: &str,
    ) -> Result<String, RelayError> {
        let (owner, repo) = Self::owner_repo(locator)?;
        Ok(format!(
            "{}/{owner}/{repo}/{}/{}",
            self.raw_base,
            encode_path(&locator.branch),
            encode_path(path)
        ))
    }

    fn download(&self, url: &str) -> Result<String, RelayError> {
        download_text(&self.agent, url)
    }
}

/// Turn a tree API body into entries. A body with `message` is an API error.
pub fn parse_tree_body(body: serde_json::Value) -> Result<Vec<RepositoryEntry>, RelayError> {
    if let Some(message) = body.get("message").and_then(|m| m.as_str()) {
        return Err(RelayError::Reported(message.to_string()));
    }
    if body.get("truncated").and_then(|t| t.as_bool()).unwrap_or(false) {
        tracing::warn!("GitHub truncated the repository tree; some files will be missing");
    }
    let tree = body
        .get("tree")
        .cloned()
        .ok_or_else(|| RelayError::Malformed("response has no `tree` field".to_string()))?;
    serde_json::from_value(tree).map_err(|e| RelayError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryKind;
    use serde_json::json;

    fn locator(url: &str) -> RepoLocator {
        RepoLocator::new(url, "main", None)
    }

    #[test]
    fn test_tree_url_strips_dot_git() {
        let relay = GitHubRelay::new();
        assert_eq!(
            relay.tree_url(&locator("https://github.com/acme/tool.git")).expect("url"),
            "https://api.github.com/repos/acme/tool/git/trees/main?recursive=1"
        );
    }

    #[test]
    fn test_invalid_url_is_reported() {
        let relay = GitHubRelay::new();
        let err = relay.get_tree(&locator("https://gitlab.com/acme/tool")).expect_err("invalid");
        assert_eq!(err, RelayError::Reported("Invalid GitHub URL".to_string()));
    }

    #[test]
    fn test_download_url_uses_raw_host() {
        let relay = GitHubRelay::new();
        let url = relay
            .get_file_download_url(&locator("https://github.com/acme/tool"), "src/my lib.rs")
            .expect("url");
        assert_eq!(url, "https://raw.githubusercontent.com/acme/tool/main/src/my%20lib.rs");
    }

    #[test]
    fn test_parse_tree_body() {
        let body = json!({
            "sha": "root",
            "tree": [
                {"path": "src", "mode": "040000", "type": "tree", "sha": "t1"},
                {"path": "src/lib.rs", "mode": "100644", "type": "blob", "sha": "b1", "size": 12}
            ],
            "truncated": false
        });
        let entries = parse_tree_body(body).expect("entries");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::Tree);
        assert_eq!(entries[1], RepositoryEntry::blob("src/lib.rs", "b1", 12));
    }

    #[test]
    fn test_parse_tree_body_surfaces_api_message() {
        let err = parse_tree_body(json!({"message": "Not Found"})).expect_err("api error");
        assert_eq!(err, RelayError::Reported("Not Found".to_string()));
    }
}
