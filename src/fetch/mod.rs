//! Repository relays and file fetching.
//!
//! A [`Relay`] answers the two questions the flattener asks of a remote:
//! "what is in this repository?" and "where do I download this file?".
//! Implementations:
//! - [`github::GitHubRelay`] talks to the GitHub API directly
//! - [`endpoint::EndpointRelay`] forwards to a relay endpoint speaking the
//!   `{success, data}` envelope
//! - [`local::LocalRelay`] serves a local directory

use crate::domain::RepositoryEntry;
use thiserror::Error;

pub mod endpoint;
pub mod github;
mod http;
pub mod local;
pub mod orchestrator;
pub mod prefetch;

pub use orchestrator::{fetch_files, FetchContext, FetchProgress, FetchSummary};
pub use prefetch::{plan_prefetch, PrefetchCaps};

/// Repository coordinates passed with every relay request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocator {
    pub repo_url: String,
    pub branch: String,
    pub token: Option<String>,
}

impl RepoLocator {
    pub fn new(repo_url: &str, branch: &str, token: Option<&str>) -> Self {
        Self {
            repo_url: repo_url.trim().to_string(),
            branch: branch.trim().to_string(),
            token: token.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The relay or upstream API answered with an error message.
    #[error("{0}")]
    Reported(String),

    #[error("Failed to get download URL")]
    MissingDownloadUrl,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Network or API error: {0}")]
    Transport(String),

    #[error("Malformed relay response: {0}")]
    Malformed(String),
}

impl RelayError {
    /// Short reason shown next to a file whose fetch failed.
    pub fn reason(&self) -> String {
        match self {
            RelayError::Reported(message) => message.clone(),
            RelayError::MissingDownloadUrl => "Failed to get download URL".to_string(),
            RelayError::NotFound(_) => "File not found".to_string(),
            RelayError::Transport(_) | RelayError::Malformed(_) => {
                "Network or API error".to_string()
            }
        }
    }
}

pub trait Relay {
    /// Flat list of every entry in the repository at `locator.branch`.
    fn get_tree(&self, locator: &RepoLocator) -> Result<Vec<RepositoryEntry>, RelayError>;

    fn get_file_download_url(&self, locator: &RepoLocator, path: &str)
        -> Result<String, RelayError>;

    /// Plain content fetch of a download URL.
    fn download(&self, url: &str) -> Result<String, RelayError>;
}
