//! Client for a relay endpoint that proxies GitHub on our behalf.
//!
//! Requests are form posts carrying `action_type` (`get_tree` or `get_file`),
//! `repo_url`, `branch`, `path` and `token`. Answers use the envelope
//! `{"success": true, "data": ...}` or `{"success": false, "data": "<message>"}`.

use super::http::{agent, download_text, json_body};
use super::{Relay, RelayError, RepoLocator};
use crate::domain::RepositoryEntry;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Value,
}

pub struct EndpointRelay {
    agent: ureq::Agent,
    endpoint: String,
}

impl EndpointRelay {
    pub fn new(endpoint: &str) -> Self {
        Self { agent: agent(), endpoint: endpoint.to_string() }
    }

    fn call(&self, fields: &[(&str, &str)]) -> Result<Value, RelayError> {
        tracing::debug!("POST {} {:?}", self.endpoint, fields.first());
        let body = json_body(self.agent.post(&self.endpoint).send_form(fields))?;
        unwrap_envelope(body)
    }
}

/// Extract `data` from a successful envelope; failures become `Reported`.
pub fn unwrap_envelope(body: Value) -> Result<Value, RelayError> {
    let envelope: Envelope =
        serde_json::from_value(body).map_err(|e| RelayError::Malformed(e.to_string()))?;
    if envelope.success {
        return Ok(envelope.data);
    }
    let message = match envelope.data {
        Value::String(message) => message,
        Value::Null => "Relay request failed".to_string(),
        other => other.to_string(),
    };
    Err(RelayError::Reported(message))
}

impl Relay for EndpointRelay {
    fn get_tree(&self, locator: &RepoLocator) -> Result<Vec<RepositoryEntry>, RelayError> {
        let token = locator.token.as_deref().unwrap_or("");
        let data = self.call(&[
            ("action_type", "get_tree"),
            ("repo_url", locator.repo_url.as_str()),
            ("branch", locator.branch.as_str()),
            ("token", token),
        ])?;
        let tree = data.get("tree").cloned().unwrap_or(Value::Array(Vec::new()));
        serde_json::from_value(tree).map_err(|e| RelayError::Malformed(e.to_string()))
    }

    fn get_file_download_url(
        &self,
        locator: &RepoLocator,
        path: &str,
    ) -> Result<String, RelayError> {
        let token = locator.token.as_deref().unwrap_or("");
        let data = self.call(&[
            ("action_type", "get_file"),
            ("repo_url", locator.repo_url.as_str()),
            ("branch", locator.branch.as_str()),
            ("path", path),
            ("token", token),
        ])?;
        data.get("download_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or(RelayError::MissingDownloadUrl)
    }

    fn download(&self, url: &str) -> Result<String, RelayError> {
        download_text(&self.agent, url)
    }
}
