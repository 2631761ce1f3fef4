//! Shared blocking HTTP helpers for the network relays.

use super::RelayError;
use crate::utils::decode_bytes;
use std::io::Read;
use std::time::Duration;

pub(crate) const USER_AGENT: &str = concat!("codebase-flattener/", env!("CARGO_PKG_VERSION"));

/// Refuse raw downloads above this size.
const MAX_DOWNLOAD_BYTES: u64 = 50 * 1024 * 1024;

pub(crate) fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(15))
        .timeout_read(Duration::from_secs(60))
        .user_agent(USER_AGENT)
        .build()
}

/// Parse a JSON body, also for 4xx/5xx answers that carry one.
pub(crate) fn json_body(
    result: Result<ureq::Response, ureq::Error>,
) -> Result<serde_json::Value, RelayError> {
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            return match response.into_json::<serde_json::Value>() {
                Ok(body) => Ok(body),
                Err(_) => Err(RelayError::Transport(format!("HTTP status {code}"))),
            };
        }
        Err(e) => return Err(RelayError::Transport(e.to_string())),
    };
    response.into_json().map_err(|e| RelayError::Malformed(e.to_string()))
}

pub(crate) fn download_text(agent: &ureq::Agent, url: &str) -> Result<String, RelayError> {
    let response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::Status(404, _) => RelayError::NotFound(url.to_string()),
        other => RelayError::Transport(other.to_string()),
    })?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_DOWNLOAD_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| RelayError::Transport(e.to_string()))?;
    if bytes.len() as u64 > MAX_DOWNLOAD_BYTES {
        return Err(RelayError::Transport(format!(
            "download exceeds {MAX_DOWNLOAD_BYTES} bytes: {url}"
        )));
    }

    let (content, _encoding) = decode_bytes(&bytes);
    Ok(content)
}

/// Percent-encode a repository path for use in a URL, keeping `/`.
pub(crate) fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::encode_path;

    #[test]
    fn encode_path_keeps_slashes_and_escapes_the_rest() {
        assert_eq!(encode_path("src/lib.rs"), "src/lib.rs");
        assert_eq!(encode_path("docs/my file#1.md"), "docs/my%20file%231.md");
        assert_eq!(encode_path("é"), "%C3%A9");
    }
}
