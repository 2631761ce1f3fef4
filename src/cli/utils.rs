//! Shared CLI utilities.

use anyhow::{Context, Result};
use std::path::Path;

/// Split a comma-separated string, trimming whitespace and discarding empty
/// segments.
pub fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}

/// Text from an inline flag or a file flag; the inline value wins.
pub fn text_arg(inline: Option<&str>, file: Option<&Path>) -> Result<Option<String>> {
    if let Some(text) = inline {
        return Ok(Some(text.to_string()));
    }
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed reading {}", path.display()))
            .map(Some),
        None => Ok(None),
    }
}
