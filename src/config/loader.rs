//! Config file discovery and parsing

use crate::domain::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_CANDIDATES: &[&str] = &[
    "codebase-flattener.toml",
    ".codebase-flattener.toml",
    "cbf.toml",
    ".cbf.toml",
    "cbf.yml",
    ".cbf.yml",
    "cbf.yaml",
    ".cbf.yaml",
];

/// Section names a config file may nest its settings under.
const SECTION_NAMES: &[&str] = &["codebase-flattener", "cbf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Load `explicit`, or the first config found in `search_dir`.
///
/// Errors in an explicitly named file are returned. A discovered file that
/// fails to read or parse is logged and defaults are used instead.
pub fn load_config(search_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let Some(path) = discover_config(search_dir) else {
                return Ok(Config::default());
            };
            tracing::debug!("Using config {}", path.display());
            read_config(&path).or_else(|e| {
                tracing::warn!("Ignoring config {}: {:#}", path.display(), e);
                Ok(Config::default())
            })
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let format = ConfigFormat::from_path(path).with_context(|| {
        format!("Unsupported config extension for file {}", path.display())
    })?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading config file: {}", path.display()))?;
    match format {
        ConfigFormat::Toml => parse_toml_config(&content, path),
        ConfigFormat::Yaml => parse_yaml_config(&content, path),
    }
}

fn parse_toml_config(content: &str, path: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", path.display()))?;
    let section = SECTION_NAMES.iter().find_map(|name| raw.get(*name)).cloned();
    section
        .unwrap_or(raw)
        .try_into()
        .with_context(|| format!("Invalid TOML config: {}", path.display()))
}

fn parse_yaml_config(content: &str, path: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", path.display()))?;
    if raw.is_null() {
        return Ok(Config::default());
    }
    let section = SECTION_NAMES.iter().find_map(|name| raw.get(*name)).cloned();
    serde_yaml::from_value(section.unwrap_or(raw))
        .with_context(|| format!("Invalid YAML config: {}", path.display()))
}

pub fn discover_config(search_dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES.iter().map(|name| search_dir.join(name)).find(|path| path.is_file())
}
