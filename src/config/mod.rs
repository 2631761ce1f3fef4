//! Configuration loading and merging
//!
//! Precedence: CLI flags > environment (`GITHUB_TOKEN`) > config file > defaults.

pub mod loader;
pub mod merge;

pub use loader::{discover_config, load_config};
pub use merge::{merge_cli_with_config, CliOverrides};
