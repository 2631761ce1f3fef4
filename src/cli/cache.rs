//! Cache command: inspect and clear the persisted content cache

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;
use std::path::PathBuf;

use crate::cache::{ContentCache, FileBlobStore};
use crate::config::load_config;
use crate::utils::{format_file_size, format_with_commas};

#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Content cache file
    #[arg(long, value_name = "FILE", global = true)]
    pub cache_file: Option<PathBuf>,

    /// Config file (default: discovered in the working directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached repositories with entry counts
    List,

    /// Remove cached content
    Clear {
        /// Only clear this repository key (`owner/repo@branch`)
        #[arg(long, value_name = "KEY")]
        key: Option<String>,
    },

    /// Print the cache file location
    Path,
}

pub fn run(args: CacheArgs) -> Result<()> {
    let store = match args.cache_file {
        Some(path) => FileBlobStore::new(path),
        None => {
            let cwd = std::env::current_dir()?;
            match load_config(&cwd, args.config.as_deref())?.cache_file {
                Some(path) => FileBlobStore::new(path),
                None => FileBlobStore::default_location(),
            }
        }
    };

    if let CacheAction::Path = args.action {
        println!("{}", store.path().display());
        return Ok(());
    }

    let cache = ContentCache::new(Box::new(store));
    match args.action {
        CacheAction::List => {
            let partitions = cache.partitions();
            if partitions.is_empty() {
                println!("Cache is empty ({})", cache.describe());
            }
            for partition in partitions {
                println!(
                    "{}  {} files, {}",
                    style(&partition.repository_key).bold(),
                    format_with_commas(partition.entries),
                    format_file_size(partition.content_bytes as u64)
                );
            }
        }
        CacheAction::Clear { key: Some(key) } => {
            let removed = cache.clear_partition(&key);
            println!("Removed {removed} entries for {key}");
        }
        CacheAction::Clear { key: None } => {
            let removed = cache.clear_all();
            println!("Removed {removed} entries");
        }
        CacheAction::Path => {}
    }
    Ok(())
}
