//! Command-line interface for codebase-flattener
//!
//! Each subcommand loads a repository, applies selection edits in order and
//! then renders or fetches, the way one page session would.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cache;
mod common;
mod fetch;
mod overview;
mod prompt;
mod tree;
pub(crate) mod utils;

/// Flatten a repository into a single AI-ready prompt
#[derive(Parser)]
#[command(name = "codebase-flattener")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the selectable file tree with selection state
    Tree(tree::TreeArgs),

    /// Print the repository overview block
    Overview(overview::OverviewArgs),

    /// Fetch the selected files into the content cache
    Fetch(fetch::FetchArgs),

    /// Assemble the prompt and write it to a file
    Prompt(Box<prompt::PromptArgs>),

    /// Inspect or clear the content cache
    Cache(cache::CacheArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Tree(args) => tree::run(args),
        Commands::Overview(args) => overview::run(args),
        Commands::Fetch(args) => fetch::run(args),
        Commands::Prompt(args) => prompt::run(*args),
        Commands::Cache(args) => cache::run(args),
    }
}
