//! Prompt command: assemble and save the final prompt

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::common::{apply_selection_edits, open_workspace, FetchBar, RepoArgs, SelectionArgs};
use super::utils::text_arg;
use crate::config::CliOverrides;
use crate::domain::{FetchStatus, FlattenError};
use crate::render::prompt_file_name;
use crate::utils::format_with_commas;

#[derive(Args, Debug)]
pub struct PromptArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// What you want the model to do
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Read the query from a file
    #[arg(long, value_name = "FILE", conflicts_with = "query")]
    pub query_file: Option<PathBuf>,

    /// Custom instructions (default: from config)
    #[arg(long, value_name = "TEXT")]
    pub instructions: Option<String>,

    /// Read custom instructions from a file
    #[arg(long, value_name = "FILE", conflicts_with = "instructions")]
    pub instructions_file: Option<PathBuf>,

    /// Skip the size-capped pre-fetch after loading
    #[arg(long)]
    pub no_prefetch: bool,

    /// Directory for the prompt file
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the prompt instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Token budget for the over-budget warning
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<usize>,
}

pub fn run(args: PromptArgs) -> Result<()> {
    let query = text_arg(args.query.as_deref(), args.query_file.as_deref())?.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(FlattenError::MissingQuery.into());
    }

    let extra = CliOverrides {
        max_tokens: args.max_tokens,
        output_dir: args.output_dir.clone(),
        auto_prefetch: args.no_prefetch.then_some(false),
        ..CliOverrides::default()
    };
    let mut workspace = open_workspace(&args.repo, extra)?;
    apply_selection_edits(&mut workspace.controller, &args.selection)?;

    let instructions =
        text_arg(args.instructions.as_deref(), args.instructions_file.as_deref())?
            .unwrap_or_else(|| workspace.config.custom_instructions.clone());

    let bar = FetchBar::new();
    let report = workspace.controller.assemble(&query, &instructions, &mut |p| bar.update(p))?;
    bar.finish();

    for (path, status) in workspace.controller.session().statuses() {
        if let FetchStatus::Error(reason) = status {
            eprintln!("warning: {path} was not included: {reason}");
        }
    }

    if args.stdout {
        println!("{}", report.text);
        return Ok(());
    }

    let config = &workspace.config;
    let repo_url = workspace
        .controller
        .session()
        .repository()
        .map(|r| r.locator.repo_url.clone())
        .unwrap_or_default();
    let name = prompt_file_name(
        &repo_url,
        &query,
        &config.abbreviations,
        chrono::Local::now().naive_local(),
    );
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    let out_path = config.output_dir.join(name);
    std::fs::write(&out_path, &report.text)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    println!("Wrote {}", out_path.display());
    println!("  Files included:   {}", report.files_included);
    println!(
        "  Estimated tokens: ~{} (max {})",
        format_with_commas(report.estimated_tokens),
        format_with_commas(report.max_tokens)
    );
    Ok(())
}
