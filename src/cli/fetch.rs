//! Fetch command: pull the selection into the cache

use anyhow::Result;
use clap::Args;
use console::style;

use super::common::{apply_selection_edits, open_workspace, FetchBar, RepoArgs, SelectionArgs};
use crate::config::CliOverrides;
use crate::session::{Command, Outcome};
use crate::utils::format_with_commas;

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

pub fn run(args: FetchArgs) -> Result<()> {
    let extra = CliOverrides { auto_prefetch: Some(false), ..CliOverrides::default() };
    let mut workspace = open_workspace(&args.repo, extra)?;
    apply_selection_edits(&mut workspace.controller, &args.selection)?;

    let bar = FetchBar::new();
    let outcome = workspace.controller.dispatch(Command::FetchSelected, &mut |p| bar.update(p))?;
    bar.finish();

    let Outcome::Fetched(summary) = outcome else {
        return Ok(());
    };
    for (path, reason) in &summary.failed {
        eprintln!("{} {}: {}", style("error").red(), path, reason);
    }
    if summary.is_complete() {
        println!("{}", style(summary.message()).green());
    } else {
        println!("{}", style(summary.message()).yellow());
    }
    println!("  from cache: {}", summary.cached);
    println!("  downloaded: {}", summary.fetched);

    let tokens = workspace.controller.token_estimate("", &workspace.config.custom_instructions);
    println!(
        "Estimated tokens: ~{} (max {})",
        format_with_commas(tokens),
        format_with_commas(workspace.config.max_tokens)
    );
    Ok(())
}
