//! Overview command

use anyhow::Result;
use clap::Args;

use super::common::{open_workspace, RepoArgs};
use crate::config::CliOverrides;

#[derive(Args, Debug)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub repo: RepoArgs,
}

pub fn run(args: OverviewArgs) -> Result<()> {
    let extra = CliOverrides { auto_prefetch: Some(false), ..CliOverrides::default() };
    let workspace = open_workspace(&args.repo, extra)?;
    if let Some(overview) = workspace.controller.session().overview() {
        println!("{overview}");
    }
    Ok(())
}
