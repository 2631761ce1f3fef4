//! codebase-flattener: flatten a repository into an AI-ready prompt

use anyhow::Result;

fn main() -> Result<()> {
    codebase_flattener::cli::run()
}
