//! Done command implementation

use anyhow::Result;
use clap::Args;
use file_queue_core::config::Config;

/// Mark a running item done
#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Item text exactly as claimed
    item: String,
}

/// Execute the done command
pub fn execute(args: DoneArgs, config: &Config) -> Result<()> {
    config.file_queue().done(&args.item)?;
    Ok(())
}
