//! Requeue command implementation

use anyhow::Result;
use clap::Args;
use file_queue_core::config::Config;

/// Return a running item to the pending file
#[derive(Args, Debug)]
pub struct RequeueArgs {
    /// Item text exactly as claimed
    item: String,
}

/// Execute the requeue command
pub fn execute(args: RequeueArgs, config: &Config) -> Result<()> {
    let pending = config.queue.pending_path();
    config.file_queue().requeue(&args.item, &pending)?;
    Ok(())
}
