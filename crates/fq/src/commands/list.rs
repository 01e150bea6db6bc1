//! List command implementation

use anyhow::Result;
use clap::Args;
use file_queue_core::config::Config;

use super::CommandError;

/// Print the items in one queue file
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Which file: pending, running, or done
    state: String,
}

/// Execute the list command
pub fn execute(args: ListArgs, config: &Config) -> Result<()> {
    let queue = config.file_queue();
    let path = match args.state.as_str() {
        "pending" => config.queue.pending_path(),
        "running" => queue.paths().running.clone(),
        "done" => queue.paths().done.clone(),
        other => return Err(CommandError::UnknownState(other.to_string()).into()),
    };

    for item in queue.list(&path)? {
        println!("{item}");
    }
    Ok(())
}
