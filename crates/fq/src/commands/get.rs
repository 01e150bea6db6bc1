//! Get command implementation

use anyhow::Result;
use clap::Args;
use file_queue_core::config::Config;
use file_queue_core::queue::item::strip_terminator;
use serde_json::json;

use super::CommandError;

/// Claim the next pending item
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the get command
///
/// Prints the claimed item. An empty queue is reported through the exit
/// status alone so driver loops can `while item=$(fq get); do ...; done`.
pub fn execute(args: GetArgs, config: &Config) -> Result<()> {
    let queue = config.file_queue();
    let pending = config.queue.pending_path();

    let Some(item) = queue.get(&pending)? else {
        return Err(CommandError::QueueEmpty.into());
    };
    let item = strip_terminator(&item);

    if args.json {
        println!("{}", json!({ "item": item }));
    } else {
        println!("{item}");
    }
    Ok(())
}
