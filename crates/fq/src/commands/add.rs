//! Add command implementation

use anyhow::Result;
use clap::Args;
use file_queue_core::config::Config;
use file_queue_core::AddMode;

/// Append items to the pending file
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Items to append, one line each
    #[arg(required = true)]
    items: Vec<String>,

    /// Treat each item as a file path and append its contents
    #[arg(long, short = 'f')]
    file: bool,
}

/// Execute the add command
pub fn execute(args: AddArgs, config: &Config) -> Result<()> {
    let queue = config.file_queue();
    let pending = config.queue.pending_path();
    let mode = if args.file {
        AddMode::File
    } else {
        AddMode::Text
    };

    for item in &args.items {
        queue.add(&pending, item, mode)?;
    }
    Ok(())
}
