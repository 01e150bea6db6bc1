//! Status command implementation

use anyhow::Result;
use clap::Args;
use file_queue_core::config::Config;
use serde_json::json;

/// Show item counts per state
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the status command
pub fn execute(args: StatusArgs, config: &Config) -> Result<()> {
    let queue = config.file_queue();
    let pending = config.queue.pending_path();
    let status = queue.status(&pending)?;

    if args.json {
        let output = json!({
            "pending": status.pending,
            "running": status.running,
            "done": status.done,
            "journal": status.journal,
            "files": {
                "pending": pending,
                "running": queue.paths().running,
                "done": queue.paths().done,
            }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Pending: {:>6}  ({})", status.pending, pending.display());
        println!("Running: {:>6}  ({})", status.running, queue.paths().running.display());
        println!("Done:    {:>6}  ({})", status.done, queue.paths().done.display());
        if status.journal > 0 {
            println!();
            println!(
                "{} interrupted transition(s) in the journal; run `fq recover`",
                status.journal
            );
        }
    }

    Ok(())
}
