//! Recover command implementation

use anyhow::Result;
use clap::Args;
use file_queue_core::config::Config;

/// Replay the transition journal
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the recover command
pub fn execute(args: RecoverArgs, config: &Config) -> Result<()> {
    let report = config.file_queue().recover()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Replayed {}, already complete {}, quarantined {}",
            report.replayed, report.already_complete, report.quarantined
        );
    }
    Ok(())
}
