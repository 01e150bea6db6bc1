//! Init command implementation

use anyhow::Result;
use clap::Args;
use file_queue_core::config::Config;
use std::fs::OpenOptions;

/// Create the queue layout
#[derive(Args, Debug)]
pub struct InitArgs {}

/// Execute the init command
pub fn execute(_args: InitArgs, config: &Config) -> Result<()> {
    let queue = config.file_queue();
    queue.init()?;

    // Pending may live outside the data dir
    let pending = config.queue.pending_path();
    if let Some(parent) = pending.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(&pending)?;

    println!("Initialized queue in {}", config.queue.data_dir().display());
    Ok(())
}
