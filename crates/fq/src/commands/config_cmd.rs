//! Config command implementation

use anyhow::Result;
use clap::Args;
use file_queue_core::config::Config;

/// Print the resolved configuration as TOML
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Execute the config command
pub fn execute(_args: ConfigArgs, config: &Config) -> Result<()> {
    let mut resolved = config.clone();
    let paths = config.queue.queue_paths();
    resolved.queue.data_dir = Some(config.queue.data_dir());
    resolved.queue.pending = Some(config.queue.pending_path());
    resolved.queue.running = Some(paths.running);
    resolved.queue.done = Some(paths.done);

    print!("{}", toml::to_string(&resolved)?);
    Ok(())
}
