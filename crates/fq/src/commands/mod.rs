//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use file_queue_core::config::{Config, ConfigOverrides, resolve_config};
use file_queue_core::home::get_home_dir;
use std::path::PathBuf;

mod add;
mod config_cmd;
mod done;
mod error;
mod get;
mod init;
mod list;
mod recover;
mod requeue;
mod status;

pub use error::CommandError;

/// fq - File-backed work queue
#[derive(Parser, Debug)]
#[command(
    name = "fq",
    version,
    about = "File-backed pending/running/done work queue",
    long_about = "Hand work items between scripts through plain text files guarded by advisory locks"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory holding running.txt, done.txt and journal/
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Pending file to add to or claim from
    #[arg(long, global = true)]
    pending: Option<PathBuf>,

    /// Retry lock acquisition this many times instead of blocking
    #[arg(long, global = true)]
    lock_retries: Option<u32>,

    /// Config file to use instead of .fq.toml discovery
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Resolve configuration from flags, env, config files and defaults
    pub fn resolve(&self) -> Result<Config> {
        let home_dir = get_home_dir()?;
        let current_dir = std::env::current_dir()?;
        let overrides = ConfigOverrides {
            data_dir: self.data_dir.clone(),
            pending: self.pending.clone(),
            lock_retries: self.lock_retries,
            config_path: self.config.clone(),
        };
        Ok(resolve_config(&overrides, &current_dir, &home_dir)?)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the data directory, queue files and journal
    Init(init::InitArgs),

    /// Append items to the pending file
    Add(add::AddArgs),

    /// Claim the next pending item
    Get(get::GetArgs),

    /// Mark a running item done
    Done(done::DoneArgs),

    /// Return a running item to the pending file
    Requeue(requeue::RequeueArgs),

    /// Show item counts per state
    Status(status::StatusArgs),

    /// Print the items in one queue file
    List(list::ListArgs),

    /// Finish transitions interrupted by a crash
    Recover(recover::RecoverArgs),

    /// Print the resolved configuration
    Config(config_cmd::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let config = self.global.resolve()?;
        match self.command {
            Commands::Init(args) => init::execute(args, &config),
            Commands::Add(args) => add::execute(args, &config),
            Commands::Get(args) => get::execute(args, &config),
            Commands::Done(args) => done::execute(args, &config),
            Commands::Requeue(args) => requeue::execute(args, &config),
            Commands::Status(args) => status::execute(args, &config),
            Commands::List(args) => list::execute(args, &config),
            Commands::Recover(args) => recover::execute(args, &config),
            Commands::Config(args) => config_cmd::execute(args, &config),
        }
    }
}
