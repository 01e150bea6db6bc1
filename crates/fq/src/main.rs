//! fq - File-backed work queue
//!
//! A thin CLI over pending/running/done text files, letting shell scripts
//! hand work items to each other with advisory file locks.

use clap::Parser;

mod commands;

use commands::{Cli, CommandError};

fn main() {
    file_queue_core::logging::init();
    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed command line");

    if let Err(e) = cli.execute() {
        if let Some(CommandError::QueueEmpty) = e.downcast_ref::<CommandError>() {
            std::process::exit(2);
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
