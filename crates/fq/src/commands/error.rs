//! Error types for command execution

use thiserror::Error;

/// Command execution errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// `get` found nothing to claim; exits with status 2 without a message
    #[error("Queue is empty")]
    QueueEmpty,

    /// Unknown queue file name for `list`
    #[error("Unknown queue file '{0}' (expected pending, running, or done)")]
    UnknownState(String),
}
