//! Error types for queue file operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during queue operations
#[derive(Error, Debug)]
pub enum QueueError {
    /// Failed to acquire file lock after multiple retries
    #[error("Failed to acquire lock on {path} after {retries} retries")]
    LockTimeout { path: PathBuf, retries: u32 },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse or serialize a journal entry
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Item is not present in the running file
    #[error("Item not found in running file: {item:?}")]
    NotRunning { item: String },

    /// Queue file path cannot be used for this operation
    #[error("Invalid queue path: {path}")]
    InvalidPath { path: PathBuf },

    /// Item cannot be stored as a single queue line
    #[error("Invalid item: {reason}")]
    InvalidItem { reason: String },

    /// Transition journal error
    #[error("Journal error: {message}")]
    Journal { message: String },
}

impl QueueError {
    /// Wrap an I/O error with the path it occurred on
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        QueueError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True if this is an I/O error caused by a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            QueueError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
