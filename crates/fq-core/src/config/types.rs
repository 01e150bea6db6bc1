//! Configuration types

use crate::io::LockPolicy;
use crate::queue::{DEFAULT_DATA_DIR, FileQueue, QueuePaths};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Queue file locations
    #[serde(default)]
    pub queue: QueueConfig,
    /// Lock acquisition behavior
    #[serde(default)]
    pub lock: LockConfig,
}

/// Queue file locations
///
/// Unset fields fall back to the layout under `data_dir`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Directory holding running.txt, done.txt and journal/ (default: data)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Default pending file (default: <data_dir>/pending.txt)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PathBuf>,
    /// Running file override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<PathBuf>,
    /// Done file override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<PathBuf>,
}

impl QueueConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn pending_path(&self) -> PathBuf {
        self.pending
            .clone()
            .unwrap_or_else(|| self.data_dir().join("pending.txt"))
    }

    pub fn queue_paths(&self) -> QueuePaths {
        let mut paths = QueuePaths::in_dir(self.data_dir());
        if let Some(running) = &self.running {
            paths.running = running.clone();
        }
        if let Some(done) = &self.done {
            paths.done = done.clone();
        }
        paths
    }
}

/// Lock acquisition configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Retry count for backoff acquisition; unset means block until acquired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl LockConfig {
    pub fn policy(&self) -> LockPolicy {
        match self.max_retries {
            Some(max_retries) => LockPolicy::Backoff { max_retries },
            None => LockPolicy::Blocking,
        }
    }
}

impl Config {
    /// Build the queue this configuration describes
    pub fn file_queue(&self) -> FileQueue {
        FileQueue::new(self.queue.queue_paths()).with_lock_policy(self.lock.policy())
    }
}
