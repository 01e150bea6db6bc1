//! Queue file locations and lock ordering

use std::path::{Path, PathBuf};

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Role a file plays in the queue
///
/// Roles are ordered: transitions acquire locks in ascending role order so
/// two transitions can never wait on each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileRole {
    Pending,
    Running,
    Done,
}

/// Well-known shared locations for queue state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePaths {
    /// Items currently claimed by a consumer
    pub running: PathBuf,
    /// Append-only log of completed items
    pub done: PathBuf,
    /// Write-ahead journal for in-flight transitions
    pub journal_dir: PathBuf,
}

impl QueuePaths {
    /// Standard layout inside `dir`: `running.txt`, `done.txt`, `journal/`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            running: dir.join("running.txt"),
            done: dir.join("done.txt"),
            journal_dir: dir.join("journal"),
        }
    }
}

impl Default for QueuePaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_matches_legacy_paths() {
        let paths = QueuePaths::default();
        assert_eq!(paths.running, PathBuf::from("data/running.txt"));
        assert_eq!(paths.done, PathBuf::from("data/done.txt"));
        assert_eq!(paths.journal_dir, PathBuf::from("data/journal"));
    }

    #[test]
    fn test_role_order() {
        assert!(FileRole::Pending < FileRole::Running);
        assert!(FileRole::Running < FileRole::Done);
    }
}
