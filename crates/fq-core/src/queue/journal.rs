//! Write-ahead journal for pending → running → done transitions
//!
//! A transition touches two files. Before either is mutated, an entry
//! describing the move is written to the journal directory and fsynced; the
//! entry is deleted once both files are updated, while both locks are still
//! held. An entry that survives therefore belongs to a process that died
//! mid-transition, and [`replay`] finishes that move exactly once.
//!
//! # Directory Structure
//!
//! ```text
//! data/journal/
//!   <millis>-<uuid>.json   - in-flight or interrupted transitions
//!   failed/                - entries that could not be parsed
//! ```
//!
//! # Replay
//!
//! Each entry records the source content hash before the rewrite and the
//! destination length before the append:
//!
//! 1. Source hash unchanged → the line at `source_index` is removed
//! 2. Destination lacks the item at the recorded offset → any torn tail is
//!    truncated and the item appended
//!
//! Queue operations never mutate a file named by a surviving entry until the
//! entry is replayed, so these checks see exactly what the dead process left.

use crate::io::atomic::{append_contents, read_contents_or_empty, replace_contents, truncate_to};
use crate::io::error::QueueError;
use crate::io::hash::compute_hash;
use crate::queue::item::{split_lines, without_line};
use crate::queue::paths::FileRole;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which transition an entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// Pending → running
    Get,
    /// Running → done
    Done,
    /// Running → pending
    Requeue,
}

impl TransitionKind {
    /// Roles of the (source, destination) files
    pub fn roles(self) -> (FileRole, FileRole) {
        match self {
            TransitionKind::Get => (FileRole::Pending, FileRole::Running),
            TransitionKind::Done => (FileRole::Running, FileRole::Done),
            TransitionKind::Requeue => (FileRole::Running, FileRole::Pending),
        }
    }
}

/// One in-flight transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub kind: TransitionKind,
    /// Line as appended to the destination, `\n`-terminated
    pub item: String,
    pub source: PathBuf,
    /// Index of the moved line in the source before the rewrite
    pub source_index: usize,
    /// BLAKE3 hash of the source before the rewrite
    pub source_hash: String,
    pub destination: PathBuf,
    /// Destination length in bytes before the append
    pub destination_len: u64,
    /// ISO 8601 timestamp when the transition started
    pub created_at: String,
}

impl JournalEntry {
    pub fn new(
        kind: TransitionKind,
        item: String,
        source: PathBuf,
        source_index: usize,
        source_hash: String,
        destination: PathBuf,
        destination_len: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            item,
            source,
            source_index,
            source_hash,
            destination,
            destination_len,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// True if this entry reads or writes any of `files`
    pub fn involves(&self, files: &[&Path]) -> bool {
        files
            .iter()
            .any(|f| *f == self.source.as_path() || *f == self.destination.as_path())
    }
}

/// What replaying an entry had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayOutcome {
    pub source_rewritten: bool,
    pub destination_written: bool,
}

impl ReplayOutcome {
    /// Both halves were already on disk
    pub fn was_complete(&self) -> bool {
        !self.source_rewritten && !self.destination_written
    }
}

/// Summary of a recovery pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecoveryReport {
    /// Entries whose transition had to be finished
    pub replayed: usize,
    /// Entries whose transition was already fully applied
    pub already_complete: usize,
    /// Unparsable entries moved to `failed/`
    pub quarantined: usize,
}

/// Journal directory handle
#[derive(Debug, Clone)]
pub struct Journal {
    dir: PathBuf,
}

impl Journal {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn failed_dir(&self) -> PathBuf {
        self.dir.join("failed")
    }

    /// Durably record an entry; returns the entry file path
    pub fn record(&self, entry: &JournalEntry) -> Result<PathBuf, QueueError> {
        fs::create_dir_all(&self.dir).map_err(|e| QueueError::io(&self.dir, e))?;

        let millis = chrono::Utc::now().timestamp_millis();
        let path = self.dir.join(format!("{millis:013}-{}.json", entry.id));
        let content = serde_json::to_vec_pretty(entry).map_err(|e| QueueError::Json {
            path: path.clone(),
            source: e,
        })?;
        replace_contents(&path, &content)?;
        Ok(path)
    }

    /// Delete a finished entry
    pub fn clear(&self, path: &Path) -> Result<(), QueueError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(QueueError::io(path, e)),
        }
    }

    /// Entry files, oldest first
    pub fn entry_paths(&self) -> Result<Vec<PathBuf>, QueueError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(QueueError::io(&self.dir, e)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| QueueError::io(&self.dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Number of entries awaiting replay
    pub fn pending_count(&self) -> Result<usize, QueueError> {
        Ok(self.entry_paths()?.len())
    }

    /// Load one entry
    pub fn load(path: &Path) -> Result<JournalEntry, QueueError> {
        let content = fs::read(path).map_err(|e| QueueError::io(path, e))?;
        serde_json::from_slice(&content).map_err(|e| QueueError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// First surviving entry that touches any of `files`
    ///
    /// Unparsable entries are skipped here; recovery quarantines them.
    pub fn find_involving(&self, files: &[&Path]) -> Result<Option<PathBuf>, QueueError> {
        for path in self.entry_paths()? {
            match Self::load(&path) {
                Ok(entry) if entry.involves(files) => return Ok(Some(path)),
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(QueueError::Json { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Move an entry into `failed/`
    pub fn quarantine(&self, path: &Path) -> Result<PathBuf, QueueError> {
        let failed_dir = self.failed_dir();
        fs::create_dir_all(&failed_dir).map_err(|e| QueueError::io(&failed_dir, e))?;

        let file_name = path.file_name().ok_or_else(|| QueueError::Journal {
            message: format!("Invalid journal entry path: {path:?}"),
        })?;
        let failed_path = failed_dir.join(file_name);
        fs::rename(path, &failed_path).map_err(|e| QueueError::io(path, e))?;
        Ok(failed_path)
    }
}

/// Finish an interrupted transition
///
/// Caller must hold the locks of both the source and destination files.
/// An entry whose index or offset cannot address the files fails with
/// [`QueueError::Journal`] before either file is touched.
pub fn replay(entry: &JournalEntry) -> Result<ReplayOutcome, QueueError> {
    let mut outcome = ReplayOutcome::default();
    let (start, end) = destination_span(entry)?;

    let source = read_contents_or_empty(&entry.source)?;
    if compute_hash(source.as_bytes()) == entry.source_hash {
        let lines = split_lines(&source);
        if entry.source_index >= lines.len() {
            return Err(QueueError::Journal {
                message: format!(
                    "entry {} points past the end of {}",
                    entry.id,
                    entry.source.display()
                ),
            });
        }
        replace_contents(&entry.source, without_line(&lines, entry.source_index).as_bytes())?;
        outcome.source_rewritten = true;
    }

    let destination = match fs::read(&entry.destination) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(QueueError::io(&entry.destination, e)),
    };
    let applied = destination.len() >= end && &destination[start..end] == entry.item.as_bytes();
    if !applied {
        if destination.len() > start {
            truncate_to(&entry.destination, entry.destination_len)?;
        }
        append_contents(&entry.destination, entry.item.as_bytes())?;
        outcome.destination_written = true;
    }

    Ok(outcome)
}

/// Byte range the item occupies in the destination once appended
fn destination_span(entry: &JournalEntry) -> Result<(usize, usize), QueueError> {
    usize::try_from(entry.destination_len)
        .ok()
        .and_then(|start| Some((start, start.checked_add(entry.item.len())?)))
        .ok_or_else(|| QueueError::Journal {
            message: format!(
                "entry {} has destination offset {} out of range",
                entry.id, entry.destination_len
            ),
        })
}
