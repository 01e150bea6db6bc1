//! Three-file work queue: pending → running → done

use crate::io::atomic::{self, append_contents, read_contents, replace_contents};
use crate::io::error::QueueError;
use crate::io::hash::compute_hash;
use crate::io::lock::{FileLock, LockPolicy, lock_file};
use crate::queue::item::{
    AddMode, find_line, split_lines, strip_terminator, validate_text_item, with_terminator,
    without_line,
};
use crate::queue::journal::{Journal, JournalEntry, RecoveryReport, TransitionKind, replay};
use crate::queue::paths::{FileRole, QueuePaths};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Line counts per queue state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QueueStatus {
    pub pending: usize,
    pub running: usize,
    pub done: usize,
    /// Journal entries left by interrupted transitions
    pub journal: usize,
}

/// Result of replaying a single journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryRecovery {
    Replayed,
    AlreadyComplete,
    Quarantined,
    Vanished,
}

/// Returns true iff `path` exists and has no content
///
/// Takes no lock. Fails with an I/O error if the file does not exist.
pub fn is_empty(path: &Path) -> Result<bool, QueueError> {
    Ok(read_contents(path)?.is_empty())
}

/// Pending/running/done work queue over plain text files
///
/// Each operation locks every file it touches for its whole duration, in
/// [`FileRole`] order, and journals two-file transitions so a crash can be
/// finished by [`FileQueue::recover`].
#[derive(Debug, Clone)]
pub struct FileQueue {
    paths: QueuePaths,
    journal: Journal,
    lock_policy: LockPolicy,
}

impl FileQueue {
    /// Queue over the given running/done/journal locations. Performs no I/O.
    pub fn new(paths: QueuePaths) -> Self {
        let journal = Journal::new(paths.journal_dir.clone());
        Self {
            paths,
            journal,
            lock_policy: LockPolicy::default(),
        }
    }

    pub fn with_lock_policy(mut self, lock_policy: LockPolicy) -> Self {
        self.lock_policy = lock_policy;
        self
    }

    pub fn paths(&self) -> &QueuePaths {
        &self.paths
    }

    pub fn lock_policy(&self) -> LockPolicy {
        self.lock_policy
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Create directories, the running and done files, and the journal dir
    ///
    /// Existing files are left untouched.
    pub fn init(&self) -> Result<(), QueueError> {
        for file in [&self.paths.running, &self.paths.done] {
            ensure_file(file)?;
        }
        fs::create_dir_all(&self.paths.journal_dir)
            .map_err(|e| QueueError::io(&self.paths.journal_dir, e))?;
        Ok(())
    }

    /// See [`is_empty`]
    pub fn is_empty(&self, path: &Path) -> Result<bool, QueueError> {
        is_empty(path)
    }

    /// Append an item to a pending file
    ///
    /// In [`AddMode::Text`] `elem` is appended as one line. In
    /// [`AddMode::File`] `elem` is a path whose contents are appended; a
    /// missing final newline is supplied. The pending file is created if
    /// absent.
    pub fn add(&self, pending: &Path, elem: &str, mode: AddMode) -> Result<(), QueueError> {
        let payload = match mode {
            AddMode::Text => {
                validate_text_item(elem)?;
                format!("{}\n", strip_terminator(elem))
            }
            AddMode::File => {
                let source = Path::new(elem);
                let content = read_contents(source)?;
                if content.is_empty() {
                    content
                } else {
                    with_terminator(&content)
                }
            }
        };

        let pending = self.resolve_pending(pending)?;
        loop {
            let guards = self.lock_ordered(&[(FileRole::Pending, pending.as_path())])?;
            let Some(_guards) = self.hold_if_clean(guards, &[pending.as_path()])? else {
                continue;
            };

            append_contents(&pending, payload.as_bytes())?;
            debug!(pending = %pending.display(), %mode, bytes = payload.len(), "added item");
            return Ok(());
        }
    }

    /// Claim the first pending item
    ///
    /// Removes the first line of `pending`, appends it to the running file,
    /// and returns it with its line terminator. Returns `None` when `pending`
    /// is empty.
    pub fn get(&self, pending: &Path) -> Result<Option<String>, QueueError> {
        let pending = self.resolve_pending(pending)?;
        let running = resolve_path(&self.paths.running)?;
        self.transition(TransitionKind::Get, &pending, &running, |lines| {
            if lines.is_empty() { None } else { Some(0) }
        })
    }

    /// Mark a running item complete
    ///
    /// Removes the first running line equal to `elem` (line terminators are
    /// ignored when comparing) and appends it to the done file. Returns the
    /// removed line. Fails with [`QueueError::NotRunning`] and changes
    /// nothing if no line matches.
    pub fn done(&self, elem: &str) -> Result<String, QueueError> {
        let running = resolve_path(&self.paths.running)?;
        let done = resolve_path(&self.paths.done)?;
        self.transition(TransitionKind::Done, &running, &done, |lines| find_line(lines, elem))?
            .ok_or_else(|| QueueError::NotRunning {
                item: strip_terminator(elem).to_string(),
            })
    }

    /// Return a running item to the end of a pending file
    ///
    /// Matching and errors follow [`FileQueue::done`].
    pub fn requeue(&self, elem: &str, pending: &Path) -> Result<String, QueueError> {
        let running = resolve_path(&self.paths.running)?;
        let pending = self.resolve_pending(pending)?;
        self.transition(TransitionKind::Requeue, &running, &pending, |lines| {
            find_line(lines, elem)
        })?
        .ok_or_else(|| QueueError::NotRunning {
            item: strip_terminator(elem).to_string(),
        })
    }

    /// Snapshot of a queue file's items, without line terminators
    pub fn list(&self, path: &Path) -> Result<Vec<String>, QueueError> {
        let content = read_contents(path)?;
        Ok(split_lines(&content)
            .into_iter()
            .map(|line| strip_terminator(line).to_string())
            .collect())
    }

    /// Unlocked snapshot of item counts; missing files count as empty
    pub fn status(&self, pending: &Path) -> Result<QueueStatus, QueueError> {
        let count = |path: &Path| -> Result<usize, QueueError> {
            Ok(split_lines(&atomic::read_contents_or_empty(path)?).len())
        };
        Ok(QueueStatus {
            pending: count(pending)?,
            running: count(&self.paths.running)?,
            done: count(&self.paths.done)?,
            journal: self.journal.pending_count()?,
        })
    }

    /// Finish every transition interrupted by a crash
    pub fn recover(&self) -> Result<RecoveryReport, QueueError> {
        let mut report = RecoveryReport::default();
        for path in self.journal.entry_paths()? {
            match self.recover_entry(&path)? {
                EntryRecovery::Replayed => report.replayed += 1,
                EntryRecovery::AlreadyComplete => report.already_complete += 1,
                EntryRecovery::Quarantined => report.quarantined += 1,
                EntryRecovery::Vanished => {}
            }
        }
        if report != RecoveryReport::default() {
            info!(
                replayed = report.replayed,
                already_complete = report.already_complete,
                quarantined = report.quarantined,
                "journal recovery finished"
            );
        }
        Ok(report)
    }

    /// Move one line from `source` to `destination` under both locks
    ///
    /// `select` picks the line index to move; `None` leaves both files
    /// untouched and is returned as-is.
    fn transition<F>(
        &self,
        kind: TransitionKind,
        source: &Path,
        destination: &Path,
        select: F,
    ) -> Result<Option<String>, QueueError>
    where
        F: Fn(&[&str]) -> Option<usize>,
    {
        let (source_role, destination_role) = kind.roles();
        loop {
            let guards =
                self.lock_ordered(&[(source_role, source), (destination_role, destination)])?;
            let Some(_guards) = self.hold_if_clean(guards, &[source, destination])? else {
                continue;
            };

            let content = read_contents(source)?;
            let lines = split_lines(&content);
            let Some(index) = select(&lines) else {
                return Ok(None);
            };
            let line = lines[index].to_string();

            let entry = JournalEntry::new(
                kind,
                with_terminator(&line),
                source.to_path_buf(),
                index,
                compute_hash(content.as_bytes()),
                destination.to_path_buf(),
                file_len(destination)?,
            );
            let entry_path = self.journal.record(&entry)?;

            replace_contents(source, without_line(&lines, index).as_bytes())?;
            append_contents(destination, entry.item.as_bytes())?;
            self.journal.clear(&entry_path)?;

            info!(
                kind = ?kind,
                item = strip_terminator(&line),
                from = %source.display(),
                to = %destination.display(),
                "moved item"
            );
            return Ok(Some(line));
        }
    }

    /// Acquire locks for `files` in role order
    fn lock_ordered(&self, files: &[(FileRole, &Path)]) -> Result<Vec<FileLock>, QueueError> {
        let mut ordered = files.to_vec();
        ordered.sort_by_key(|(role, _)| *role);

        let mut guards = Vec::with_capacity(ordered.len());
        for (_, path) in ordered {
            guards.push(lock_file(path, self.lock_policy)?);
        }
        Ok(guards)
    }

    /// Hand `guards` back if no surviving journal entry touches `files`.
    /// Otherwise release them, replay the entry, and return `None` so the
    /// caller relocks and retries.
    ///
    /// Entries are only ever written while both of their files are locked,
    /// so while `guards` are held any entry naming one of `files` was left by
    /// a dead process.
    fn hold_if_clean(
        &self,
        guards: Vec<FileLock>,
        files: &[&Path],
    ) -> Result<Option<Vec<FileLock>>, QueueError> {
        let Some(stale) = self.journal.find_involving(files)? else {
            return Ok(Some(guards));
        };
        drop(guards);
        warn!(entry = %stale.display(), "found interrupted transition, replaying");
        self.recover_entry(&stale)?;
        Ok(None)
    }

    fn recover_entry(&self, path: &Path) -> Result<EntryRecovery, QueueError> {
        let entry = match Journal::load(path) {
            Ok(entry) => entry,
            Err(e) if e.is_not_found() => return Ok(EntryRecovery::Vanished),
            Err(QueueError::Json { source, .. }) => {
                let failed = self.journal.quarantine(path)?;
                warn!(
                    entry = %failed.display(),
                    error = %source,
                    "quarantined corrupt journal entry"
                );
                return Ok(EntryRecovery::Quarantined);
            }
            Err(e) => return Err(e),
        };

        let (source_role, destination_role) = entry.kind.roles();
        let _guards = self.lock_ordered(&[
            (source_role, entry.source.as_path()),
            (destination_role, entry.destination.as_path()),
        ])?;

        // Another process may have replayed it while we waited for the locks
        if !path.exists() {
            return Ok(EntryRecovery::Vanished);
        }

        let outcome = match replay(&entry) {
            Ok(outcome) => outcome,
            Err(QueueError::Journal { message }) => {
                let failed = self.journal.quarantine(path)?;
                warn!(
                    entry = %failed.display(),
                    error = %message,
                    "quarantined unreplayable journal entry"
                );
                return Ok(EntryRecovery::Quarantined);
            }
            Err(e) => return Err(e),
        };
        self.journal.clear(path)?;
        warn!(
            kind = ?entry.kind,
            item = strip_terminator(&entry.item),
            source_rewritten = outcome.source_rewritten,
            destination_written = outcome.destination_written,
            "replayed journal entry"
        );

        if outcome.was_complete() {
            Ok(EntryRecovery::AlreadyComplete)
        } else {
            Ok(EntryRecovery::Replayed)
        }
    }

    /// Resolved pending path, rejecting aliases of running/done
    fn resolve_pending(&self, pending: &Path) -> Result<PathBuf, QueueError> {
        let pending = resolve_path(pending)?;
        if pending == resolve_path(&self.paths.running)?
            || pending == resolve_path(&self.paths.done)?
        {
            return Err(QueueError::InvalidPath { path: pending });
        }
        Ok(pending)
    }
}

/// Absolute path with symlinks and `..` resolved
///
/// Files that do not exist yet resolve through their parent directory, or
/// lexically when the parent is missing too. Two spellings of one file must
/// map to the same lock file.
fn resolve_path(path: &Path) -> Result<PathBuf, QueueError> {
    let absolute = std::path::absolute(path).map_err(|e| QueueError::io(path, e))?;
    match fs::canonicalize(&absolute) {
        Ok(resolved) => return Ok(resolved),
        Err(e) if e.kind() != ErrorKind::NotFound => return Err(QueueError::io(path, e)),
        Err(_) => {}
    }

    let normalized = normalize_lexically(&absolute);
    let (Some(parent), Some(name)) = (normalized.parent(), normalized.file_name()) else {
        return Ok(normalized);
    };
    match fs::canonicalize(parent) {
        Ok(parent) => Ok(parent.join(name)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(normalized),
        Err(e) => Err(QueueError::io(parent, e)),
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn file_len(path: &Path) -> Result<u64, QueueError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
        Err(e) => Err(QueueError::io(path, e)),
    }
}

fn ensure_file(path: &Path) -> Result<(), QueueError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| QueueError::io(parent, e))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| QueueError::io(path, e))
}
