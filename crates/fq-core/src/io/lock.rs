//! Advisory file locking for queue files
//!
//! Every queue file `foo.txt` is guarded by a sibling lock file
//! `foo.txt.lock`. Locks are exclusive, advisory, and held by a [`FileLock`]
//! guard that releases on drop, so no exit path can leak a held lock.

use crate::io::error::QueueError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// How lock acquisition behaves when another process holds the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    /// Block the calling thread until the lock is available
    #[default]
    Blocking,
    /// Retry non-blocking acquisition with exponential backoff
    Backoff { max_retries: u32 },
}

/// File lock guard that automatically releases on drop
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Path of the lock file this guard holds
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock too; unlock explicitly so the
        // release is visible before the file is dropped.
        let _ = FileExt::unlock(&self.file);
        debug!(lock = %self.path.display(), "released lock");
    }
}

/// Lock file path for a queue file (`<file>.lock`)
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

/// Acquire an exclusive lock guarding `target` according to `policy`
pub fn lock_file(target: &Path, policy: LockPolicy) -> Result<FileLock, QueueError> {
    let lock_path = lock_path_for(target);
    match policy {
        LockPolicy::Blocking => acquire_blocking(&lock_path),
        LockPolicy::Backoff { max_retries } => acquire_lock(&lock_path, max_retries),
    }
}

fn open_lock_file(path: &Path) -> Result<File, QueueError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| QueueError::io(path, e))
}

/// Acquire an exclusive lock, blocking until it is available
pub fn acquire_blocking(path: &Path) -> Result<FileLock, QueueError> {
    let file = open_lock_file(path)?;
    file.lock_exclusive().map_err(|e| QueueError::io(path, e))?;
    debug!(lock = %path.display(), "acquired lock");
    Ok(FileLock {
        file,
        path: path.to_path_buf(),
    })
}

/// Acquire an exclusive lock on a file with backoff retry
///
/// Attempts to acquire a lock with exponential backoff:
/// - Attempt 0: No wait
/// - Attempt 1: 50ms wait
/// - Attempt 2: 100ms wait
/// - Attempt 3: 200ms wait
/// - Attempt 4: 400ms wait
/// - Attempt 5: 800ms wait
///
/// Returns `QueueError::LockTimeout` if unable to acquire lock after all retries.
pub fn acquire_lock(path: &Path, max_retries: u32) -> Result<FileLock, QueueError> {
    let file = open_lock_file(path)?;

    for attempt in 0..=max_retries {
        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(lock = %path.display(), attempt, "acquired lock");
                return Ok(FileLock {
                    file,
                    path: path.to_path_buf(),
                });
            }
            Err(e) if is_contended(&e) => {
                if attempt < max_retries {
                    let wait_ms = 50u64 * (1 << attempt.min(10));
                    std::thread::sleep(Duration::from_millis(wait_ms));
                }
            }
            Err(e) => return Err(QueueError::io(path, e)),
        }
    }

    Err(QueueError::LockTimeout {
        path: path.to_path_buf(),
        retries: max_retries,
    })
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_appends_suffix() {
        let path = Path::new("data/running.txt");
        assert_eq!(lock_path_for(path), PathBuf::from("data/running.txt.lock"));
    }

    #[test]
    fn test_lock_file_creates_lock_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("pending.txt");

        let lock = lock_file(&target, LockPolicy::Blocking).unwrap();
        assert!(temp_dir.path().join("pending.txt.lock").exists());
        assert_eq!(lock.path(), temp_dir.path().join("pending.txt.lock"));
        // The target itself is untouched
        assert!(!target.exists());
    }

    #[test]
    fn test_lock_auto_release() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("test.lock");

        {
            let _lock = acquire_lock(&lock_path, 0).unwrap();
        }

        // Zero retries: only succeeds if the previous guard released
        let _lock2 = acquire_lock(&lock_path, 0).unwrap();
    }

    #[test]
    fn test_blocking_waits_for_holder() {
        let temp_dir = TempDir::new().unwrap();
        let target = Arc::new(temp_dir.path().join("running.txt"));
        let barrier = Arc::new(Barrier::new(2));

        let target_clone = Arc::clone(&target);
        let barrier_clone = Arc::clone(&barrier);
        let holder = thread::spawn(move || {
            let _lock = lock_file(&target_clone, LockPolicy::Blocking).unwrap();
            barrier_clone.wait();
            thread::sleep(Duration::from_millis(100));
        });

        barrier.wait();
        let started = std::time::Instant::now();
        let _lock = lock_file(&target, LockPolicy::Blocking).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));

        holder.join().unwrap();
    }

    #[test]
    fn test_acquire_lock_concurrent_backoff() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = Arc::new(temp_dir.path().join("test.lock"));
        let barrier = Arc::new(Barrier::new(2));

        let lock_path_clone = Arc::clone(&lock_path);
        let barrier_clone = Arc::clone(&barrier);

        let handle1 = thread::spawn(move || {
            let _lock = acquire_lock(&lock_path_clone, 5).unwrap();
            barrier_clone.wait();
            thread::sleep(Duration::from_millis(100));
        });

        let handle2 = thread::spawn(move || {
            barrier.wait();
            acquire_lock(&lock_path, 5).is_ok()
        });

        handle1.join().unwrap();
        assert!(handle2.join().unwrap());
    }

    #[test]
    fn test_acquire_lock_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = Arc::new(temp_dir.path().join("test.lock"));
        let barrier = Arc::new(Barrier::new(2));

        let lock_path_clone = Arc::clone(&lock_path);
        let barrier_clone = Arc::clone(&barrier);
        let handle1 = thread::spawn(move || {
            let _lock = acquire_lock(&lock_path_clone, 5).unwrap();
            barrier_clone.wait();
            thread::sleep(Duration::from_secs(1));
        });

        barrier.wait();
        let result = acquire_lock(&lock_path, 2);
        assert!(matches!(result, Err(QueueError::LockTimeout { retries: 2, .. })));

        handle1.join().unwrap();
    }
}
