//! Durable write primitives for queue files
//!
//! Rewrites go through a sibling `.tmp` file that is fsynced and renamed over
//! the target, so readers never observe a half-written queue file. Appends
//! are fsynced before returning.

use crate::io::error::QueueError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary path used while rewriting `path` (`<file>.tmp`)
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a queue file as UTF-8 text
pub fn read_contents(path: &Path) -> Result<String, QueueError> {
    fs::read_to_string(path).map_err(|e| QueueError::io(path, e))
}

/// Read a queue file, treating a missing file as empty
pub fn read_contents_or_empty(path: &Path) -> Result<String, QueueError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(QueueError::io(path, e)),
    }
}

/// Replace the contents of `path` atomically
///
/// Writes to `<file>.tmp`, fsyncs, then renames over `path`.
pub fn replace_contents(path: &Path, content: &[u8]) -> Result<(), QueueError> {
    let tmp_path = tmp_path_for(path);

    {
        let mut tmp_file = fs::File::create(&tmp_path).map_err(|e| QueueError::io(&tmp_path, e))?;
        tmp_file
            .write_all(content)
            .map_err(|e| QueueError::io(&tmp_path, e))?;
        tmp_file
            .sync_all()
            .map_err(|e| QueueError::io(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        QueueError::io(path, e)
    })
}

/// Append bytes to `path`, creating it if absent, and fsync
pub fn append_contents(path: &Path, content: &[u8]) -> Result<(), QueueError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| QueueError::io(path, e))?;
    file.write_all(content).map_err(|e| QueueError::io(path, e))?;
    file.sync_all().map_err(|e| QueueError::io(path, e))
}

/// Truncate `path` to `len` bytes and fsync
pub fn truncate_to(path: &Path, len: u64) -> Result<(), QueueError> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| QueueError::io(path, e))?;
    file.set_len(len).map_err(|e| QueueError::io(path, e))?;
    file.sync_all().map_err(|e| QueueError::io(path, e))
}
