//! Core library for file-queue (fq)
//!
//! A work queue kept in three plain text files (pending, running, done),
//! one item per line, guarded by advisory lock files so cooperating
//! processes on one host can share it safely.
//!
//! Transitions between files are journaled, so a process that dies halfway
//! through moving an item leaves a record that [`queue::FileQueue::recover`]
//! (or the next operation touching those files) completes.

pub mod config;
pub mod home;
pub mod io;
pub mod logging;
pub mod queue;

pub use io::{LockPolicy, QueueError};
pub use queue::{AddMode, FileQueue, QueuePaths, QueueStatus, RecoveryReport};
