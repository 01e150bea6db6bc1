//! Locked, durable file I/O for queue files
//!
//! - **File locking**: exclusive advisory locks on `<file>.lock`, released on drop
//! - **Atomic rewrite**: tmp file + fsync + rename for every in-place edit
//! - **Content hashing**: BLAKE3 fingerprints used by journal replay

pub mod atomic;
pub mod error;
pub mod hash;
pub mod lock;

// Re-export primary API
pub use error::QueueError;
pub use lock::{FileLock, LockPolicy};
