//! File-backed work queue
//!
//! Work items move through three plain text files, one item per line:
//!
//! ```text
//! pending.txt ──get──▶ running.txt ──done──▶ done.txt
//!      ▲                    │
//!      └──────requeue───────┘
//! ```
//!
//! Producers append to any pending file with [`FileQueue::add`]; consumers
//! claim with [`FileQueue::get`] and finish with [`FileQueue::done`].
//!
//! # Example
//!
//! ```rust,no_run
//! use file_queue_core::queue::{AddMode, FileQueue, QueuePaths};
//! use std::path::Path;
//!
//! let queue = FileQueue::new(QueuePaths::in_dir("data"));
//! queue.init()?;
//!
//! let pending = Path::new("data/pending.txt");
//! queue.add(pending, "job1", AddMode::Text)?;
//!
//! if let Some(item) = queue.get(pending)? {
//!     // ... do the work ...
//!     queue.done(&item)?;
//! }
//! # Ok::<(), file_queue_core::io::QueueError>(())
//! ```

pub mod file_queue;
pub mod item;
pub mod journal;
pub mod paths;

pub use file_queue::{FileQueue, QueueStatus, is_empty};
pub use item::AddMode;
pub use journal::{RecoveryReport, TransitionKind};
pub use paths::{DEFAULT_DATA_DIR, FileRole, QueuePaths};
