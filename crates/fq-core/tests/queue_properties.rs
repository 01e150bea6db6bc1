//! End-to-end behavior of the pending/running/done queue

use file_queue_core::io::hash::compute_hash;
use file_queue_core::queue::journal::{Journal, JournalEntry, TransitionKind};
use file_queue_core::{AddMode, FileQueue, QueuePaths};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

struct Fixture {
    _temp_dir: TempDir,
    queue: FileQueue,
    pending: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        let queue = FileQueue::new(QueuePaths::in_dir(&data));
        queue.init().unwrap();
        let pending = data.join("pending.txt");
        fs::write(&pending, "").unwrap();
        Self {
            _temp_dir: temp_dir,
            queue,
            pending,
        }
    }

    fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn running(&self) -> String {
        self.read(&self.queue.paths().running)
    }

    fn done(&self) -> String {
        self.read(&self.queue.paths().done)
    }
}

#[test]
fn test_example_scenario() {
    let fx = Fixture::new();
    fs::write(&fx.pending, "job1\njob2\n").unwrap();

    let item = fx.queue.get(&fx.pending).unwrap();
    assert_eq!(item.as_deref(), Some("job1\n"));
    assert_eq!(fx.read(&fx.pending), "job2\n");
    assert_eq!(fx.running(), "job1\n");

    fx.queue.done("job1\n").unwrap();
    assert_eq!(fx.running(), "");
    assert_eq!(fx.done(), "job1\n");
}

#[test]
fn test_adds_on_empty_file_are_fifo() {
    let fx = Fixture::new();
    assert!(fx.queue.is_empty(&fx.pending).unwrap());

    for i in 0..5 {
        fx.queue
            .add(&fx.pending, &format!("item-{i}"), AddMode::Text)
            .unwrap();
    }
    assert!(!fx.queue.is_empty(&fx.pending).unwrap());

    for i in 0..5 {
        let item = fx.queue.get(&fx.pending).unwrap().unwrap();
        assert_eq!(item, format!("item-{i}\n"));
    }
    assert_eq!(fx.queue.get(&fx.pending).unwrap(), None);
}

#[test]
fn test_done_appends_and_preserves_other_running_lines() {
    let fx = Fixture::new();
    fs::write(&fx.queue.paths().done, "earlier\n").unwrap();
    for item in ["a", "b", "c", "d"] {
        fx.queue.add(&fx.pending, item, AddMode::Text).unwrap();
    }
    for _ in 0..4 {
        fx.queue.get(&fx.pending).unwrap();
    }

    fx.queue.done("c").unwrap();

    assert_eq!(fx.running(), "a\nb\nd\n");
    assert_eq!(fx.done(), "earlier\nc\n");
}

#[test]
fn test_concurrent_adds_never_interleave() {
    let fx = Fixture::new();
    let queue = Arc::new(fx.queue.clone());
    let pending = Arc::new(fx.pending.clone());
    let threads = 8;
    let per_thread = 25;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let queue = Arc::clone(&queue);
            let pending = Arc::clone(&pending);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    let item = format!("thread-{t}-item-{i}-{}", "x".repeat(64));
                    queue.add(&pending, &item, AddMode::Text).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let content = fx.read(&fx.pending);
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), threads * per_thread);

    let unique: HashSet<&str> = lines.iter().copied().collect();
    assert_eq!(unique.len(), threads * per_thread, "no line lost or duplicated");
    for line in &lines {
        assert!(line.starts_with("thread-") && line.ends_with(&"x".repeat(64)));
    }
}

#[test]
fn test_concurrent_consumers_claim_each_item_once() {
    let fx = Fixture::new();
    let total = 60;
    for i in 0..total {
        fx.queue
            .add(&fx.pending, &format!("job-{i}"), AddMode::Text)
            .unwrap();
    }

    let queue = Arc::new(fx.queue.clone());
    let pending = Arc::new(fx.pending.clone());
    let workers = 4;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let pending = Arc::clone(&pending);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut claimed = Vec::new();
                while let Some(item) = queue.get(&pending).unwrap() {
                    queue.done(&item).unwrap();
                    claimed.push(item);
                }
                claimed
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.join().unwrap());
    }

    assert_eq!(all.len(), total);
    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), total);
    assert_eq!(fx.read(&fx.pending), "");
    assert_eq!(fx.running(), "");
    assert_eq!(fx.done().lines().count(), total);
    assert_eq!(fx.queue.journal().pending_count().unwrap(), 0);
}

fn interrupted_get(fx: &Fixture, pending_before: &str, running_len: u64) -> PathBuf {
    let entry = JournalEntry::new(
        TransitionKind::Get,
        "job1\n".to_string(),
        fs::canonicalize(&fx.pending).unwrap(),
        0,
        compute_hash(pending_before.as_bytes()),
        fs::canonicalize(&fx.queue.paths().running).unwrap(),
        running_len,
    );
    Journal::new(fx.queue.paths().journal_dir.clone())
        .record(&entry)
        .unwrap()
}

#[test]
fn test_recover_crash_before_source_rewrite() {
    let fx = Fixture::new();
    fs::write(&fx.pending, "job1\njob2\n").unwrap();
    interrupted_get(&fx, "job1\njob2\n", 0);

    let report = fx.queue.recover().unwrap();

    assert_eq!(report.replayed, 1);
    assert_eq!(fx.read(&fx.pending), "job2\n");
    assert_eq!(fx.running(), "job1\n");
    assert_eq!(fx.queue.status(&fx.pending).unwrap().journal, 0);
}

#[test]
fn test_recover_crash_between_rewrite_and_append() {
    let fx = Fixture::new();
    fs::write(&fx.pending, "job2\n").unwrap();
    interrupted_get(&fx, "job1\njob2\n", 0);

    let report = fx.queue.recover().unwrap();

    assert_eq!(report.replayed, 1);
    assert_eq!(fx.read(&fx.pending), "job2\n");
    assert_eq!(fx.running(), "job1\n");
}

#[test]
fn test_recover_crash_after_both_writes() {
    let fx = Fixture::new();
    fs::write(&fx.pending, "job2\n").unwrap();
    fs::write(&fx.queue.paths().running, "job1\n").unwrap();
    interrupted_get(&fx, "job1\njob2\n", 0);

    let report = fx.queue.recover().unwrap();

    assert_eq!(report.already_complete, 1);
    assert_eq!(report.replayed, 0);
    assert_eq!(fx.read(&fx.pending), "job2\n");
    assert_eq!(fx.running(), "job1\n");
}

#[test]
fn test_next_operation_replays_interrupted_transition_first() {
    let fx = Fixture::new();
    fs::write(&fx.pending, "job1\njob2\n").unwrap();
    interrupted_get(&fx, "job1\njob2\n", 0);

    // The add must not touch pending until the interrupted get is finished
    fx.queue.add(&fx.pending, "job3", AddMode::Text).unwrap();
    assert_eq!(fx.read(&fx.pending), "job2\njob3\n");
    assert_eq!(fx.running(), "job1\n");

    let next = fx.queue.get(&fx.pending).unwrap();
    assert_eq!(next.as_deref(), Some("job2\n"));
    assert_eq!(fx.running(), "job1\njob2\n");
}

#[test]
fn test_unrelated_operation_leaves_entry_for_recover() {
    let fx = Fixture::new();
    fs::write(&fx.pending, "job1\n").unwrap();
    fs::write(&fx.queue.paths().running, "other\n").unwrap();
    interrupted_get(&fx, "job1\n", 6);

    let elsewhere = fx.pending.with_file_name("elsewhere.txt");
    fx.queue.add(&elsewhere, "x", AddMode::Text).unwrap();
    assert_eq!(fx.queue.status(&fx.pending).unwrap().journal, 1);

    fx.queue.recover().unwrap();
    assert_eq!(fx.running(), "other\njob1\n");
    assert_eq!(fx.read(&fx.pending), "");
}

#[test]
fn test_recover_quarantines_entry_with_impossible_offset() {
    let fx = Fixture::new();
    fs::write(&fx.pending, "job1\njob2\n").unwrap();
    interrupted_get(&fx, "job1\njob2\n", u64::MAX);

    let report = fx.queue.recover().unwrap();
    assert_eq!(report.quarantined, 1);
    assert_eq!(report.replayed, 0);
    assert_eq!(fx.read(&fx.pending), "job1\njob2\n");
    assert_eq!(fx.running(), "");

    fx.queue.add(&fx.pending, "job3", AddMode::Text).unwrap();
    assert_eq!(fx.queue.get(&fx.pending).unwrap().as_deref(), Some("job1\n"));
}
