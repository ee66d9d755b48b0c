//! Sequential producer — reads files in enumeration order into a bounded queue
//!
//! The queue is the backpressure point: when every slot is taken the
//! producer blocks until a worker frees one, so at most
//! `queue_capacity + max_concurrency` file buffers are alive at once.
//! Read failures travel inside the task; they never stop the producer.

use crate::{LicScanError, LicScanResult};
use crossbeam::channel::Sender;
use crossbeam::sync::WaitGroup;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub(crate) const BYTES_PER_MB: u64 = 1024 * 1024;

// ─── Cancellation ──────────────────────────────────────────────────

/// Shared cancellation flag checked by the producer and by every worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ─── File Task ─────────────────────────────────────────────────────

/// One file's worth of work, consumed by exactly one worker
#[derive(Debug)]
pub struct FileTask {
    /// Position in the enumeration (the aggregator slot)
    pub index: usize,
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub error: Option<String>,
    /// Completion-barrier token; released when the task is dropped
    pub(crate) done: Option<WaitGroup>,
}

impl FileTask {
    pub fn loaded(index: usize, path: PathBuf, content: Vec<u8>) -> Self {
        Self {
            index,
            path,
            content,
            error: None,
            done: None,
        }
    }

    pub fn failed(index: usize, path: PathBuf, error: &LicScanError) -> Self {
        Self {
            index,
            path,
            content: Vec::new(),
            error: Some(error.to_string()),
            done: None,
        }
    }

    fn with_token(mut self, token: WaitGroup) -> Self {
        self.done = Some(token);
        self
    }
}

// ─── Reading ───────────────────────────────────────────────────────

/// Fail with `SizeLimit` when `path` is larger than `limit_mb`
pub fn check_size(path: &Path, limit_mb: u64) -> LicScanResult<()> {
    let meta = std::fs::metadata(path).map_err(|e| LicScanError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if meta.len() > limit_mb.saturating_mul(BYTES_PER_MB) {
        return Err(LicScanError::SizeLimit {
            path: path.to_path_buf(),
            limit_mb,
        });
    }
    Ok(())
}

/// Read a whole file, honoring the optional size cap
pub fn read_file(path: &Path, max_size_mb: Option<u64>) -> LicScanResult<Vec<u8>> {
    if let Some(limit) = max_size_mb {
        check_size(path, limit)?;
    }
    std::fs::read(path).map_err(|e| LicScanError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Feed every path into `tx` in order, then close the stream by dropping it.
///
/// Each task carries a clone of `barrier`. Once cancelled, the remaining
/// paths are still sent (unread, with a cancellation error) so every path
/// gets a report.
pub fn produce(
    files: &[PathBuf],
    tx: Sender<FileTask>,
    max_size_mb: Option<u64>,
    cancel: &CancelToken,
    barrier: WaitGroup,
) {
    let mut sent = 0usize;
    for (index, path) in files.iter().enumerate() {
        let task = if cancel.is_cancelled() {
            FileTask::failed(index, path.clone(), &LicScanError::Cancelled)
        } else {
            match read_file(path, max_size_mb) {
                Ok(content) => FileTask::loaded(index, path.clone(), content),
                Err(e) => {
                    tracing::debug!("Read failed for {}: {}", path.display(), e);
                    FileTask::failed(index, path.clone(), &e)
                }
            }
        };

        if tx.send(task.with_token(barrier.clone())).is_err() {
            tracing::warn!(
                "All workers exited; {} of {} files not dispatched",
                files.len() - index,
                files.len()
            );
            break;
        }
        sent += 1;
    }
    tracing::debug!("Producer finished: {} tasks dispatched", sent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::bounded;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_produce_in_order_with_read_errors() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let missing = dir.path().join("missing.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "alpha").unwrap();
        fs::write(&b, "beta").unwrap();

        let files = vec![a.clone(), missing.clone(), b.clone()];
        let (tx, rx) = bounded(8);
        produce(&files, tx, None, &CancelToken::new(), WaitGroup::new());

        let tasks: Vec<FileTask> = rx.iter().collect();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].content, b"alpha");
        assert!(tasks[1].error.as_deref().unwrap().contains("missing.txt"));
        assert!(tasks[1].content.is_empty());
        assert_eq!(tasks[2].path, b);
        assert_eq!(
            tasks.iter().map(|t| t.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_size_limit_recorded_not_read() {
        let dir = TempDir::new().unwrap();
        let big = dir.path().join("big.bin");
        fs::write(&big, vec![b'x'; (BYTES_PER_MB + 1) as usize]).unwrap();

        let err = read_file(&big, Some(1)).unwrap_err();
        assert!(matches!(err, LicScanError::SizeLimit { limit_mb: 1, .. }));
        assert!(read_file(&big, Some(2)).is_ok());
    }

    #[test]
    fn test_cancelled_producer_still_emits_every_path() {
        let dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..4)
            .map(|i| {
                let p = dir.path().join(format!("{}.txt", i));
                fs::write(&p, "x").unwrap();
                p
            })
            .collect();

        let cancel = CancelToken::new();
        cancel.cancel();
        let (tx, rx) = bounded(8);
        produce(&files, tx, None, &cancel, WaitGroup::new());

        let tasks: Vec<FileTask> = rx.iter().collect();
        assert_eq!(tasks.len(), 4);
        assert!(tasks
            .iter()
            .all(|t| t.error.as_deref() == Some("scan cancelled")));
    }

    #[test]
    fn test_producer_blocks_on_full_queue() {
        let dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..6)
            .map(|i| {
                let p = dir.path().join(format!("{}.txt", i));
                fs::write(&p, "x").unwrap();
                p
            })
            .collect();

        let (tx, rx) = bounded(2);
        std::thread::scope(|s| {
            let handle = s.spawn(|| produce(&files, tx, None, &CancelToken::new(), WaitGroup::new()));
            std::thread::sleep(std::time::Duration::from_millis(50));
            // producer cannot run ahead of the queue
            assert!(rx.len() <= 2);
            assert!(!handle.is_finished());
            let drained: Vec<FileTask> = rx.iter().collect();
            assert_eq!(drained.len(), 6);
        });
    }
}
