//! Worker pool — one producer, M analysis workers, one aggregator
//!
//! The producer reads files in enumeration order into a bounded channel.
//! Workers pull tasks, run the match engine and the copyright extractor,
//! and merge the result into the aggregator slot for that path. Every task
//! carries a barrier token; the coordinator waits for all tokens to be
//! released before finalizing.
//!
//! Analysis is panic-safe: a panic inside one file's analysis becomes an
//! error on that file's report and the worker moves on.

use super::aggregate::Aggregator;
use super::file_index::FileIndex;
use super::producer::{produce, CancelToken, FileTask};
use super::ScanConfig;
use crate::detection::CopyrightExtractor;
use crate::license::MatchEngine;
use crate::report::{AggregateReport, FileReport};
use crate::{LicScanError, LicScanResult};
use crossbeam::channel::{bounded, Receiver};
use crossbeam::sync::WaitGroup;
use sha2::{Digest, Sha256};
use std::any::Any;
use std::path::Path;
use std::time::Instant;

// ─── Per-file Analysis ─────────────────────────────────────────────

/// Run license matching and copyright extraction over one buffer
pub fn analyze_buffer(
    engine: &dyn MatchEngine,
    extractor: &dyn CopyrightExtractor,
    path: &Path,
    content: &[u8],
) -> FileReport {
    let mut report = FileReport::new(path);
    report.sha256 = Some(hex::encode(Sha256::digest(content)));
    report.add_matches(engine.find_matches(content));
    report.copyrights = extractor.extract(content);
    report
}

/// Analyze a buffer, turning a panic into an error report
pub fn analyze_guarded(
    engine: &dyn MatchEngine,
    extractor: &dyn CopyrightExtractor,
    path: &Path,
    content: &[u8],
) -> FileReport {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        analyze_buffer(engine, extractor, path, content)
    }));

    match result {
        Ok(report) => report,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("  ✗ Analysis of {} panicked: {}", path.display(), message);
            FileReport::failed(path, format!("analysis panicked: {}", message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn process_task(
    task: &FileTask,
    engine: &dyn MatchEngine,
    extractor: &dyn CopyrightExtractor,
    cancel: &CancelToken,
) -> FileReport {
    if let Some(error) = &task.error {
        return FileReport::failed(&task.path, error);
    }
    if cancel.is_cancelled() {
        return FileReport::failed(&task.path, LicScanError::Cancelled);
    }
    analyze_guarded(engine, extractor, &task.path, &task.content)
}

// ─── Workers ───────────────────────────────────────────────────────

fn worker_loop(
    id: usize,
    rx: Receiver<FileTask>,
    engine: &dyn MatchEngine,
    extractor: &dyn CopyrightExtractor,
    aggregator: &Aggregator,
    cancel: &CancelToken,
) {
    let mut handled = 0usize;
    for task in rx.iter() {
        let report = process_task(&task, engine, extractor, cancel);
        aggregator.merge(task.index, report);
        handled += 1;
        // dropping the task releases its barrier token
    }
    tracing::debug!("Worker {} exiting after {} files", id, handled);
}

/// Scan every path in `index` with `config.max_concurrency` workers.
///
/// Returns exactly one report per enumerated path, in enumeration order.
pub fn run_pipeline(
    index: &FileIndex,
    engine: &dyn MatchEngine,
    extractor: &dyn CopyrightExtractor,
    config: &ScanConfig,
    cancel: &CancelToken,
) -> LicScanResult<AggregateReport> {
    config.validate()?;

    let start = Instant::now();
    tracing::info!(
        "→ Scanning {} files ({} workers, queue {})",
        index.total_files(),
        config.max_concurrency,
        config.queue_capacity
    );

    let aggregator = Aggregator::new(index.total_files());
    let barrier = WaitGroup::new();
    let (tx, rx) = bounded::<FileTask>(config.queue_capacity);

    std::thread::scope(|s| {
        let producer_barrier = barrier.clone();
        let spawned = std::thread::Builder::new()
            .name("licscan-producer".into())
            .spawn_scoped(s, move || {
                produce(
                    &index.files,
                    tx,
                    config.max_file_size_mb,
                    cancel,
                    producer_barrier,
                )
            });
        if let Err(e) = spawned {
            tracing::error!("Failed to start producer: {}", e);
        }

        let mut workers = 0usize;
        for id in 0..config.max_concurrency {
            let rx = rx.clone();
            let aggregator = &aggregator;
            let spawned = std::thread::Builder::new()
                .name(format!("licscan-worker-{}", id))
                .spawn_scoped(s, move || {
                    worker_loop(id, rx, engine, extractor, aggregator, cancel)
                });
            match spawned {
                Ok(_) => workers += 1,
                Err(e) => tracing::error!("Failed to start worker {}: {}", id, e),
            }
        }
        drop(rx);

        if workers == 0 {
            tracing::error!("No workers running; unscanned files will carry errors");
        }

        barrier.wait();
    });

    let report = aggregator.finalize(
        &index.root,
        &index.files,
        index.skipped.clone(),
        start.elapsed(),
    );

    tracing::info!(
        "  ✓ Scan complete in {}ms ({} files, {} with errors, {} license matches, {} copyrights)",
        report.duration_ms,
        report.file_count,
        report.failed_files().count(),
        report.total_licenses(),
        report.total_copyrights()
    );

    Ok(report)
}
