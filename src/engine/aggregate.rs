//! Result aggregation — one slot per enumerated path
//!
//! Workers merge concurrently under a single lock. Slots are indexed by
//! enumeration position, so the final order never depends on completion
//! order and a path can never be reported twice.

use crate::report::{AggregateReport, FileReport, SkippedEntry};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error attached to a path that no worker ever reported
pub const MISSING_REPORT: &str = "no report produced";

pub struct Aggregator {
    slots: Mutex<Vec<Option<FileReport>>>,
}

impl Aggregator {
    pub fn new(file_count: usize) -> Self {
        Self {
            slots: Mutex::new(vec![None; file_count]),
        }
    }

    /// Store the report for slot `index`.
    ///
    /// Returns `false` (and keeps the first report) when the slot is out of
    /// range or already filled.
    pub fn merge(&self, index: usize, report: FileReport) -> bool {
        let mut slots = self.slots.lock();
        match slots.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(report);
                true
            }
            Some(Some(existing)) => {
                tracing::warn!(
                    "Duplicate report for {} rejected",
                    existing.path.display()
                );
                false
            }
            None => {
                tracing::warn!(
                    "Report for out-of-range slot {} rejected ({})",
                    index,
                    report.path.display()
                );
                false
            }
        }
    }

    pub fn merged(&self) -> usize {
        self.slots.lock().iter().filter(|s| s.is_some()).count()
    }

    /// Consume the aggregator into the final report.
    ///
    /// `files` is the enumeration the slots were created for; any slot still
    /// empty gets a failed report for its path.
    pub fn finalize(
        self,
        root: &Path,
        files: &[PathBuf],
        skipped: Vec<SkippedEntry>,
        elapsed: Duration,
    ) -> AggregateReport {
        let slots = self.slots.into_inner();
        let mut missing = 0usize;
        let files: Vec<FileReport> = slots
            .into_iter()
            .zip(files)
            .map(|(slot, path)| {
                slot.unwrap_or_else(|| {
                    missing += 1;
                    FileReport::failed(path.clone(), MISSING_REPORT)
                })
            })
            .collect();

        if missing > 0 {
            tracing::error!("{} files finished without a report", missing);
        }

        AggregateReport {
            root: root.to_path_buf(),
            file_count: files.len(),
            files,
            skipped,
            scanner_version: env!("CARGO_PKG_VERSION").to_string(),
            scanned_at: chrono::Utc::now().to_rfc3339(),
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("f{}.txt", i))).collect()
    }

    #[test]
    fn test_finalize_keeps_enumeration_order() {
        let files = paths(3);
        let agg = Aggregator::new(files.len());
        assert!(agg.merge(2, FileReport::new("f2.txt")));
        assert!(agg.merge(0, FileReport::new("f0.txt")));
        assert!(agg.merge(1, FileReport::new("f1.txt")));

        let report = agg.finalize(Path::new("."), &files, Vec::new(), Duration::ZERO);
        assert_eq!(report.file_count, 3);
        let order: Vec<_> = report.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(order, files);
        assert!(report.failed_files().next().is_none());
    }

    #[test]
    fn test_duplicate_merge_rejected() {
        let agg = Aggregator::new(1);
        let mut first = FileReport::new("f0.txt");
        first.scan_errors.push("first".into());
        assert!(agg.merge(0, first));
        assert!(!agg.merge(0, FileReport::new("f0.txt")));
        assert!(!agg.merge(5, FileReport::new("nope.txt")));
        assert_eq!(agg.merged(), 1);

        let report = agg.finalize(Path::new("."), &paths(1), Vec::new(), Duration::ZERO);
        assert_eq!(report.files[0].scan_errors, vec!["first"]);
    }

    #[test]
    fn test_missing_slots_become_errors() {
        let files = paths(2);
        let agg = Aggregator::new(2);
        agg.merge(0, FileReport::new("f0.txt"));

        let report = agg.finalize(Path::new("."), &files, Vec::new(), Duration::ZERO);
        assert_eq!(report.file_count, 2);
        assert_eq!(report.files[1].path, PathBuf::from("f1.txt"));
        assert_eq!(report.files[1].scan_errors, vec![MISSING_REPORT]);
    }

    #[test]
    fn test_concurrent_merges() {
        let files = paths(500);
        let agg = Aggregator::new(files.len());
        std::thread::scope(|s| {
            for t in 0..4 {
                let agg = &agg;
                let files = &files;
                s.spawn(move || {
                    for i in (t..files.len()).step_by(4) {
                        assert!(agg.merge(i, FileReport::new(files[i].clone())));
                    }
                });
            }
        });
        assert_eq!(agg.merged(), 500);
    }
}
