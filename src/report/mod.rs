//! Report model and output
//!
//! `FileReport` is produced once per analyzed file; `AggregateReport` holds
//! one `FileReport` per enumerated path in enumeration order.

pub mod json;

use crate::license::{LicenseMatch, MatchKind};
use crate::{LicScanError, LicScanResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ─── Per-file Records ──────────────────────────────────────────────

/// One license match as recorded in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub key: String,
    pub score: f64,
    pub match_kind: MatchKind,
    pub start_line: usize,
    pub end_line: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl From<LicenseMatch> for LicenseRecord {
    fn from(m: LicenseMatch) -> Self {
        Self {
            key: m.license.0,
            score: m.confidence,
            match_kind: m.kind,
            start_line: m.start_line,
            end_line: m.end_line,
            start_index: m.start_token,
            end_index: m.end_token,
        }
    }
}

/// A copyright notice and its holder, with byte spans into the normalized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyrightRecord {
    pub notice: String,
    pub holder: String,
    pub notice_start: usize,
    pub notice_end: usize,
    pub holder_start: usize,
    pub holder_end: usize,
}

impl CopyrightRecord {
    /// Move all spans by `offset` bytes (chunked scans)
    pub fn shifted(mut self, offset: usize) -> Self {
        self.notice_start += offset;
        self.notice_end += offset;
        self.holder_start += offset;
        self.holder_end += offset;
        self
    }
}

/// Everything found in one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub licenses: Vec<LicenseRecord>,
    /// Raw license identifiers, one per match, in match order
    pub license_expressions: Vec<String>,
    pub copyrights: Vec<CopyrightRecord>,
    pub scan_errors: Vec<String>,
    /// SHA-256 of the analyzed content (absent when the file was not read)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// A report that only carries an error; matches and copyrights stay empty
    pub fn failed(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        let mut report = Self::new(path);
        report.scan_errors.push(error.to_string());
        report
    }

    /// Append matches in engine order, recording identifiers alongside
    pub fn add_matches(&mut self, matches: Vec<LicenseMatch>) {
        for m in matches {
            self.license_expressions.push(m.license.0.clone());
            self.licenses.push(LicenseRecord::from(m));
        }
    }

    /// Record an error, discarding any partial findings
    pub fn record_error(&mut self, error: impl ToString) {
        self.licenses.clear();
        self.license_expressions.clear();
        self.copyrights.clear();
        self.scan_errors.push(error.to_string());
    }

    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

// ─── Aggregate ─────────────────────────────────────────────────────

/// A traversal entry that could not be enumerated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: Option<PathBuf>,
    pub reason: String,
}

/// Consolidated result of a directory scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub root: PathBuf,
    pub file_count: usize,
    pub files: Vec<FileReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
    pub scanner_version: String,
    pub scanned_at: String,
    pub duration_ms: u64,
}

impl AggregateReport {
    /// Files whose error list is non-empty
    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.has_errors())
    }

    pub fn total_licenses(&self) -> usize {
        self.files.iter().map(|f| f.licenses.len()).sum()
    }

    pub fn total_copyrights(&self) -> usize {
        self.files.iter().map(|f| f.copyrights.len()).sum()
    }
}

/// Write an aggregate report as JSON to `output`
pub fn write_report(report: &AggregateReport, output: &Path) -> LicScanResult<()> {
    let content = json::render(report)?;
    std::fs::write(output, content).map_err(LicScanError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::LicenseId;

    fn sample_match(id: &str, start: usize) -> LicenseMatch {
        LicenseMatch {
            license: LicenseId::new(id),
            confidence: 0.9,
            kind: MatchKind::License,
            start_line: 1,
            end_line: 3,
            start_token: start,
            end_token: start + 10,
        }
    }

    #[test]
    fn test_add_matches_preserves_order_and_duplicates() {
        let mut report = FileReport::new("a.txt");
        report.add_matches(vec![
            sample_match("MIT", 0),
            sample_match("Apache-2.0", 20),
            sample_match("MIT", 40),
        ]);
        assert_eq!(report.license_expressions, vec!["MIT", "Apache-2.0", "MIT"]);
        assert_eq!(report.licenses[2].start_index, 40);
        assert_eq!(report.licenses[1].key, "Apache-2.0");
    }

    #[test]
    fn test_record_error_clears_findings() {
        let mut report = FileReport::new("a.txt");
        report.add_matches(vec![sample_match("MIT", 0)]);
        report.record_error("boom");
        assert!(report.licenses.is_empty());
        assert!(report.license_expressions.is_empty());
        assert_eq!(report.scan_errors, vec!["boom"]);
    }

    #[test]
    fn test_shifted_copyright() {
        let record = CopyrightRecord {
            notice: "Copyright 2020 A".into(),
            holder: "2020 A".into(),
            notice_start: 0,
            notice_end: 16,
            holder_start: 10,
            holder_end: 16,
        }
        .shifted(100);
        assert_eq!(record.notice_start, 100);
        assert_eq!(record.holder_end, 116);
    }
}
