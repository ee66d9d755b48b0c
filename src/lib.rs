//! # licscan — Concurrent License & Copyright Scanner
//!
//! Scans a file or a directory tree for embedded license text and copyright
//! notices, producing a per-file and aggregate report.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Scanner                             │
//! │  ┌──────────┐   ┌──────────┐   bounded    ┌───────────────┐  │
//! │  │FileIndex │──▶│ Producer │──▶ queue ───▶│ M workers     │  │
//! │  │(walkdir) │   │(1 thread)│  (backpress.)│ match engine  │  │
//! │  └──────────┘   └──────────┘              │ + copyright   │  │
//! │                                           └───────┬───────┘  │
//! │                                                   │          │
//! │  ┌────────────────────────────────────────────────▼───────┐  │
//! │  │ Aggregator (one slot per file, mutex merge)            │  │
//! │  │      → completion barrier → JSON report                │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Capabilities
//!
//! - **License matching**: pluggable [`MatchEngine`], with an askalono-backed
//!   corpus classifier as the default engine
//! - **Copyright extraction**: escape/glyph normalization followed by
//!   line-oriented notice and holder extraction with byte spans
//! - **Bounded pipeline**: sequential reader, bounded queue, fixed worker pool,
//!   exactly one report per enumerated file
//! - **Single-file mode**: whole-file or chunked (buffered) analysis

pub mod detection;
pub mod engine;
pub mod license;
pub mod report;

// Re-exports for convenience
pub use detection::{CopyrightExtractor, RegexCopyrightExtractor};
pub use engine::{CancelToken, ScanConfig, Scanner, Threshold};
pub use license::{CorpusClassifier, LicenseId, LicenseMatch, MatchEngine, MatchKind};
pub use report::{AggregateReport, CopyrightRecord, FileReport, LicenseRecord, SkippedEntry};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LicScanError {
    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("file exceeds maximum size of {limit_mb} MB: {path}")]
    SizeLimit { path: PathBuf, limit_mb: u64 },

    #[error("License corpus load failed: {0}")]
    CorpusLoad(String),

    #[error("threshold out of range: {0}")]
    ThresholdRange(f64),

    #[error("max concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("scan cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type LicScanResult<T> = Result<T, LicScanError>;
