//! # Scan Engine
//!
//! - `config` — `ScanConfig`, `Threshold`, optional `licscan.toml`
//! - `file_index` — single-pass directory walk
//! - `producer` — sequential reader feeding the bounded queue
//! - `pipeline` — worker pool, per-file analysis, completion barrier
//! - `aggregate` — one report slot per enumerated file
//! - `single_file` — whole-file and chunked single-file analysis

pub mod aggregate;
pub mod config;
pub mod file_index;
pub mod pipeline;
pub mod producer;
pub mod single_file;

pub use config::{ScanConfig, Threshold, CONFIG_FILE_NAMES};
pub use file_index::FileIndex;
pub use producer::CancelToken;

use crate::detection::{CopyrightExtractor, RegexCopyrightExtractor};
use crate::license::{CorpusClassifier, MatchEngine};
use crate::report::{self, json, AggregateReport, FileReport};
use crate::{LicScanError, LicScanResult};
use std::path::Path;

// ─── Scanner ───────────────────────────────────────────────────────

/// Owns the match engine and the copyright extractor for the lifetime of
/// a scan session.
pub struct Scanner {
    config: ScanConfig,
    engine: Box<dyn MatchEngine>,
    extractor: Box<dyn CopyrightExtractor>,
}

impl Scanner {
    /// Load the corpus at `corpus_path` with `threshold` as a fraction in [0, 1].
    ///
    /// Fails before any scanning with `ThresholdRange` or `CorpusLoad`.
    pub fn configure(corpus_path: &Path, threshold: f64) -> LicScanResult<Self> {
        let config = ScanConfig {
            corpus_path: Some(corpus_path.to_path_buf()),
            threshold: Threshold::new(threshold)?,
            ..Default::default()
        };
        Self::from_config(config)
    }

    /// Build from a full configuration; `corpus_path` must be set
    pub fn from_config(config: ScanConfig) -> LicScanResult<Self> {
        config.validate()?;
        let corpus = config
            .corpus_path
            .clone()
            .ok_or_else(|| LicScanError::Config("no license corpus configured".into()))?;

        tracing::info!("Loading license corpus from {}", corpus.display());
        let classifier = CorpusClassifier::load(&corpus, config.threshold)?;
        tracing::info!(
            "  ✓ {} corpus entries (threshold {})",
            classifier.len(),
            config.threshold
        );

        Ok(Self::with_engine(Box::new(classifier), config))
    }

    /// Use a caller-supplied match engine; the engine's own threshold wins
    pub fn with_engine(engine: Box<dyn MatchEngine>, mut config: ScanConfig) -> Self {
        config.threshold = engine.threshold();
        Self {
            config,
            engine,
            extractor: Box::new(RegexCopyrightExtractor::new()),
        }
    }

    /// Replace the copyright extractor
    pub fn with_extractor(mut self, extractor: Box<dyn CopyrightExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn threshold(&self) -> Threshold {
        self.engine.threshold()
    }

    /// Set the confidence threshold from a percentage in [0, 100].
    ///
    /// Out-of-range input (or NaN) leaves the current threshold untouched.
    pub fn set_threshold(&mut self, percent: f64) -> LicScanResult<()> {
        let threshold = Threshold::from_percent(percent)?;
        self.engine.set_threshold(threshold);
        self.config.threshold = threshold;
        tracing::debug!("Threshold set to {}", threshold);
        Ok(())
    }

    // ─── Single File ───────────────────────────────────────────────

    /// Analyze one file. Read and size failures land in the report.
    pub fn analyze_file(&self, path: &Path, max_size_mb: Option<u64>, buffered: bool) -> FileReport {
        if buffered {
            single_file::analyze_chunked(
                self.engine.as_ref(),
                self.extractor.as_ref(),
                path,
                max_size_mb,
                self.config.read_chunk_mb,
            )
        } else {
            single_file::analyze_whole(
                self.engine.as_ref(),
                self.extractor.as_ref(),
                path,
                max_size_mb,
            )
        }
    }

    /// Analyze one file and render the report as JSON.
    ///
    /// Always returns a JSON document; a rendering failure yields
    /// `{"error": "..."}`.
    pub fn scan_file(&self, path: &Path, max_size_mb: Option<u64>, buffered: bool) -> String {
        let report = self.analyze_file(path, max_size_mb, buffered);
        match json::render_file(&report) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!("Failed to render report for {}: {}", path.display(), e);
                json::error_document(&e.to_string())
            }
        }
    }

    // ─── Directory Scan ────────────────────────────────────────────

    /// Scan `root` (file or directory) with `max_concurrency` workers
    pub fn scan_tree(
        &self,
        root: &Path,
        max_concurrency: usize,
        cancel: &CancelToken,
    ) -> LicScanResult<AggregateReport> {
        let config = ScanConfig {
            max_concurrency,
            ..self.config.clone()
        };
        config.validate()?;

        tracing::info!("═══════════════════════════════════════════════════════");
        tracing::info!("licscan: {}", root.display());
        tracing::info!("═══════════════════════════════════════════════════════");

        let index = FileIndex::build(root, config.follow_symlinks);
        pipeline::run_pipeline(
            &index,
            self.engine.as_ref(),
            self.extractor.as_ref(),
            &config,
            cancel,
        )
    }

    /// Scan `root` and write the aggregate report to `output`
    pub fn scan_path_to(
        &self,
        root: &Path,
        output: &Path,
        max_concurrency: usize,
    ) -> LicScanResult<AggregateReport> {
        let report = self.scan_tree(root, max_concurrency, &CancelToken::new())?;
        report::write_report(&report, output)?;
        tracing::info!("Report written to {}", output.display());
        Ok(report)
    }

    /// Scan `root` and persist the report; `true` when the report was written
    pub fn scan_path(&self, root: &Path, output: &Path, max_concurrency: usize) -> bool {
        match self.scan_path_to(root, output, max_concurrency) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Scan of {} failed: {}", root.display(), e);
                false
            }
        }
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("config", &self.config)
            .field("threshold", &self.engine.threshold())
            .finish_non_exhaustive()
    }
}
