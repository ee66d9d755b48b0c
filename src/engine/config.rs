//! Scan configuration — explicit values owned by a `Scanner`
//!
//! Loaded from `licscan.toml` / `.licscan.toml` when present, otherwise
//! built from defaults and command-line overrides.

use crate::{LicScanError, LicScanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Config file names looked up by [`ScanConfig::from_project_root`], in order
pub const CONFIG_FILE_NAMES: &[&str] = &["licscan.toml", ".licscan.toml"];

// ─── Threshold ─────────────────────────────────────────────────────

/// Match-engine confidence threshold, always a fraction in [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(0.8);

    /// Build from a fraction; rejects NaN and anything outside [0, 1]
    pub fn new(fraction: f64) -> LicScanResult<Self> {
        if fraction.is_finite() && (0.0..=1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(LicScanError::ThresholdRange(fraction))
        }
    }

    /// Build from a percentage in [0, 100]
    pub fn from_percent(percent: f64) -> LicScanResult<Self> {
        if percent.is_finite() && (0.0..=100.0).contains(&percent) {
            Ok(Self(percent / 100.0))
        } else {
            Err(LicScanError::ThresholdRange(percent))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Threshold {
    type Error = LicScanError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> f64 {
        t.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// ─── Scan Configuration ────────────────────────────────────────────

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory holding the license corpus
    pub corpus_path: Option<PathBuf>,
    /// Minimum match confidence (0.0-1.0)
    pub threshold: Threshold,
    /// Number of worker threads analyzing files concurrently
    pub max_concurrency: usize,
    /// Slots in the producer → worker queue
    pub queue_capacity: usize,
    /// Files larger than this many MB are not read
    pub max_file_size_mb: Option<u64>,
    /// Chunk size for buffered single-file scans, in MB
    pub read_chunk_mb: u64,
    /// Follow symbolic links while walking directories
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            corpus_path: None,
            threshold: Threshold::DEFAULT,
            max_concurrency: num_cpus::get().max(1),
            queue_capacity: 5,
            max_file_size_mb: None,
            read_chunk_mb: 1,
            follow_symlinks: false,
        }
    }
}

impl ScanConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> LicScanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LicScanError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: ScanConfig = toml::from_str(&content).map_err(|e| {
            LicScanError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Try the known config file names under `root`, fall back to defaults
    pub fn from_project_root(root: &Path) -> Self {
        for name in CONFIG_FILE_NAMES {
            let path = root.join(name);
            if !path.is_file() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}; using defaults", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Reject settings that would stall or disable the pipeline
    pub fn validate(&self) -> LicScanResult<()> {
        if self.max_concurrency == 0 {
            return Err(LicScanError::InvalidConcurrency(0));
        }
        if self.queue_capacity == 0 {
            return Err(LicScanError::Config("queue_capacity must be at least 1".into()));
        }
        if self.read_chunk_mb == 0 {
            return Err(LicScanError::Config("read_chunk_mb must be at least 1".into()));
        }
        Ok(())
    }
}
