//! License identity and the match-engine seam
//!
//! The scanner never matches license text itself: it hands raw bytes to a
//! [`MatchEngine`] and records whatever the engine returns, in order.
//! [`CorpusClassifier`] is the engine shipped with the crate.

pub mod classifier;

pub use classifier::*;

use crate::engine::Threshold;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── License Identity ───────────────────────────────────────────────

/// License identifier as named by the corpus (SPDX where the corpus uses SPDX names)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseId(pub String);

impl LicenseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Match Results ──────────────────────────────────────────────────

/// What kind of corpus entry produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Full license text
    License,
    /// Short license header / notice
    Header,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::License => write!(f, "license"),
            Self::Header => write!(f, "header"),
        }
    }
}

/// A single candidate license match reported by a [`MatchEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseMatch {
    pub license: LicenseId,
    /// Similarity in [threshold, 1.0]
    pub confidence: f64,
    pub kind: MatchKind,
    /// 1-based line of the first matched token
    pub start_line: usize,
    /// 1-based line of the last matched token
    pub end_line: usize,
    /// Index of the first matched token
    pub start_token: usize,
    /// Index one past the last matched token
    pub end_token: usize,
}

// ─── Engine Trait ───────────────────────────────────────────────────

/// License-similarity engine consulted once per analyzed buffer.
///
/// Implementations must be shareable across worker threads: `find_matches`
/// takes `&self` and is called concurrently.
pub trait MatchEngine: Send + Sync {
    /// Return every match at or above the current threshold, in engine order
    fn find_matches(&self, content: &[u8]) -> Vec<LicenseMatch>;

    /// Threshold currently applied to matches
    fn threshold(&self) -> Threshold;

    /// Replace the threshold used by subsequent calls
    fn set_threshold(&mut self, threshold: Threshold);
}
