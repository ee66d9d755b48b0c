//! License text identification backed by askalono
//!
//! The corpus is loaded into an `askalono::Store` and every buffer is run
//! through a `ScanStrategy` with bound optimization enabled, so a license
//! embedded in a larger file is reported with the lines it occupies. The
//! store's Sørensen–Dice score is the match confidence.
//!
//! Two corpus layouts are accepted:
//!  - SPDX license-list-data JSON (`*.json`), loaded with `Store::load_spdx`
//!  - plain texts, one license per file named by its stem (`MIT.txt`); a
//!    `.header` stem suffix (`Apache-2.0.header.txt`) marks a header entry

use super::{LicenseId, LicenseMatch, MatchEngine, MatchKind};
use crate::engine::Threshold;
use crate::{LicScanError, LicScanResult};
use askalono::{IdentifiedLicense, LicenseType, ScanStrategy, Store, TextData};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Corpus file stem suffix marking a header entry
const HEADER_SUFFIX: &str = ".header";

/// License classifier over an on-disk corpus
pub struct CorpusClassifier {
    store: Store,
    /// store name → reported identity, for plain-text corpus entries
    names: HashMap<String, (LicenseId, MatchKind)>,
    threshold: Threshold,
}

impl CorpusClassifier {
    /// Load the corpus under `dir`.
    ///
    /// Fails if the directory is missing, askalono rejects the SPDX data, a
    /// text cannot be read, or nothing usable was loaded.
    pub fn load(dir: &Path, threshold: Threshold) -> LicScanResult<Self> {
        if !dir.is_dir() {
            return Err(LicScanError::CorpusLoad(format!(
                "corpus directory not found: {}",
                dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                LicScanError::CorpusLoad(format!("failed to walk {}: {}", dir.display(), e))
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        let is_spdx = files
            .iter()
            .any(|p| p.extension().map_or(false, |ext| ext == "json"));

        let classifier = if is_spdx {
            let mut store = Store::new();
            store.load_spdx(dir, false).map_err(|e| {
                LicScanError::CorpusLoad(format!("failed to load SPDX data from {}: {}", dir.display(), e))
            })?;
            Self::from_store(store, HashMap::new(), threshold)?
        } else {
            let mut texts = Vec::new();
            for path in &files {
                let Some((name, id, kind)) = corpus_name(path) else {
                    continue;
                };
                let bytes = std::fs::read(path).map_err(|e| {
                    LicScanError::CorpusLoad(format!("failed to read {}: {}", path.display(), e))
                })?;
                texts.push((name, id, kind, String::from_utf8_lossy(&bytes).into_owned()));
            }
            Self::from_texts(texts, threshold)?
        };

        tracing::info!(
            "Loaded license corpus from {}: {} entries",
            dir.display(),
            classifier.len()
        );
        Ok(classifier)
    }

    /// Build a classifier from in-memory license texts.
    ///
    /// Each tuple is (store name, reported id, kind, text). Store names must
    /// be unique; reported ids may repeat (a license and its header).
    pub fn from_texts(
        texts: Vec<(String, LicenseId, MatchKind, String)>,
        threshold: Threshold,
    ) -> LicScanResult<Self> {
        let prepared: Vec<TextData> = texts
            .par_iter()
            .map(|(_, _, _, text)| TextData::from(text.as_str()))
            .collect();

        let mut store = Store::new();
        let mut names = HashMap::new();
        for ((name, id, kind, text), data) in texts.into_iter().zip(prepared) {
            if text.trim().is_empty() {
                tracing::warn!("Skipping empty corpus entry {}", name);
                continue;
            }
            store.add_license(name.clone(), data);
            names.insert(name, (id, kind));
        }

        Self::from_store(store, names, threshold)
    }

    fn from_store(
        store: Store,
        names: HashMap<String, (LicenseId, MatchKind)>,
        threshold: Threshold,
    ) -> LicScanResult<Self> {
        if store.is_empty() {
            return Err(LicScanError::CorpusLoad("no usable license texts in corpus".into()));
        }
        Ok(Self {
            store,
            names,
            threshold,
        })
    }

    /// Number of licenses loaded
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn identity(&self, license: &IdentifiedLicense) -> (LicenseId, MatchKind) {
        let name = license.name.to_string();
        if let Some(known) = self.names.get(&name) {
            return known.clone();
        }
        let kind = if matches!(license.kind, LicenseType::Header) {
            MatchKind::Header
        } else {
            MatchKind::License
        };
        (LicenseId::new(name), kind)
    }
}

impl MatchEngine for CorpusClassifier {
    fn find_matches(&self, content: &[u8]) -> Vec<LicenseMatch> {
        let text = String::from_utf8_lossy(content);
        if text.trim().is_empty() {
            return Vec::new();
        }

        let strategy = ScanStrategy::new(&self.store)
            .confidence_threshold(self.threshold.value() as f32)
            .optimize(true);

        let result = match strategy.scan(&TextData::from(&*text)) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("askalono scan failed: {}", e);
                return Vec::new();
            }
        };

        let offsets = TokenOffsets::new(&text);
        let mut matches: Vec<LicenseMatch> = result
            .containing
            .iter()
            .map(|c| self.to_match(&c.license, c.score, c.line_range, &offsets))
            .collect();

        // the whole buffer matched closely enough that no narrowing ran
        if matches.is_empty() {
            if let Some(license) = &result.license {
                matches.push(self.to_match(license, result.score, (0, offsets.lines()), &offsets));
            }
        }

        matches.sort_by_key(|m| m.start_line);
        matches
    }

    fn threshold(&self) -> Threshold {
        self.threshold
    }

    fn set_threshold(&mut self, threshold: Threshold) {
        self.threshold = threshold;
    }
}

impl CorpusClassifier {
    fn to_match(
        &self,
        license: &IdentifiedLicense,
        score: f32,
        line_range: (usize, usize),
        offsets: &TokenOffsets,
    ) -> LicenseMatch {
        let (id, kind) = self.identity(license);
        let (start, end) = line_range;
        let end = end.max(start + 1).min(offsets.lines().max(1));
        LicenseMatch {
            license: id,
            confidence: f64::from(score).min(1.0),
            kind,
            start_line: start + 1,
            end_line: end,
            start_token: offsets.before_line(start),
            end_token: offsets.before_line(end),
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Word counts per line, for turning askalono line ranges into token spans
struct TokenOffsets {
    /// `cumulative[i]` = words on lines `0..i`
    cumulative: Vec<usize>,
}

impl TokenOffsets {
    fn new(text: &str) -> Self {
        let mut cumulative = vec![0];
        let mut total = 0;
        for line in text.lines() {
            total += line.split_whitespace().count();
            cumulative.push(total);
        }
        Self { cumulative }
    }

    fn lines(&self) -> usize {
        self.cumulative.len() - 1
    }

    /// Words before 0-based line `line` (clamped to the text)
    fn before_line(&self, line: usize) -> usize {
        self.cumulative[line.min(self.lines())]
    }
}

/// Derive (store name, reported id, kind) from a corpus file name
fn corpus_name(path: &Path) -> Option<(String, LicenseId, MatchKind)> {
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || stem.starts_with('.') {
        return None;
    }
    match stem.strip_suffix(HEADER_SUFFIX) {
        Some(id) if !id.is_empty() => {
            Some((stem.to_string(), LicenseId::new(id), MatchKind::Header))
        }
        _ => Some((stem.to_string(), LicenseId::new(stem), MatchKind::License)),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
