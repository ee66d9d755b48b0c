//! Copyright detection
//!
//! The pipeline only depends on [`CopyrightExtractor`]; the regex
//! implementation can be replaced without touching worker coordination.

pub mod copyright;

pub use copyright::{extract_copyrights, normalize, RegexCopyrightExtractor};

use crate::report::CopyrightRecord;

/// Extracts copyright notices from a raw buffer.
///
/// Must be deterministic: identical input yields identical records.
pub trait CopyrightExtractor: Send + Sync {
    fn extract(&self, content: &[u8]) -> Vec<CopyrightRecord>;
}
