//! JSON report renderer

use super::{AggregateReport, FileReport};
use crate::LicScanResult;

/// Render an aggregate report as pretty-printed JSON
pub fn render(report: &AggregateReport) -> LicScanResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render a single file report as compact JSON
pub fn render_file(report: &FileReport) -> LicScanResult<String> {
    Ok(serde_json::to_string(report)?)
}

/// Error document returned in place of a report that could not be rendered
pub fn error_document(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
