//! Single-file analysis, whole or chunked
//!
//! Chunked mode bounds memory to one chunk. Copyright spans are shifted by
//! the normalized length of the preceding chunks, so they index the same
//! normalized text a whole-file scan produces. Match lines are shifted to
//! file lines; token indices stay relative to their chunk. Notices or
//! license texts straddling a chunk boundary may be missed.

use super::pipeline::analyze_guarded;
use super::producer::{check_size, read_file, BYTES_PER_MB};
use crate::detection::{normalize, CopyrightExtractor};
use crate::license::MatchEngine;
use crate::report::FileReport;
use crate::LicScanError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Read the whole file into memory and analyze it once
pub fn analyze_whole(
    engine: &dyn MatchEngine,
    extractor: &dyn CopyrightExtractor,
    path: &Path,
    max_size_mb: Option<u64>,
) -> FileReport {
    match read_file(path, max_size_mb) {
        Ok(content) => analyze_guarded(engine, extractor, path, &content),
        Err(e) => FileReport::failed(path, e),
    }
}

/// Analyze `path` in consecutive chunks of `chunk_mb` MiB
pub fn analyze_chunked(
    engine: &dyn MatchEngine,
    extractor: &dyn CopyrightExtractor,
    path: &Path,
    max_size_mb: Option<u64>,
    chunk_mb: u64,
) -> FileReport {
    if let Some(limit) = max_size_mb {
        if let Err(e) = check_size(path, limit) {
            return FileReport::failed(path, e);
        }
    }

    let read_error = |e: std::io::Error| LicScanError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => return FileReport::failed(path, read_error(e)),
    };

    let chunk_bytes = chunk_mb.max(1).saturating_mul(BYTES_PER_MB);
    let mut reader = BufReader::new(file);
    let mut report = FileReport::new(path);
    let mut hasher = Sha256::new();
    let mut byte_offset = 0usize;
    let mut normalized_offset = 0usize;
    let mut line_offset = 0usize;
    let mut chunk = Vec::new();
    let mut chunks = 0usize;

    loop {
        chunk.clear();
        if let Err(e) = reader.by_ref().take(chunk_bytes).read_to_end(&mut chunk) {
            report.record_error(read_error(e));
            report.sha256 = None;
            return report;
        }
        if chunk.is_empty() {
            break;
        }
        chunks += 1;
        hasher.update(&chunk);

        let part = analyze_guarded(engine, extractor, path, &chunk);
        if part.has_errors() {
            report.record_error(part.scan_errors.join("; "));
            return report;
        }

        let matches = part.licenses.len();
        report.license_expressions.extend(part.license_expressions);
        report
            .licenses
            .extend(part.licenses.into_iter().map(|mut m| {
                m.start_line += line_offset;
                m.end_line += line_offset;
                m
            }));
        report.copyrights.extend(
            part.copyrights
                .into_iter()
                .map(|c| c.shifted(normalized_offset)),
        );

        tracing::debug!(
            "Chunk {} of {} at byte {}: {} matches",
            chunks,
            path.display(),
            byte_offset,
            matches
        );

        byte_offset += chunk.len();
        normalized_offset += normalize(&chunk).len();
        line_offset += chunk.iter().filter(|&&b| b == b'\n').count();
    }

    report.sha256 = Some(hex::encode(hasher.finalize()));
    report
}
