//! Copyright notice extraction
//!
//! ## Pipeline
//!
//! 1. **Escape collapse** — literal `\n`, `\f`, `\r`, `\0` spellings embedded
//!    in text (string literals, JSON blobs) become real newlines so a notice
//!    split by them is seen line by line.
//! 2. **Glyph normalization** — HTML entities, unicode/octal/hex escapes, the
//!    literal `©` and the `(C)` / `( c)` spellings all become `(c)`.
//! 3. **Extraction** — one regex, multi-line mode. A notice starts at the word
//!    `Copyright` (optionally followed by `(c)`) or at a free-standing `(c)`,
//!    continues through the year list and the holder, and drops a trailing
//!    `Inc.`, punctuation, and `All rights reserved`.
//! 4. **Sanitization** — trim, then cut at the first undecodable byte,
//!    replacement character, or NUL.
//!
//! All offsets are byte offsets into the normalized text (stage 2 output).
//! Matching runs on bytes, so files that are not valid UTF-8 are still
//! scanned.

use super::CopyrightExtractor;
use crate::report::CopyrightRecord;
use once_cell::sync::Lazy;
use regex::bytes::{NoExpand, Regex};
use std::borrow::Cow;

static ESCAPES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[nfr0]").expect("escape pattern compiles"));

static GLYPHS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:&copy;?|&#169;|&#xa9;|\\?u00a9|\\xa9|\\251|\( ?c\))|©")
        .expect("glyph pattern compiles")
});

static NOTICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)",
        // lead-in: "Copyright", "Copyright (c)", or a bare "(c)"
        r"(?:(?i:copyright)[ \t]+(?:\(c\)[ \t]+)?|(?-u:\B)\(c\)[ \t]+)",
        // holder: years, optional "by", rest of the line (lazy)
        r"(?P<holder>\d{2,4}(?:[ \t]*[-,][ \t]*\d{2,4})*,?[ \t]*(?i:by[ \t]+)?(?-u:[^\n])*?)",
        // trailer
        r"(?:,?[ \t]+(?i:inc)\.?)?[ \t]*[.,-]?[ \t]*(?i:all[ \t]+rights[ \t]+reserved\.?)?[ \t\r]*$",
    ))
    .expect("notice pattern compiles")
});

/// Regex-based extractor; stateless and safe to share across workers
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexCopyrightExtractor;

impl RegexCopyrightExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl CopyrightExtractor for RegexCopyrightExtractor {
    fn extract(&self, content: &[u8]) -> Vec<CopyrightRecord> {
        extract_copyrights(content)
    }
}

/// Stage 1: collapse literal escape spellings into newlines
pub fn normalize_escapes(content: &[u8]) -> Cow<'_, [u8]> {
    ESCAPES.replace_all(content, NoExpand(b"\n"))
}

/// Stage 2: rewrite every copyright-symbol spelling to `(c)`
pub fn normalize_glyphs(content: &[u8]) -> Cow<'_, [u8]> {
    GLYPHS.replace_all(content, NoExpand(b"(c)"))
}

/// Stages 1 and 2 combined; all offsets refer to this text
pub fn normalize(content: &[u8]) -> Vec<u8> {
    let escaped = normalize_escapes(content);
    normalize_glyphs(&escaped).into_owned()
}

/// Run the full pipeline over `content`
pub fn extract_copyrights(content: &[u8]) -> Vec<CopyrightRecord> {
    let normalized = normalize(content);

    NOTICE
        .captures_iter(&normalized)
        .filter_map(|caps| {
            let notice = caps.get(0)?;
            let holder = caps.name("holder")?;
            Some(CopyrightRecord {
                notice: sanitize(notice.as_bytes()),
                holder: sanitize(holder.as_bytes()),
                notice_start: notice.start(),
                notice_end: notice.end(),
                holder_start: holder.start(),
                holder_end: holder.end(),
            })
        })
        .collect()
}

/// Stage 4: keep the decodable prefix up to the first NUL, trimmed
pub fn sanitize(raw: &[u8]) -> String {
    let valid = match std::str::from_utf8(raw) {
        Ok(s) => s,
        Err(e) => std::str::from_utf8(&raw[..e.valid_up_to()]).unwrap_or_default(),
    };
    let cut = valid.find(['\0', '\u{FFFD}']).unwrap_or(valid.len());
    valid[..cut].trim().to_string()
}

// ─── Tests ──────────────────────────────────────────────────────────
