//! Text cleanup applied to every successful extraction.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize raw extracted text into a single dense line.
///
/// Literal two-character `\n` escapes become real newlines, every whitespace
/// run (including those newlines) collapses to one space, and the result is
/// trimmed. Line and paragraph structure is discarded. Idempotent.
pub fn normalize_text(raw: &str) -> String {
    let unescaped = raw.replace("\\n", "\n");
    WHITESPACE_RUN
        .replace_all(&unescaped, " ")
        .trim()
        .to_string()
}
