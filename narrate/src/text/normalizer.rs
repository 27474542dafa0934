//! Text normalization for extracted document text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of 3+ separator characters that decorate scene breaks and headers
/// in ebooks. Read aloud they become noise, so they collapse to a space.
static SEPARATOR_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-/_*]{3,}").expect("separator regex is valid"));

static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Normalize extracted text before chunking.
///
/// - Collapses runs of 3+ separator characters (`-`, `/`, `_`, `*`) to a space
/// - Replaces every remaining slash and backslash with a space
/// - Collapses all whitespace runs to a single space
/// - Trims leading/trailing whitespace
///
/// Pure and idempotent; empty input yields empty output.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = SEPARATOR_RUNS.replace_all(text, " ");
    let text = text.replace(['/', '\\'], " ");
    let text = WHITESPACE_RUNS.replace_all(&text, " ");
    text.trim().to_string()
}
