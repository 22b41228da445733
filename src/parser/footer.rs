//! Footer-text policy.
//!
//! Running headers and footers converted from PDF tend to leak into the body
//! as stray paragraphs ("- 3 -", "p. 12"). They are not content and must
//! not become paragraphs or table titles.

use regex::Regex;
use std::sync::OnceLock;

fn page_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-–—]?\s*\d+\s*[-–—]?$").unwrap())
}

fn page_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:p\.|page)\s*\d+$").unwrap())
}

/// Check if text is a bare page number (optionally dash-wrapped) or a
/// `p. N` / `page N` label.
pub fn is_footer_text(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && (page_number_regex().is_match(text) || page_label_regex().is_match(text))
}

/// Check if a paragraph should be dropped from the block stream: empty after
/// trimming, or footer text.
pub fn is_suppressed(text: &str) -> bool {
    text.trim().is_empty() || is_footer_text(text)
}
