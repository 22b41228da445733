//! Narrative text normalization.
//!
//! The external parser returns page text with tables inlined as HTML and
//! soft-wrapped lines. Narrative output must carry neither: tables are
//! handled separately by the transcriber.

use regex::Regex;
use std::sync::OnceLock;

/// Separator substituted for explicit line-break markup.
pub const LINE_BREAK_SEPARATOR: &str = " / ";

/// Text normalizer with precompiled patterns.
pub struct Normalizer {
    table_regex: Regex,
    line_break_regex: Regex,
    newline_run_regex: Regex,
    space_run_regex: Regex,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self {
            table_regex: Regex::new(r"(?is)<table\b.*?</table\s*>").unwrap(),
            line_break_regex: Regex::new(r"(?i)<br\s*/?\s*>").unwrap(),
            newline_run_regex: Regex::new(r"\n+").unwrap(),
            space_run_regex: Regex::new(r"[ \t\u{a0}]+").unwrap(),
        }
    }

    /// Normalize raw page text into paragraph-level narrative text.
    ///
    /// Stages, in order:
    /// 1. remove every `<table>…</table>` span (non-greedy, any case, across lines)
    /// 2. replace `<br>` markup with `" / "`
    /// 3. a lone newline becomes a space
    /// 4. two or more newlines become exactly one blank line
    /// 5. runs of spaces collapse to one; the result is trimmed
    pub fn process(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let text = self.strip_markup(&text);

        let text = self
            .newline_run_regex
            .replace_all(&text, |caps: &regex::Captures| {
                if caps[0].len() == 1 {
                    " "
                } else {
                    "\n\n"
                }
            });

        let text = self.space_run_regex.replace_all(&text, " ");
        text.trim().to_string()
    }

    // Removal can splice fragments into new markup ("<b<table></table>r>"),
    // so both substitutions run to a fixpoint. Each pass strictly shrinks
    // the text, which bounds the loop.
    fn strip_markup(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let stripped = self.table_regex.replace_all(&current, "");
            let next = self
                .line_break_regex
                .replace_all(&stripped, LINE_BREAK_SEPARATOR)
                .into_owned();
            if next == current {
                return next;
            }
            current = next;
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize text with a shared [`Normalizer`].
pub fn normalize(text: &str) -> String {
    static NORMALIZER: OnceLock<Normalizer> = OnceLock::new();
    NORMALIZER.get_or_init(Normalizer::new).process(text)
}
