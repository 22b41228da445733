//! Page reconciliation by anchor matching.
//!
//! The external parser's pages and the DOCX tables share no identifier. A
//! table is located by searching page text for two anchor strings taken
//! from its first data row, after collapsing whitespace on both sides so
//! that line-wrap differences between the two extraction paths cannot cause
//! a mismatch.
//!
//! Tiers, first success wins:
//!
//! 1. both anchors on the same page
//! 2. anchor 1 on a page
//! 3. the title and an anchor on the same page (anchor 2 stands in when
//!    anchor 1 is empty)
//!
//! Within a tier the lowest page number wins.
//!
//! Page text arrives as HTML, so character references are decoded on the
//! page side before matching against plain DOCX cell text.

use crate::model::{PageMap, ResolvedPage};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(amp|lt|gt|quot|apos|nbsp|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});").unwrap()
    })
}

/// Decode the HTML character references a parser emits inside table markup.
///
/// Single pass, so `&amp;lt;` decodes to `&lt;` and not to `<`. Unknown or
/// invalid references are left as written.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    entity_regex().replace_all(text, |caps: &Captures<'_>| {
        let name = &caps[1];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => {
                let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => name[1..].parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }
        };
        match decoded {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Collapse whitespace runs to one space, trim, and compose to NFC.
pub fn normalize_whitespace(text: &str) -> String {
    let composed: String = text.nfc().collect();
    whitespace_regex()
        .replace_all(composed.trim(), " ")
        .into_owned()
}

/// Page texts prepared for matching: entities decoded, NFC, whitespace
/// collapsed. Build once per document and reuse for every table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageIndex {
    pages: Vec<(u32, String)>,
}

impl PageIndex {
    /// Normalize every page of `pages`, keeping ascending page order.
    pub fn new(pages: &PageMap) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(number, text)| (number, normalize_whitespace(&decode_entities(text))))
                .collect(),
        }
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if there are no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Normalized text of a page.
    pub fn text(&self, number: u32) -> Option<&str> {
        self.pages
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, text)| text.as_str())
    }
}

impl From<&PageMap> for PageIndex {
    fn from(pages: &PageMap) -> Self {
        PageIndex::new(pages)
    }
}

/// Which matching tier attributed a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    /// Both anchors on the same page
    BothAnchors,
    /// Anchor 1 alone
    PrimaryAnchor,
    /// Title plus an anchor
    TitleAndAnchor,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchTier::BothAnchors => "both anchors",
            MatchTier::PrimaryAnchor => "primary anchor",
            MatchTier::TitleAndAnchor => "title and anchor",
        };
        f.write_str(name)
    }
}

/// Normalized search terms for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorSet {
    title: Option<String>,
    anchor1: String,
    anchor2: String,
}

impl AnchorSet {
    /// Build the search terms. `title` is `None` when the table has no usable
    /// title (e.g. the "no title" sentinel).
    pub fn new(title: Option<&str>, anchor1: &str, anchor2: &str) -> Self {
        Self {
            title: title.map(normalize_whitespace).filter(|t| !t.is_empty()),
            anchor1: normalize_whitespace(anchor1),
            anchor2: normalize_whitespace(anchor2),
        }
    }

    /// Check if neither anchor carries any text.
    pub fn is_empty(&self) -> bool {
        self.anchor1.is_empty() && self.anchor2.is_empty()
    }

    /// Find the page and tier for these anchors.
    pub fn locate(&self, pages: &PageMap) -> Option<(u32, MatchTier)> {
        if self.is_empty() || pages.is_empty() {
            return None;
        }
        self.locate_in(&PageIndex::new(pages))
    }

    /// Find the page and tier in an already normalized page index.
    pub fn locate_in(&self, index: &PageIndex) -> Option<(u32, MatchTier)> {
        if self.is_empty() || index.is_empty() {
            return None;
        }

        let tiers = [
            MatchTier::BothAnchors,
            MatchTier::PrimaryAnchor,
            MatchTier::TitleAndAnchor,
        ];
        tiers.into_iter().find_map(|tier| {
            index
                .pages
                .iter()
                .find(|(_, text)| self.matches(tier, text))
                .map(|(number, _)| (*number, tier))
        })
    }

    fn matches(&self, tier: MatchTier, text: &str) -> bool {
        let found = |needle: &str| !needle.is_empty() && text.contains(needle);
        match tier {
            MatchTier::BothAnchors => found(&self.anchor1) && found(&self.anchor2),
            MatchTier::PrimaryAnchor => found(&self.anchor1),
            MatchTier::TitleAndAnchor => {
                let anchor = if self.anchor1.is_empty() {
                    &self.anchor2
                } else {
                    &self.anchor1
                };
                self.title.as_deref().is_some_and(found) && found(anchor)
            }
        }
    }
}

/// Resolve the page a table appeared on.
///
/// Returns [`ResolvedPage::Unresolved`] when the page map is empty, both
/// anchors are empty, or no tier matches.
pub fn resolve_page(pages: &PageMap, title: &str, anchor1: &str, anchor2: &str) -> ResolvedPage {
    resolve_with_tier(pages, Some(title), anchor1, anchor2).0
}

/// Like [`resolve_page`], also reporting the tier that matched.
pub fn resolve_with_tier(
    pages: &PageMap,
    title: Option<&str>,
    anchor1: &str,
    anchor2: &str,
) -> (ResolvedPage, Option<MatchTier>) {
    resolve_in(&PageIndex::new(pages), title, anchor1, anchor2)
}

/// Like [`resolve_with_tier`], against a prepared [`PageIndex`].
pub fn resolve_in(
    index: &PageIndex,
    title: Option<&str>,
    anchor1: &str,
    anchor2: &str,
) -> (ResolvedPage, Option<MatchTier>) {
    match AnchorSet::new(title, anchor1, anchor2).locate_in(index) {
        Some((page, tier)) => (ResolvedPage::Page(page), Some(tier)),
        None => (ResolvedPage::Unresolved, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(entries: &[(u32, &str)]) -> PageMap {
        entries
            .iter()
            .map(|(n, t)| (*n, t.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  경영\n\t학과   130 "), "경영 학과 130");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_normalize_composes_hangul() {
        // Decomposed jamo for "학과"
        let decomposed = "\u{1112}\u{1161}\u{11a8}\u{1100}\u{116a}";
        assert_eq!(normalize_whitespace(decomposed), "학과");
    }

    #[test]
    fn test_tier_one_beats_tier_two() {
        let map = pages(&[(2, "경영학과 only"), (1, "경영학과 and 130")]);
        let map_reversed = pages(&[(1, "경영학과 only"), (2, "경영학과 and 130")]);

        assert_eq!(resolve_page(&map, "t", "경영학과", "130"), ResolvedPage::Page(1));
        assert_eq!(
            resolve_with_tier(&map_reversed, None, "경영학과", "130"),
            (ResolvedPage::Page(2), Some(MatchTier::BothAnchors))
        );
    }

    #[test]
    fn test_primary_anchor_alone() {
        let map = pages(&[(1, "서론"), (3, "경영학과 130학점")]);
        assert_eq!(
            resolve_with_tier(&map, None, "경영학과", "비고 없음"),
            (ResolvedPage::Page(3), Some(MatchTier::PrimaryAnchor))
        );
    }

    #[test]
    fn test_anchor_two_alone_is_not_enough() {
        let map = pages(&[(1, "130")]);
        assert_eq!(resolve_page(&map, "학점 비교", "", "130"), ResolvedPage::Unresolved);
    }

    #[test]
    fn test_title_tier() {
        let map = pages(&[(1, "130"), (4, "학점 비교\n\n130")]);
        assert_eq!(
            resolve_with_tier(&map, Some("학점 비교"), "", "130"),
            (ResolvedPage::Page(4), Some(MatchTier::TitleAndAnchor))
        );
    }

    #[test]
    fn test_unresolved_defaults() {
        let empty = PageMap::new();
        assert_eq!(resolve_page(&empty, "t", "a", "b"), ResolvedPage::Unresolved);

        let map = pages(&[(1, "학점 비교")]);
        assert_eq!(resolve_page(&map, "학점 비교", "", ""), ResolvedPage::Unresolved);
        assert_eq!(resolve_page(&map, "x", "없는 값", "없는 값"), ResolvedPage::Unresolved);
    }

    #[test]
    fn test_whitespace_invariance() {
        let wrapped = pages(&[(1, "앞"), (2, "경영\n학과   130\n\n학점")]);
        let flat = pages(&[(1, "앞"), (2, "경영 학과 130 학점")]);

        let a = resolve_page(&wrapped, "t", "경영 학과", "130 학점");
        let b = resolve_page(&flat, "t", "경영\t\n학과", "130   학점");
        assert_eq!(a, ResolvedPage::Page(2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_lowest_page_wins_tie() {
        let map = pages(&[(5, "경영학과 130"), (2, "경영학과 130"), (9, "경영학과 130")]);
        assert_eq!(resolve_page(&map, "t", "경영학과", "130"), ResolvedPage::Page(2));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("R&amp;D &lt;b&gt; &quot;x&quot; it&apos;s"), "R&D <b> \"x\" it's");
        assert_eq!(decode_entities("&#39;a&#x41;&nbsp;"), "'aA\u{a0}");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&bogus; & &#xFFFFFF;"), "&bogus; & &#xFFFFFF;");
        assert!(matches!(decode_entities("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escaped_page_text_matches_plain_anchors() {
        let map = pages(&[
            (1, "서론"),
            (3, "<table><tr><td>R&amp;D</td><td>A&lt;B</td></tr></table>"),
        ]);
        assert_eq!(
            resolve_with_tier(&map, None, "R&D", "A<B"),
            (ResolvedPage::Page(3), Some(MatchTier::BothAnchors))
        );

        let nbsp = pages(&[(2, "경영&nbsp;학과 130")]);
        assert_eq!(resolve_page(&nbsp, "t", "경영 학과", "130"), ResolvedPage::Page(2));
    }

    #[test]
    fn test_page_index_reuse() {
        let map = pages(&[(2, "경영\n학과 130"), (1, "R&amp;D")]);
        let index = PageIndex::new(&map);
        assert_eq!(index.len(), 2);
        assert_eq!(index.text(2), Some("경영 학과 130"));
        assert_eq!(index.text(1), Some("R&D"));

        assert_eq!(resolve_in(&index, None, "경영 학과", "130").0, ResolvedPage::Page(2));
        assert_eq!(resolve_in(&index, None, "R&D", "").0, ResolvedPage::Page(1));
        assert_eq!(resolve_in(&PageIndex::default(), None, "a", "b").0, ResolvedPage::Unresolved);
    }

    #[test]
    fn test_anchor_set_empty() {
        assert!(AnchorSet::new(Some("title"), " ", "\n").is_empty());
        assert!(!AnchorSet::new(None, "a", "").is_empty());
    }
}
