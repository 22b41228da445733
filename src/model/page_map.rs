//! Per-page ground truth from the external parser.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page number → raw page text (tables inlined as HTML) as reported by the
/// external parser.
///
/// Keys are 1-based page numbers. A missing page means the service could not
/// attribute it; lookups treat that as "no coverage". Iteration is in
/// ascending page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageMap {
    pages: BTreeMap<u32, String>,
}

impl PageMap {
    /// Create an empty page map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the raw text of a page. A repeated page number appends to the
    /// existing text so that multi-segment pages keep all their content.
    pub fn insert(&mut self, page: u32, text: impl Into<String>) {
        let text = text.into();
        self.pages
            .entry(page)
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(&text);
            })
            .or_insert(text);
    }

    /// Raw text of a page.
    pub fn get(&self, page: u32) -> Option<&str> {
        self.pages.get(&page).map(String::as_str)
    }

    /// Iterate pages in ascending page-number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.pages.iter().map(|(n, t)| (*n, t.as_str()))
    }

    /// Number of pages with coverage.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if no page has coverage.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromIterator<(u32, String)> for PageMap {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        let mut map = PageMap::new();
        for (page, text) in iter {
            map.insert(page, text);
        }
        map
    }
}

/// Outcome of page attribution for a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ResolvedPage {
    /// The table was found on this 1-based page
    Page(u32),
    /// No page could be attributed; serialized as `-1`
    #[default]
    Unresolved,
}

impl ResolvedPage {
    /// Sentinel used in serialized metadata for an unresolved page.
    pub const UNRESOLVED: i64 = -1;

    /// Integer form used in record metadata.
    pub fn as_i64(self) -> i64 {
        match self {
            ResolvedPage::Page(n) => i64::from(n),
            ResolvedPage::Unresolved => Self::UNRESOLVED,
        }
    }

    /// The page number, if resolved.
    pub fn page(self) -> Option<u32> {
        match self {
            ResolvedPage::Page(n) => Some(n),
            ResolvedPage::Unresolved => None,
        }
    }

    /// Check if the page was resolved.
    pub fn is_resolved(self) -> bool {
        matches!(self, ResolvedPage::Page(_))
    }
}

impl From<ResolvedPage> for i64 {
    fn from(page: ResolvedPage) -> Self {
        page.as_i64()
    }
}

impl From<i64> for ResolvedPage {
    fn from(value: i64) -> Self {
        match u32::try_from(value) {
            Ok(n) if n > 0 => ResolvedPage::Page(n),
            _ => ResolvedPage::Unresolved,
        }
    }
}

impl std::fmt::Display for ResolvedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedPage::Page(n) => write!(f, "{}", n),
            ResolvedPage::Unresolved => write!(f, "unresolved"),
        }
    }
}
