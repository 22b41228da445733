//! Narrative Markdown assembled from per-page parser output.

use super::Normalizer;

/// Literal separator placed between pages.
pub const PAGE_SEPARATOR: &str = "\n\n—\n\n";

/// Normalize each page and join them with [`PAGE_SEPARATOR`].
pub fn to_markdown<'a>(pages: impl IntoIterator<Item = &'a str>) -> String {
    MarkdownRenderer::new().render(pages)
}

/// Narrative Markdown renderer.
pub struct MarkdownRenderer {
    normalizer: Normalizer,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new() -> Self {
        Self {
            normalizer: Normalizer::new(),
        }
    }

    /// Render pages, in the order given, into one Markdown string.
    pub fn render<'a>(&self, pages: impl IntoIterator<Item = &'a str>) -> String {
        pages
            .into_iter()
            .map(|page| self.normalizer.process(page))
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
