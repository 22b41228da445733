//! DOCX extraction options.

/// Options for walking a DOCX document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Append text-box content to its anchoring paragraph
    pub include_textboxes: bool,

    /// Drop paragraphs matching the footer-text policy
    pub suppress_footer_text: bool,

    /// Parse header/footer parts and attach them to sections
    pub include_headers_footers: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable text-box capture.
    pub fn with_textboxes(mut self, include: bool) -> Self {
        self.include_textboxes = include;
        self
    }

    /// Enable or disable the footer-text policy.
    pub fn with_footer_suppression(mut self, suppress: bool) -> Self {
        self.suppress_footer_text = suppress;
        self
    }

    /// Enable or disable header/footer region parsing.
    pub fn with_headers_footers(mut self, include: bool) -> Self {
        self.include_headers_footers = include;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_textboxes: true,
            suppress_footer_text: true,
            include_headers_footers: false,
        }
    }
}
