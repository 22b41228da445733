//! External document parser adapter.
//!
//! A [`DocumentParser`] sends a whole PDF to a document-understanding service
//! and returns one raw text segment per page. [`parse_to_markdown`] turns
//! those segments into the run's [`PageMap`] and narrative Markdown file,
//! degrading to an empty map when the service fails or stalls.

pub mod llama;

pub use llama::{LlamaParseClient, LlamaParseConfig, DEFAULT_PARSING_INSTRUCTION};

use crate::error::{Error, Result};
use crate::model::PageMap;
use crate::render::MarkdownRenderer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One page segment returned by the external service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPage {
    /// 1-based page number as reported by the service
    pub number: u32,

    /// Raw segment text, tables inlined as HTML
    pub text: String,
}

impl ParsedPage {
    /// Create a page segment.
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Trait for external document parsing services.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Get the name of this parser.
    fn name(&self) -> &str;

    /// Parse a PDF into per-page segments, in page order.
    async fn parse_pages(&self, pdf: &Path) -> Result<Vec<ParsedPage>>;
}

/// Outcome of the external parse stage.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Narrative Markdown file (always written, possibly empty)
    pub markdown: PathBuf,

    /// Raw per-page text keyed by page number
    pub pages: PageMap,

    /// Whether the service failed, stalled or returned nothing
    pub degraded: bool,
}

/// Run the external parser, write the narrative Markdown to `markdown` and
/// build the page map.
///
/// Service failures, empty responses and timeouts are logged and degrade to
/// an empty [`PageMap`]; only a failure to write the Markdown file is
/// returned as an error.
pub async fn parse_to_markdown(
    parser: &dyn DocumentParser,
    pdf: &Path,
    markdown: &Path,
    timeout: Duration,
) -> Result<ParseOutcome> {
    let segments = match tokio::time::timeout(timeout, parser.parse_pages(pdf)).await {
        Ok(Ok(segments)) if !segments.is_empty() => Some(segments),
        Ok(Ok(_)) => {
            log::warn!(
                "{} returned no pages for {}",
                parser.name(),
                pdf.display()
            );
            None
        }
        Ok(Err(e)) => {
            log::warn!("{} failed on {}: {}", parser.name(), pdf.display(), e);
            None
        }
        Err(_) => {
            log::warn!(
                "{} on {}: {}",
                parser.name(),
                pdf.display(),
                Error::Timeout(timeout)
            );
            None
        }
    };

    let degraded = segments.is_none();
    let segments = segments.unwrap_or_default();

    let pages: PageMap = segments
        .iter()
        .map(|page| (page.number, page.text.clone()))
        .collect();
    let content = MarkdownRenderer::new().render(segments.iter().map(|page| page.text.as_str()));

    tokio::fs::write(markdown, content).await?;
    log::info!(
        "Wrote {} ({} pages{})",
        markdown.display(),
        pages.len(),
        if degraded { ", degraded" } else { "" }
    );

    Ok(ParseOutcome {
        markdown: markdown.to_path_buf(),
        pages,
        degraded,
    })
}
