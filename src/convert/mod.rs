//! PDF to DOCX conversion.
//!
//! The converter is a layout-preserving black box: it reads a PDF and writes
//! a DOCX whose tables keep their structure. Any backend implements
//! [`DocxConverter`] and is injected into the pipeline.
//!
//! # Example
//!
//! ```no_run
//! use pdfrag::convert::{ConvertOptions, DocxConverter, Pdf2DocxCommand};
//! use std::path::Path;
//!
//! fn main() -> pdfrag::Result<()> {
//!     let converter = Pdf2DocxCommand::new();
//!     let docx = converter.convert(
//!         Path::new("notice.pdf"),
//!         Path::new("uploads/notice.docx"),
//!         &ConvertOptions::default(),
//!     )?;
//!     println!("{}", docx.display());
//!     Ok(())
//! }
//! ```

mod pdf2docx;

pub use pdf2docx::Pdf2DocxCommand;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Options for PDF to DOCX conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// First page to convert, zero-based
    pub start_page: u32,

    /// Page to stop before, zero-based; `None` converts to the end
    pub end_page: Option<u32>,
}

impl ConvertOptions {
    /// Create new conversion options (whole document).
    pub fn new() -> Self {
        Self::default()
    }

    /// Start converting at a zero-based page.
    pub fn with_start_page(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    /// Stop before a zero-based page.
    pub fn with_end_page(mut self, page: u32) -> Self {
        self.end_page = Some(page);
        self
    }
}

/// Trait for PDF to DOCX converters.
///
/// Conversion is blocking and may take seconds to minutes; the pipeline
/// runs it on a blocking worker thread. Failure is fatal for a run.
pub trait DocxConverter: Send + Sync {
    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert `pdf` into a DOCX written at `docx`, returning the written path.
    fn convert(&self, pdf: &Path, docx: &Path, options: &ConvertOptions) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new().with_start_page(1).with_end_page(4);
        assert_eq!(options.start_page, 1);
        assert_eq!(options.end_page, Some(4));
    }

    #[test]
    fn test_default_converts_everything() {
        let options = ConvertOptions::default();
        assert_eq!(options.start_page, 0);
        assert!(options.end_page.is_none());
    }
}
