//! DOCX structural extraction.

mod docx;
mod footer;
mod options;

pub use docx::{extract_blocks, DocxDocument, DocxParser, Section};
pub use footer::{is_footer_text, is_suppressed};
pub use options::ExtractOptions;
