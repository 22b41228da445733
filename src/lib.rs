//! # pdfrag
//!
//! Hybrid PDF ingestion for retrieval.
//!
//! A PDF is sent down two independent extraction paths: a layout-preserving
//! PDF to DOCX conversion and an external document-understanding service.
//! Tables are read structurally from the DOCX, then attributed to pages by
//! matching anchor text against the service's per-page output.
//!
//! Each run produces four files for one source PDF:
//!
//! - `<stem>.docx`: the converted document
//! - `<stem>.md`: normalized narrative text, pages joined by `\n\n—\n\n`
//! - `<stem>.html`: every table, each preceded by a `# <title>` line
//! - `<stem>_rag.txt`: one `<json metadata> <sentence>` line per table row
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfrag::{LlamaParseClient, LlamaParseConfig, Pdf2DocxCommand, Pipeline, PipelineOptions};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> pdfrag::Result<()> {
//!     let parser = LlamaParseClient::new(LlamaParseConfig::new("llx-..."))?;
//!     let pipeline = Pipeline::new(
//!         Arc::new(Pdf2DocxCommand::new()),
//!         Arc::new(parser),
//!         PipelineOptions::default(),
//!     );
//!
//!     let artifacts = pipeline.run(Path::new("notice.pdf")).await?;
//!     println!("{}", artifacts.key_values.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Offline use
//!
//! ```no_run
//! use pdfrag::{extract_blocks, transcribe, PageMap};
//!
//! fn main() -> pdfrag::Result<()> {
//!     let blocks = extract_blocks("notice.docx")?;
//!     let transcript = transcribe(&blocks, &PageMap::new(), "notice.pdf");
//!     println!("{}", transcript.kv_text()?);
//!     Ok(())
//! }
//! ```

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod reconcile;
pub mod render;
pub mod service;
pub mod transcribe;

// Re-export commonly used types
pub use convert::{ConvertOptions, DocxConverter, Pdf2DocxCommand};
pub use detect::{detect_format_from_bytes, detect_format_from_path, ensure_pdf, InputFormat};
pub use error::{Error, Result};
pub use model::{
    Block, ExtractedTable, KeyValueRecord, PageMap, Paragraph, PipelineArtifacts, RecordMetadata,
    ResolvedPage, RunStats, Table, TableRow,
};
pub use parser::{extract_blocks, DocxDocument, DocxParser, ExtractOptions, Section};
pub use pipeline::{extract_and_transcribe, Pipeline, PipelineOptions};
pub use reconcile::{resolve_in, resolve_page, resolve_with_tier, AnchorSet, MatchTier, PageIndex};
pub use render::{normalize, to_html, to_markdown, Normalizer};
pub use service::{parse_to_markdown, DocumentParser, LlamaParseClient, LlamaParseConfig, ParsedPage};
pub use transcribe::{transcribe, TranscribeOptions, Transcriber, Transcript};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
