//! Rendering of the pipeline's text artifacts.

mod cleanup;
pub mod html;
pub mod kv;
pub mod markdown;

pub use cleanup::{normalize, Normalizer, LINE_BREAK_SEPARATOR};
pub use html::to_html;
pub use kv::{parse_kv_text, to_kv_text};
pub use markdown::{to_markdown, MarkdownRenderer, PAGE_SEPARATOR};
