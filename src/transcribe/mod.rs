//! Table to key-value transcription.
//!
//! Each DOCX table becomes an [`ExtractedTable`] (title, header, data rows,
//! resolved page) and each non-empty data row becomes one
//! [`KeyValueRecord`]. A malformed table is logged and skipped without
//! affecting the others.

mod header;

pub use header::{column_names, contains_marker, merge_header, UNNAMED_PREFIX};

use crate::error::{Error, Result};
use crate::model::{anchors_of, Block, ExtractedTable, KeyValueRecord, PageMap, Table};
use crate::parser::is_footer_text;
use crate::reconcile::{normalize_whitespace, resolve_in, PageIndex};
use crate::render::{to_html, to_kv_text};

/// Default marker that identifies a second header row.
pub const DEFAULT_HEADER_MARKER: &str = "대 학";

/// Default title for a table without a usable preceding paragraph.
pub const DEFAULT_UNTITLED: &str = "제목 없음";

/// Sentence prefix label for the table title.
const TITLE_LABEL: &str = "제목";

/// Options for transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribeOptions {
    /// Marker text that promotes the row after the header into the header
    pub header_marker: String,

    /// Title used when no paragraph precedes a table
    pub untitled: String,
}

impl TranscribeOptions {
    /// Create new transcription options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header-merge marker.
    pub fn with_header_marker(mut self, marker: impl Into<String>) -> Self {
        self.header_marker = marker.into();
        self
    }

    /// Set the "no title" sentinel.
    pub fn with_untitled(mut self, untitled: impl Into<String>) -> Self {
        self.untitled = untitled.into();
        self
    }
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
            untitled: DEFAULT_UNTITLED.to_string(),
        }
    }
}

/// Output of transcribing one document's tables.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// HTML visualization of every table, malformed ones included
    pub html: String,

    /// One record per non-empty data row, in table order
    pub records: Vec<KeyValueRecord>,

    /// Successfully extracted tables
    pub tables: Vec<ExtractedTable>,

    /// Indices of tables skipped as malformed
    pub skipped: Vec<usize>,
}

impl Transcript {
    /// Key-value text, one record per line.
    pub fn kv_text(&self) -> Result<String> {
        to_kv_text(&self.records)
    }

    /// Number of extracted tables without a resolved page.
    pub fn unresolved_count(&self) -> usize {
        self.tables.iter().filter(|t| !t.page.is_resolved()).count()
    }
}

/// Table transcriber.
#[derive(Debug, Clone, Default)]
pub struct Transcriber {
    options: TranscribeOptions,
}

impl Transcriber {
    /// Create a transcriber.
    pub fn new(options: TranscribeOptions) -> Self {
        Self { options }
    }

    /// The transcriber's options.
    pub fn options(&self) -> &TranscribeOptions {
        &self.options
    }

    /// Transcribe every table in `blocks`, attributing pages from `pages`.
    pub fn transcribe(&self, blocks: &[Block], pages: &PageMap, source: &str) -> Transcript {
        let titled = self.titled_tables(blocks);
        let index = PageIndex::new(pages);
        let html = to_html(titled.iter().map(|(title, table)| (title.as_str(), *table)));

        let mut transcript = Transcript {
            html,
            ..Transcript::default()
        };

        for (table_index, (title, table)) in titled.iter().enumerate() {
            match self.extract_in(table_index, title, table, &index) {
                Ok(extracted) => {
                    transcript
                        .records
                        .extend(self.records(&extracted, source));
                    transcript.tables.push(extracted);
                }
                Err(e) => {
                    log::warn!("Skipping table: {}", e);
                    transcript.skipped.push(table_index);
                }
            }
        }

        log::debug!(
            "Transcribed {} tables ({} skipped) into {} records",
            transcript.tables.len(),
            transcript.skipped.len(),
            transcript.records.len()
        );

        transcript
    }

    /// Pair each table with its title: the nearest preceding paragraph,
    /// unless that paragraph is footer text.
    fn titled_tables<'b>(&self, blocks: &'b [Block]) -> Vec<(String, &'b Table)> {
        let mut last_paragraph: Option<&str> = None;
        let mut tables = Vec::new();

        for block in blocks {
            match block {
                Block::Paragraph(p) => last_paragraph = Some(p.text.as_str()),
                Block::Table(table) => {
                    let title = match last_paragraph {
                        Some(text) if !text.trim().is_empty() && !is_footer_text(text) => {
                            normalize_whitespace(text)
                        }
                        _ => self.options.untitled.clone(),
                    };
                    tables.push((title, table));
                }
            }
        }

        tables
    }

    /// Build the extracted form of one table.
    pub fn extract(
        &self,
        index: usize,
        title: &str,
        table: &Table,
        pages: &PageMap,
    ) -> Result<ExtractedTable> {
        self.extract_in(index, title, table, &PageIndex::new(pages))
    }

    /// Like [`Transcriber::extract`], against a prepared [`PageIndex`].
    pub fn extract_in(
        &self,
        index: usize,
        title: &str,
        table: &Table,
        pages: &PageIndex,
    ) -> Result<ExtractedTable> {
        let malformed = |reason: &str| Error::MalformedTable {
            index,
            reason: reason.to_string(),
        };

        let first = table.rows.first().ok_or_else(|| malformed("no rows"))?;
        let width = table.column_count();
        if width == 0 {
            return Err(malformed("no columns"));
        }

        let mut header = column_names(first, width);
        let mut data_start = 1;
        let mut header_merged = false;
        if let Some(second) = table.rows.get(1) {
            if contains_marker(second, &self.options.header_marker) {
                header = merge_header(&header, second);
                data_start = 2;
                header_merged = true;
            }
        }

        let data_rows = table.rows.get(data_start..).unwrap_or_default().to_vec();

        let (anchor1, anchor2) = anchors_of(data_rows.first());
        let title_hint = (title != self.options.untitled).then_some(title);
        let (page, tier) = resolve_in(pages, title_hint, anchor1, anchor2);
        match tier {
            Some(tier) => log::debug!("Table #{} '{}' on page {} ({})", index, title, page, tier),
            None => log::debug!("Table #{} '{}' page unresolved", index, title),
        }

        Ok(ExtractedTable {
            title: title.to_string(),
            header,
            data_rows,
            page,
            header_merged,
        })
    }

    /// One record per data row with at least one non-empty value.
    pub fn records(&self, table: &ExtractedTable, source: &str) -> Vec<KeyValueRecord> {
        table
            .data_rows
            .iter()
            .filter_map(|row| {
                let pairs: Vec<String> = table
                    .header
                    .iter()
                    .enumerate()
                    .filter_map(|(i, column)| {
                        let value = normalize_whitespace(row.cell(i)?);
                        (!value.is_empty()).then(|| format!("{}: {}", column, value))
                    })
                    .collect();
                if pairs.is_empty() {
                    return None;
                }
                let sentence = format!("{}: {}, {}", TITLE_LABEL, table.title, pairs.join(", "));
                Some(KeyValueRecord::table_row(source, table.page, sentence))
            })
            .collect()
    }
}

/// Transcribe with default options.
pub fn transcribe(blocks: &[Block], pages: &PageMap, source: &str) -> Transcript {
    Transcriber::default().transcribe(blocks, pages, source)
}
