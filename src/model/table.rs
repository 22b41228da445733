//! Table types.

use super::ResolvedPage;
use serde::{Deserialize, Serialize};

/// A table as extracted from the document body.
///
/// Rows are rectangular in grid columns when they come from the DOCX
/// extractor: merged cells repeat their text in each spanned column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in document order
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows.
    pub fn from_rows(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cell texts; a cell's paragraphs are joined with `\n`
    pub cells: Vec<String>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(Into::into).collect())
    }

    /// Cell text at `index`, if present.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Check if every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells.join("\t")
    }
}

/// A table prepared for transcription: title, header, data rows and the
/// page it was attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    /// Nearest preceding paragraph text, or the "no title" sentinel
    pub title: String,

    /// Column names, possibly merged from two header rows
    pub header: Vec<String>,

    /// All rows after the header
    pub data_rows: Vec<TableRow>,

    /// Page resolved by anchor matching
    pub page: ResolvedPage,

    /// Whether the two-row header merge was applied
    pub header_merged: bool,
}

impl ExtractedTable {
    /// Anchor strings taken from the first data row: the second cell and
    /// the last cell. Missing cells yield empty anchors.
    pub fn anchors(&self) -> (&str, &str) {
        anchors_of(self.data_rows.first())
    }
}

/// Anchor pair for a data row: (second cell, last cell).
pub(crate) fn anchors_of(row: Option<&TableRow>) -> (&str, &str) {
    match row {
        Some(row) => (
            row.cell(1).unwrap_or(""),
            row.cells.last().map(String::as_str).unwrap_or(""),
        ),
        None => ("", ""),
    }
}
