//! Reading-order content blocks.

use super::Table;
use serde::{Deserialize, Serialize};

/// A unit of document content in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// Narrative paragraph (visible run text plus any text-box text)
    Paragraph(Paragraph),
    /// Table with rows of cell text
    Table(Table),
}

impl Block {
    /// Create a paragraph block from text.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph(Paragraph::with_text(text))
    }

    /// Get the table if this is a table block.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        }
    }

    /// Get the paragraph if this is a paragraph block.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    /// Check if this is a table block.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Plain text of the block; tables are tab/newline separated.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.text.clone(),
            Block::Table(t) => t.plain_text(),
        }
    }
}

/// A paragraph of narrative text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph text
    pub text: String,
}

impl Paragraph {
    /// Create a paragraph with text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;

    #[test]
    fn test_block_accessors() {
        let para = Block::paragraph("학점 비교");
        assert!(!para.is_table());
        assert_eq!(para.as_paragraph().unwrap().text, "학점 비교");
        assert!(para.as_table().is_none());

        let table = Block::Table(Table::from_rows(vec![TableRow::from_strings(["a", "b"])]));
        assert!(table.is_table());
        assert_eq!(table.plain_text(), "a\tb");
    }

    #[test]
    fn test_paragraph_empty() {
        assert!(Paragraph::with_text("  \n").is_empty());
        assert!(!Paragraph::with_text("x").is_empty());
    }
}
