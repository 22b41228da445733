//! Retrieval-ready key-value records.

use super::ResolvedPage;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Record type tag written into every key-value line.
pub const TABLE_KV: &str = "table_kv";

/// Compact metadata tag preceding each flattened sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Source file name
    pub source: String,

    /// Resolved page, `-1` when unresolved
    pub page: ResolvedPage,

    /// Record kind, always [`TABLE_KV`] for table rows
    #[serde(rename = "type")]
    pub kind: String,
}

/// One data row of one table, flattened into a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueRecord {
    /// Metadata tag
    pub metadata: RecordMetadata,

    /// `"제목: <title>, <col>: <val>, ..."`
    pub sentence: String,
}

impl KeyValueRecord {
    /// Create a table row record.
    pub fn table_row(
        source: impl Into<String>,
        page: ResolvedPage,
        sentence: impl Into<String>,
    ) -> Self {
        Self {
            metadata: RecordMetadata {
                source: source.into(),
                page,
                kind: TABLE_KV.to_string(),
            },
            sentence: sentence.into(),
        }
    }

    /// Render as one output line: `<json metadata> <sentence>`.
    pub fn to_line(&self) -> Result<String> {
        let metadata = serde_json::to_string(&self.metadata)?;
        Ok(format!("{} {}", metadata, self.sentence))
    }

    /// Parse a line produced by [`KeyValueRecord::to_line`].
    pub fn from_line(line: &str) -> Option<Self> {
        let mut stream = serde_json::Deserializer::from_str(line).into_iter::<RecordMetadata>();
        let metadata = stream.next()?.ok()?;
        let rest = &line[stream.byte_offset()..];
        Some(Self {
            metadata,
            sentence: rest.strip_prefix(' ').unwrap_or(rest).to_string(),
        })
    }
}
