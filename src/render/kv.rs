//! Key-value text output for the downstream indexer.

use crate::error::Result;
use crate::model::KeyValueRecord;

/// Render records as newline-separated `<json metadata> <sentence>` lines.
pub fn to_kv_text(records: &[KeyValueRecord]) -> Result<String> {
    let lines = records
        .iter()
        .map(KeyValueRecord::to_line)
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

/// Parse key-value text back into records, skipping lines that do not carry
/// a metadata tag.
pub fn parse_kv_text(text: &str) -> Vec<KeyValueRecord> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(KeyValueRecord::from_line)
        .collect()
}
