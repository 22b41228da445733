//! Header inference for extracted tables.
//!
//! Column names follow the dataframe convention the downstream indexer was
//! built against: a blank header cell becomes `Unnamed: <i>` and repeated
//! names get a `.<n>` suffix.

use crate::model::TableRow;
use crate::reconcile::normalize_whitespace;
use std::collections::HashMap;

/// Placeholder prefix for blank header cells.
pub const UNNAMED_PREFIX: &str = "Unnamed";

/// Column names from the first row, padded to `width` columns.
pub fn column_names(row: &TableRow, width: usize) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    (0..width)
        .map(|i| {
            let base = normalize_whitespace(row.cell(i).unwrap_or(""));
            let base = if base.is_empty() {
                format!("{}: {}", UNNAMED_PREFIX, i)
            } else {
                base
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

/// Check if any cell of `row` contains the header marker.
pub fn contains_marker(row: &TableRow, marker: &str) -> bool {
    let marker = normalize_whitespace(marker);
    !marker.is_empty()
        && row
            .cells
            .iter()
            .any(|cell| normalize_whitespace(cell).contains(&marker))
}

/// Strip the `.<n>` suffix [`column_names`] gives a repeated name.
///
/// Only a suffix whose removal leaves a name that was seen earlier in
/// `columns` counts; dots inside header text are kept.
fn strip_duplicate_suffix<'c>(column: &'c str, columns: &[String]) -> &'c str {
    match column.rsplit_once('.') {
        Some((base, n))
            if !n.is_empty()
                && n.bytes().all(|b| b.is_ascii_digit())
                && columns.iter().any(|c| c == base) =>
        {
            base
        }
        _ => column,
    }
}

/// Merge a second header row into the column names.
///
/// Placeholder columns take the row's value outright; named columns keep
/// their base name (without any duplicate suffix) followed by the value.
pub fn merge_header(columns: &[String], row: &TableRow) -> Vec<String> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = normalize_whitespace(row.cell(i).unwrap_or(""));
            let base = strip_duplicate_suffix(column, &columns[..i]);
            if column.starts_with(UNNAMED_PREFIX) {
                if value.is_empty() {
                    column.clone()
                } else {
                    value
                }
            } else if value.is_empty() {
                base.to_string()
            } else {
                format!("{} {}", base, value)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        let row = TableRow::from_strings(["학과", "", "학과", "기준\n학점"]);
        assert_eq!(
            column_names(&row, 5),
            vec!["학과", "Unnamed: 1", "학과.1", "기준 학점", "Unnamed: 4"]
        );
    }

    #[test]
    fn test_marker() {
        let row = TableRow::from_strings(["대 학", "경영학과(주)", "130"]);
        assert!(contains_marker(&row, "대 학"));
        let wrapped = TableRow::from_strings(["대\n학"]);
        assert!(contains_marker(&wrapped, "대 학"));
        assert!(!contains_marker(&TableRow::from_strings(["대학"]), "대 학"));
        assert!(!contains_marker(&row, " "));
    }

    #[test]
    fn test_merge_replaces_placeholders() {
        let columns = vec![
            "구분".to_string(),
            "Unnamed: 1".to_string(),
            "구분.1".to_string(),
        ];
        let row = TableRow::from_strings(["대 학", "경영학과(주)", "130"]);
        assert_eq!(
            merge_header(&columns, &row),
            vec!["구분 대 학", "경영학과(주)", "구분 130"]
        );
    }

    #[test]
    fn test_merge_keeps_dots_in_header_text() {
        let first = TableRow::from_strings(["No.", "기준(2024.03~)", "", "학과", "학과", "v1.2"]);
        let columns = column_names(&first, 6);
        assert_eq!(columns[4], "학과.1");

        let row = TableRow::from_strings(["대 학", "학점", "비고", "a", "b", "c"]);
        assert_eq!(
            merge_header(&columns, &row),
            vec![
                "No. 대 학",
                "기준(2024.03~) 학점",
                "비고",
                "학과 a",
                "학과 b",
                "v1.2 c",
            ]
        );
    }

    #[test]
    fn test_merge_with_short_row() {
        let columns = vec!["학과".to_string(), "Unnamed: 1".to_string()];
        let row = TableRow::from_strings(["대 학"]);
        assert_eq!(merge_header(&columns, &row), vec!["학과 대 학", "Unnamed: 1"]);
    }
}
