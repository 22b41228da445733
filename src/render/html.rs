//! HTML visualization of extracted tables.

use crate::model::Table;

/// Render titled tables as `# <title>` markers each followed by the table
/// markup, in the order given.
pub fn to_html<'a>(tables: impl IntoIterator<Item = (&'a str, &'a Table)>) -> String {
    let mut output = String::new();
    for (title, table) in tables {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!("# {}\n", title));
        render_table(&mut output, table);
    }
    output
}

/// Render one table as `<table border='1'>` markup. Cell paragraphs are
/// separated by `<br>`.
pub fn render_table(output: &mut String, table: &Table) {
    output.push_str("<table border='1'>\n");
    for row in &table.rows {
        output.push_str("  <tr>\n");
        for cell in &row.cells {
            let content = cell
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(escape_html)
                .collect::<Vec<_>>()
                .join("<br>");
            output.push_str(&format!("    <td>{}</td>\n", content));
        }
        output.push_str("  </tr>\n");
    }
    output.push_str("</table>\n");
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
