//! Shared fixtures: synthetic DOCX packages and in-process adapters.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pdfrag::convert::{ConvertOptions, DocxConverter};
use pdfrag::error::{Error, Result};
use pdfrag::service::{DocumentParser, ParsedPage};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Minimal bytes accepted as a PDF by magic-byte detection.
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n";

/// Write a placeholder PDF into `dir`.
pub fn write_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, PDF_BYTES).unwrap();
    path
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Paragraph XML with one run per line separated by `w:br`.
pub fn paragraph_xml(text: &str) -> String {
    let runs: Vec<String> = text
        .split('\n')
        .map(|line| format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape(line)))
        .collect();
    format!("<w:p><w:r>{}</w:r></w:p>", runs.join("<w:br/>"))
}

/// Table XML; each cell is one paragraph per `\n`-separated line.
pub fn table_xml(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in row.iter() {
            xml.push_str("<w:tc>");
            for line in cell.split('\n') {
                xml.push_str(&format!(
                    r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                    escape(line)
                ));
            }
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

/// Builds DOCX packages in memory.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    final_sect_pr: Option<String>,
    parts: Vec<(String, String)>,
    relationships: Vec<(String, String, &'static str)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&paragraph_xml(text));
        self
    }

    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        self.body.push_str(&table_xml(rows));
        self
    }

    /// Append raw body XML.
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Add a header part reachable through relationship `rel_id`.
    pub fn header_part(mut self, rel_id: &str, file: &str, text: &str) -> Self {
        self.parts.push((format!("word/{}", file), hdr_ftr_xml("hdr", text)));
        self.relationships.push((
            rel_id.to_string(),
            file.to_string(),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header",
        ));
        self
    }

    /// Add a footer part reachable through relationship `rel_id`.
    pub fn footer_part(mut self, rel_id: &str, file: &str, text: &str) -> Self {
        self.parts.push((format!("word/{}", file), hdr_ftr_xml("ftr", text)));
        self.relationships.push((
            rel_id.to_string(),
            file.to_string(),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer",
        ));
        self
    }

    /// Close the current section with a paragraph-level section break.
    pub fn section_break(mut self, header: Option<&str>, footer: Option<&str>) -> Self {
        let refs = sect_pr_xml(header, footer);
        self.body
            .push_str(&format!("<w:p><w:pPr>{}</w:pPr></w:p>", refs));
        self
    }

    /// Properties of the final section.
    pub fn final_section(mut self, header: Option<&str>, footer: Option<&str>) -> Self {
        self.final_sect_pr = Some(sect_pr_xml(header, footer));
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}{}</w:body></w:document>"#,
            W_NS,
            R_NS,
            self.body,
            self.final_sect_pr.clone().unwrap_or_default()
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
        )
        .unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(self.document_xml().as_bytes()).unwrap();

        if !self.relationships.is_empty() {
            let mut rels = String::from(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            );
            for (id, target, kind) in &self.relationships {
                rels.push_str(&format!(
                    r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                    id, kind, target
                ));
            }
            rels.push_str("</Relationships>");
            zip.start_file("word/_rels/document.xml.rels", options).unwrap();
            zip.write_all(rels.as_bytes()).unwrap();
        }

        for (name, xml) in &self.parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

fn hdr_ftr_xml(root: &str, text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:{root} xmlns:w="{W_NS}">{}</w:{root}>"#,
        paragraph_xml(text)
    )
}

fn sect_pr_xml(header: Option<&str>, footer: Option<&str>) -> String {
    let mut xml = String::from("<w:sectPr>");
    if let Some(id) = header {
        xml.push_str(&format!(
            r#"<w:headerReference w:type="default" r:id="{}"/>"#,
            id
        ));
    }
    if let Some(id) = footer {
        xml.push_str(&format!(
            r#"<w:footerReference w:type="default" r:id="{}"/>"#,
            id
        ));
    }
    xml.push_str("</w:sectPr>");
    xml
}

/// The two-page notice used by the end-to-end scenario.
pub fn notice_docx() -> DocxBuilder {
    DocxBuilder::new()
        .paragraph("공지사항입니다")
        .paragraph("- 1 -")
        .paragraph("학점 비교")
        .table(&[&["학과", "기준"], &["경영학과", "130"]])
        .paragraph("p. 2")
}

/// Page segments the external service would return for [`notice_docx`].
pub fn notice_pages() -> Vec<ParsedPage> {
    vec![
        ParsedPage::new(1, "공지사항입니다\n"),
        ParsedPage::new(
            2,
            "학점 비교\n<table><tr><th>학과</th><th>기준</th></tr><tr><td>경영학과</td><td>130</td></tr></table>",
        ),
    ]
}

/// Converter that writes a prepared DOCX.
pub struct StaticConverter {
    docx: Vec<u8>,
    delay: Duration,
    pub finished: Arc<AtomicBool>,
}

impl StaticConverter {
    pub fn new(docx: Vec<u8>) -> Self {
        Self {
            docx,
            delay: Duration::ZERO,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl DocxConverter for StaticConverter {
    fn name(&self) -> &str {
        "static"
    }

    fn convert(&self, _pdf: &Path, docx: &Path, _options: &ConvertOptions) -> Result<PathBuf> {
        std::thread::sleep(self.delay);
        std::fs::write(docx, &self.docx)?;
        self.finished.store(true, Ordering::SeqCst);
        Ok(docx.to_path_buf())
    }
}

/// Converter that always fails.
pub struct FailingConverter;

impl DocxConverter for FailingConverter {
    fn name(&self) -> &str {
        "failing"
    }

    fn convert(&self, _pdf: &Path, _docx: &Path, _options: &ConvertOptions) -> Result<PathBuf> {
        Err(Error::Conversion("corrupt xref table".into()))
    }
}

/// Parser that returns fixed pages, optionally after a delay.
pub struct StaticParser {
    pages: Vec<ParsedPage>,
    delay: Duration,
    pub finished: Arc<AtomicBool>,
}

impl StaticParser {
    pub fn new(pages: Vec<ParsedPage>) -> Self {
        Self {
            pages,
            delay: Duration::ZERO,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl DocumentParser for StaticParser {
    fn name(&self) -> &str {
        "static"
    }

    async fn parse_pages(&self, _pdf: &Path) -> Result<Vec<ParsedPage>> {
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(self.pages.clone())
    }
}

/// Parser whose service is down.
pub struct FailingParser;

#[async_trait]
impl DocumentParser for FailingParser {
    fn name(&self) -> &str {
        "failing"
    }

    async fn parse_pages(&self, _pdf: &Path) -> Result<Vec<ParsedPage>> {
        Err(Error::ExternalParse("503 Service Unavailable".into()))
    }
}
