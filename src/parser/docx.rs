//! DOCX structural extraction.
//!
//! Walks `word/document.xml` in document order and emits one [`Block`] per
//! body paragraph or table. Content controls (`w:sdt`) are transparent.
//! Section boundaries are recorded so callers can iterate per section with
//! that section's header and footer.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::ops::Range;
use std::path::Path;

use roxmltree::Node;
use zip::result::ZipError;
use zip::ZipArchive;

use super::footer::is_suppressed;
use super::ExtractOptions;
use crate::error::{Error, Result};
use crate::model::{Block, Paragraph, Table, TableRow};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const MC_NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// Extract body blocks from a DOCX file with default options.
pub fn extract_blocks<P: AsRef<Path>>(path: P) -> Result<Vec<Block>> {
    Ok(DocxParser::new(ExtractOptions::default())
        .open(path)?
        .into_blocks())
}

/// A logical section of the body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Range into [`DocxDocument::blocks`]
    pub blocks: Range<usize>,

    /// Blocks of the section's default header (empty unless requested)
    pub header: Vec<Block>,

    /// Blocks of the section's default footer (empty unless requested)
    pub footer: Vec<Block>,
}

/// Result of walking a DOCX document.
#[derive(Debug, Clone, Default)]
pub struct DocxDocument {
    blocks: Vec<Block>,
    sections: Vec<Section>,
}

impl DocxDocument {
    /// All body blocks, concatenated across sections, in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Consume the document, keeping only the body blocks.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Sections in document order. Always at least one for a parsed body.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Body blocks belonging to a section.
    pub fn section_blocks(&self, section: &Section) -> &[Block] {
        &self.blocks[section.blocks.clone()]
    }

    /// Tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(Block::as_table)
    }

    /// Number of paragraph blocks.
    pub fn paragraph_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_table()).count()
    }

    /// Number of table blocks.
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }
}

/// DOCX structural parser.
#[derive(Debug, Clone, Default)]
pub struct DocxParser {
    options: ExtractOptions,
}

impl DocxParser {
    /// Create a parser with the given options.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Parse a DOCX file.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<DocxDocument> {
        let data = std::fs::read(path.as_ref())?;
        self.parse_bytes(&data)
    }

    /// Parse a DOCX package held in memory.
    pub fn parse_bytes(&self, data: &[u8]) -> Result<DocxDocument> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        let xml = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| Error::InvalidDocx(format!("missing {}", DOCUMENT_PART)))?;
        let doc = roxmltree::Document::parse(&xml)?;
        let body = child_w(doc.root_element(), "body")
            .ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

        let mut walker = BodyWalker::new(&self.options);
        walker.walk(body);
        let (blocks, markers) = walker.finish();

        let parts = if self.options.include_headers_footers {
            Some(HeaderFooterParts::load(&mut archive, &self.options)?)
        } else {
            None
        };

        let mut sections = Vec::with_capacity(markers.len());
        let mut start = 0;
        let mut inherited = SectionRefs::default();
        for marker in markers {
            let refs = marker.refs.inherit(&inherited);
            let (header, footer) = match parts.as_ref() {
                Some(parts) => (
                    parts.blocks(refs.header.as_deref()),
                    parts.blocks(refs.footer.as_deref()),
                ),
                None => (Vec::new(), Vec::new()),
            };
            sections.push(Section {
                blocks: start..marker.end,
                header,
                footer,
            });
            start = marker.end;
            inherited = refs;
        }

        log::debug!(
            "DOCX walk: {} blocks in {} sections",
            blocks.len(),
            sections.len()
        );

        Ok(DocxDocument { blocks, sections })
    }
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn is_w(node: Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(WML_NS)
        && node.tag_name().name() == name
}

fn is_mc(node: Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(MC_NS)
        && node.tag_name().name() == name
}

fn child_w<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_w(*n, name))
}

fn w_val<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute((WML_NS, "val"))
}

/// Header/footer relationship ids of one section (default type only).
#[derive(Debug, Clone, Default)]
struct SectionRefs {
    header: Option<String>,
    footer: Option<String>,
}

impl SectionRefs {
    fn from_sect_pr(sect_pr: Node) -> Self {
        let reference = |name: &str| {
            sect_pr
                .children()
                .filter(|n| is_w(*n, name))
                .find(|n| matches!(n.attribute((WML_NS, "type")), None | Some("default")))
                .and_then(|n| n.attribute((REL_NS, "id")))
                .map(str::to_string)
        };
        Self {
            header: reference("headerReference"),
            footer: reference("footerReference"),
        }
    }

    // A section without its own reference reuses the previous section's.
    fn inherit(self, previous: &SectionRefs) -> Self {
        Self {
            header: self.header.or_else(|| previous.header.clone()),
            footer: self.footer.or_else(|| previous.footer.clone()),
        }
    }
}

struct SectionMarker {
    end: usize,
    refs: SectionRefs,
}

/// Accumulates blocks in reading order for one XML container.
struct BodyWalker<'o> {
    options: &'o ExtractOptions,
    blocks: Vec<Block>,
    markers: Vec<SectionMarker>,
    final_refs: Option<SectionRefs>,
}

impl<'o> BodyWalker<'o> {
    fn new(options: &'o ExtractOptions) -> Self {
        Self {
            options,
            blocks: Vec::new(),
            markers: Vec::new(),
            final_refs: None,
        }
    }

    fn walk(&mut self, container: Node) {
        for child in container.children().filter(Node::is_element) {
            if is_w(child, "p") {
                self.paragraph(child);
            } else if is_w(child, "tbl") {
                self.blocks.push(Block::Table(parse_table(child)));
            } else if is_w(child, "sdt") {
                if let Some(content) = child_w(child, "sdtContent") {
                    self.walk(content);
                }
            } else if is_w(child, "sectPr") {
                self.final_refs = Some(SectionRefs::from_sect_pr(child));
            }
        }
    }

    fn paragraph(&mut self, p: Node) {
        let text = paragraph_text(p, self.options.include_textboxes);
        let suppressed = if self.options.suppress_footer_text {
            is_suppressed(&text)
        } else {
            text.is_empty()
        };
        if !suppressed {
            self.blocks.push(Block::Paragraph(Paragraph::with_text(text)));
        }

        if let Some(sect_pr) = child_w(p, "pPr").and_then(|ppr| child_w(ppr, "sectPr")) {
            self.markers.push(SectionMarker {
                end: self.blocks.len(),
                refs: SectionRefs::from_sect_pr(sect_pr),
            });
        }
    }

    fn finish(mut self) -> (Vec<Block>, Vec<SectionMarker>) {
        self.markers.push(SectionMarker {
            end: self.blocks.len(),
            refs: self.final_refs.unwrap_or_default(),
        });
        (self.blocks, self.markers)
    }
}

/// Paragraph text: visible runs, then any text-box text not already present.
fn paragraph_text(p: Node, include_textboxes: bool) -> String {
    let mut visible = String::new();
    collect_run_text(p, &mut visible);
    let mut text = visible.trim().to_string();

    if include_textboxes {
        let mut boxes = Vec::new();
        find_textboxes(p, &mut boxes);
        for textbox in boxes {
            let box_text = textbox_text(textbox);
            if box_text.is_empty() || text.contains(&box_text) {
                continue;
            }
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&box_text);
        }
    }

    text
}

fn collect_run_text(node: Node, out: &mut String) {
    for child in node.children().filter(Node::is_element) {
        if is_w(child, "t") {
            out.push_str(child.text().unwrap_or(""));
        } else if is_w(child, "tab") {
            out.push('\t');
        } else if is_w(child, "br") || is_w(child, "cr") {
            out.push('\n');
        } else if is_w(child, "txbxContent")
            || is_w(child, "pPr")
            || is_w(child, "rPr")
            || is_mc(child, "Fallback")
        {
            // Text boxes are captured separately; the VML fallback duplicates them.
        } else {
            collect_run_text(child, out);
        }
    }
}

fn find_textboxes<'a, 'input>(node: Node<'a, 'input>, out: &mut Vec<Node<'a, 'input>>) {
    for child in node.children().filter(Node::is_element) {
        if is_w(child, "txbxContent") {
            out.push(child);
        } else if !is_mc(child, "Fallback") {
            find_textboxes(child, out);
        }
    }
}

fn textbox_text(textbox: Node) -> String {
    textbox
        .children()
        .filter(|n| is_w(*n, "p"))
        .map(|p| {
            let mut line = String::new();
            collect_run_text(p, &mut line);
            line.trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cell text: trimmed text of each direct paragraph, blanks dropped, joined by `\n`.
fn cell_text(tc: Node) -> String {
    tc.children()
        .filter(|n| is_w(*n, "p"))
        .map(|p| {
            let mut line = String::new();
            collect_run_text(p, &mut line);
            line.trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn row_cells<'a, 'input>(tr: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    let mut cells = Vec::new();
    for child in tr.children().filter(Node::is_element) {
        if is_w(child, "tc") {
            cells.push(child);
        } else if is_w(child, "sdt") {
            if let Some(content) = child_w(child, "sdtContent") {
                cells.extend(content.children().filter(|n| is_w(*n, "tc")));
            }
        }
    }
    cells
}

fn parse_table(tbl: Node) -> Table {
    let mut table = Table::new();
    let mut previous: Vec<String> = Vec::new();

    for tr in tbl.children().filter(|n| is_w(*n, "tr")) {
        let mut cells: Vec<String> = Vec::new();

        let grid_before = child_w(tr, "trPr")
            .and_then(|pr| child_w(pr, "gridBefore"))
            .and_then(w_val)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        cells.extend(std::iter::repeat(String::new()).take(grid_before));

        for tc in row_cells(tr) {
            let tc_pr = child_w(tc, "tcPr");
            let span = tc_pr
                .and_then(|pr| child_w(pr, "gridSpan"))
                .and_then(w_val)
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(1)
                .max(1);
            let continues_merge = tc_pr
                .and_then(|pr| child_w(pr, "vMerge"))
                .map(|vm| w_val(vm) != Some("restart"))
                .unwrap_or(false);

            let text = if continues_merge {
                previous.get(cells.len()).cloned().unwrap_or_default()
            } else {
                cell_text(tc)
            };
            cells.extend(std::iter::repeat(text).take(span));
        }

        previous = cells.clone();
        table.add_row(TableRow::new(cells));
    }

    table
}

/// Header and footer parts, resolved through the document relationships.
struct HeaderFooterParts {
    targets: HashMap<String, String>,
    parsed: HashMap<String, Vec<Block>>,
}

impl HeaderFooterParts {
    fn load<R: Read + Seek>(archive: &mut ZipArchive<R>, options: &ExtractOptions) -> Result<Self> {
        let mut targets = HashMap::new();
        if let Some(rels) = read_part(archive, DOCUMENT_RELS_PART)? {
            let doc = roxmltree::Document::parse(&rels)?;
            for rel in doc
                .root_element()
                .children()
                .filter(|n| {
                    n.is_element()
                        && n.tag_name().namespace() == Some(PKG_REL_NS)
                        && n.tag_name().name() == "Relationship"
                })
            {
                if let (Some(id), Some(target)) = (rel.attribute("Id"), rel.attribute("Target")) {
                    targets.insert(id.to_string(), part_name(target));
                }
            }
        }

        let mut parsed = HashMap::new();
        for part in targets.values() {
            if !(part.starts_with("word/header") || part.starts_with("word/footer")) {
                continue;
            }
            let Some(xml) = read_part(archive, part)? else {
                log::warn!("Header/footer part {} is referenced but missing", part);
                continue;
            };
            let doc = roxmltree::Document::parse(&xml)?;
            let mut walker = BodyWalker::new(options);
            walker.walk(doc.root_element());
            parsed.insert(part.clone(), walker.finish().0);
        }

        Ok(Self { targets, parsed })
    }

    fn blocks(&self, rel_id: Option<&str>) -> Vec<Block> {
        rel_id
            .and_then(|id| self.targets.get(id))
            .and_then(|part| self.parsed.get(part))
            .cloned()
            .unwrap_or_default()
    }
}

/// Relationship targets are relative to `word/` unless absolute.
fn part_name(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("word/{}", target.trim_start_matches("./")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(inner: &str) -> String {
        format!(
            r#"<w:document xmlns:w="{}" xmlns:r="{}" xmlns:mc="{}"><w:body>{}</w:body></w:document>"#,
            WML_NS, REL_NS, MC_NS, inner
        )
    }

    fn walk(xml: &str) -> (Vec<Block>, Vec<SectionMarker>) {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let body = child_w(doc.root_element(), "body").unwrap();
        let options = ExtractOptions::default();
        let mut walker = BodyWalker::new(&options);
        walker.walk(body);
        walker.finish()
    }

    #[test]
    fn test_paragraphs_and_footer_suppression() {
        let xml = body(
            r#"<w:p><w:r><w:t>공지</w:t></w:r><w:r><w:t xml:space="preserve">사항</w:t></w:r></w:p>
               <w:p><w:r><w:t>- 3 -</w:t></w:r></w:p>
               <w:p></w:p>
               <w:p><w:r><w:t>p. 4</w:t></w:r></w:p>"#,
        );
        let (blocks, _) = walk(&xml);
        assert_eq!(blocks, vec![Block::paragraph("공지사항")]);
    }

    #[test]
    fn test_textbox_appended_once() {
        let xml = body(
            r#"<w:p><w:r><w:t>본문</w:t></w:r>
                 <w:r><mc:AlternateContent>
                   <mc:Choice><w:drawing><w:txbxContent><w:p><w:r><w:t>상자</w:t></w:r></w:p></w:txbxContent></w:drawing></mc:Choice>
                   <mc:Fallback><w:pict><w:txbxContent><w:p><w:r><w:t>상자</w:t></w:r></w:p></w:txbxContent></w:pict></mc:Fallback>
                 </mc:AlternateContent></w:r></w:p>"#,
        );
        let (blocks, _) = walk(&xml);
        assert_eq!(blocks, vec![Block::paragraph("본문\n상자")]);
    }

    #[test]
    fn test_textbox_mirroring_visible_text_is_skipped() {
        let xml = body(
            r#"<w:p><w:r><w:t>같은 글</w:t></w:r>
                 <w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>같은 글</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r></w:p>"#,
        );
        let (blocks, _) = walk(&xml);
        assert_eq!(blocks, vec![Block::paragraph("같은 글")]);
    }

    #[test]
    fn test_table_cells_and_merges() {
        let xml = body(
            r#"<w:tbl>
                 <w:tr>
                   <w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>구분</w:t></w:r></w:p></w:tc>
                   <w:tc><w:tcPr><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>학점</w:t></w:r></w:p></w:tc>
                 </w:tr>
                 <w:tr>
                   <w:tc><w:p><w:r><w:t> 경영 </w:t></w:r></w:p><w:p/><w:p><w:r><w:t>학과</w:t></w:r></w:p></w:tc>
                   <w:tc><w:p><w:r><w:t>주</w:t></w:r></w:p></w:tc>
                   <w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>
                 </w:tr>
               </w:tbl>"#,
        );
        let (blocks, _) = walk(&xml);
        let table = blocks[0].as_table().unwrap();
        assert_eq!(table.rows[0].cells, vec!["구분", "구분", "학점"]);
        assert_eq!(table.rows[1].cells, vec!["경영\n학과", "주", "학점"]);
    }

    #[test]
    fn test_document_order_and_sdt() {
        let xml = body(
            r#"<w:p><w:r><w:t>앞</w:t></w:r></w:p>
               <w:sdt><w:sdtContent><w:p><w:r><w:t>컨트롤</w:t></w:r></w:p></w:sdtContent></w:sdt>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>x</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
               <w:p><w:r><w:t>뒤</w:t></w:r></w:p>"#,
        );
        let (blocks, _) = walk(&xml);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1], Block::paragraph("컨트롤"));
        assert!(blocks[2].is_table());
        assert_eq!(blocks[3], Block::paragraph("뒤"));
    }

    #[test]
    fn test_section_markers() {
        let xml = body(
            r#"<w:p><w:r><w:t>1절</w:t></w:r></w:p>
               <w:p><w:pPr><w:sectPr><w:headerReference w:type="default" r:id="rId7"/></w:sectPr></w:pPr></w:p>
               <w:p><w:r><w:t>2절</w:t></w:r></w:p>
               <w:sectPr><w:footerReference w:type="default" r:id="rId9"/></w:sectPr>"#,
        );
        let (blocks, markers) = walk(&xml);
        assert_eq!(blocks.len(), 2);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].end, 1);
        assert_eq!(markers[0].refs.header.as_deref(), Some("rId7"));
        assert_eq!(markers[1].end, 2);
        assert_eq!(markers[1].refs.footer.as_deref(), Some("rId9"));

        let inherited = markers[1].refs.clone().inherit(&markers[0].refs);
        assert_eq!(inherited.header.as_deref(), Some("rId7"));
    }

    #[test]
    fn test_part_name() {
        assert_eq!(part_name("header1.xml"), "word/header1.xml");
        assert_eq!(part_name("/word/footer2.xml"), "word/footer2.xml");
    }

    #[test]
    fn test_not_a_zip() {
        let parser = DocxParser::default();
        assert!(matches!(parser.parse_bytes(b"not a docx"), Err(Error::Zip(_))));
    }
}
