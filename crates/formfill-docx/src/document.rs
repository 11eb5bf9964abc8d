//! A `.docx` package opened for text replacement.
//!
//! Only `word/document.xml` is parsed. Every other package entry is copied
//! through unchanged on save.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use formfill_core::Block;
use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::DocxError;
use crate::xml::{NodeId, XmlTree};

pub const DOCUMENT_PART: &str = "word/document.xml";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Elements that group runs inside a paragraph.
const RUN_CONTAINERS: &[&str] = &["w:hyperlink", "w:ins", "w:smartTag", "w:fldSimple"];

/// Run content that is not text and must survive a text replacement.
const GRAPHIC_ELEMENTS: &[&str] = &["w:drawing", "w:pict", "w:object", "mc:AlternateContent"];

/// Run children that carry text.
const TEXT_ELEMENTS: &[&str] = &["w:t", "w:tab", "w:br", "w:cr"];

/// Addressable text location in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Body-level paragraph.
    Paragraph(usize),
    /// Whole table cell; text is its paragraphs joined by `\n`.
    Cell { table: usize, row: usize, cell: usize },
    /// One paragraph inside a table cell.
    CellParagraph {
        table: usize,
        row: usize,
        cell: usize,
        paragraph: usize,
    },
    /// Paragraph inside a text box or content control.
    Embedded(usize),
}

pub struct Document {
    /// Original package bytes; `None` for documents built in memory.
    package: Option<Vec<u8>>,
    tree: XmlTree,
    paragraphs: Vec<NodeId>,
    /// table -> row -> cell
    tables: Vec<Vec<Vec<NodeId>>>,
    embedded: Vec<NodeId>,
    order: Vec<Block>,
}

impl Document {
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let bytes = std::fs::read(path).map_err(|source| DocxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Self::from_bytes(bytes)?;
        debug!(
            path = %path.display(),
            paragraphs = doc.paragraph_count(),
            tables = doc.table_count(),
            embedded = doc.embedded_count(),
            "opened document"
        );
        Ok(doc)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DocxError> {
        let xml = {
            let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice()))?;
            let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| match e {
                ZipError::FileNotFound => DocxError::MissingDocumentPart,
                other => other.into(),
            })?;
            let mut xml = String::new();
            part.read_to_string(&mut xml)?;
            xml
        };
        Self::from_parts(Some(bytes), &xml)
    }

    /// Build a document from the inner XML of `w:body`. Saving writes a
    /// minimal package around it.
    pub fn from_body_xml(body: &str) -> Result<Self, DocxError> {
        let xml = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
                r#" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006""#,
                r#" xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape""#,
                r#" xmlns:v="urn:schemas-microsoft-com:vml">"#,
                "<w:body>{}</w:body></w:document>"
            ),
            body
        );
        Self::from_parts(None, &xml)
    }

    fn from_parts(package: Option<Vec<u8>>, xml: &str) -> Result<Self, DocxError> {
        let tree = XmlTree::parse(xml)?;
        let body = tree.find("w:body").ok_or(DocxError::MissingBody)?;

        let mut paragraphs = Vec::new();
        let mut tables = Vec::new();
        let mut order = Vec::new();
        for &child in tree.children(body) {
            if tree.is(child, "w:p") {
                order.push(Block::Paragraph(paragraphs.len()));
                paragraphs.push(child);
            } else if tree.is(child, "w:tbl") {
                order.push(Block::Table(tables.len()));
                let rows = tree
                    .child_elements(child, "w:tr")
                    .into_iter()
                    .map(|tr| tree.child_elements(tr, "w:tc"))
                    .collect();
                tables.push(rows);
            }
        }

        let mut embedded: Vec<NodeId> = Vec::new();
        for node in tree.descendants(body) {
            if tree.is(node, "w:txbxContent") || tree.is(node, "w:sdtContent") {
                for p in tree.descendants(node) {
                    if tree.is(p, "w:p") && !embedded.contains(&p) {
                        embedded.push(p);
                    }
                }
            }
        }

        Ok(Self {
            package,
            tree,
            paragraphs,
            tables,
            embedded,
            order,
        })
    }

    // ── Enumeration ──

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn row_count(&self, table: usize) -> usize {
        self.tables.get(table).map_or(0, Vec::len)
    }

    pub fn cell_count(&self, table: usize, row: usize) -> usize {
        self.tables
            .get(table)
            .and_then(|t| t.get(row))
            .map_or(0, Vec::len)
    }

    pub fn cell_paragraph_count(&self, table: usize, row: usize, cell: usize) -> usize {
        self.cell_node(table, row, cell)
            .map_or(0, |tc| self.tree.child_elements(tc, "w:p").len())
    }

    pub fn embedded_count(&self) -> usize {
        self.embedded.len()
    }

    /// Body paragraphs and tables in true document order.
    pub fn body_order(&self) -> &[Block] {
        &self.order
    }

    fn cell_node(&self, table: usize, row: usize, cell: usize) -> Option<NodeId> {
        self.tables.get(table)?.get(row)?.get(cell).copied()
    }

    fn paragraph_node(&self, slot: Slot) -> Option<NodeId> {
        match slot {
            Slot::Paragraph(i) => self.paragraphs.get(i).copied(),
            Slot::Embedded(i) => self.embedded.get(i).copied(),
            Slot::CellParagraph {
                table,
                row,
                cell,
                paragraph,
            } => {
                let tc = self.cell_node(table, row, cell)?;
                self.tree.child_elements(tc, "w:p").get(paragraph).copied()
            }
            Slot::Cell { .. } => None,
        }
    }

    // ── Text ──

    /// Current text of a slot; empty when the slot does not exist.
    pub fn text(&self, slot: Slot) -> String {
        match slot {
            Slot::Cell { table, row, cell } => self
                .cell_node(table, row, cell)
                .map(|tc| {
                    self.tree
                        .child_elements(tc, "w:p")
                        .into_iter()
                        .map(|p| self.paragraph_text(p))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .unwrap_or_default(),
            _ => self
                .paragraph_node(slot)
                .map(|p| self.paragraph_text(p))
                .unwrap_or_default(),
        }
    }

    /// Replace the text of a slot. Returns `false` when the slot does not
    /// exist. Paragraph properties and the first run's formatting are kept.
    pub fn set_text(&mut self, slot: Slot, text: &str) -> bool {
        match slot {
            Slot::Cell { table, row, cell } => {
                let Some(tc) = self.cell_node(table, row, cell) else {
                    return false;
                };
                let p = self.reset_cell(tc);
                self.set_paragraph_text(p, text);
                true
            }
            _ => match self.paragraph_node(slot) {
                Some(p) => {
                    self.set_paragraph_text(p, text);
                    true
                }
                None => false,
            },
        }
    }

    fn paragraph_text(&self, p: NodeId) -> String {
        let mut out = String::new();
        for &child in self.tree.children(p) {
            if self.tree.is(child, "w:r") {
                self.run_text(child, &mut out);
            } else if RUN_CONTAINERS.iter().any(|c| self.tree.is(child, c)) {
                for r in self.tree.child_elements(child, "w:r") {
                    self.run_text(r, &mut out);
                }
            }
        }
        out
    }

    fn run_text(&self, r: NodeId, out: &mut String) {
        for &child in self.tree.children(r) {
            match self.tree.name(child) {
                Some(b"w:t") => {
                    for &t in self.tree.children(child) {
                        out.push_str(self.tree.text(t).unwrap_or(""));
                    }
                }
                Some(b"w:tab") => out.push('\t'),
                Some(b"w:br") | Some(b"w:cr") => out.push('\n'),
                _ => {}
            }
        }
    }

    fn has_graphic(&self, node: NodeId) -> bool {
        self.tree
            .descendants(node)
            .into_iter()
            .any(|d| GRAPHIC_ELEMENTS.iter().any(|g| self.tree.is(d, g)))
    }

    fn strip_text(&mut self, node: NodeId) {
        let runs = if self.tree.is(node, "w:r") {
            vec![node]
        } else {
            self.tree.child_elements(node, "w:r")
        };
        for r in runs {
            let kept: Vec<NodeId> = self
                .tree
                .children(r)
                .iter()
                .copied()
                .filter(|c| !TEXT_ELEMENTS.iter().any(|t| self.tree.is(*c, t)))
                .collect();
            self.tree.set_children(r, kept);
        }
    }

    fn set_paragraph_text(&mut self, p: NodeId, text: &str) {
        let run_props = self
            .tree
            .first_child(p, "w:r")
            .and_then(|r| self.tree.first_child(r, "w:rPr"));
        let run_props = run_props.map(|rpr| self.tree.deep_clone(rpr));

        let mut kept = Vec::new();
        let mut insert_at = None;
        for child in self.tree.children(p).to_vec() {
            let is_run = self.tree.is(child, "w:r")
                || RUN_CONTAINERS.iter().any(|c| self.tree.is(child, c));
            if !is_run {
                kept.push(child);
            } else if self.has_graphic(child) {
                self.strip_text(child);
                kept.push(child);
            } else if insert_at.is_none() {
                insert_at = Some(kept.len());
            }
        }
        let at = insert_at.unwrap_or(kept.len());
        self.tree.set_children(p, kept);

        if text.is_empty() {
            return;
        }
        let run = self.build_run(text, run_props);
        self.tree.insert(p, at, run);
    }

    fn build_run(&mut self, text: &str, run_props: Option<NodeId>) -> NodeId {
        let run = self.tree.new_element("w:r");
        if let Some(rpr) = run_props {
            self.tree.append(run, rpr);
        }
        let mut buf = String::new();
        for ch in text.chars() {
            match ch {
                '\t' | '\n' => {
                    self.flush_text(run, &mut buf);
                    let name = if ch == '\t' { "w:tab" } else { "w:br" };
                    let el = self.tree.new_element(name);
                    self.tree.append(run, el);
                }
                _ => buf.push(ch),
            }
        }
        self.flush_text(run, &mut buf);
        run
    }

    fn flush_text(&mut self, run: NodeId, buf: &mut String) {
        if buf.is_empty() {
            return;
        }
        let t = self.tree.new_element("w:t");
        self.tree.set_attr(t, "xml:space", "preserve");
        let txt = self.tree.new_text(buf);
        self.tree.append(t, txt);
        self.tree.append(run, t);
        buf.clear();
    }

    /// Leave a cell with its properties and a single (first) paragraph.
    fn reset_cell(&mut self, tc: NodeId) -> NodeId {
        let first_p = self.tree.first_child(tc, "w:p");
        let mut kept: Vec<NodeId> = self
            .tree
            .children(tc)
            .iter()
            .copied()
            .filter(|c| self.tree.is(*c, "w:tcPr") || Some(*c) == first_p)
            .collect();
        let p = match first_p {
            Some(p) => p,
            None => {
                let p = self.tree.new_element("w:p");
                kept.push(p);
                p
            }
        };
        self.tree.set_children(tc, kept);
        p
    }

    // ── Output ──

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let xml = self.tree.to_bytes()?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        match &self.package {
            Some(bytes) => {
                let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice()))?;
                for i in 0..archive.len() {
                    let entry = archive.by_index_raw(i)?;
                    if entry.name() == DOCUMENT_PART {
                        writer.start_file(DOCUMENT_PART, options)?;
                        writer.write_all(&xml)?;
                    } else {
                        writer.raw_copy_file(entry)?;
                    }
                }
            }
            None => {
                writer.start_file("[Content_Types].xml", options)?;
                writer.write_all(CONTENT_TYPES.as_bytes())?;
                writer.start_file("_rels/.rels", options)?;
                writer.write_all(PACKAGE_RELS.as_bytes())?;
                writer.start_file(DOCUMENT_PART, options)?;
                writer.write_all(&xml)?;
            }
        }
        Ok(writer.finish()?.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|source| DocxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "saved document");
        Ok(())
    }

    /// Serialized `word/document.xml`, for inspection in tests and logs.
    pub fn document_xml(&self) -> Result<String, DocxError> {
        let bytes = self.tree.to_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
