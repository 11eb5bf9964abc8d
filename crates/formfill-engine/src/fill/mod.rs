//! Section fillers.
//!
//! Every filler reads current text from the live [`Document`], writes through
//! [`Document::set_text`] and returns the number of non-empty values it
//! wrote. Clearing a stale answer cell is not counted.

pub mod text;

mod address;
mod bgv;
mod declaration;
mod education;
mod employment;
mod gap;
mod letters;
mod nomination;
mod reference;
mod simple;

use std::sync::LazyLock;

use formfill_docx::{Document, Slot};
use regex::Regex;

use crate::labels::normalize;

pub(crate) use address::fill_address_table;
pub use bgv::fill_background_verification;
pub use declaration::fill_declaration;
pub(crate) use education::fill_education_table;
pub(crate) use employment::fill_employment_table;
pub(crate) use gap::fill_gap_table;
pub use letters::{fill_general, fill_loa, fill_nda, fill_pf_account};
pub use nomination::{fill_epf_nomination, fill_gratuity};
pub(crate) use reference::fill_reference_table;
pub use simple::{fill_current_address_everywhere, fill_simple_six_fields};

/// Per-document count of consumed records for each repeated section, so
/// the Nth table of a class gets the Nth record and no record is reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionCounters {
    pub employment: usize,
    pub education: usize,
    pub address: usize,
    pub previous_address: usize,
    pub reference: usize,
    pub gap: usize,
}

/// Position inside one table's run of ordinal sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    /// Not inside a section this filler owns; rows are left alone.
    Outside,
    /// Inside section `n`, which has a record.
    Active(usize),
    /// Inside a section with no record; answer cells are cleared.
    Exhausted,
}

impl SectionState {
    pub fn enter(index: usize, available: usize) -> Self {
        if index < available {
            Self::Active(index)
        } else {
            Self::Exhausted
        }
    }
}

// ── Ordinals ──

static ORDINAL_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s\-–:#.]*(?:\(\s*([ivx]+|\d{1,2})\s*\)|([ivx]+)\b|(\d{1,2})\b)")
        .expect("valid ordinal regex")
});

static ORDINAL_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*([ivx]+|\d{1,2})\s*\)").expect("valid ordinal regex"));

fn roman(s: &str) -> Option<usize> {
    let n = match s {
        "i" => 1,
        "ii" => 2,
        "iii" => 3,
        "iv" => 4,
        "v" => 5,
        "vi" => 6,
        "vii" => 7,
        "viii" => 8,
        "ix" => 9,
        "x" => 10,
        _ => return None,
    };
    Some(n)
}

fn ordinal_value(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|n| *n > 0).or_else(|| roman(s))
}

/// 1-based ordinal following `keyword` ("Reference 2", "Employer (iii)"),
/// or failing that any parenthesised ordinal in the text.
pub fn ordinal_after(keyword: &str, text: &str) -> Option<usize> {
    let t = normalize(text);
    if let Some(at) = t.find(keyword) {
        let rest = &t[at + keyword.len()..];
        if let Some(caps) = ORDINAL_AFTER.captures(rest) {
            let raw = caps.get(1).or(caps.get(2)).or(caps.get(3))?;
            if let Some(n) = ordinal_value(raw.as_str()) {
                return Some(n);
            }
        }
    }
    ORDINAL_ANYWHERE
        .captures(&t)
        .and_then(|c| c.get(1))
        .and_then(|m| ordinal_value(m.as_str()))
}

// ── Live table access ──

/// Snapshot of one table's current cell text.
pub(crate) struct TableView {
    pub table: usize,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn read(doc: &Document, table: usize) -> Self {
        let rows = (0..doc.row_count(table))
            .map(|r| {
                (0..doc.cell_count(table, r))
                    .map(|c| {
                        doc.text(Slot::Cell {
                            table,
                            row: r,
                            cell: c,
                        })
                    })
                    .collect()
            })
            .collect();
        Self { table, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn cells(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, cell: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(cell))
            .map_or("", |s| s.trim())
    }

    /// First cell, normalized.
    pub fn left(&self, row: usize) -> String {
        normalize(self.cell(row, 0))
    }

    /// Every cell but the answer cell, normalized.
    pub fn label(&self, row: usize) -> String {
        let cells = self.rows.get(row).map_or(&[][..], Vec::as_slice);
        let take = if cells.len() >= 2 { cells.len() - 1 } else { cells.len() };
        normalize(&cells[..take].join(" | "))
    }

    /// Whole row, normalized.
    pub fn blob(&self, row: usize) -> String {
        self.rows
            .get(row)
            .map(|cells| normalize(&cells.join(" | ")))
            .unwrap_or_default()
    }

    /// Answer cell: the last cell of a row with at least two cells.
    pub fn answer(&self, row: usize) -> Option<Slot> {
        let n = self.cells(row);
        (n >= 2).then(|| Slot::Cell {
            table: self.table,
            row,
            cell: n - 1,
        })
    }
}

/// Write a value into a row's answer cell. Returns 1 when a non-empty value
/// was written.
pub(crate) fn put_answer(doc: &mut Document, view: &TableView, row: usize, value: &str) -> usize {
    let Some(slot) = view.answer(row) else {
        return 0;
    };
    let value = text::blank(value);
    doc.set_text(slot, &value);
    usize::from(!value.is_empty())
}

pub(crate) fn clear_answer(doc: &mut Document, view: &TableView, row: usize) {
    if let Some(slot) = view.answer(row) {
        doc.set_text(slot, "");
    }
}

/// Write a specific cell, counting non-empty values.
pub(crate) fn put_cell(doc: &mut Document, table: usize, row: usize, cell: usize, value: &str) -> usize {
    let written = doc.set_text(Slot::Cell { table, row, cell }, value);
    usize::from(written && !value.trim().is_empty())
}

/// Replace a slot's text. Counts only when the text actually changes.
pub(crate) fn rewrite(doc: &mut Document, slot: Slot, new_text: &str) -> usize {
    if doc.text(slot) == new_text {
        return 0;
    }
    usize::from(doc.set_text(slot, new_text))
}

/// Slots of every paragraph inside every table cell, in document order.
pub(crate) fn cell_paragraph_slots(doc: &Document) -> Vec<Slot> {
    let mut slots = Vec::new();
    for table in 0..doc.table_count() {
        for row in 0..doc.row_count(table) {
            for cell in 0..doc.cell_count(table, row) {
                for paragraph in 0..doc.cell_paragraph_count(table, row, cell) {
                    slots.push(Slot::CellParagraph {
                        table,
                        row,
                        cell,
                        paragraph,
                    });
                }
            }
        }
    }
    slots
}

#[cfg(test)]
pub(crate) mod testdoc {
    //! Body-XML builders for filler tests.

    use formfill_docx::Document;

    pub fn p(text: &str) -> String {
        let text = text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>")
    }

    pub fn table(rows: &[&[&str]]) -> String {
        let mut xml = String::from("<w:tbl>");
        for row in rows {
            xml.push_str("<w:tr>");
            for cell in *row {
                xml.push_str(&format!("<w:tc>{}</w:tc>", p(cell)));
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
        xml
    }

    pub fn doc(parts: &[String]) -> Document {
        Document::from_body_xml(&parts.concat()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testdoc::*;
    use super::*;

    #[test]
    fn ordinals_roman_and_arabic() {
        assert_eq!(ordinal_after("employer", "Details of Previous Employer (ii)"), Some(2));
        assert_eq!(ordinal_after("employer", "Details of Employer - 3"), Some(3));
        assert_eq!(ordinal_after("reference", "Reference 1"), Some(1));
        assert_eq!(ordinal_after("reference", "REFERENCE II"), Some(2));
        assert_eq!(ordinal_after("gap", "(iv) details of gap"), Some(4));
        assert_eq!(ordinal_after("employer", "Details of Present Employer"), None);
        assert_eq!(ordinal_after("gap", "Details of gap if any"), None);
    }

    #[test]
    fn section_state_enter() {
        assert_eq!(SectionState::enter(0, 2), SectionState::Active(0));
        assert_eq!(SectionState::enter(2, 2), SectionState::Exhausted);
    }

    #[test]
    fn table_view_label_excludes_answer() {
        let d = doc(&[table(&[&["Name", "Jane"], &["Heading only"]])]);
        let view = TableView::read(&d, 0);
        assert_eq!(view.label(0), "name");
        assert_eq!(view.blob(0), "name | jane");
        assert_eq!(view.label(1), "heading only");
        assert!(view.answer(1).is_none());
    }

    #[test]
    fn put_answer_counts_non_empty_only() {
        let mut d = doc(&[table(&[&["Name", "____"]])]);
        let view = TableView::read(&d, 0);
        assert_eq!(put_answer(&mut d, &view, 0, "N/A"), 0);
        assert_eq!(
            d.text(Slot::Cell {
                table: 0,
                row: 0,
                cell: 1
            }),
            ""
        );
        assert_eq!(put_answer(&mut d, &view, 0, "Jane"), 1);
    }

    #[test]
    fn rewrite_is_idempotent() {
        let mut d = doc(&[p("Name: Jane")]);
        assert_eq!(rewrite(&mut d, Slot::Paragraph(0), "Name: Jane"), 0);
        assert_eq!(rewrite(&mut d, Slot::Paragraph(0), "Name: Joan"), 1);
    }
}
