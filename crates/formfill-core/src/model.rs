//! Read-only structural view of one document: paragraphs, tables and their
//! true interleaving in the body.

use serde::Serialize;

use crate::types::FieldType;

/// A body-level block in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Block {
    Paragraph(usize),
    Table(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParagraphInfo {
    pub position: usize,
    pub text: String,
    pub is_field: bool,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellInfo {
    pub text: String,
    pub is_field: bool,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowInfo {
    pub cells: Vec<CellInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableInfo {
    pub position: usize,
    pub heading: String,
    pub rows: Vec<RowInfo>,
}

/// Derived view of a document. Never mutated after extraction; fillers read
/// the live document for current text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuralModel {
    pub paragraphs: Vec<ParagraphInfo>,
    pub tables: Vec<TableInfo>,
    pub order: Vec<Block>,
}

impl StructuralModel {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.tables.is_empty()
    }

    /// Paragraph and cell text, one fragment per line.
    pub fn full_text(&self) -> String {
        let mut parts: Vec<&str> = self.paragraphs.iter().map(|p| p.text.as_str()).collect();
        for table in &self.tables {
            for row in &table.rows {
                parts.extend(row.cells.iter().map(|c| c.text.as_str()));
            }
        }
        parts.join("\n")
    }

    /// Index of the paragraph nearest before `table` in document order.
    pub fn paragraph_before_table(&self, table: usize) -> Option<usize> {
        let at = self.order.iter().position(|b| *b == Block::Table(table))?;
        self.order[..at].iter().rev().find_map(|b| match b {
            Block::Paragraph(p) => Some(*p),
            Block::Table(_) => None,
        })
    }

    /// Counts of field-bearing paragraphs and cells.
    pub fn field_count(&self) -> usize {
        let paras = self.paragraphs.iter().filter(|p| p.is_field).count();
        let cells: usize = self
            .tables
            .iter()
            .flat_map(|t| &t.rows)
            .map(|r| r.cells.iter().filter(|c| c.is_field).count())
            .sum();
        paras + cells
    }
}
