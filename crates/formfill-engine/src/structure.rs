//! Structure extraction: a read-only pass that turns a document into a
//! [`StructuralModel`].

use formfill_core::{Block, CellInfo, ParagraphInfo, RowInfo, StructuralModel, TableInfo};
use formfill_docx::{Document, Slot};

use crate::labels::match_label;

/// Paragraph texts that name a whole section rather than one table.
const GENERIC_HEADINGS: &[&str] = &["personal details:", "employment history:", "education:"];

/// First-row words that identify an education block better than a generic
/// heading does.
const HEADING_PROBES: &[&str] = &["highest qualification", "previous", "professional"];

pub fn extract(doc: &Document) -> StructuralModel {
    let paragraphs: Vec<ParagraphInfo> = (0..doc.paragraph_count())
        .map(|i| {
            let text = doc.text(Slot::Paragraph(i)).trim().to_string();
            let m = match_label(&text);
            ParagraphInfo {
                position: i,
                text,
                is_field: m.is_field,
                field_type: m.field_type,
            }
        })
        .collect();

    let order: Vec<Block> = doc.body_order().to_vec();

    let mut model = StructuralModel {
        paragraphs,
        tables: Vec::with_capacity(doc.table_count()),
        order,
    };

    for t in 0..doc.table_count() {
        let rows: Vec<RowInfo> = (0..doc.row_count(t))
            .map(|r| RowInfo {
                cells: (0..doc.cell_count(t, r))
                    .map(|c| {
                        let text = doc
                            .text(Slot::Cell {
                                table: t,
                                row: r,
                                cell: c,
                            })
                            .trim()
                            .to_string();
                        let m = match_label(&text);
                        CellInfo {
                            text,
                            is_field: m.is_field,
                            field_type: m.field_type,
                        }
                    })
                    .collect(),
            })
            .collect();
        let preceding = model
            .paragraph_before_table(t)
            .map(|p| model.paragraphs[p].text.as_str())
            .unwrap_or("");
        let heading = table_heading(preceding, &rows);
        model.tables.push(TableInfo {
            position: t,
            heading,
            rows,
        });
    }

    tracing::debug!(
        paragraphs = model.paragraphs.len(),
        tables = model.tables.len(),
        fields = model.field_count(),
        "extracted structure"
    );
    model
}

/// Lowercased heading for a table. Generic section labels defer to the
/// table's own first row when that row names the block.
pub fn table_heading(preceding: &str, rows: &[RowInfo]) -> String {
    let mut heading = preceding.trim().to_lowercase();
    if heading.is_empty() || GENERIC_HEADINGS.contains(&heading.as_str()) {
        if let Some(first) = rows.first() {
            let probe = first
                .cells
                .iter()
                .take(2)
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_lowercase();
            if HEADING_PROBES.iter().any(|k| probe.contains(k)) {
                heading = probe;
            }
        }
    }
    heading.replace("details of ", "")
}
