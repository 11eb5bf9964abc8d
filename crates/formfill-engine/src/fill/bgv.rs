//! Background verification forms: "Label:" paragraphs plus every repeated
//! section table.

use formfill_core::{AddressQualifier, FieldType, StructuralModel};
use formfill_docx::{Document, Slot};

use super::text::is_placeholder;
use super::{
    SectionCounters, TableView, fill_address_table, fill_education_table, fill_employment_table,
    fill_gap_table, fill_reference_table, rewrite,
};
use crate::classifier::{TableKind, classify_table};
use crate::resolver::Resolver;

/// Paragraph labels ending in ":" get their value appended.
fn fill_label_paragraphs(doc: &mut Document, model: &StructuralModel, res: &Resolver) -> usize {
    let mut fixes = 0;
    for p in &model.paragraphs {
        let Some((label, tail)) = p.text.trim_end().rsplit_once(':') else {
            continue;
        };
        if !p.is_field || !is_placeholder(tail) {
            continue;
        }
        let value = res.resolve(p.field_type, AddressQualifier::scan(label));
        if value.trim().is_empty() {
            continue;
        }
        let new_text = if p.field_type == FieldType::PassportExpiryDateWithEmployment {
            format!("Expiry Date: {value} Employment History:")
        } else {
            format!("{}: {value}", label.trim_end())
        };
        fixes += rewrite(doc, Slot::Paragraph(p.position), &new_text);
    }
    fixes
}

pub fn fill_background_verification(
    doc: &mut Document,
    model: &StructuralModel,
    res: &Resolver,
    counters: &mut SectionCounters,
) -> usize {
    let record = res.record();
    let education = record.education_list();
    let addresses = record.address_list();
    let gaps = record.gap_list();

    let mut fixes = fill_label_paragraphs(doc, model, res);

    for table in &model.tables {
        let t = table.position;
        let mut view = TableView::read(doc, t);
        let kind = classify_table(&view.rows);
        tracing::debug!(table = t, kind = kind.as_str(), heading = %table.heading, "table");
        fixes += match kind {
            TableKind::Employment => fill_employment_table(doc, &view, &record.employment_history, counters),
            TableKind::Education => fill_education_table(doc, &view, &table.heading, &education, counters),
            TableKind::Sections(set) => {
                let mut n = 0;
                if set.address {
                    n += fill_address_table(doc, &view, &table.heading, &addresses, counters);
                    view = TableView::read(doc, t);
                }
                if set.reference {
                    n += fill_reference_table(doc, &view, &record.references, counters);
                    view = TableView::read(doc, t);
                }
                if set.gap {
                    n += fill_gap_table(doc, &view, &gaps, counters, set.address || set.reference);
                }
                n
            }
            TableKind::Unknown => 0,
        };
    }
    fixes
}
