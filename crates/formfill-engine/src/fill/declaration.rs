//! Declaration forms: gender tick boxes and keyword labels, in body
//! paragraphs, table cells and text boxes.

use std::collections::HashSet;

use formfill_core::{AddressQualifier, FieldType};
use formfill_docx::{Document, Slot};

use super::cell_paragraph_slots;
use super::text::{fill_after_colon, tick_gender};
use crate::labels::{declaration_field, is_fillable};
use crate::resolver::Resolver;

/// How far back an empty paragraph looks for the label it answers.
const LABEL_LOOKBACK: usize = 3;

fn value(res: &Resolver, field: FieldType) -> String {
    match field {
        FieldType::PassportDetails => res.record().personal(&["passport_no"]),
        other => res.resolve(other, AddressQualifier::Unspecified),
    }
}

/// Tick gender or fill one keyword label in place. Returns the field that
/// was filled, if any.
fn fill_span(
    doc: &mut Document,
    slot: Slot,
    res: &Resolver,
    gender: &str,
    fixes: &mut usize,
) -> Option<FieldType> {
    let text = doc.text(slot);
    if text.trim().is_empty() {
        return None;
    }
    if let Some(ticked) = tick_gender(&text, gender) {
        if doc.set_text(slot, &ticked) {
            *fixes += 1;
        }
        return Some(FieldType::Gender);
    }
    let field = declaration_field(&text)?;
    let v = value(res, field);
    if v.trim().is_empty() {
        return None;
    }
    let new_text = fill_after_colon(&text, &v)?;
    if doc.set_text(slot, &new_text) {
        *fixes += 1;
    }
    Some(field)
}

pub fn fill_declaration(doc: &mut Document, res: &Resolver) -> usize {
    let gender = res.record().personal(&["gender"]);
    let mut fixes = 0;
    let mut filled: HashSet<FieldType> = HashSet::new();

    for i in 0..doc.paragraph_count() {
        if let Some(f) = fill_span(doc, Slot::Paragraph(i), res, &gender, &mut fixes) {
            filled.insert(f);
        }
    }

    // Empty paragraphs under a label that had nowhere to put its value.
    for i in 0..doc.paragraph_count() {
        if !doc.text(Slot::Paragraph(i)).trim().is_empty() {
            continue;
        }
        for j in i.saturating_sub(LABEL_LOOKBACK)..i {
            let label = doc.text(Slot::Paragraph(j));
            if !is_fillable(&label) {
                continue;
            }
            let Some(field) = declaration_field(&label) else {
                continue;
            };
            if filled.contains(&field) {
                continue;
            }
            let v = value(res, field);
            if v.trim().is_empty() {
                continue;
            }
            if doc.set_text(Slot::Paragraph(i), &v) {
                fixes += 1;
                filled.insert(field);
            }
            break;
        }
    }

    for slot in cell_paragraph_slots(doc) {
        fill_span(doc, slot, res, &gender, &mut fixes);
    }
    for i in 0..doc.embedded_count() {
        fill_span(doc, Slot::Embedded(i), res, &gender, &mut fixes);
    }
    fixes
}

#[cfg(test)]
mod tests {
    use super::super::testdoc::*;
    use super::*;
    use chrono::NaiveDate;
    use formfill_core::ApplicantRecord;
    use serde_json::json;

    fn record() -> ApplicantRecord {
        ApplicantRecord::from_value(json!({
            "personal_details": {
                "name": "Jane Doe",
                "father_name": "Richard Doe",
                "gender": "Female",
                "nationality": "Indian",
                "passport_no": "Z1234567",
                "email": "jane@example.com"
            }
        }))
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn labels_and_gender_are_filled() {
        let mut d = doc(&[
            p("Self Declaration"),
            p("Full Name: ________"),
            p("Father's Name:"),
            p("Gender: Male Female Transgender"),
            p("Passport No:"),
        ]);
        let rec = record();
        let fixes = fill_declaration(&mut d, &Resolver::new(&rec, today()));
        assert_eq!(d.text(Slot::Paragraph(1)), "Full Name: Jane Doe");
        assert_eq!(d.text(Slot::Paragraph(2)), "Father's Name: Richard Doe");
        assert_eq!(d.text(Slot::Paragraph(3)), "Gender: ☐ Male ☑ Female ☐ Transgender");
        assert_eq!(d.text(Slot::Paragraph(4)), "Passport No: Z1234567");
        assert_eq!(fixes, 4);
    }

    #[test]
    fn empty_paragraph_below_label_takes_value() {
        let mut d = doc(&[p("Nationality"), p(""), p("Email: jane@old.test")]);
        let rec = record();
        let fixes = fill_declaration(&mut d, &Resolver::new(&rec, today()));
        assert_eq!(fixes, 0);

        let mut d = doc(&[p("Nationality:"), p("")]);
        // "Nationality:" is filled in place, so the empty line stays empty.
        fill_declaration(&mut d, &Resolver::new(&rec, today()));
        assert_eq!(d.text(Slot::Paragraph(0)), "Nationality: Indian");
        assert_eq!(d.text(Slot::Paragraph(1)), "");
    }

    #[test]
    fn cells_and_text_boxes_are_filled() {
        let body = format!(
            "{}<w:p><w:r><w:txbxContent>{}</w:txbxContent></w:r></w:p>",
            table(&[&["Nationality:"]]),
            p("Email:")
        );
        let mut d = formfill_docx::Document::from_body_xml(&body).unwrap();
        let rec = record();
        fill_declaration(&mut d, &Resolver::new(&rec, today()));
        assert_eq!(
            d.text(Slot::CellParagraph {
                table: 0,
                row: 0,
                cell: 0,
                paragraph: 0
            }),
            "Nationality: Indian"
        );
        assert_eq!(d.text(Slot::Embedded(0)), "Email: jane@example.com");
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut d = doc(&[p("Name:"), p("Male Female Transgender")]);
        let rec = record();
        let res = Resolver::new(&rec, today());
        assert_eq!(fill_declaration(&mut d, &res), 2);
        assert_eq!(fill_declaration(&mut d, &res), 0);
    }
}
