//! Six-field forms (name, father's name, email, address, date and the
//! "I, ... s/o or d/o ..." line) and the address pass that runs on every
//! non-verification form.

use formfill_core::AddressQualifier;
use formfill_docx::{Document, Slot};

use super::letters::RELATION_LINE;
use super::text::{blank, is_placeholder, label_before_colon};
use super::{TableView, put_answer, rewrite};
use crate::labels::{
    ADDRESS_LABEL, DATE_LABEL, DECLARATION_NAME_LINE, EMAIL_LABEL, EMAIL_SIGNATURE_LINE,
    RELATION_MARKER, is_father_label, is_name_label,
};
use crate::resolver::Resolver;

/// Labels longer than this are sentences, not fields.
const MAX_LABEL_CHARS: usize = 60;

struct SixFields {
    name: String,
    father: String,
    email: String,
    date: String,
}

impl SixFields {
    fn new(res: &Resolver) -> Self {
        let r = res.record();
        Self {
            name: r.personal(&["name"]),
            father: r.personal(&["father_name", "fathers_name"]),
            email: r.personal(&["email"]),
            date: res.today_text(),
        }
    }

    /// Value for a label. Father is tested before name so "Father's Name"
    /// never takes the applicant's name.
    fn value_for(&self, label: &str, res: &Resolver) -> Option<String> {
        let v = if is_father_label(label) {
            self.father.clone()
        } else if is_name_label(label) {
            self.name.clone()
        } else if EMAIL_LABEL.is_match(label) {
            self.email.clone()
        } else if ADDRESS_LABEL.is_match(label) {
            res.address(AddressQualifier::scan(label))
        } else if DATE_LABEL.is_match(label) {
            self.date.clone()
        } else {
            return None;
        };
        Some(v)
    }
}

pub fn fill_simple_six_fields(doc: &mut Document, res: &Resolver) -> usize {
    let six = SixFields::new(res);
    let mut fixes = 0;

    for i in 0..doc.paragraph_count() {
        let slot = Slot::Paragraph(i);
        let text = doc.text(slot);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        if DECLARATION_NAME_LINE.is_match(trimmed) && RELATION_MARKER.is_match(trimmed) {
            if six.name.is_empty() || six.father.is_empty() {
                continue;
            }
            if let Some(m) = RELATION_LINE.find(trimmed) {
                let rest = trimmed[m.end()..].trim_start();
                let new_text = format!("I, {} s/o or d/o {} {rest}", six.name, six.father);
                fixes += rewrite(doc, slot, new_text.trim_end());
            }
            continue;
        }

        if EMAIL_SIGNATURE_LINE.is_match(trimmed) {
            if !six.email.is_empty() {
                let new_text = format!("Personal Email id: {}   Signature:", six.email);
                fixes += rewrite(doc, slot, &new_text);
            }
            continue;
        }

        let label = label_before_colon(trimmed);
        if label.is_empty() || label.chars().count() > MAX_LABEL_CHARS {
            continue;
        }
        let Some(value) = six.value_for(label, res) else {
            continue;
        };
        if blank(&value).is_empty() {
            continue;
        }
        fixes += rewrite(doc, slot, &format!("{label}: {value}"));
    }

    for t in 0..doc.table_count() {
        let view = TableView::read(doc, t);
        for row in 0..view.len() {
            if view.cells(row) < 2 {
                continue;
            }
            let label = label_before_colon(view.cell(row, 0));
            let Some(value) = six.value_for(label, res) else {
                continue;
            };
            if blank(&value).is_empty() || view.cell(row, view.cells(row) - 1) == value {
                continue;
            }
            fixes += put_answer(doc, &view, row, &value);
        }
    }
    fixes
}

/// Section headings ("Details of the Address ...") read like address
/// labels but must stay untouched.
fn is_heading_like(label: &str) -> bool {
    let l = label.to_lowercase();
    l.chars().count() > MAX_LABEL_CHARS || l.contains(" of ") || l.contains(" the ")
}

/// Fill address labels with the address their qualifier names. Labels that
/// already carry a different value are left alone.
pub fn fill_current_address_everywhere(doc: &mut Document, res: &Resolver) -> usize {
    let any = [
        AddressQualifier::Current,
        AddressQualifier::Permanent,
        AddressQualifier::Previous,
    ]
    .iter()
    .any(|q| !res.address(*q).is_empty());
    if !any {
        return 0;
    }

    let mut fixes = 0;
    for i in 0..doc.paragraph_count() {
        let slot = Slot::Paragraph(i);
        let text = doc.text(slot);
        let trimmed = text.trim();
        if !ADDRESS_LABEL.is_match(trimmed) || EMAIL_LABEL.is_match(trimmed) {
            continue;
        }
        let label = label_before_colon(trimmed);
        if is_heading_like(label) {
            continue;
        }
        let value = res.address(AddressQualifier::scan(label));
        if value.is_empty() {
            continue;
        }
        if let Some((_, after)) = trimmed.split_once(':') {
            if !is_placeholder(after) && after.trim() != value {
                continue;
            }
        }
        fixes += rewrite(doc, slot, &format!("{label}: {value}"));
    }

    for t in 0..doc.table_count() {
        let view = TableView::read(doc, t);
        for row in 0..view.len() {
            if view.cells(row) < 2 {
                continue;
            }
            let label = view.cell(row, 0);
            if !ADDRESS_LABEL.is_match(label) || EMAIL_LABEL.is_match(label) || is_heading_like(label) {
                continue;
            }
            let value = res.address(AddressQualifier::scan(label));
            let current = view.cell(row, view.cells(row) - 1);
            if value.is_empty() || current == value || !is_placeholder(current) {
                continue;
            }
            fixes += put_answer(doc, &view, row, &value);
        }
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
                "email": "jane@example.com"
            },
            "address_history": {
                "current": "12 MG Road, Bengaluru",
                "permanent": "7 Temple St, Madurai"
            }
        }))
        .unwrap()
    }

    fn res(rec: &ApplicantRecord) -> Resolver<'_> {
        Resolver::new(rec, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap())
    }

    #[test]
    fn six_fields_in_paragraphs() {
        let mut d = doc(&[
            p("Employee Name:"),
            p("Father's Name:"),
            p("Email ID:"),
            p("Permanent Address:"),
            p("Date:"),
        ]);
        let rec = record();
        assert_eq!(fill_simple_six_fields(&mut d, &res(&rec)), 5);
        assert_eq!(d.text(Slot::Paragraph(0)), "Employee Name: Jane Doe");
        assert_eq!(d.text(Slot::Paragraph(1)), "Father's Name: Richard Doe");
        assert_eq!(d.text(Slot::Paragraph(2)), "Email ID: jane@example.com");
        assert_eq!(d.text(Slot::Paragraph(3)), "Permanent Address: 7 Temple St, Madurai");
        assert_eq!(d.text(Slot::Paragraph(4)), "Date: 07-03-2024");
    }

    #[test]
    fn six_fields_are_idempotent() {
        let mut d = doc(&[p("Name:"), p("Address:"), table(&[&["Email", ""]])]);
        let rec = record();
        let r = res(&rec);
        assert_eq!(fill_simple_six_fields(&mut d, &r), 3);
        let first = d.document_xml().unwrap();
        assert_eq!(fill_simple_six_fields(&mut d, &r), 0);
        assert_eq!(d.document_xml().unwrap(), first);
        assert_eq!(d.text(Slot::Paragraph(1)), "Address: 12 MG Road, Bengaluru");
    }

    #[test]
    fn relation_line_is_completed() {
        let mut d = doc(&[p("I, ______ s/o or d/o ______ do hereby declare")]);
        let rec = record();
        assert_eq!(fill_simple_six_fields(&mut d, &res(&rec)), 1);
        assert_eq!(
            d.text(Slot::Paragraph(0)),
            "I, Jane Doe s/o or d/o Richard Doe do hereby declare"
        );
    }

    #[test]
    fn address_pass_respects_qualifiers_and_filled_text() {
        let mut d = doc(&[
            p("Permanent Address:"),
            p("Current Address: 1 Other Lane"),
            p("Details of the address proof"),
            table(&[&["Residential Address", ""]]),
        ]);
        let rec = record();
        let fixes = fill_current_address_everywhere(&mut d, &res(&rec));
        assert_eq!(fixes, 2);
        assert_eq!(d.text(Slot::Paragraph(0)), "Permanent Address: 7 Temple St, Madurai");
        assert_eq!(d.text(Slot::Paragraph(1)), "Current Address: 1 Other Lane");
        assert_eq!(d.text(Slot::Paragraph(2)), "Details of the address proof");
        assert_eq!(
            d.text(Slot::Cell { table: 0, row: 0, cell: 1 }),
            "12 MG Road, Bengaluru"
        );
        assert_eq!(fill_current_address_everywhere(&mut d, &res(&rec)), 0);
    }

    #[test]
    fn address_pass_without_addresses_does_nothing() {
        let mut d = doc(&[p("Address:")]);
        let rec = ApplicantRecord::default();
        assert_eq!(fill_current_address_everywhere(&mut d, &res(&rec)), 0);
        assert_eq!(d.text(Slot::Paragraph(0)), "Address:");
    }
}
