//! Statutory nomination forms: payment of gratuity (Form F) and EPF/EPS
//! nomination (Form 2).

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use formfill_core::{AddressQualifier, Fields};
use formfill_docx::{Document, Slot};
use regex::Regex;

use super::text::blank;
use super::{TableView, put_answer, put_cell, rewrite};
use crate::labels::normalize;
use crate::resolver::Resolver;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid nomination regex")
}

static HONORIFIC_BLANK: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)shri\.?\s*/?\s*shrimati\s*/\s*kumari\s*[.…_]+"));
static PLACE_ONLY: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^place\s*[.…_:]+\s*$"));
static DATE_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^date\s*[.…_:]+\s*signature\s*/\s*thumb[-\s]impression"));
static PLACE_AND_DATE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^place\s*:\s*[.…_\s]*date\s*:\s*[.…_\s]*$"));
static WITNESS_LINE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)^name in full and full address of\s*:?\s*[.…_\s]*$"));

static BLOCK_LETTERS: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)name\s*\(in block letters\)"));
static DOB_ACCOUNT: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)date of birth\s*:.*account no\.?"));
static MARITAL_LINE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)sex\s*:\s*male\s*/\s*female.*marital status"));
static PERMANENT_ADDRESS_LINE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)address\s+permanent\s*:?[\s.…_]*$"));
static DATE_ALONE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^date\s*[:.…_]*$"));
static CERTIFICATE_HONORIFIC: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)shri\s*/\s*smt\.?\s*/\s*miss\s*"));

const DOB_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];

fn parse_date(s: &str) -> Option<NaiveDate> {
    DOB_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s.trim(), f).ok())
}

/// Completed years between `dob` and `today`; empty when `dob` does not
/// parse.
pub fn age_on(dob: &str, today: NaiveDate) -> String {
    let Some(born) = parse_date(dob) else {
        return String::new();
    };
    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    if years < 0 {
        return String::new();
    }
    years.to_string()
}

fn is_female(gender: &str) -> bool {
    matches!(gender.trim().to_lowercase().as_str(), "f" | "female")
}

fn joined(parts: &[String]) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fill the first empty data row of a table whose header row contains
/// `header` and has a column count in `columns`. At most one row is
/// written.
fn fill_first_empty_row(
    doc: &mut Document,
    header: &str,
    columns: RangeInclusive<usize>,
    values: &[String],
) -> usize {
    for t in 0..doc.table_count() {
        let view = TableView::read(doc, t);
        if view.len() < 2 || !columns.contains(&view.cells(0)) || !view.blob(0).contains(header) {
            continue;
        }
        let Some(row) = (1..view.len()).find(|&r| {
            view.cells(r) >= values.len() && (0..view.cells(r)).all(|c| view.cell(r, c).is_empty())
        }) else {
            continue;
        };
        let mut fixes = 0;
        for (c, v) in values.iter().enumerate() {
            fixes += put_cell(doc, t, row, c, v);
        }
        return usize::from(fixes > 0);
    }
    0
}

// ── Gratuity ──

/// Employee statement rows, keyed by the label in the middle cell.
const STATEMENT_ROWS: &[(&str, &str)] = &[
    ("name of employee in full", "name"),
    ("sex", "gender"),
    ("religion", "religion"),
    ("marital status", "marital_status"),
    ("department", "department"),
    ("post held", "post_held"),
    ("date of appointment", "date_of_appointment"),
    ("permanent address", "address"),
];

pub fn fill_gratuity(doc: &mut Document, res: &Resolver) -> usize {
    let r = res.record();
    let epf = &r.epf_and_gratuity;
    let name = r.personal(&["name"]);
    let gender = r.personal(&["gender"]);
    let address = res.address(AddressQualifier::Unspecified);
    let place = epf.text("form_sign_place");
    let date = res.today_text();
    let nominee = epf.section("nominee");

    let statement = |key: &str| -> String {
        match key {
            "name" => name.clone(),
            "gender" => gender.clone(),
            "address" => res.address(AddressQualifier::Permanent),
            other => epf.text(other),
        }
    };

    let mut fixes = 0;
    for i in 0..doc.paragraph_count() {
        let slot = Slot::Paragraph(i);
        let text = doc.text(slot);
        let t = text.trim();
        let new_text = if HONORIFIC_BLANK.is_match(t) && !name.is_empty() {
            let honorific = if is_female(&gender) { "Shrimati" } else { "Shri" };
            HONORIFIC_BLANK
                .replace(t, format!("{honorific} {name}").as_str())
                .into_owned()
        } else if PLACE_ONLY.is_match(t) && !place.is_empty() {
            format!("Place {place}")
        } else if DATE_SIGNATURE.is_match(t) {
            format!("Date {date}\tSignature/Thumb-impression")
        } else if PLACE_AND_DATE.is_match(t) {
            format!("Place : {place} Date : {date}")
        } else if WITNESS_LINE.is_match(t) {
            let witnesses: Vec<String> = epf
                .texts("witnesses")
                .iter()
                .map(|w| joined(&[w.clone(), address.clone()]))
                .collect();
            if witnesses.is_empty() {
                continue;
            }
            format!("Name in full and full address of: {}", witnesses.join("; "))
        } else {
            continue;
        };
        fixes += rewrite(doc, slot, &new_text);
    }

    for t in 0..doc.table_count() {
        let view = TableView::read(doc, t);
        for row in 0..view.len() {
            if view.cells(row) != 3 || !view.cell(row, 2).is_empty() {
                continue;
            }
            let label = normalize(view.cell(row, 1));
            if let Some((_, key)) = STATEMENT_ROWS.iter().find(|(l, _)| label.contains(l)) {
                fixes += put_answer(doc, &view, row, &statement(key));
            }
        }
    }

    if !nominee.text("name").is_empty() {
        let values = [
            joined(&[nominee.text("name"), nominee.text("address")]),
            nominee.text("relationship"),
            age_on(&nominee.text("date_of_birth"), res.today()),
            nominee.text("share"),
        ];
        fixes += fill_first_empty_row(doc, "nominee", 4..=usize::MAX, &values);
    }
    fixes
}

// ── EPF nomination ──

fn nominee_values(nominee: &Fields) -> [String; 3] {
    [
        joined(&[nominee.text("name"), nominee.text("address")]),
        nominee.text("date_of_birth"),
        nominee.text("relationship"),
    ]
}

pub fn fill_epf_nomination(doc: &mut Document, res: &Resolver) -> usize {
    let r = res.record();
    let epf = &r.epf_and_gratuity;
    let name = r.personal(&["name"]);
    let gender = r.personal(&["gender"]);
    let dob = r.personal(&["date_of_birth"]);
    let pf_account = epf.first_text(&["pf_account_no", "pf_account_number"]);
    let marital = epf.first_text(&["marital_status"]);
    let permanent = res.address(AddressQualifier::Permanent);
    let date = res.today_text();

    let mut fixes = 0;
    for i in 0..doc.paragraph_count() {
        let slot = Slot::Paragraph(i);
        let text = doc.text(slot);
        let t = text.trim();
        let new_text = if BLOCK_LETTERS.is_match(t) && !name.is_empty() {
            format!("Name (IN BLOCK LETTERS) :\t{}", name.to_uppercase())
        } else if DOB_ACCOUNT.is_match(t) && !(dob.is_empty() && pf_account.is_empty()) {
            format!("Date of Birth :\t{dob}\t3. Account No. \t{pf_account}")
        } else if MARITAL_LINE.is_match(t) && !marital.is_empty() {
            format!("4. *Sex : MALE/FEMALE:\t5. Marital Status \t{marital}")
        } else if PERMANENT_ADDRESS_LINE.is_match(t) && !permanent.is_empty() {
            format!("6. Address Permanent :\t{permanent}")
        } else if DATE_ALONE.is_match(t) {
            format!("Date \t{date}")
        } else if CERTIFICATE_HONORIFIC.is_match(t)
            && normalize(t).contains("employed in my establishment")
            && !name.is_empty()
        {
            let honorific = if is_female(&gender) { "Smt." } else { "Shri" };
            CERTIFICATE_HONORIFIC
                .replace(t, format!("{honorific} {name} ").as_str())
                .into_owned()
        } else {
            continue;
        };
        fixes += rewrite(doc, slot, &new_text);
    }

    let nominee = epf.section("nominee");
    if !nominee.text("name").is_empty() {
        let [who, born, relation] = nominee_values(&nominee);
        let wide = [who.clone(), relation.clone(), born.clone(), nominee.text("share")];
        fixes += fill_first_empty_row(doc, "nominee", 6..=usize::MAX, &wide);
        fixes += fill_first_empty_row(doc, "nominee", 3..=5, &[who, born, relation]);
    }
    let member = epf.section("family_member_1");
    if !member.text("name").is_empty() {
        let values = [
            "1".to_string(),
            joined(&[member.text("name"), member.text("address")]),
            blank(&member.text("age")),
            member.text("relationship"),
        ];
        fixes += fill_first_empty_row(doc, "family member", 4..=usize::MAX, &values);
    }
    fixes
}

#[cfg(test)]
mod tests {
    use super::super::testdoc::*;
    use super::*;
    use formfill_core::ApplicantRecord;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    fn record() -> ApplicantRecord {
        ApplicantRecord::from_value(json!({
            "personal_details": {
                "name": "Jane Doe",
                "gender": "Female",
                "date_of_birth": "1994-05-10"
            },
            "address_history": {"permanent": "7 Temple St, Madurai"},
            "epf_and_gratuity": {
                "department": "Finance",
                "post_held": "Analyst",
                "form_sign_place": "Pune",
                "pf_account_no": "MH/PUN/123",
                "marital_status": "Single",
                "witnesses": ["Asha Rao"],
                "nominee": {
                    "name": "Mary Doe",
                    "relationship": "Mother",
                    "address": "7 Temple St, Madurai",
                    "date_of_birth": "1960-03-08",
                    "share": "100%"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn age_counts_completed_years() {
        assert_eq!(age_on("1960-03-08", today()), "63");
        assert_eq!(age_on("07/03/1960", today()), "64");
        assert_eq!(age_on("unknown", today()), "");
    }

    #[test]
    fn gratuity_lines_statement_and_nominee() {
        let mut d = doc(&[
            p("I, shri.shrimati/Kumari………… whose particulars are given"),
            p("Place………"),
            p("Date……… Signature/Thumb-impression"),
            table(&[
                &["1", "Name of employee in full", ""],
                &["2", "Department", ""],
                &["3", "Religion", ""],
            ]),
            table(&[
                &["Name in full with full address of nominee(s)", "Relationship", "Age", "Share"],
                &["1", "2", "3", "4"],
                &["", "", "", ""],
            ]),
        ]);
        let rec = record();
        let fixes = fill_gratuity(&mut d, &Resolver::new(&rec, today()));
        assert_eq!(
            d.text(Slot::Paragraph(0)),
            "I, Shrimati Jane Doe whose particulars are given"
        );
        assert_eq!(d.text(Slot::Paragraph(1)), "Place Pune");
        assert_eq!(d.text(Slot::Paragraph(2)), "Date 07-03-2024\tSignature/Thumb-impression");
        let cell = |t, row, cell| d.text(Slot::Cell { table: t, row, cell });
        assert_eq!(cell(0, 0, 2), "Jane Doe");
        assert_eq!(cell(0, 1, 2), "Finance");
        assert_eq!(cell(0, 2, 2), "");
        assert_eq!(cell(1, 2, 0), "Mary Doe, 7 Temple St, Madurai");
        assert_eq!(cell(1, 2, 2), "63");
        assert_eq!(fixes, 6);
    }

    #[test]
    fn epf_lines_and_nominee_row() {
        let mut d = doc(&[
            p("1. Name (IN BLOCK LETTERS) :"),
            p("6. Address Permanent :"),
            p("Date"),
            table(&[
                &["Name and Address of the nominee", "Date of Birth", "Relationship"],
                &["", "", ""],
            ]),
        ]);
        let rec = record();
        let fixes = fill_epf_nomination(&mut d, &Resolver::new(&rec, today()));
        assert_eq!(d.text(Slot::Paragraph(0)), "Name (IN BLOCK LETTERS) :\tJANE DOE");
        assert_eq!(d.text(Slot::Paragraph(1)), "6. Address Permanent :\t7 Temple St, Madurai");
        assert_eq!(d.text(Slot::Paragraph(2)), "Date \t07-03-2024");
        assert_eq!(
            d.text(Slot::Cell { table: 0, row: 1, cell: 2 }),
            "Mother"
        );
        assert_eq!(fixes, 4);
    }
}
