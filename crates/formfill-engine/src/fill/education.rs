//! Education tables. The table heading (or an in-table "Details of ...
//! Qualification" row) picks the record: highest is the first, previous
//! the second onwards. Professional certification blocks are not filled.

use formfill_core::Fields;
use formfill_docx::Document;

use super::text::period_text;
use super::{SectionCounters, SectionState, TableView, clear_answer, ordinal_after, put_answer};

enum Source {
    Key(&'static str),
    Period,
}

const EDUCATION_FIELDS: &[(fn(&str) -> bool, Source)] = &[
    (
        |l| l.contains("university") && l.contains("college"),
        Source::Key("university_and_college"),
    ),
    (
        |l| l.contains("location") && (l.contains("town") || l.contains("city") || l.contains("address")),
        Source::Key("location_full_address"),
    ),
    (
        |l| l.contains("period of the course") || (l.contains("period") && l.contains("course")),
        Source::Period,
    ),
    (
        |l| l.contains("degree") || l.contains("diploma") || l.contains("course"),
        Source::Key("degree_or_course"),
    ),
    (
        |l| l.contains("roll") || l.contains("registration") || l.contains("seat"),
        Source::Key("roll_or_registration"),
    ),
];

fn is_qualification_header(left: &str) -> bool {
    left.contains("details of") && (left.contains("qualification") || left.contains("professional"))
}

fn is_certification(heading: &str) -> bool {
    heading.contains("professional") && heading.contains("certification")
}

/// Record index a heading addresses; `None` for certification blocks.
fn section_index(heading: &str, counters: &mut SectionCounters) -> Option<usize> {
    if is_certification(heading) {
        return None;
    }
    let index = if heading.contains("highest") {
        0
    } else if heading.contains("previous") {
        1 + ordinal_after("qualification", heading).map_or(0, |n| n - 1)
    } else {
        counters.education
    };
    counters.education = counters.education.max(index + 1);
    Some(index)
}

fn value(record: &Fields, source: &Source) -> String {
    match source {
        Source::Key(key) => record.text(key),
        Source::Period => period_text(record.get("period_of_the_course")),
    }
}

pub fn fill_education_table(
    doc: &mut Document,
    view: &TableView,
    heading: &str,
    records: &[Fields],
    counters: &mut SectionCounters,
) -> usize {
    let has_headers = (0..view.len()).any(|r| is_qualification_header(&view.left(r)));
    let mut state = if has_headers {
        SectionState::Exhausted
    } else {
        match section_index(heading, counters) {
            Some(i) => SectionState::enter(i, records.len()),
            None => SectionState::Outside,
        }
    };

    let mut fixes = 0;
    for row in 0..view.len() {
        let left = view.left(row);
        if is_qualification_header(&left) {
            state = match section_index(&left, counters) {
                Some(i) => SectionState::enter(i, records.len()),
                None => SectionState::Outside,
            };
            continue;
        }
        match state {
            SectionState::Active(i) => {
                let source = EDUCATION_FIELDS
                    .iter()
                    .find(|(test, _)| test(&left))
                    .map(|(_, s)| s);
                if let Some(source) = source {
                    fixes += put_answer(doc, view, row, &value(&records[i], source));
                }
            }
            SectionState::Exhausted => clear_answer(doc, view, row),
            SectionState::Outside => {}
        }
    }
    fixes
}

#[cfg(test)]
mod tests {
    use super::super::testdoc::*;
    use super::*;
    use formfill_docx::Slot;
    use serde_json::json;

    fn records() -> Vec<Fields> {
        serde_json::from_value(json!([
            {
                "university_and_college": "IIT Bombay",
                "degree_or_course": "B.Tech",
                "period_of_the_course": {"start": "2014-07-01", "end": "2018-05-31"}
            },
            {"university_and_college": "DPS", "degree_or_course": "XII"}
        ]))
        .unwrap()
    }

    fn cell(d: &Document, table: usize, row: usize) -> String {
        d.text(Slot::Cell { table, row, cell: 1 })
    }

    #[test]
    fn heading_routes_highest_and_previous() {
        let rows: &[&[&str]] = &[&["University and College", ""], &["Degree / Course", ""]];
        let mut d = doc(&[table(rows), table(rows)]);
        let recs = records();
        let mut counters = SectionCounters::default();
        let v = TableView::read(&d, 1);
        fill_education_table(&mut d, &v, "previous qualification", &recs, &mut counters);
        let v = TableView::read(&d, 0);
        fill_education_table(&mut d, &v, "highest qualification", &recs, &mut counters);
        assert_eq!(cell(&d, 0, 0), "IIT Bombay");
        assert_eq!(cell(&d, 1, 0), "DPS");
        assert_eq!(cell(&d, 1, 1), "XII");
    }

    #[test]
    fn in_table_headers_and_certifications() {
        let mut d = doc(&[table(&[
            &["Details of Highest Qualification"],
            &["University and College", ""],
            &["Period of the course", ""],
            &["Details of Professional Certification"],
            &["Degree", "keep me"],
        ])]);
        let recs = records();
        let v = TableView::read(&d, 0);
        let fixes = fill_education_table(&mut d, &v, "", &recs, &mut SectionCounters::default());
        assert_eq!(fixes, 2);
        assert_eq!(cell(&d, 0, 2), "Jul 2014 - May 2018");
        assert_eq!(cell(&d, 0, 4), "keep me");
    }

    #[test]
    fn missing_record_clears_answers() {
        let mut d = doc(&[table(&[&["Degree", "old"]])]);
        let v = TableView::read(&d, 0);
        let fixes = fill_education_table(&mut d, &v, "previous qualification", &[], &mut SectionCounters::default());
        assert_eq!(fixes, 0);
        assert_eq!(cell(&d, 0, 0), "");
    }

    #[test]
    fn surplus_section_clears_every_answer() {
        let mut d = doc(&[table(&[
            &["Details of Previous Qualification (2)"],
            &["Grade / Percentage", "____"],
            &["Degree", "old"],
        ])]);
        let v = TableView::read(&d, 0);
        fill_education_table(&mut d, &v, "", &records(), &mut SectionCounters::default());
        assert_eq!(cell(&d, 0, 1), "");
        assert_eq!(cell(&d, 0, 2), "");
    }

    #[test]
    fn certification_heading_skips_table() {
        let mut d = doc(&[table(&[&["Degree", "old"]])]);
        let v = TableView::read(&d, 0);
        fill_education_table(
            &mut d,
            &v,
            "professional certification",
            &records(),
            &mut SectionCounters::default(),
        );
        assert_eq!(cell(&d, 0, 0), "old");
    }
}
