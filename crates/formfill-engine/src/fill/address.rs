//! Multi-address tables: "Complete Address" rows open a section whose
//! town, duration and phone rows follow.

use formfill_core::record::{ADDRESS_TEXT_KEY, ADDRESS_TYPE_KEY};
use formfill_core::{AddressQualifier, Fields};
use formfill_docx::Document;

use super::text::city_of;
use super::{SectionCounters, TableView, clear_answer, put_answer};

fn of_type<'a>(list: &'a [Fields], kind: &str) -> impl Iterator<Item = &'a Fields> {
    list.iter().filter(move |a| a.text(ADDRESS_TYPE_KEY) == kind)
}

/// Pick the address a "Complete Address" row asks for, consuming a slot
/// from the matching counter.
fn target(list: &[Fields], qualifier: AddressQualifier, counters: &mut SectionCounters) -> Option<Fields> {
    match qualifier {
        AddressQualifier::Permanent => of_type(list, "permanent").next().cloned(),
        AddressQualifier::Current => of_type(list, "current").next().cloned(),
        AddressQualifier::Previous => {
            let index = counters.previous_address;
            counters.previous_address += 1;
            of_type(list, "previous").nth(index).cloned()
        }
        AddressQualifier::Unspecified => {
            let index = counters.address;
            counters.address += 1;
            list.get(index).cloned()
        }
    }
}

fn leaves_section(left: &str) -> bool {
    left.contains("reference") || left.contains("referee") || left.contains("gap")
}

pub fn fill_address_table(
    doc: &mut Document,
    view: &TableView,
    heading: &str,
    list: &[Fields],
    counters: &mut SectionCounters,
) -> usize {
    let mut pending = AddressQualifier::scan(heading);
    // None: outside any address section. Some(None): section with no data.
    let mut current: Option<Option<Fields>> = None;
    let mut fixes = 0;

    for row in 0..view.len() {
        let left = view.left(row);
        if leaves_section(&left) {
            current = None;
            continue;
        }
        if left.contains("complete") && left.contains("address") {
            let qualifier = match AddressQualifier::scan(&left) {
                AddressQualifier::Unspecified => pending,
                q => q,
            };
            let found = target(list, qualifier, counters);
            match &found {
                Some(a) => fixes += put_answer(doc, view, row, &a.text(ADDRESS_TEXT_KEY)),
                None => clear_answer(doc, view, row),
            }
            tracing::debug!(
                table = view.table,
                row,
                qualifier = qualifier.as_str(),
                found = found.is_some(),
                "address section"
            );
            current = Some(found);
            continue;
        }
        if left.contains("address") && !left.contains("mail") {
            let q = AddressQualifier::scan(&left);
            if q != AddressQualifier::Unspecified {
                pending = q;
                current = None;
                continue;
            }
        }

        let Some(section) = &current else {
            continue;
        };
        let is_town = left.contains("town") || left.contains("city");
        let is_duration = left.contains("duration of stay");
        let is_phone = left.contains("phone");
        if !(is_town || is_duration || is_phone) {
            continue;
        }
        match section {
            Some(a) => {
                let value = if is_town {
                    city_of(&a.text(ADDRESS_TEXT_KEY))
                } else if is_duration {
                    a.text("duration_of_stay")
                } else {
                    a.text("phone_number")
                };
                fixes += put_answer(doc, view, row, &value);
            }
            None => clear_answer(doc, view, row),
        }
    }
    fixes
}

#[cfg(test)]
mod tests {
    use super::super::testdoc::*;
    use super::*;
    use formfill_core::ApplicantRecord;
    use formfill_docx::Slot;
    use serde_json::json;

    fn list() -> Vec<Fields> {
        ApplicantRecord::from_value(json!({
            "address_history": {
                "current": {
                    "town_or_city_name": "12 MG Road, Indiranagar, Bengaluru, Karnataka",
                    "duration_of_stay": "2 years",
                    "phone_number": "9000000001"
                },
                "previous": [
                    {"town_or_city_name": "4 Lake View, Kothrud, Pune, Maharashtra"}
                ],
                "permanent": {"town_or_city_name": "7 Temple St, Madurai, Tamil Nadu"}
            }
        }))
        .unwrap()
        .address_list()
    }

    fn cell(d: &Document, row: usize) -> String {
        d.text(Slot::Cell { table: 0, row, cell: 1 })
    }

    #[test]
    fn qualified_rows_pick_matching_address() {
        let mut d = doc(&[table(&[
            &["Complete Address (Permanent)", ""],
            &["Town / City", ""],
            &["Complete Address (Current)", ""],
            &["Duration of stay", ""],
            &["Phone Number", ""],
        ])]);
        let view = TableView::read(&d, 0);
        let fixes = fill_address_table(&mut d, &view, "", &list(), &mut SectionCounters::default());
        assert_eq!(fixes, 5);
        assert_eq!(cell(&d, 0), "7 Temple St, Madurai, Tamil Nadu");
        assert_eq!(cell(&d, 1), "Madurai, Tamil Nadu");
        assert_eq!(cell(&d, 2), "12 MG Road, Indiranagar, Bengaluru, Karnataka");
        assert_eq!(cell(&d, 3), "2 years");
        assert_eq!(cell(&d, 4), "9000000001");
    }

    #[test]
    fn qualifier_header_row_applies_to_next_section() {
        let mut d = doc(&[table(&[
            &["Previous Address"],
            &["Complete Address", ""],
            &["Town / City", ""],
        ])]);
        let view = TableView::read(&d, 0);
        let mut counters = SectionCounters::default();
        fill_address_table(&mut d, &view, "", &list(), &mut counters);
        assert_eq!(cell(&d, 1), "4 Lake View, Kothrud, Pune, Maharashtra");
        assert_eq!(cell(&d, 2), "Pune, Maharashtra");
        assert_eq!(counters.previous_address, 1);
    }

    #[test]
    fn unqualified_sections_walk_the_list_then_clear() {
        let rows: Vec<&[&str]> = (0..4)
            .flat_map(|_| [&["Complete Address", "x"][..], &["Town / City", "x"][..]])
            .collect();
        let mut d = doc(&[table(&rows)]);
        let view = TableView::read(&d, 0);
        let fixes = fill_address_table(&mut d, &view, "", &list(), &mut SectionCounters::default());
        assert_eq!(fixes, 6);
        assert_eq!(cell(&d, 4), "7 Temple St, Madurai, Tamil Nadu");
        assert_eq!(cell(&d, 6), "");
        assert_eq!(cell(&d, 7), "");
    }

    #[test]
    fn reference_rows_end_the_section() {
        let mut d = doc(&[table(&[
            &["Complete Address", ""],
            &["Reference 1"],
            &["Phone Number", "ref phone"],
        ])]);
        let view = TableView::read(&d, 0);
        fill_address_table(&mut d, &view, "", &list(), &mut SectionCounters::default());
        assert_eq!(cell(&d, 2), "ref phone");
    }
}
