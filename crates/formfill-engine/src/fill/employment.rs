//! Employment tables: one section per "Details of ... Employer" header row,
//! or the whole table as one section when there are no headers.

use formfill_core::Fields;
use formfill_docx::Document;

use super::text::period_text;
use super::{SectionCounters, SectionState, TableView, clear_answer, ordinal_after, put_answer};

enum Source {
    Keys(&'static [&'static str]),
    Period,
    CanVerify,
}

/// Row-label rules over the normalized first cell, first match wins.
const EMPLOYMENT_FIELDS: &[(fn(&str) -> bool, Source)] = &[
    (
        |l| {
            l.contains("employers name")
                || l.contains("employer name")
                || l.contains("employer's name")
                || l.contains("employer’s name")
        },
        Source::Keys(&["employer_name_and_branch", "employer_name"]),
    ),
    (
        |l| {
            l.contains("position")
                && (l.contains("held") || l.contains("department") || l.contains("dept"))
        },
        Source::Keys(&["position_and_department", "position_department"]),
    ),
    (|l| l.contains("employment period"), Source::Period),
    (|l| l.contains("employee code"), Source::Keys(&["employee_code"])),
    (|l| l.contains("last salary"), Source::Keys(&["last_salary"])),
    (
        |l| l.contains("reason for leaving"),
        Source::Keys(&["reason_for_leaving"]),
    ),
    (
        |l| l.contains("reporting manager"),
        Source::Keys(&["reporting_manager"]),
    ),
    (
        |l| l.contains("telephone") || l.contains("landline"),
        Source::Keys(&["landline"]),
    ),
    (
        |l| l.contains("verify") && l.contains("employment"),
        Source::CanVerify,
    ),
    (
        |l| l.contains("agency") && l.contains("details"),
        Source::Keys(&["agency_details", "contract_agency"]),
    ),
    (
        |l| l.contains("address"),
        Source::Keys(&["employer_address", "address"]),
    ),
];

fn is_employer_header(left: &str) -> bool {
    left.contains("details of") && left.contains("employer")
}

fn field(left: &str) -> Option<&'static Source> {
    EMPLOYMENT_FIELDS
        .iter()
        .find(|(test, _)| test(left))
        .map(|(_, source)| source)
}

fn value(record: &Fields, source: &Source) -> String {
    match source {
        Source::Keys(keys) => record.first_text(keys),
        Source::Period => period_text(record.get("employment_period")),
        Source::CanVerify => {
            if record.truthy("can_verify") {
                "Yes".into()
            } else {
                "No".into()
            }
        }
    }
}

/// Fill one employment table. A header ordinal ("(ii)", "2") addresses a
/// record directly; headers without one take the next unused record.
pub fn fill_employment_table(
    doc: &mut Document,
    view: &TableView,
    records: &[Fields],
    counters: &mut SectionCounters,
) -> usize {
    let has_headers = (0..view.len()).any(|r| is_employer_header(&view.left(r)));
    let mut state = if has_headers {
        SectionState::Exhausted
    } else {
        let index = counters.employment;
        counters.employment += 1;
        SectionState::enter(index, records.len())
    };

    let mut fixes = 0;
    for row in 0..view.len() {
        let left = view.left(row);
        if is_employer_header(&left) {
            let index = ordinal_after("employer", &left)
                .map(|n| n - 1)
                .unwrap_or(counters.employment);
            counters.employment = counters.employment.max(index + 1);
            state = SectionState::enter(index, records.len());
            tracing::debug!(table = view.table, row, section = index, "employment section");
            continue;
        }
        match state {
            SectionState::Active(i) => {
                if let Some(source) = field(&left) {
                    fixes += put_answer(doc, view, row, &value(&records[i], source));
                }
            }
            SectionState::Exhausted => clear_answer(doc, view, row),
            SectionState::Outside => {}
        }
    }
    fixes
}
