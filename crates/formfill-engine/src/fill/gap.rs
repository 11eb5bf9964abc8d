//! Employment-gap sections.

use std::sync::LazyLock;

use formfill_core::Fields;
use formfill_docx::Document;
use regex::Regex;

use super::text::period_text;
use super::{SectionCounters, SectionState, TableView, clear_answer, ordinal_after, put_answer};

static NAMED_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bgap\s*[-:#]?\s*(?:\(\s*(?:[ivx]+|\d{1,2})\s*\)|[ivx]+\b|\d{1,2}\b)")
        .expect("valid gap regex")
});
static FROM_TO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:from|to)\b").expect("valid gap regex"));

#[derive(Debug, Clone, Copy)]
enum GapField {
    Address,
    Reason,
    Period,
}

const GAP_FIELDS: &[(fn(&str) -> bool, GapField)] = &[
    (
        |l| l.contains("address stayed") || l.contains("address during gap"),
        GapField::Address,
    ),
    (
        |l| l.contains("reason for gap") || l.contains("gap reason") || l.starts_with("reason"),
        GapField::Reason,
    ),
    (
        |l| l.contains("period") || l.contains("duration") || FROM_TO.is_match(l),
        GapField::Period,
    ),
];

fn value(gap: &Fields, field: GapField) -> String {
    match field {
        GapField::Address => gap.text("address_during_gap"),
        GapField::Reason => gap.text("reason"),
        GapField::Period => period_text(gap.get("period")),
    }
}

fn named_ordinal(blob: &str) -> Option<usize> {
    let m = NAMED_GAP.find(blob)?;
    ordinal_after("gap", m.as_str())
}

fn ends_gaps(blob: &str) -> bool {
    blob.contains("reference")
        || blob.contains("referee")
        || (blob.contains("complete") && blob.contains("address"))
}

/// Fill gap sections. In a gap-only table the first section opens at the
/// top; in a mixed table it opens at the first row that mentions a gap.
pub fn fill_gap_table(
    doc: &mut Document,
    view: &TableView,
    gaps: &[Fields],
    counters: &mut SectionCounters,
    mixed: bool,
) -> usize {
    let next = |counters: &mut SectionCounters| {
        let index = counters.gap;
        counters.gap += 1;
        SectionState::enter(index, gaps.len())
    };
    let mut state = if mixed {
        SectionState::Outside
    } else {
        next(counters)
    };
    let mut fixes = 0;

    for row in 0..view.len() {
        let blob = view.blob(row);
        if let Some(n) = named_ordinal(&blob) {
            state = SectionState::enter(n - 1, gaps.len());
            counters.gap = counters.gap.max(n);
        } else if mixed && ends_gaps(&blob) {
            state = SectionState::Outside;
            continue;
        } else if state == SectionState::Outside && blob.contains("gap") {
            state = next(counters);
        }

        match state {
            SectionState::Active(i) => {
                let label = view.label(row);
                if let Some(field) = GAP_FIELDS.iter().find(|(test, _)| test(&label)).map(|(_, f)| *f) {
                    fixes += put_answer(doc, view, row, &value(&gaps[i], field));
                }
            }
            SectionState::Exhausted => clear_answer(doc, view, row),
            SectionState::Outside => {}
        }
    }
    fixes
}
