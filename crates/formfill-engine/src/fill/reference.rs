//! Reference tables, in two layouts: named sections ("Reference 1",
//! "Reference (ii)") or one run of referee rows where a repeated field
//! starts the next reference.

use std::sync::LazyLock;

use formfill_core::Fields;
use formfill_docx::Document;
use regex::Regex;

use super::{SectionCounters, SectionState, TableView, clear_answer, ordinal_after, put_answer};

static NAMED_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:reference|referee)\s*[-:#]?\s*(?:\(\s*(?:[ivx]+|\d{1,2})\s*\)|[ivx]+\b|\d{1,2}\b)")
        .expect("valid reference regex")
});
static ORG_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\borg\b").expect("valid reference regex"));
static PH_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bph\b").expect("valid reference regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefField {
    DesignationCompany,
    Phone,
    Name,
    Email,
    Relationship,
    YearsKnown,
}

impl RefField {
    fn keys(self) -> &'static [&'static str] {
        match self {
            Self::DesignationCompany => &["designation_and_company", "designation"],
            Self::Phone => &["phone", "phone_number", "contact"],
            Self::Name => &["name"],
            Self::Email => &["email"],
            Self::Relationship => &["relationship"],
            Self::YearsKnown => &["years_known"],
        }
    }
}

const REFERENCE_FIELDS: &[(fn(&str) -> bool, RefField)] = &[
    (
        |l| l.contains("designation") || l.contains("company") || l.contains("organization") || ORG_WORD.is_match(l),
        RefField::DesignationCompany,
    ),
    (
        |l| PH_WORD.is_match(l) || l.contains("phone") || l.contains("mobile") || l.contains("contact"),
        RefField::Phone,
    ),
    (|l| l.contains("name"), RefField::Name),
    (|l| l.contains("email") || l.contains("mail"), RefField::Email),
    (|l| l.contains("relationship"), RefField::Relationship),
    (
        |l| l.contains("years known") || l.contains("known for") || l.contains("years"),
        RefField::YearsKnown,
    ),
];

fn field(label: &str) -> Option<RefField> {
    REFERENCE_FIELDS
        .iter()
        .find(|(test, _)| test(label))
        .map(|(_, f)| *f)
}

/// 1-based ordinal of a "Reference N" row.
fn named_ordinal(blob: &str) -> Option<usize> {
    let m = NAMED_REFERENCE.find(blob)?;
    let keyword = if m.as_str().starts_with("referee") { "referee" } else { "reference" };
    ordinal_after(keyword, m.as_str())
}

fn ends_references(blob: &str) -> bool {
    blob.contains("gap") || (blob.contains("complete") && blob.contains("address"))
}

fn write(doc: &mut Document, view: &TableView, row: usize, state: SectionState, refs: &[Fields], f: RefField) -> usize {
    match state {
        SectionState::Active(i) => put_answer(doc, view, row, &refs[i].first_text(f.keys())),
        SectionState::Exhausted => {
            clear_answer(doc, view, row);
            0
        }
        SectionState::Outside => 0,
    }
}

pub fn fill_reference_table(
    doc: &mut Document,
    view: &TableView,
    refs: &[Fields],
    counters: &mut SectionCounters,
) -> usize {
    let named = (0..view.len()).any(|r| named_ordinal(&view.blob(r)).is_some());
    if named {
        fill_named(doc, view, refs, counters)
    } else {
        fill_sequential(doc, view, refs, counters)
    }
}

fn fill_named(doc: &mut Document, view: &TableView, refs: &[Fields], counters: &mut SectionCounters) -> usize {
    let mut state = SectionState::Outside;
    let mut fixes = 0;
    for row in 0..view.len() {
        let blob = view.blob(row);
        if let Some(n) = named_ordinal(&blob) {
            state = SectionState::enter(n - 1, refs.len());
            counters.reference = counters.reference.max(n);
            continue;
        }
        if ends_references(&blob) {
            state = SectionState::Outside;
            continue;
        }
        if state == SectionState::Exhausted {
            clear_answer(doc, view, row);
        } else if let Some(f) = field(&view.label(row)) {
            fixes += write(doc, view, row, state, refs, f);
        }
    }
    fixes
}

fn fill_sequential(doc: &mut Document, view: &TableView, refs: &[Fields], counters: &mut SectionCounters) -> usize {
    let mut state = SectionState::Outside;
    let mut seen: Vec<RefField> = Vec::new();
    let mut fixes = 0;
    let next = |counters: &mut SectionCounters| {
        let index = counters.reference;
        counters.reference += 1;
        SectionState::enter(index, refs.len())
    };

    for row in 0..view.len() {
        let blob = view.blob(row);
        if ends_references(&blob) {
            state = SectionState::Outside;
            continue;
        }
        let label = view.label(row);
        if state == SectionState::Outside && (label.contains("reference") || label.contains("referee")) {
            state = next(counters);
            seen.clear();
        }
        if state == SectionState::Exhausted {
            clear_answer(doc, view, row);
            continue;
        }
        let Some(f) = field(&label) else {
            continue;
        };
        if state == SectionState::Outside {
            continue;
        }
        if seen.contains(&f) {
            state = next(counters);
            seen.clear();
        }
        seen.push(f);
        fixes += write(doc, view, row, state, refs, f);
    }
    fixes
}
