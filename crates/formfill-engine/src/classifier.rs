//! Form and table classification.
//!
//! Both are ordered keyword tables evaluated first-match-wins. Form
//! classification is a pure function of the document text.

use std::sync::LazyLock;

use formfill_core::{FormType, StructuralModel};
use regex::Regex;

use crate::labels::normalize;

static NDA_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnda\b").expect("valid nda regex"));
static LOA_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bloa\b").expect("valid loa regex"));
static REFERENCE_ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\breference\s*(1|2|\(i\)|i|\(ii\)|ii)\b").expect("valid reference regex")
});

/// Form rules over lowercased full text, in priority order.
const FORM_RULES: &[(fn(&str) -> bool, FormType)] = &[
    (
        |t| t.contains("background verification"),
        FormType::BackgroundVerification,
    ),
    (
        |t| t.contains("form 2 revised") || t.contains("nomination and declaration form"),
        FormType::EpfNomination,
    ),
    (|t| t.contains("gratuity"), FormType::Gratuity),
    (
        |t| t.contains("declaration for pf account linking with aadhar"),
        FormType::PfAccount,
    ),
    (|t| t.contains("declaration"), FormType::Declaration),
    (
        |t| t.contains("non-disclosure") || NDA_WORD.is_match(t),
        FormType::Nda,
    ),
    (
        |t| t.contains("leave of absence") || LOA_WORD.is_match(t),
        FormType::Loa,
    ),
];

pub fn classify_text(text: &str) -> FormType {
    let t = normalize(text);
    FORM_RULES
        .iter()
        .find(|(test, _)| test(&t))
        .map(|(_, tag)| *tag)
        .unwrap_or_default()
}

pub fn classify(model: &StructuralModel) -> FormType {
    classify_text(&model.full_text())
}

// ── Tables ──

const EMPLOYMENT_KEYS: &[&str] = &[
    "employers name",
    "employer name",
    "employer's name",
    "position",
    "employment period",
    "employee code",
    "last salary",
    "reporting manager",
    "verify",
    "agency",
    "office",
    "telephone",
    "landline",
];

const EDUCATION_KEYS: &[&str] = &[
    "university and college",
    "degree",
    "diploma",
    "course",
    "period of the course",
    "roll",
    "registration",
    "seat",
    "location",
];

const ADDRESS_KEYS: &[&str] = &[
    "complete",
    "address",
    "town/ city",
    "town",
    "city",
    "duration of stay",
    "phone number",
];

const REFERENCE_KEYS: &[&str] = &["reference", "referee"];

const GAP_KEYS: &[&str] = &["gap", "unemployment"];

/// Which repeated-section fillers apply to a table that is neither an
/// employment nor an education table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionSet {
    pub address: bool,
    pub reference: bool,
    pub gap: bool,
}

impl SectionSet {
    pub fn is_empty(&self) -> bool {
        !(self.address || self.reference || self.gap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Employment,
    Education,
    /// Address, reference and gap sections, any combination. Fillers run in
    /// that fixed order.
    Sections(SectionSet),
    Unknown,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employment => "employment",
            Self::Education => "education",
            Self::Sections(_) => "sections",
            Self::Unknown => "unknown",
        }
    }
}

fn any_first_cell(rows: &[Vec<String>], keys: &[&str]) -> bool {
    rows.iter().any(|row| {
        let left = row.first().map(String::as_str).unwrap_or("");
        let t = normalize(left);
        keys.iter().any(|k| t.contains(k))
    })
}

fn any_row(rows: &[Vec<String>], keys: &[&str]) -> bool {
    rows.iter().any(|row| {
        let t = normalize(&row.join(" | "));
        keys.iter().any(|k| t.contains(k))
    })
}

pub fn looks_like_address(rows: &[Vec<String>]) -> bool {
    any_first_cell(rows, ADDRESS_KEYS) || any_row(rows, ADDRESS_KEYS)
}

pub fn looks_like_reference(rows: &[Vec<String>]) -> bool {
    any_row(rows, REFERENCE_KEYS)
        || rows.iter().any(|row| {
            let left = normalize(row.first().map(String::as_str).unwrap_or(""));
            REFERENCE_ORDINAL.is_match(&left)
        })
}

pub fn looks_like_gap(rows: &[Vec<String>]) -> bool {
    any_row(rows, GAP_KEYS)
}

/// Classify a table from its current cell text (row-major).
pub fn classify_table(rows: &[Vec<String>]) -> TableKind {
    if any_first_cell(rows, EMPLOYMENT_KEYS) {
        return TableKind::Employment;
    }
    if any_first_cell(rows, EDUCATION_KEYS) {
        return TableKind::Education;
    }
    let set = SectionSet {
        address: looks_like_address(rows),
        reference: looks_like_reference(rows),
        gap: looks_like_gap(rows),
    };
    if set.is_empty() {
        TableKind::Unknown
    } else {
        TableKind::Sections(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(grid: &[&[&str]]) -> Vec<Vec<String>> {
        grid.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn form_rules_priority() {
        assert_eq!(
            classify_text("Background Verification Form ... Declaration"),
            FormType::BackgroundVerification
        );
        assert_eq!(classify_text("FORM 2 REVISED"), FormType::EpfNomination);
        assert_eq!(
            classify_text("Nomination and Declaration Form"),
            FormType::EpfNomination
        );
        assert_eq!(classify_text("Payment of Gratuity declaration"), FormType::Gratuity);
        assert_eq!(
            classify_text("Declaration for PF account linking with Aadhar"),
            FormType::PfAccount
        );
        assert_eq!(classify_text("Self Declaration"), FormType::Declaration);
        assert_eq!(classify_text("Mutual Non-Disclosure Agreement"), FormType::Nda);
        assert_eq!(classify_text("This NDA binds"), FormType::Nda);
        assert_eq!(classify_text("Leave of Absence request"), FormType::Loa);
        assert_eq!(classify_text("LOA"), FormType::Loa);
        assert_eq!(classify_text("Offer letter"), FormType::General);
    }

    #[test]
    fn nda_and_loa_need_whole_words() {
        assert_eq!(classify_text("Agenda for the loan"), FormType::General);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Name: Email: Gratuity";
        assert_eq!(classify_text(text), classify_text(text));
    }

    #[test]
    fn employment_and_education_are_exclusive() {
        let t = rows(&[&["Employer Name & Branch", ""], &["Degree", ""]]);
        assert_eq!(classify_table(&t), TableKind::Employment);
        let t = rows(&[&["University and College", ""], &["Address", ""]]);
        assert_eq!(classify_table(&t), TableKind::Education);
    }

    #[test]
    fn mixed_tables_collect_every_section() {
        let t = rows(&[
            &["Complete Address", ""],
            &["Reference 1", ""],
            &["Name", ""],
            &["Details of Gap if any", ""],
            &["Reason for gap", ""],
        ]);
        assert_eq!(
            classify_table(&t),
            TableKind::Sections(SectionSet {
                address: true,
                reference: true,
                gap: true
            })
        );
    }

    #[test]
    fn unrelated_table_is_unknown() {
        let t = rows(&[&["Item", "Qty"], &["Laptop", "1"]]);
        assert_eq!(classify_table(&t), TableKind::Unknown);
    }
}
