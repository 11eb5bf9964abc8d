//! Label matching: decides whether a text span is a fillable label and which
//! field it names.
//!
//! Matching is an ordered `(predicate, tag)` table evaluated first-match-wins
//! over lowercased, whitespace-normalized text. Ties are broken by table
//! order, so reordering entries changes behavior.

use std::sync::LazyLock;

use formfill_core::FieldType;
use regex::{Regex, RegexSet};

/// Lowercase and collapse runs of whitespace.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn word(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid label regex")
}

static PAN_WORD: LazyLock<Regex> = LazyLock::new(|| word(r"\bpan\b"));
static DIN_WORD: LazyLock<Regex> = LazyLock::new(|| word(r"\bdin\b"));
static SEX_WORD: LazyLock<Regex> = LazyLock::new(|| word(r"\bsex\b"));
static DATE_ONLY: LazyLock<Regex> = LazyLock::new(|| word(r"^\s*date\s*:?\s*$"));
static BARE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    word(r"^(full |applicant |employee |candidate |member )?name\s*(\(.*\))?\s*[:*]*\s*[_.\-\s–—…]*$")
});

type Rule = (fn(&str) -> bool, FieldType);

/// Field-type rules over normalized text, in priority order.
const FIELD_RULES: &[Rule] = &[
    (|t| t.contains("background verification"), FieldType::BgvHeader),
    (
        |t| t.contains("name") && t.contains("complete") && !t.contains("father"),
        FieldType::Name,
    ),
    (|t| t.contains("father") && t.contains("name"), FieldType::FatherName),
    (|t| BARE_NAME.is_match(t), FieldType::Name),
    (|t| t.contains("email"), FieldType::Email),
    (|t| t.contains("address"), FieldType::Address),
    (|t| PAN_WORD.is_match(t), FieldType::PanCard),
    (|t| t.contains("aadhaar") || t.contains("aadhar"), FieldType::AadharCard),
    (|t| t.contains("phone") || t.contains("mobile"), FieldType::Phone),
    (|t| t.contains("date") && t.contains("birth"), FieldType::DateOfBirth),
    (|t| t.contains("gender") || SEX_WORD.is_match(t), FieldType::Gender),
    (|t| t.contains("nationality"), FieldType::Nationality),
    (|t| t.contains("signature"), FieldType::Signature),
    (|t| t.contains("print name"), FieldType::PrintName),
    (|t| DATE_ONLY.is_match(t), FieldType::Date),
    (|t| DIN_WORD.is_match(t), FieldType::Din),
    (
        |t| t.contains("passport") && t.contains("details"),
        FieldType::PassportDetails,
    ),
    (
        |t| t.contains("passport") && t.contains("issue"),
        FieldType::PassportIssueDate,
    ),
    (
        |t| t.contains("passport") && t.contains("expiry"),
        FieldType::PassportExpiryDate,
    ),
    (|t| t.contains("passport"), FieldType::PassportNo),
    (
        |t| t.contains("issue date") && t.ends_with(':'),
        FieldType::PassportIssueDate,
    ),
    (
        |t| t.contains("expiry date") && t.contains("employment history"),
        FieldType::PassportExpiryDateWithEmployment,
    ),
    (
        |t| t.contains("expiry date") && t.ends_with(':'),
        FieldType::PassportExpiryDate,
    ),
];

/// Shapes that mark a span as fillable regardless of keywords.
static FILLABLE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r":\s*$",
        r"(?i)\(complete\)\*:",
        r"(?i)\(if any\)\*:",
        r"(?i)\bprint name\b",
        r"(?i)\bsignature\b",
        r"(?i)\bdate\b",
        r"(?i)\btitle\b",
        r"(?i)name.*:",
        r"(?i)address.*:",
        r"(?i)email.*:",
        r"(?i)phone.*:",
        r"[:_：]\s*[_.\-\s–—…]+$",
    ])
    .expect("valid fillable regex set")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMatch {
    pub is_field: bool,
    pub field_type: FieldType,
}

pub fn field_type(text: &str) -> FieldType {
    let t = normalize(text);
    FIELD_RULES
        .iter()
        .find(|(test, _)| test(&t))
        .map(|(_, tag)| *tag)
        .unwrap_or_default()
}

pub fn is_fillable(text: &str) -> bool {
    FILLABLE.is_match(text.trim())
}

pub fn match_label(text: &str) -> LabelMatch {
    LabelMatch {
        is_field: is_fillable(text),
        field_type: field_type(text),
    }
}

// ── Six-field patterns ──

pub static NAME_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    word(
        r"(?i)\b(name|employee\s*name|member\s*name|i\s*name|applicant\s*name|name\s+of\s+(?:the\s+)?employee(?:\s+in\s+full)?)\b",
    )
});

pub static FATHER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    word(
        r"(?i)\b(father['’]?s?\s*name|husband['’]?s?\s*name|guardian['’]?s?\s*name|s/o|d/o|w/o|son\s*/\s*daughter\s*/\s*wife\s*of)\b",
    )
});

pub static DECLARATION_NAME_LINE: LazyLock<Regex> = LazyLock::new(|| word(r"(?i)^\s*i\s*,"));

pub static RELATION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    word(r"(?i)\b(s/o|d/o|w/o|son\s*/\s*daughter\s*/\s*wife\s*of)\b")
});

pub static EMAIL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    word(r"(?i)\b((personal|official)\s+)?e[-\s]?mail(\s*id)?\b|\bmail\s*id\b")
});

pub static ADDRESS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    word(
        r"(?i)\b(?:(present|current|residential|communication|correspondence|registered|permanent|previous)\s+)?address\b",
    )
});

pub static DATE_LABEL: LazyLock<Regex> = LazyLock::new(|| word(r"(?i)\bdate\b"));

pub static EMAIL_SIGNATURE_LINE: LazyLock<Regex> =
    LazyLock::new(|| word(r"(?i)personal\s+email\s+id\s*:\s*signature\s*:\s*$"));

/// Father/husband/guardian label. Checked before [`is_name_label`] so a
/// "Father's Name" label never receives the applicant's own name.
pub fn is_father_label(text: &str) -> bool {
    FATHER_LABEL.is_match(text)
}

/// Applicant-name label: a name keyword with no father/husband/guardian
/// reference in the span.
pub fn is_name_label(text: &str) -> bool {
    NAME_LABEL.is_match(text) && !is_father_label(text) && !normalize(text).contains("father")
}

// ── Declaration keywords ──

/// Declaration label rules: which personal field a label asks for.
pub const DECLARATION_RULES: &[Rule] = &[
    (
        |t| {
            ["name", "member name", "full name", "candidate name"]
                .iter()
                .any(|k| t.contains(k))
                && !["father", "husband", "guardian"].iter().any(|k| t.contains(k))
        },
        FieldType::Name,
    ),
    (
        |t| ["father", "husband"].iter().any(|k| t.contains(k)),
        FieldType::FatherName,
    ),
    (
        |t| ["date of birth", "dob", "d.o.b"].iter().any(|k| t.contains(k)),
        FieldType::DateOfBirth,
    ),
    (
        |t| ["email", "e-mail"].iter().any(|k| t.contains(k)),
        FieldType::Email,
    ),
    (|t| t.contains("nationality"), FieldType::Nationality),
    (
        |t| PAN_WORD.is_match(t) || t.contains("permanent account number"),
        FieldType::PanCard,
    ),
    (
        |t| ["aadhaar", "aadhar", "npr"].iter().any(|k| t.contains(k)),
        FieldType::AadharCard,
    ),
    (|t| t.contains("passport"), FieldType::PassportDetails),
];

/// Declaration field a label asks for, if any.
pub fn declaration_field(text: &str) -> Option<FieldType> {
    let t = normalize(text);
    DECLARATION_RULES
        .iter()
        .find(|(test, _)| test(&t))
        .map(|(_, tag)| *tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_types_first_match_wins() {
        assert_eq!(field_type("BACKGROUND VERIFICATION FORM"), FieldType::BgvHeader);
        assert_eq!(field_type("Name (Complete)*:"), FieldType::Name);
        assert_eq!(field_type("Father's Name:"), FieldType::FatherName);
        assert_eq!(field_type("Email Id:"), FieldType::Email);
        assert_eq!(field_type("Permanent Address:"), FieldType::Address);
        assert_eq!(field_type("PAN Card No:"), FieldType::PanCard);
        assert_eq!(field_type("Aadhaar Number:"), FieldType::AadharCard);
        assert_eq!(field_type("Mobile:"), FieldType::Phone);
        assert_eq!(field_type("Date of Birth:"), FieldType::DateOfBirth);
        assert_eq!(field_type("Sex"), FieldType::Gender);
        assert_eq!(field_type("Date:"), FieldType::Date);
        assert_eq!(field_type("DIN:"), FieldType::Din);
        assert_eq!(field_type("Passport Details:"), FieldType::PassportDetails);
        assert_eq!(field_type("Passport Issue Date:"), FieldType::PassportIssueDate);
        assert_eq!(field_type("Passport Number"), FieldType::PassportNo);
        assert_eq!(field_type("Issue Date:"), FieldType::PassportIssueDate);
        assert_eq!(
            field_type("Expiry Date: Employment History:"),
            FieldType::PassportExpiryDateWithEmployment
        );
        assert_eq!(field_type("Expiry Date:"), FieldType::PassportExpiryDate);
        assert_eq!(field_type("Some sentence."), FieldType::Unknown);
    }

    #[test]
    fn bare_name_label() {
        assert_eq!(field_type("Name:"), FieldType::Name);
        assert_eq!(field_type("Full Name : ____"), FieldType::Name);
        assert_eq!(field_type("Print Name"), FieldType::PrintName);
    }

    #[test]
    fn pan_and_din_need_whole_words() {
        assert_eq!(field_type("Company"), FieldType::Unknown);
        assert_eq!(field_type("Dinner"), FieldType::Unknown);
    }

    #[test]
    fn address_wins_over_later_rules_by_order() {
        // "address" is checked before "phone", so the address tag wins.
        assert_eq!(field_type("Address and phone:"), FieldType::Address);
    }

    #[test]
    fn fillable_shapes() {
        assert!(is_fillable("Name:"));
        assert!(is_fillable("Declaration ______"));
        assert!(is_fillable("Place: ......"));
        assert!(is_fillable("Signature"));
        assert!(!is_fillable("This form must be completed in full."));
        let m = match_label("Email Id:");
        assert!(m.is_field);
        assert_eq!(m.field_type, FieldType::Email);
    }

    #[test]
    fn father_routes_before_name() {
        assert!(is_father_label("Father's Name:"));
        assert!(!is_name_label("Father's Name:"));
        assert!(is_name_label("Employee Name:"));
        assert!(is_name_label("Name of the employee in full"));
        assert!(is_father_label("S/o"));
    }

    #[test]
    fn six_field_patterns() {
        assert!(EMAIL_LABEL.is_match("Personal E-mail Id"));
        assert!(EMAIL_LABEL.is_match("Mail ID:"));
        assert!(ADDRESS_LABEL.is_match("Correspondence Address"));
        assert!(DATE_LABEL.is_match("Date:"));
        assert!(!DATE_LABEL.is_match("Update"));
        assert!(DECLARATION_NAME_LINE.is_match("I, ....... s/o or d/o ......"));
        assert!(RELATION_MARKER.is_match("I, ....... s/o or d/o ......"));
        assert!(EMAIL_SIGNATURE_LINE.is_match("Personal Email id:    Signature:"));
    }

    #[test]
    fn declaration_keywords() {
        assert_eq!(declaration_field("Member Name:"), Some(FieldType::Name));
        assert_eq!(declaration_field("Father's/Husband's Name:"), Some(FieldType::FatherName));
        assert_eq!(declaration_field("D.O.B :"), Some(FieldType::DateOfBirth));
        assert_eq!(declaration_field("PAN:"), Some(FieldType::PanCard));
        assert_eq!(declaration_field("Aadhaar / NPR:"), Some(FieldType::AadharCard));
        assert_eq!(declaration_field("Passport:"), Some(FieldType::PassportDetails));
        assert_eq!(declaration_field("Company"), None);
    }
}
