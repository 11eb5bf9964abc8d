//! Letter-style forms: NDA, leave of absence, PF account linking and the
//! general fallback. Each is a short list of line patterns plus the
//! signature table most of these letters end with.

use std::sync::LazyLock;

use formfill_core::AddressQualifier;
use formfill_docx::{Document, Slot};
use regex::Regex;

use super::text::{blank, fill_after_colon, label_before_colon};
use super::{TableView, put_answer, put_cell, rewrite};
use crate::labels::{ADDRESS_LABEL, EMAIL_LABEL, EMAIL_SIGNATURE_LINE};
use crate::resolver::Resolver;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid letter regex")
}

/// "Label:" optionally followed by a blank to write over.
fn open_line(label: &str) -> Regex {
    re(&format!(r"(?i)^\s*{label}\s*:[\s_.\-–—…]*$"))
}

static PRINT_NAME_LINE: LazyLock<Regex> = LazyLock::new(|| open_line(r".*\bprint name\b.*"));
static NAME_LINE: LazyLock<Regex> = LazyLock::new(|| open_line("name"));
static TITLE_LINE: LazyLock<Regex> = LazyLock::new(|| open_line("title"));
static POSITION_LINE: LazyLock<Regex> = LazyLock::new(|| open_line("position"));
static EMPLOYER_LINE: LazyLock<Regex> = LazyLock::new(|| open_line("employer"));
static DATE_LINE: LazyLock<Regex> = LazyLock::new(|| open_line("date"));

static PRINT_NAME_CELL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\bprint name\b"));
static NAME_CELL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\bname\b"));
static TITLE_CELL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\btitle\b"));
static POSITION_CELL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\bposition\b"));
static EMPLOYER_CELL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\bemployer\b"));
static DATE_CELL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\bdate\b"));
static NAME_CELL_EXACT: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^\s*name\s*:?\s*$"));

/// "I, ........ s/o or d/o ........" with both blanks still open.
pub(crate) static RELATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^\s*i\s*,\s*[.…_\s]*\s*s/o\s+or\s+d/o\s*[.…_]+[.…_\s]*")
});

static SIGN_BY: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^\s*by\s*:\s*$"));

// ── Shared passes ──

/// Whole-line paragraph rules: a pattern and the text that replaces a
/// matching line.
fn fill_lines(doc: &mut Document, rules: &[(&Regex, String)]) -> usize {
    let mut fixes = 0;
    for i in 0..doc.paragraph_count() {
        let text = doc.text(Slot::Paragraph(i));
        if let Some((_, new_text)) = rules.iter().find(|(re, _)| re.is_match(text.trim())) {
            fixes += rewrite(doc, Slot::Paragraph(i), new_text);
        }
    }
    fixes
}

/// Table rows whose first cell matches a pattern get the value in their
/// answer cell. Empty values are skipped.
fn fill_rows(doc: &mut Document, rules: &[(&Regex, String)]) -> usize {
    let mut fixes = 0;
    for t in 0..doc.table_count() {
        let view = TableView::read(doc, t);
        for row in 0..view.len() {
            if view.cells(row) < 2 {
                continue;
            }
            let left = view.cell(row, 0);
            let Some((_, value)) = rules.iter().find(|(re, _)| re.is_match(left)) else {
                continue;
            };
            if blank(value).is_empty() {
                continue;
            }
            fixes += put_answer(doc, &view, row, value);
        }
    }
    fixes
}

/// Signature blocks laid out as "By:" | "" | "By:" get the applicant's
/// name in the third cell.
fn fill_signature_rows(doc: &mut Document, name: &str) -> usize {
    if name.trim().is_empty() {
        return 0;
    }
    let mut fixes = 0;
    for t in 0..doc.table_count() {
        let view = TableView::read(doc, t);
        for row in 0..view.len() {
            if view.cells(row) >= 3
                && SIGN_BY.is_match(view.cell(row, 0))
                && view.cell(row, 1).is_empty()
                && SIGN_BY.is_match(view.cell(row, 2))
            {
                fixes += put_cell(doc, t, row, 2, &format!("By: {name}"));
            }
        }
    }
    fixes
}

/// Drop rules whose value is empty so no line is rewritten to a bare label.
fn present(rules: Vec<(&'static Regex, String, String)>) -> Vec<(&'static Regex, String)> {
    rules
        .into_iter()
        .filter(|(_, value, _)| !blank(value).is_empty())
        .map(|(re, _, line)| (re, line))
        .collect()
}

// ── Forms ──

pub fn fill_nda(doc: &mut Document, res: &Resolver) -> usize {
    let name = res.record().personal(&["name"]);
    let title = res.title();
    let date = res.today_text();

    let lines = present(vec![
        (&*PRINT_NAME_LINE, name.clone(), format!("Print Name: {name}")),
        (&*TITLE_LINE, title.clone(), format!("Title: {title}")),
        (&*DATE_LINE, date.clone(), format!("Date: {date}")),
    ]);
    let rows = [
        (&*PRINT_NAME_CELL, name.clone()),
        (&*TITLE_CELL, title),
        (&*DATE_CELL, date),
    ];
    fill_lines(doc, &lines) + fill_rows(doc, &rows) + fill_signature_rows(doc, &name)
}

pub fn fill_loa(doc: &mut Document, res: &Resolver) -> usize {
    let name = res.record().personal(&["name"]);
    let position = res.title();
    let employer = res.employer();
    let date = res.today_text();

    let lines = present(vec![
        (&*NAME_LINE, name.clone(), format!("Name: {name}")),
        (&*POSITION_LINE, position.clone(), format!("Position: {position}")),
        (&*EMPLOYER_LINE, employer.clone(), format!("Employer: {employer}")),
        (&*DATE_LINE, date.clone(), format!("Date: {date}")),
    ]);
    let rows = [
        (&*NAME_CELL, name.clone()),
        (&*POSITION_CELL, position),
        (&*EMPLOYER_CELL, employer),
        (&*DATE_CELL, date),
    ];
    fill_lines(doc, &lines) + fill_rows(doc, &rows) + fill_signature_rows(doc, &name)
}

pub fn fill_pf_account(doc: &mut Document, res: &Resolver) -> usize {
    let r = res.record();
    let name = r.personal(&["name"]);
    let father = r.personal(&["father_name", "fathers_name"]);
    let email = r.personal(&["email"]);
    let date = res.today_text();

    let mut fixes = 0;
    if !name.is_empty() && !father.is_empty() {
        for i in 0..doc.paragraph_count() {
            let text = doc.text(Slot::Paragraph(i));
            if let Some(m) = RELATION_LINE.find(&text) {
                let new_text = format!("I, {name} s/o or d/o {father} {}", text[m.end()..].trim_start());
                fixes += rewrite(doc, Slot::Paragraph(i), new_text.trim_end());
            }
        }
    }
    let lines = present(vec![
        (&*NAME_LINE, name.clone(), format!("Name: {name}")),
        (
            &*EMAIL_SIGNATURE_LINE,
            email.clone(),
            format!("Personal Email id: {email}   Signature:"),
        ),
        (&*DATE_LINE, date.clone(), format!("Date: {date}")),
    ]);
    fixes + fill_lines(doc, &lines)
}

pub fn fill_general(doc: &mut Document, res: &Resolver) -> usize {
    let name = res.record().personal(&["name"]);
    let email = res.record().personal(&["email"]);
    let mut fixes = 0;

    for i in 0..doc.paragraph_count() {
        let slot = Slot::Paragraph(i);
        let text = doc.text(slot);
        let trimmed = text.trim();
        let value = if NAME_LINE.is_match(trimmed) {
            name.clone()
        } else if EMAIL_LABEL.is_match(trimmed) {
            email.clone()
        } else if ADDRESS_LABEL.is_match(trimmed) {
            res.address(AddressQualifier::scan(label_before_colon(trimmed)))
        } else {
            continue;
        };
        if blank(&value).is_empty() {
            continue;
        }
        if let Some(new_text) = fill_after_colon(trimmed, &value) {
            fixes += rewrite(doc, slot, &new_text);
        }
    }

    for t in 0..doc.table_count() {
        let view = TableView::read(doc, t);
        for row in 0..view.len() {
            if view.cells(row) < 2 || !view.cell(row, view.cells(row) - 1).is_empty() {
                continue;
            }
            let left = view.cell(row, 0);
            let value = if NAME_CELL_EXACT.is_match(left) {
                name.clone()
            } else if EMAIL_LABEL.is_match(left) {
                email.clone()
            } else if ADDRESS_LABEL.is_match(left) {
                res.address(AddressQualifier::scan(left))
            } else {
                continue;
            };
            fixes += put_answer(doc, &view, row, &value);
        }
    }
    fixes
}
