//! Text-level fill helpers shared by every filler.

use std::sync::LazyLock;

use chrono::NaiveDate;
use formfill_core::value_text;
use regex::Regex;
use serde_json::Value;

/// Characters that make up a blank-line placeholder.
const PLACEHOLDER_CHARS: &[char] = &['_', '.', '-', '–', '—', '…'];

static PLACEHOLDER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([:_：]\s*)[_.\-\s–—…]+$").expect("valid placeholder regex")
});

static GENDER_WORDS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    ["male", "female", "transgender"]
        .map(|w| Regex::new(&format!(r"(?i)\b{w}\b")).expect("valid gender regex"))
});

pub const CHECKED: char = '☑';
pub const UNCHECKED: char = '☐';

/// Empty, or made only of underscores, dots, dashes and whitespace.
pub fn is_placeholder(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_whitespace() || PLACEHOLDER_CHARS.contains(&c))
}

/// Normalise "no value" spellings to the empty string.
pub fn blank(v: &str) -> String {
    let s = v.trim();
    match s.to_uppercase().as_str() {
        "" | "N/A" | "NA" | "NONE" | "NULL" => String::new(),
        _ => s.to_string(),
    }
}

/// Put `value` after the label's colon (or after a trailing placeholder).
/// Returns `None` when the text already carries a value.
pub fn fill_after_colon(text: &str, value: &str) -> Option<String> {
    if let Some((left, right)) = text.split_once(':') {
        if is_placeholder(right) {
            return Some(format!("{left}: {value}"));
        }
    }
    let caps = PLACEHOLDER_SUFFIX.captures(text)?;
    let whole = caps.get(0)?;
    let sep = caps.get(1)?.as_str();
    Some(format!("{}{sep}{value}", &text[..whole.start()]))
}

/// Text before the first colon, trimmed; the whole text when there is none.
pub fn label_before_colon(text: &str) -> &str {
    text.split_once(':').map_or(text, |(l, _)| l).trim()
}

/// Mark the chosen gender option. Applies only when the span lists all
/// three options and has not been ticked yet.
pub fn tick_gender(text: &str, chosen: &str) -> Option<String> {
    if text.contains(CHECKED) || text.contains(UNCHECKED) {
        return None;
    }
    let chosen = match chosen.trim().to_lowercase().as_str() {
        "m" | "male" => "male",
        "f" | "female" => "female",
        "t" | "transgender" => "transgender",
        _ => return None,
    };
    if !GENDER_WORDS.iter().all(|re| re.is_match(text)) {
        return None;
    }
    let mut out = text.to_string();
    for re in GENDER_WORDS.iter() {
        out = re
            .replacen(&out, 1, |caps: &regex::Captures| {
                let word = &caps[0];
                let glyph = if word.eq_ignore_ascii_case(chosen) {
                    CHECKED
                } else {
                    UNCHECKED
                };
                format!("{glyph} {word}")
            })
            .into_owned();
    }
    Some(out)
}

/// City part of a full address: the last two comma-separated parts.
pub fn city_of(full_address: &str) -> String {
    let parts: Vec<&str> = full_address.split(',').collect();
    match parts.as_slice() {
        [.., city, state] => format!("{}, {}", city.trim(), state.trim()),
        _ => full_address.trim().to_string(),
    }
}

/// Text of a course or employment period. A `{start, end}` pair of ISO
/// dates reads as "Jun 2018 - May 2022"; anything else goes through
/// [`value_text`].
pub fn period_text(v: Option<&Value>) -> String {
    let Some(v) = v else {
        return String::new();
    };
    if let Value::Object(m) = v {
        let month = |key: &str| {
            m.get(key)
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
                .map(|d| d.format("%b %Y").to_string())
        };
        if let (Some(start), Some(end)) = (month("start"), month("end")) {
            return format!("{start} - {end}");
        }
    }
    value_text(v)
}
