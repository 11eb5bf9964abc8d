//! Applicant data record consumed by the value resolver and section fillers.
//!
//! The record is deliberately loose: every section is a JSON object whose
//! scalar fields are either plain values or structured `{value, iso, raw}`
//! objects. Accessors never fail; missing data reads as an empty string.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Address-entry key holding the full address text.
pub const ADDRESS_TEXT_KEY: &str = "town_or_city_name";

/// Address-entry key tagging the entry as current / previous / permanent.
pub const ADDRESS_TYPE_KEY: &str = "address_type";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("cannot read record file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record must be a JSON object")]
    NotAnObject,
}

/// Render a JSON value as fill text.
///
/// Structured values prefer `raw`, then `value`, then `iso`. Null, arrays and
/// empty structures read as the empty string.
pub fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => ["raw", "value", "iso"]
            .iter()
            .filter_map(|k| map.get(*k))
            .map(value_text)
            .find(|s| !s.is_empty())
            .unwrap_or_default(),
        Value::Null | Value::Array(_) => String::new(),
    }
}

/// One section of the record: a JSON object with lenient accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fields(Map<String, Value>);

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<Map<String, Value>>::deserialize(deserializer)
            .map(|m| Fields(m.unwrap_or_default()))
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text of one key, empty when absent.
    pub fn text(&self, key: &str) -> String {
        self.0.get(key).map(value_text).unwrap_or_default()
    }

    /// First non-empty text among alternate keys.
    pub fn first_text(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|k| self.text(k))
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default()
    }

    /// Nested object under `key`, empty when absent or not an object.
    pub fn section(&self, key: &str) -> Fields {
        match self.0.get(key) {
            Some(Value::Object(m)) => Fields(m.clone()),
            _ => Fields::default(),
        }
    }

    /// String items of an array under `key`.
    pub fn texts(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .map(value_text)
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Loose truthiness, used for yes/no answers.
    pub fn truthy(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(v @ (Value::String(_) | Value::Object(_))) => {
                let s = value_text(v).trim().to_lowercase();
                !matches!(s.as_str(), "" | "false" | "no" | "n" | "0")
            }
            _ => false,
        }
    }
}

/// Address entries may be a full record or a bare address string.
fn address_entry(v: &Value) -> Option<Fields> {
    let fields = match v {
        Value::String(s) => {
            let mut f = Fields::new();
            f.insert(ADDRESS_TEXT_KEY, s.as_str());
            f
        }
        Value::Object(m) => Fields(m.clone()),
        _ => return None,
    };
    if fields.text(ADDRESS_TEXT_KEY).trim().is_empty() {
        None
    } else {
        Some(fields)
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Structured applicant data: the `form_fields` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantRecord {
    #[serde(default)]
    pub personal_details: Fields,
    #[serde(default, deserialize_with = "nullable")]
    pub employment_history: Vec<Fields>,
    #[serde(default)]
    pub education: Value,
    #[serde(default)]
    pub education_history: Value,
    #[serde(default)]
    pub address_history: Fields,
    #[serde(default, deserialize_with = "nullable")]
    pub address_list: Vec<Fields>,
    #[serde(default, deserialize_with = "nullable")]
    pub references: Vec<Fields>,
    #[serde(default)]
    pub gaps: Value,
    #[serde(default)]
    pub epf_and_gratuity: Fields,
}

impl ApplicantRecord {
    /// Build from a parsed document. A top-level `form_fields` object is
    /// unwrapped; otherwise the object itself is the record.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let Value::Object(mut root) = value else {
            return Err(RecordError::NotAnObject);
        };
        let fields = match root.remove("form_fields") {
            Some(inner @ Value::Object(_)) => inner,
            _ => Value::Object(root),
        };
        Ok(serde_json::from_value(fields)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, RecordError> {
        Self::from_value(serde_json::from_str(s)?)
    }

    /// Read and parse a record file.
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let text = std::fs::read_to_string(path).map_err(|source| RecordError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let record = Self::from_json_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            employment = record.employment_history.len(),
            references = record.references.len(),
            "loaded applicant record"
        );
        Ok(record)
    }

    /// Personal-detail text, first non-empty of the alternate keys.
    pub fn personal(&self, keys: &[&str]) -> String {
        self.personal_details.first_text(keys)
    }

    pub fn current_address(&self) -> Option<Fields> {
        self.address_history.get("current").and_then(address_entry)
    }

    pub fn permanent_address(&self) -> Option<Fields> {
        self.address_history.get("permanent").and_then(address_entry)
    }

    /// Previous addresses in order; a single record reads as a list of one.
    pub fn previous_addresses(&self) -> Vec<Fields> {
        match self.address_history.get("previous") {
            Some(Value::Array(items)) => items.iter().filter_map(address_entry).collect(),
            Some(v) => address_entry(v).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Address records in canonical fill order, each tagged with
    /// `address_type`. An explicit `address_list` wins; otherwise the order is
    /// current, previous (all of them), permanent.
    pub fn address_list(&self) -> Vec<Fields> {
        if !self.address_list.is_empty() {
            return self.address_list.clone();
        }
        let tagged = |mut f: Fields, tag: &str| {
            f.insert(ADDRESS_TYPE_KEY, tag);
            f
        };
        let mut out = Vec::new();
        if let Some(cur) = self.current_address() {
            out.push(tagged(cur, "current"));
        }
        for prev in self.previous_addresses() {
            out.push(tagged(prev, "previous"));
        }
        if let Some(perm) = self.permanent_address() {
            out.push(tagged(perm, "permanent"));
        }
        out
    }

    /// Education records: highest first, then previous. Accepts either the
    /// keyed object form or a plain list, under `education` or
    /// `education_history`.
    pub fn education_list(&self) -> Vec<Fields> {
        let source = if is_empty_value(&self.education) {
            &self.education_history
        } else {
            &self.education
        };
        match source {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| match v {
                    Value::Object(m) if !m.is_empty() => Some(Fields(m.clone())),
                    _ => None,
                })
                .collect(),
            Value::Object(m) => {
                let keyed: Vec<Fields> = ["highest_qualification", "previous_qualification"]
                    .iter()
                    .filter_map(|k| match m.get(*k) {
                        Some(Value::Object(q)) if !q.is_empty() => Some(Fields(q.clone())),
                        _ => None,
                    })
                    .collect();
                if keyed.is_empty()
                    && !m.contains_key("highest_qualification")
                    && !m.contains_key("previous_qualification")
                    && !m.is_empty()
                {
                    vec![Fields(m.clone())]
                } else {
                    keyed
                }
            }
            _ => Vec::new(),
        }
    }

    /// Employment-gap records; a single object reads as a list of one.
    pub fn gap_list(&self) -> Vec<Fields> {
        match &self.gaps {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| match v {
                    Value::Object(m) if !m.is_empty() => Some(Fields(m.clone())),
                    _ => None,
                })
                .collect(),
            Value::Object(m) if !m.is_empty() => vec![Fields(m.clone())],
            _ => Vec::new(),
        }
    }

    /// First employment record, the applicant's current or latest job.
    pub fn latest_employment(&self) -> Fields {
        self.employment_history.first().cloned().unwrap_or_default()
    }
}

fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_value_prefers_raw_then_value_then_iso() {
        assert_eq!(value_text(&json!({"value": "v", "iso": "i", "raw": "r"})), "r");
        assert_eq!(value_text(&json!({"value": "v", "iso": "i", "raw": ""})), "v");
        assert_eq!(value_text(&json!({"iso": "2020-01-01"})), "2020-01-01");
        assert_eq!(value_text(&json!({})), "");
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&json!(42)), "42");
    }

    #[test]
    fn form_fields_wrapper_is_optional() {
        let wrapped = ApplicantRecord::from_value(json!({
            "form_fields": {"personal_details": {"name": "Jane"}}
        }))
        .unwrap();
        let bare = ApplicantRecord::from_value(json!({"personal_details": {"name": "Jane"}})).unwrap();
        assert_eq!(wrapped.personal(&["name"]), "Jane");
        assert_eq!(bare.personal(&["name"]), "Jane");
    }

    #[test]
    fn non_object_record_is_rejected() {
        assert!(matches!(
            ApplicantRecord::from_value(json!([1, 2])),
            Err(RecordError::NotAnObject)
        ));
    }

    #[test]
    fn null_sections_read_as_empty() {
        let rec = ApplicantRecord::from_value(json!({
            "personal_details": null,
            "employment_history": null,
            "references": null,
            "gaps": null
        }))
        .unwrap();
        assert!(rec.personal_details.is_empty());
        assert!(rec.employment_history.is_empty());
        assert!(rec.gap_list().is_empty());
    }

    #[test]
    fn alternate_keys_first_non_empty() {
        let rec = ApplicantRecord::from_value(json!({
            "personal_details": {"father_name": "", "fathers_name": "Richard"}
        }))
        .unwrap();
        assert_eq!(rec.personal(&["father_name", "fathers_name"]), "Richard");
        assert_eq!(rec.personal(&["missing"]), "");
    }

    #[test]
    fn address_entries_accept_strings_and_lists() {
        let rec = ApplicantRecord::from_value(json!({
            "address_history": {
                "current": "A",
                "permanent": {"town_or_city_name": "B"},
                "previous": [{"town_or_city_name": "P1"}, {"town_or_city_name": ""}, "P2"]
            }
        }))
        .unwrap();
        assert_eq!(rec.current_address().unwrap().text(ADDRESS_TEXT_KEY), "A");
        assert_eq!(rec.permanent_address().unwrap().text(ADDRESS_TEXT_KEY), "B");
        let prev: Vec<String> = rec
            .previous_addresses()
            .iter()
            .map(|f| f.text(ADDRESS_TEXT_KEY))
            .collect();
        assert_eq!(prev, vec!["P1", "P2"]);

        let types: Vec<String> = rec.address_list().iter().map(|f| f.text(ADDRESS_TYPE_KEY)).collect();
        assert_eq!(types, vec!["current", "previous", "previous", "permanent"]);
    }

    #[test]
    fn education_keyed_and_list_forms() {
        let keyed = ApplicantRecord::from_value(json!({
            "education_history": {
                "highest_qualification": {"degree_or_course": "MSc"},
                "previous_qualification": {"degree_or_course": "BSc"}
            }
        }))
        .unwrap();
        let list = keyed.education_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].text("degree_or_course"), "MSc");

        let listed = ApplicantRecord::from_value(json!({
            "education": [{"degree_or_course": "PhD"}]
        }))
        .unwrap();
        assert_eq!(listed.education_list()[0].text("degree_or_course"), "PhD");
    }

    #[test]
    fn gaps_single_or_many() {
        let one = ApplicantRecord::from_value(json!({"gaps": {"reason": "Travel"}})).unwrap();
        assert_eq!(one.gap_list().len(), 1);
        let empty = ApplicantRecord::from_value(json!({"gaps": {}})).unwrap();
        assert!(empty.gap_list().is_empty());
        let many = ApplicantRecord::from_value(json!({"gaps": [{"reason": "a"}, {"reason": "b"}]})).unwrap();
        assert_eq!(many.gap_list()[1].text("reason"), "b");
    }

    #[test]
    fn truthiness() {
        let f: Fields = serde_json::from_value(json!({
            "a": true, "b": "no", "c": "Yes", "d": 0, "e": null
        }))
        .unwrap();
        assert!(f.truthy("a"));
        assert!(!f.truthy("b"));
        assert!(f.truthy("c"));
        assert!(!f.truthy("d"));
        assert!(!f.truthy("e"));
        assert!(!f.truthy("missing"));
    }
}
