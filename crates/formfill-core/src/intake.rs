//! Conversion of the flat frontend payload into the record shape the engine
//! reads (`{source_file, form_fields: {...}}`).

use serde_json::{Map, Value, json};

/// Label written into `source_file` for payload-derived records.
pub const SOURCE_LABEL: &str = "Frontend Input";

const EMPLOYMENT_KEYS: &[&str] = &[
    "employer_name_and_branch",
    "employer_address",
    "position_and_department",
    "landline",
    "employee_code",
    "last_salary",
    "reason_for_leaving",
    "reporting_manager",
    "agency_details",
    "contract_agency",
];

fn str_of<'a>(obj: &'a Value, key: &str) -> &'a str {
    obj.get(key).and_then(Value::as_str).unwrap_or("")
}

fn object_of(obj: &Value, key: &str) -> Value {
    match obj.get(key) {
        Some(v @ Value::Object(_)) => v.clone(),
        _ => json!({}),
    }
}

fn list_of(obj: &Value, key: &str) -> Vec<Value> {
    match obj.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// `{value, iso}` pair for a date string taken verbatim from the payload.
fn dated(payload: &Value, key: &str) -> Value {
    let s = str_of(payload, key);
    json!({ "value": s, "iso": s })
}

fn address(entry: &Value, phone: &str) -> Value {
    json!({
        "town_or_city_name": str_of(entry, "full_address"),
        "phone_number": phone,
        "duration_of_stay": object_of(entry, "duration_of_stay"),
    })
}

fn tagged(mut addr: Value, tag: &str) -> Value {
    if let Value::Object(m) = &mut addr {
        m.insert("address_type".into(), Value::String(tag.into()));
    }
    addr
}

fn has_address(addr: &Value) -> bool {
    !str_of(addr, "town_or_city_name").trim().is_empty()
}

fn current_employment(payload: &Value) -> Option<Value> {
    let src = payload.get("current_employment")?.as_object()?;
    if src.is_empty() {
        return None;
    }
    let mut out = Map::new();
    for key in EMPLOYMENT_KEYS {
        let v = src.get(*key).and_then(Value::as_str).unwrap_or("");
        out.insert((*key).into(), Value::String(v.into()));
    }
    out.insert(
        "employment_period".into(),
        src.get("employment_period").cloned().unwrap_or_else(|| json!({})),
    );
    out.insert(
        "can_verify".into(),
        src.get("can_verify").cloned().unwrap_or(Value::Bool(true)),
    );
    Some(Value::Object(out))
}

/// Build the record document from a frontend payload.
///
/// `previous_address` may be a single object or a list; both land in
/// `address_history.previous` and in `address_list`. A present
/// `current_employment` becomes the first employment record.
pub fn record_from_payload(payload: &Value) -> Value {
    let phone = str_of(payload, "phone");

    let personal = json!({
        "name": str_of(payload, "name"),
        "gender": str_of(payload, "gender"),
        "date_of_birth": dated(payload, "date_of_birth"),
        "father_name": str_of(payload, "father_name"),
        "nationality": str_of(payload, "nationality"),
        "pan_card": str_of(payload, "pan_card"),
        "aadhar_card": str_of(payload, "aadhar_card"),
        "din": str_of(payload, "din"),
        "passport_no": str_of(payload, "passport_no"),
        "passport_issue_date": dated(payload, "passport_issue_date"),
        "passport_expiry_date": dated(payload, "passport_expiry_date"),
        "email": str_of(payload, "email"),
        "religion": str_of(payload, "religion"),
    });

    let mut employment: Vec<Value> = current_employment(payload).into_iter().collect();
    employment.extend(list_of(payload, "employment_history"));

    let current = address(&object_of(payload, "current_address"), phone);
    let permanent = address(&object_of(payload, "permanent_address"), phone);
    let previous: Vec<Value> = match payload.get("previous_address") {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|v| v.is_object())
            .map(|v| address(v, phone))
            .collect(),
        Some(v @ Value::Object(_)) => vec![address(v, phone)],
        _ => Vec::new(),
    };

    let mut address_list: Vec<Value> = Vec::new();
    if has_address(&current) {
        address_list.push(tagged(current.clone(), "current"));
    }
    if has_address(&permanent) {
        address_list.push(tagged(permanent.clone(), "permanent"));
    }
    address_list.extend(
        previous
            .iter()
            .filter(|a| has_address(a))
            .map(|a| tagged(a.clone(), "previous")),
    );

    json!({
        "source_file": SOURCE_LABEL,
        "form_fields": {
            "personal_details": personal,
            "employment_history": employment,
            "education": {
                "highest_qualification": object_of(payload, "highest_qualification"),
                "previous_qualification": object_of(payload, "previous_qualification"),
            },
            "address_history": {
                "current": current,
                "previous": previous,
                "permanent": permanent,
            },
            "address_list": address_list,
            "references": list_of(payload, "references"),
            "gaps": payload.get("gaps").cloned().unwrap_or_else(|| json!({})),
            "epf_and_gratuity": object_of(payload, "epf_and_gratuity"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ApplicantRecord;

    fn sample_payload() -> Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@x.com",
            "phone": "99999",
            "date_of_birth": "1990-02-01",
            "current_address": {"full_address": "12 Main St"},
            "permanent_address": {"full_address": "7 Hill Rd"},
            "previous_address": [{"full_address": "1 Old Ln"}, {"full_address": ""}],
            "current_employment": {"employer_name_and_branch": "Acme"},
            "employment_history": [{"employer_name_and_branch": "Globex"}],
            "references": [{"name": "R1"}]
        })
    }

    #[test]
    fn payload_converts_to_loadable_record() {
        let doc = record_from_payload(&sample_payload());
        assert_eq!(doc["source_file"], SOURCE_LABEL);

        let rec = ApplicantRecord::from_value(doc).unwrap();
        assert_eq!(rec.personal(&["name"]), "Jane Doe");
        assert_eq!(rec.personal(&["date_of_birth"]), "1990-02-01");
        assert_eq!(rec.employment_history.len(), 2);
        assert_eq!(rec.employment_history[0].text("employer_name_and_branch"), "Acme");
        assert!(rec.employment_history[0].truthy("can_verify"));
        assert_eq!(rec.current_address().unwrap().text("phone_number"), "99999");
        assert_eq!(rec.previous_addresses().len(), 1);
        assert_eq!(rec.address_list().len(), 3);
    }

    #[test]
    fn missing_current_employment_adds_no_record() {
        let doc = record_from_payload(&json!({"name": "A"}));
        let rec = ApplicantRecord::from_value(doc).unwrap();
        assert!(rec.employment_history.is_empty());
        assert!(rec.address_list().is_empty());
        assert!(rec.education_list().is_empty());
    }

    #[test]
    fn single_previous_address_object() {
        let doc = record_from_payload(&json!({
            "previous_address": {"full_address": "Somewhere"}
        }));
        let rec = ApplicantRecord::from_value(doc).unwrap();
        assert_eq!(rec.previous_addresses()[0].text("town_or_city_name"), "Somewhere");
    }
}
