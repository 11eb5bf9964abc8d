//! Value resolution: field type plus qualifier to fill text.
//!
//! Never fails. Missing data resolves to the empty string, which callers
//! treat as "leave blank".

use chrono::NaiveDate;
use formfill_core::record::ADDRESS_TEXT_KEY;
use formfill_core::{AddressQualifier, ApplicantRecord, FieldType, Fields};

/// Output format for dates the engine generates itself.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

pub struct Resolver<'a> {
    record: &'a ApplicantRecord,
    today: NaiveDate,
}

impl<'a> Resolver<'a> {
    pub fn new(record: &'a ApplicantRecord, today: NaiveDate) -> Self {
        Self { record, today }
    }

    pub fn record(&self) -> &'a ApplicantRecord {
        self.record
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn today_text(&self) -> String {
        self.today.format(DATE_FORMAT).to_string()
    }

    pub fn resolve(&self, field: FieldType, qualifier: AddressQualifier) -> String {
        let r = self.record;
        match field {
            FieldType::Name | FieldType::PrintName => r.personal(&["name"]),
            FieldType::FatherName => r.personal(&["father_name", "fathers_name"]),
            FieldType::Email => r.personal(&["email"]),
            FieldType::Address => self.address(qualifier),
            FieldType::PanCard => r.personal(&["pan_card", "pan_card_no"]),
            FieldType::AadharCard => r.personal(&["aadhar_card", "aadhar_card_no"]),
            FieldType::Phone => self.phone(),
            FieldType::DateOfBirth => r.personal(&["date_of_birth"]),
            FieldType::Gender => r.personal(&["gender"]),
            FieldType::Nationality => r.personal(&["nationality"]),
            FieldType::Date => self.today_text(),
            FieldType::Din => r.personal(&["din"]),
            FieldType::PassportNo => r.personal(&["passport_no"]),
            FieldType::PassportIssueDate => r.personal(&["passport_issue_date"]),
            FieldType::PassportExpiryDate | FieldType::PassportExpiryDateWithEmployment => {
                r.personal(&["passport_expiry_date"])
            }
            FieldType::PassportDetails => self.passport_details(),
            FieldType::Signature | FieldType::BgvHeader | FieldType::Unknown => String::new(),
        }
    }

    /// Address record for a qualifier. Current and unspecified fall back to
    /// permanent, then to the first previous address.
    pub fn address_record(&self, qualifier: AddressQualifier) -> Option<Fields> {
        let r = self.record;
        match qualifier {
            AddressQualifier::Permanent => r.permanent_address(),
            AddressQualifier::Previous => r.previous_addresses().into_iter().next(),
            AddressQualifier::Current | AddressQualifier::Unspecified => r
                .current_address()
                .or_else(|| r.permanent_address())
                .or_else(|| r.previous_addresses().into_iter().next()),
        }
    }

    pub fn address(&self, qualifier: AddressQualifier) -> String {
        self.address_record(qualifier)
            .map(|a| a.text(ADDRESS_TEXT_KEY))
            .unwrap_or_default()
    }

    /// Phone of the default address, then a personal phone field.
    pub fn phone(&self) -> String {
        let from_address = self
            .address_record(AddressQualifier::Unspecified)
            .map(|a| a.text("phone_number"))
            .unwrap_or_default();
        if from_address.trim().is_empty() {
            self.record.personal(&["phone", "mobile"])
        } else {
            from_address
        }
    }

    pub fn passport_details(&self) -> String {
        let no = self.record.personal(&["passport_no"]);
        if no.trim().is_empty() {
            String::new()
        } else {
            format!("Passport No: {no}")
        }
    }

    /// Position of the latest employment record.
    pub fn title(&self) -> String {
        self.record
            .latest_employment()
            .first_text(&["position_and_department", "position_department"])
    }

    /// Employer of the latest employment record.
    pub fn employer(&self) -> String {
        self.record
            .latest_employment()
            .first_text(&["employer_name_and_branch", "employer_name"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: serde_json::Value) -> ApplicantRecord {
        ApplicantRecord::from_value(v).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn address_qualifier_routing() {
        let rec = record(json!({
            "address_history": {"current": "A", "permanent": "B"}
        }));
        let res = Resolver::new(&rec, today());
        assert_eq!(res.resolve(FieldType::Address, AddressQualifier::scan("Permanent Address:")), "B");
        assert_eq!(res.resolve(FieldType::Address, AddressQualifier::scan("Address:")), "A");
        assert_eq!(res.resolve(FieldType::Address, AddressQualifier::Previous), "");
    }

    #[test]
    fn current_falls_back_to_permanent_then_previous() {
        let rec = record(json!({"address_history": {"permanent": "B", "previous": ["P"]}}));
        let res = Resolver::new(&rec, today());
        assert_eq!(res.address(AddressQualifier::Current), "B");

        let rec = record(json!({"address_history": {"previous": ["P"]}}));
        let res = Resolver::new(&rec, today());
        assert_eq!(res.address(AddressQualifier::Unspecified), "P");
    }

    #[test]
    fn alternate_keys_and_structured_values() {
        let rec = record(json!({
            "personal_details": {
                "fathers_name": "Richard",
                "pan_card_no": "ABCDE1234F",
                "date_of_birth": {"value": "1990-01-02", "iso": "1990-01-02", "raw": "02/01/1990"},
                "passport_no": "Z123"
            }
        }));
        let res = Resolver::new(&rec, today());
        let none = AddressQualifier::Unspecified;
        assert_eq!(res.resolve(FieldType::FatherName, none), "Richard");
        assert_eq!(res.resolve(FieldType::PanCard, none), "ABCDE1234F");
        assert_eq!(res.resolve(FieldType::DateOfBirth, none), "02/01/1990");
        assert_eq!(res.resolve(FieldType::PassportDetails, none), "Passport No: Z123");
        assert_eq!(res.resolve(FieldType::Signature, none), "");
        assert_eq!(res.resolve(FieldType::Unknown, none), "");
    }

    #[test]
    fn date_uses_injected_clock() {
        let rec = ApplicantRecord::default();
        let res = Resolver::new(&rec, today());
        assert_eq!(res.resolve(FieldType::Date, AddressQualifier::Unspecified), "07-03-2024");
    }

    #[test]
    fn phone_prefers_address_phone() {
        let rec = record(json!({
            "personal_details": {"phone": "111"},
            "address_history": {"current": {"town_or_city_name": "A", "phone_number": "222"}}
        }));
        assert_eq!(Resolver::new(&rec, today()).phone(), "222");
        let rec = record(json!({"personal_details": {"phone": "111"}}));
        assert_eq!(Resolver::new(&rec, today()).phone(), "111");
    }

    #[test]
    fn title_and_employer_from_latest_job() {
        let rec = record(json!({
            "employment_history": [
                {"position_and_department": "Engineer", "employer_name": "Acme"},
                {"position_and_department": "Intern"}
            ]
        }));
        let res = Resolver::new(&rec, today());
        assert_eq!(res.title(), "Engineer");
        assert_eq!(res.employer(), "Acme");
    }
}
