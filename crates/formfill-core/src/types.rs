//! Closed tag sets shared by the extractor, classifier and fillers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a label found in a paragraph or table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    BgvHeader,
    Name,
    FatherName,
    Email,
    Address,
    PanCard,
    AadharCard,
    Phone,
    DateOfBirth,
    Gender,
    Nationality,
    Signature,
    PrintName,
    Date,
    Din,
    PassportDetails,
    PassportIssueDate,
    PassportExpiryDate,
    PassportExpiryDateWithEmployment,
    PassportNo,
    #[default]
    Unknown,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BgvHeader => "bgv_header",
            Self::Name => "name",
            Self::FatherName => "father_name",
            Self::Email => "email",
            Self::Address => "address",
            Self::PanCard => "pan_card",
            Self::AadharCard => "aadhar_card",
            Self::Phone => "phone",
            Self::DateOfBirth => "date_of_birth",
            Self::Gender => "gender",
            Self::Nationality => "nationality",
            Self::Signature => "signature",
            Self::PrintName => "print_name",
            Self::Date => "date",
            Self::Din => "din",
            Self::PassportDetails => "passport_details",
            Self::PassportIssueDate => "passport_issue_date",
            Self::PassportExpiryDate => "passport_expiry_date",
            Self::PassportExpiryDateWithEmployment => "passport_expiry_date_with_employment",
            Self::PassportNo => "passport_no",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form family a whole document is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    BackgroundVerification,
    EpfNomination,
    Gratuity,
    PfAccount,
    Declaration,
    Nda,
    Loa,
    #[default]
    General,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BackgroundVerification => "background_verification",
            Self::EpfNomination => "epf_nomination",
            Self::Gratuity => "gratuity",
            Self::PfAccount => "pf_account",
            Self::Declaration => "declaration",
            Self::Nda => "nda",
            Self::Loa => "loa",
            Self::General => "general",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualifier word scanned from an address label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressQualifier {
    Current,
    Permanent,
    Previous,
    #[default]
    Unspecified,
}

impl AddressQualifier {
    /// Scan a label for a qualifier word. "permanent" beats "previous" beats
    /// "current"/"present" when several appear.
    pub fn scan(label: &str) -> Self {
        let l = label.to_lowercase();
        if l.contains("permanent") {
            Self::Permanent
        } else if l.contains("previous") {
            Self::Previous
        } else if l.contains("current") || l.contains("present") {
            Self::Current
        } else {
            Self::Unspecified
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Permanent => "permanent",
            Self::Previous => "previous",
            Self::Unspecified => "unspecified",
        }
    }
}
