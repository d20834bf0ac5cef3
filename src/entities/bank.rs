// 🏦 Bank Record - one directory entry per institution code
//
// The code is the identity. Whether a record is a headquarters is NOT a field:
// it is recomputed from the code every time somebody asks.

use crate::code::{self, COUNTRY_CODE_LEN};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

// ============================================================================
// BANK RECORD
// ============================================================================

/// A bank or branch entry in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    /// 11-character SWIFT/BIC code (8-char prefix + 3-char location suffix)
    #[serde(rename = "swiftCode")]
    pub code: String,

    /// ISO 3166-1 alpha-2 country code
    #[serde(rename = "countryISO2")]
    pub country_code: String,

    #[serde(rename = "bankName")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,

    #[serde(rename = "countryName", default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Code type as published in the source data (e.g. "BIC11")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
}

impl BankRecord {
    /// Create a record with the required fields only
    pub fn new(code: impl Into<String>, country_code: impl Into<String>, name: impl Into<String>) -> Self {
        BankRecord {
            code: code.into(),
            country_code: country_code.into(),
            name: name.into(),
            address: None,
            town: None,
            country_name: None,
            timezone: None,
            record_type: None,
        }
    }

    /// Builder pattern: add address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Builder pattern: add town
    pub fn with_town(mut self, town: impl Into<String>) -> Self {
        self.town = Some(town.into());
        self
    }

    /// Builder pattern: add country display name
    pub fn with_country_name(mut self, country_name: impl Into<String>) -> Self {
        self.country_name = Some(country_name.into());
        self
    }

    /// Builder pattern: add timezone
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Builder pattern: add code type
    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Headquarters iff the code ends in "XXX". Never stored, always derived.
    pub fn is_headquarters(&self) -> bool {
        code::is_headquarter_suffix(&self.code)
    }

    /// 8-character prefix shared with the rest of the institution
    pub fn institution_prefix(&self) -> &str {
        code::institution_prefix(&self.code)
    }

    /// Canonical write form: code, name and country code upper-cased;
    /// free-text fields kept verbatim, with blanks dropped.
    pub fn normalized(self) -> Self {
        BankRecord {
            code: code::normalize_code(&self.code),
            country_code: code::normalize_country(&self.country_code),
            name: self.name.trim().to_uppercase(),
            address: non_blank(self.address),
            town: non_blank(self.town),
            country_name: non_blank(self.country_name),
            timezone: non_blank(self.timezone),
            record_type: non_blank(self.record_type),
        }
    }

    /// Checks every write path runs before anything is staged.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !code::is_well_formed_code(self.code.trim()) {
            return Err(ValidationError::new(
                "swiftCode",
                format!("'{}' must be exactly 11 letters or digits", self.code),
            ));
        }
        if self.country_code.trim().chars().count() != COUNTRY_CODE_LEN {
            return Err(ValidationError::new(
                "countryISO2",
                "invalid ISO2 format: must be exactly 2 letters",
            ));
        }
        if self.country_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(ValidationError::new("countryName", "country name cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("bankName", "bank name cannot be empty"));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// TESTS
// ============================================================================
