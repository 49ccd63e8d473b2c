//! Company and bank metadata used in file headers.

use crate::error::{Result, ValidationError};
use crate::profile::Rib;
use serde::Deserialize;
use std::io::Read;

/// Employer details supplied by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompanyBankInfo {
    pub name: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    /// CNSS affiliation number, up to 7 digits.
    pub affiliation_number: String,
    /// CNSS agency code, up to 2 digits.
    pub agency_code: String,
    /// Account debited by salary transfers.
    pub debit_account: String,
}

impl CompanyBankInfo {
    /// Reads and validates company metadata from JSON.
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let company: CompanyBankInfo = serde_json::from_reader(reader)?;
        company.validate()?;
        Ok(company)
    }

    /// Checks the fields every regulator file needs.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(invalid("name", "must not be empty"));
        }
        check_digits("affiliation_number", &self.affiliation_number, 7)?;
        check_digits("agency_code", &self.agency_code, 2)?;
        Ok(())
    }

    /// The debit account as a RIB. Only transfers need it.
    pub fn debit_rib(&self) -> std::result::Result<Rib, ValidationError> {
        Rib::parse(&self.debit_account)
            .ok_or_else(|| invalid("debit_account", "must be exactly 24 digits"))
    }
}

fn invalid(field: &'static str, reason: &str) -> ValidationError {
    ValidationError::InvalidCompanyField {
        field,
        reason: reason.to_string(),
    }
}

fn check_digits(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> std::result::Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.len() > max_len || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(
            field,
            &format!("must be 1 to {} digits, got {:?}", max_len, value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PayrollError;

    const JSON: &str = r#"{
        "name": "Atlas Textiles SARL",
        "activity": "Textile manufacturing",
        "address": "12 Rue Ibn Batouta",
        "city": "Casablanca",
        "postal_code": "20250",
        "affiliation_number": "1234567",
        "agency_code": "05",
        "debit_account": "007780000123456789012345"
    }"#;

    #[test]
    fn test_from_json() {
        let company = CompanyBankInfo::from_json(JSON.as_bytes()).unwrap();
        assert_eq!(company.name, "Atlas Textiles SARL");
        assert_eq!(company.debit_rib().unwrap().as_str(), "007780000123456789012345");
    }

    #[test]
    fn test_optional_text_fields_default_to_empty() {
        let json = r#"{"name":"X","affiliation_number":"12","agency_code":"1","debit_account":""}"#;
        let company = CompanyBankInfo::from_json(json.as_bytes()).unwrap();
        assert_eq!(company.city, "");
        assert!(company.debit_rib().is_err());
    }

    #[test]
    fn test_invalid_affiliation_number() {
        let json = JSON.replace("1234567", "12345678");
        assert!(matches!(
            CompanyBankInfo::from_json(json.as_bytes()),
            Err(PayrollError::Validation(ValidationError::InvalidCompanyField {
                field: "affiliation_number",
                ..
            }))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            CompanyBankInfo::from_json("{".as_bytes()),
            Err(PayrollError::Json(_))
        ));
    }
}
