//! Employee payroll profiles: raw CSV rows and their validated form.
//!
//! Every field is validated once, when an [`EmployeeRecord`] is parsed into
//! an [`EmployeePayrollProfile`]. Downstream code relies on the typed profile
//! and never re-checks it.

use crate::error::ValidationError;
use crate::money::Money;
use crate::tables::{MAX_DECLARED_DEPENDENTS, MAX_MONTHLY_AMOUNT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw employee row as read from CSV.
///
/// Everything is kept as text so that each problem can be reported with the
/// offending field name instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeRecord {
    pub id: Option<String>,
    pub insurance_number: Option<String>,
    pub national_id: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    /// Original hire date (YYYY-MM-DD); seniority runs from here.
    pub hire_date: Option<String>,
    /// Date of the latest contract change, if any.
    pub contract_start: Option<String>,
    pub marital_status: Option<String>,
    pub dependents: Option<String>,
    pub base_salary: Option<String>,
    pub taxable_allowances: Option<String>,
    pub non_taxable_allowances: Option<String>,
    pub other_deductions: Option<String>,
    pub family_allowance_withheld: Option<String>,
    pub bank_account: Option<String>,
    pub contract_type: Option<String>,
}

impl EmployeeRecord {
    /// Validates the raw row into a typed profile.
    pub fn parse(&self) -> Result<EmployeePayrollProfile, ValidationError> {
        let id = required(&self.id, "id")?.to_string();
        let insurance_number = InsuranceNumber::from_str(required(
            &self.insurance_number,
            "insurance_number",
        )?)?;
        let national_id = required(&self.national_id, "national_id")?.to_string();
        let last_name = required(&self.last_name, "last_name")?.to_string();
        let first_name = required(&self.first_name, "first_name")?.to_string();
        let hire_date = parse_date(required(&self.hire_date, "hire_date")?, "hire_date")?;
        let contract_start = optional(&self.contract_start)
            .map(|value| parse_date(value, "contract_start"))
            .transpose()?;
        let marital_status = MaritalStatus::from_str(
            optional(&self.marital_status).unwrap_or("single"),
        )?;
        let dependents = parse_dependents(optional(&self.dependents))?;
        let base_salary = parse_amount(required(&self.base_salary, "base_salary")?, "base_salary")?;
        let taxable_allowances = optional_amount(&self.taxable_allowances, "taxable_allowances")?;
        let non_taxable_allowances =
            optional_amount(&self.non_taxable_allowances, "non_taxable_allowances")?;
        let other_deductions = optional_amount(&self.other_deductions, "other_deductions")?;
        let family_allowance_withheld =
            optional_amount(&self.family_allowance_withheld, "family_allowance_withheld")?;
        let contract_type = ContractType::from_str(
            optional(&self.contract_type).unwrap_or("permanent"),
        )?;

        Ok(EmployeePayrollProfile {
            id,
            insurance_number,
            national_id,
            last_name,
            first_name,
            hire_date,
            contract_start,
            marital_status,
            dependents,
            base_salary,
            taxable_allowances,
            non_taxable_allowances,
            other_deductions,
            family_allowance_withheld,
            bank_account: optional(&self.bank_account).map(str::to_string),
            contract_type,
        })
    }
}

fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ValidationError> {
    optional(value).ok_or(ValidationError::MissingField(field))
}

fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn parse_amount(value: &str, field: &'static str) -> Result<Money, ValidationError> {
    let amount = Money::from_str(value).map_err(|_| ValidationError::InvalidAmount {
        field,
        value: value.to_string(),
    })?;
    if amount.is_negative() {
        return Err(ValidationError::NegativeAmount {
            field,
            value: value.to_string(),
        });
    }
    check_ceiling(field, amount)?;
    Ok(amount)
}

fn check_ceiling(field: &'static str, amount: Money) -> Result<(), ValidationError> {
    if amount > MAX_MONTHLY_AMOUNT {
        return Err(ValidationError::AmountOutOfRange {
            field,
            value: amount,
            max: MAX_MONTHLY_AMOUNT,
        });
    }
    Ok(())
}

fn optional_amount(value: &Option<String>, field: &'static str) -> Result<Money, ValidationError> {
    optional(value).map_or(Ok(Money::ZERO), |v| parse_amount(v, field))
}

fn parse_dependents(value: Option<&str>) -> Result<u8, ValidationError> {
    let Some(value) = value else {
        return Ok(0);
    };
    let count: i64 = value.parse().map_err(|_| ValidationError::InvalidAmount {
        field: "dependents",
        value: value.to_string(),
    })?;
    if count < 0 {
        return Err(ValidationError::NegativeDependents(count));
    }
    if count > i64::from(MAX_DECLARED_DEPENDENTS) {
        return Err(ValidationError::TooManyDependents {
            count,
            max: MAX_DECLARED_DEPENDENTS,
        });
    }
    Ok(count as u8)
}

/// CNSS registration number: exactly 9 digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InsuranceNumber(String);

impl InsuranceNumber {
    pub const LEN: usize = 9;

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, used for the declaration checksum.
    pub fn value(&self) -> u64 {
        // Nine ASCII digits always fit.
        self.0.bytes().fold(0, |acc, b| acc * 10 + u64::from(b - b'0'))
    }
}

impl FromStr for InsuranceNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != Self::LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidInsuranceNumber(s.to_string()));
        }
        Ok(InsuranceNumber(trimmed.to_string()))
    }
}

impl TryFrom<String> for InsuranceNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InsuranceNumber> for String {
    fn from(value: InsuranceNumber) -> Self {
        value.0
    }
}

impl fmt::Display for InsuranceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Moroccan bank account identifier (RIB): exactly 24 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rib(String);

impl Rib {
    pub const LEN: usize = 24;

    /// `None` unless `value` is exactly 24 ASCII digits.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        (trimmed.len() == Self::LEN && trimmed.bytes().all(|b| b.is_ascii_digit()))
            .then(|| Rib(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractType {
    /// Open-ended contract (CDI).
    Permanent,
    /// Fixed-term contract (CDD).
    FixedTerm,
    /// Subsidised internship contract.
    Internship,
    /// Non-salaried contractor; never declared to CNSS.
    Freelance,
}

impl ContractType {
    pub fn is_salaried(self) -> bool {
        !matches!(self, ContractType::Freelance)
    }
}

impl FromStr for ContractType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permanent" | "cdi" => Ok(ContractType::Permanent),
            "fixed-term" | "cdd" => Ok(ContractType::FixedTerm),
            "internship" | "anapec" => Ok(ContractType::Internship),
            "freelance" => Ok(ContractType::Freelance),
            _ => Err(ValidationError::UnknownContractType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl FromStr for MaritalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(MaritalStatus::Single),
            "married" => Ok(MaritalStatus::Married),
            "divorced" => Ok(MaritalStatus::Divorced),
            "widowed" => Ok(MaritalStatus::Widowed),
            _ => Err(ValidationError::UnknownMaritalStatus(s.to_string())),
        }
    }
}

/// A validated employee, ready for computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeePayrollProfile {
    pub id: String,
    pub insurance_number: InsuranceNumber,
    pub national_id: String,
    pub last_name: String,
    pub first_name: String,
    /// Original hire date. Not reset by contract-type changes.
    pub hire_date: NaiveDate,
    pub contract_start: Option<NaiveDate>,
    pub marital_status: MaritalStatus,
    pub dependents: u8,
    pub base_salary: Money,
    pub taxable_allowances: Money,
    pub non_taxable_allowances: Money,
    /// Post-tax deductions (loan repayments, advances).
    pub other_deductions: Money,
    /// Family allowance already paid out, deducted on the CNSS declaration.
    pub family_allowance_withheld: Money,
    /// Bank account as supplied; validated only when building a transfer.
    pub bank_account: Option<String>,
    pub contract_type: ContractType,
}

impl EmployeePayrollProfile {
    /// Re-checks the amount bounds for profiles built without
    /// [`EmployeeRecord::parse`].
    pub fn check_amounts(&self) -> Result<(), ValidationError> {
        let amounts = [
            ("base_salary", self.base_salary),
            ("taxable_allowances", self.taxable_allowances),
            ("non_taxable_allowances", self.non_taxable_allowances),
            ("other_deductions", self.other_deductions),
            ("family_allowance_withheld", self.family_allowance_withheld),
        ];
        for (field, amount) in amounts {
            if amount.is_negative() {
                return Err(ValidationError::NegativeAmount {
                    field,
                    value: amount.to_string(),
                });
            }
            check_ceiling(field, amount)?;
        }
        Ok(())
    }
}
