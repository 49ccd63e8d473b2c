//! The per-employee, per-period payroll result.

use crate::money::Money;
use crate::period::CalculationStatus;
use crate::profile::{ContractType, InsuranceNumber};
use serde::Serialize;

/// Result of computing one employee's pay for one period.
///
/// Carries the identity fields the declaration and transfer encoders need,
/// so that encoding only ever looks at calculations. Field order is the
/// column order of the CSV output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calculation {
    pub employee_id: String,
    pub insurance_number: InsuranceNumber,
    pub last_name: String,
    pub first_name: String,
    pub contract_type: ContractType,
    pub year: i32,
    pub month: u32,
    pub status: CalculationStatus,
    pub dependents: u8,

    pub base_salary: Money,
    pub seniority_months: u32,
    pub seniority_bonus: Money,
    pub taxable_allowances: Money,
    /// Base salary + seniority bonus + taxable allowances.
    pub taxable_gross: Money,
    pub non_taxable_gross: Money,

    /// On `min(base_salary, cap)`, never on taxable gross.
    pub employee_social_insurance: Money,
    pub employee_health_insurance: Money,
    pub professional_deduction: Money,
    pub taxable_net: Money,
    pub annual_taxable_net: Money,
    pub gross_income_tax: Money,
    pub family_deduction: Money,
    pub net_income_tax: Money,
    /// `taxable_net - net_income_tax`.
    pub net_pay: Money,
    pub other_deductions: Money,
    /// What is actually transferred: net pay plus non-taxable gross, minus
    /// post-tax deductions.
    pub net_payable: Money,

    pub employer_family_allocation: Money,
    pub employer_social_benefits: Money,
    pub employer_training_tax: Money,
    pub employer_health_insurance: Money,
    pub total_employer_cost: Money,

    pub family_allowance_withheld: Money,
    pub bank_account: Option<String>,
}

impl Calculation {
    /// "LAST FIRST", upper-cased, as printed on regulator files.
    pub fn declared_name(&self) -> String {
        format!("{} {}", self.last_name.trim(), self.first_name.trim()).to_uppercase()
    }

    pub fn employee_contributions(&self) -> Money {
        self.employee_social_insurance + self.employee_health_insurance
    }

    pub fn employer_contributions(&self) -> Money {
        self.employer_family_allocation
            + self.employer_social_benefits
            + self.employer_training_tax
            + self.employer_health_insurance
    }
}
