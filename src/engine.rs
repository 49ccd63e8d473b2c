//! Payroll calculation orchestration.
//!
//! [`compute`] is a pure function of one profile and one period. The
//! [`PayrollEngine`] loads profiles from CSV and runs `compute` over all of
//! them, collecting failures instead of stopping at the first one.

use crate::calculation::Calculation;
use crate::contributions::EmployerContributions;
use crate::error::{Result, ValidationError};
use crate::income_tax::IncomeTax;
use crate::period::{CalculationStatus, PayPeriod};
use crate::profile::{EmployeePayrollProfile, EmployeeRecord};
use crate::report::ValidationFailure;
use crate::seniority;
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::io::{Read, Write};

/// Computes one employee's pay for one period.
///
/// Deterministic: identical inputs always produce an identical result, so
/// recomputing an already computed record is a safe retry.
pub fn compute(
    profile: &EmployeePayrollProfile,
    period: &PayPeriod,
) -> std::result::Result<Calculation, ValidationError> {
    profile.check_amounts()?;

    let period_end = period.end_date();
    if profile.hire_date > period_end {
        return Err(ValidationError::HireDateAfterPeriodEnd {
            hire_date: profile.hire_date,
            period_end,
        });
    }

    let seniority_months = seniority::months_of_service(profile.hire_date, period_end);
    let seniority_bonus = seniority::bonus(profile.base_salary, seniority_months);
    let taxable_gross = profile.base_salary + seniority_bonus + profile.taxable_allowances;
    let non_taxable_gross = profile.non_taxable_allowances;

    let tax = IncomeTax::compute(profile.base_salary, taxable_gross, profile.dependents);
    let employer = EmployerContributions::for_base_salary(profile.base_salary);

    let net_payable = tax.net_pay + non_taxable_gross - profile.other_deductions;
    let total_employer_cost = taxable_gross + non_taxable_gross + employer.total();

    Ok(Calculation {
        employee_id: profile.id.clone(),
        insurance_number: profile.insurance_number.clone(),
        last_name: profile.last_name.clone(),
        first_name: profile.first_name.clone(),
        contract_type: profile.contract_type,
        year: period.year(),
        month: period.month(),
        status: CalculationStatus::Computed,
        dependents: profile.dependents,
        base_salary: profile.base_salary,
        seniority_months,
        seniority_bonus,
        taxable_allowances: profile.taxable_allowances,
        taxable_gross,
        non_taxable_gross,
        employee_social_insurance: tax.employee_social_insurance,
        employee_health_insurance: tax.employee_health_insurance,
        professional_deduction: tax.professional_deduction,
        taxable_net: tax.taxable_net,
        annual_taxable_net: tax.annual_taxable_net,
        gross_income_tax: tax.gross_tax,
        family_deduction: tax.family_deduction,
        net_income_tax: tax.net_tax,
        net_pay: tax.net_pay,
        other_deductions: profile.other_deductions,
        net_payable,
        employer_family_allocation: employer.family_allocation,
        employer_social_benefits: employer.social_benefits,
        employer_training_tax: employer.training_tax,
        employer_health_insurance: employer.health_insurance,
        total_employer_cost,
        family_allowance_withheld: profile.family_allowance_withheld,
        bank_account: profile.bank_account.clone(),
    })
}

/// Outcome of computing a whole period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollRun {
    pub period: PayPeriod,
    /// In profile input order.
    pub calculations: Vec<Calculation>,
    pub failures: Vec<ValidationFailure>,
}

impl PayrollRun {
    /// Writes calculations as CSV, one row per employee, in input order.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for calculation in &self.calculations {
            csv_writer.serialize(calculation)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Holds validated profiles for one company and computes them per period.
pub struct PayrollEngine {
    profiles: Vec<EmployeePayrollProfile>,

    /// Ids already loaded, for duplicate detection.
    known_ids: HashSet<String>,

    /// Rows rejected during ingestion.
    ingestion_failures: Vec<ValidationFailure>,
}

impl PayrollEngine {
    /// Creates a new empty engine.
    pub fn new() -> Self {
        PayrollEngine {
            profiles: Vec::new(),
            known_ids: HashSet::new(),
            ingestion_failures: Vec::new(),
        }
    }

    /// Loads employee profiles from CSV.
    ///
    /// Invalid rows are logged at warn level, recorded as ingestion
    /// failures and skipped; they never stop the remaining rows.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<EmployeeRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => {
                    let employee_id = record.id.clone();
                    match record.parse() {
                        Ok(profile) => {
                            if let Err(error) = self.add_profile(profile) {
                                self.reject(Some(row_num), employee_id, error);
                            }
                        }
                        Err(error) => self.reject(Some(row_num), employee_id, error),
                    }
                }
                Err(e) => {
                    self.reject(
                        Some(row_num),
                        None,
                        ValidationError::MalformedRow(e.to_string()),
                    );
                }
            }
        }

        info!(
            "Loaded {} employee profiles ({} rejected)",
            self.profiles.len(),
            self.ingestion_failures.len()
        );
        Ok(())
    }

    /// Adds an already validated profile. Duplicate ids are refused.
    pub fn add_profile(
        &mut self,
        profile: EmployeePayrollProfile,
    ) -> std::result::Result<(), ValidationError> {
        if !self.known_ids.insert(profile.id.clone()) {
            return Err(ValidationError::DuplicateEmployee(profile.id));
        }
        debug!("Loaded profile {}", profile.id);
        self.profiles.push(profile);
        Ok(())
    }

    pub fn profiles(&self) -> &[EmployeePayrollProfile] {
        &self.profiles
    }

    pub fn ingestion_failures(&self) -> &[ValidationFailure] {
        &self.ingestion_failures
    }

    /// Computes every loaded profile for `period`.
    ///
    /// One employee's validation error never blocks the others.
    pub fn run(&self, period: &PayPeriod) -> PayrollRun {
        let mut calculations = Vec::with_capacity(self.profiles.len());
        let mut failures = Vec::new();

        for profile in &self.profiles {
            match compute(profile, period) {
                Ok(calculation) => {
                    debug!(
                        "Computed {} for {}: net pay {}, employee contributions {}",
                        profile.id,
                        period,
                        calculation.net_pay,
                        calculation.employee_contributions()
                    );
                    calculations.push(calculation);
                }
                Err(error) => {
                    warn!("Employee {}: {}", profile.id, error);
                    failures.push(ValidationFailure {
                        row: None,
                        employee_id: Some(profile.id.clone()),
                        status: failed_status(),
                        error,
                    });
                }
            }
        }

        info!(
            "Period {}: {} calculations, {} failures",
            period,
            calculations.len(),
            failures.len()
        );

        PayrollRun {
            period: *period,
            calculations,
            failures,
        }
    }

    fn reject(&mut self, row: Option<usize>, employee_id: Option<String>, error: ValidationError) {
        let failure = ValidationFailure {
            row,
            employee_id,
            status: failed_status(),
            error,
        };
        warn!("Rejected employee {}", failure);
        self.ingestion_failures.push(failure);
    }
}

/// A calculation that never got past `Pending`.
fn failed_status() -> CalculationStatus {
    // Pending always admits Failed.
    CalculationStatus::Pending
        .fail()
        .unwrap_or(CalculationStatus::Failed)
}

impl Default for PayrollEngine {
    fn default() -> Self {
        Self::new()
    }
}
