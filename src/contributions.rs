//! Social-insurance (CNSS), health-insurance (AMO) and training-tax
//! contributions.
//!
//! Every component is rounded to the centime on its own. Totals are sums of
//! the rounded components, never a re-rounded sum.

use crate::money::Money;
use crate::tables::{
    EMPLOYEE_HEALTH_INSURANCE_RATE, EMPLOYEE_SOCIAL_INSURANCE_RATE,
    EMPLOYER_FAMILY_ALLOCATION_RATE, EMPLOYER_HEALTH_INSURANCE_RATE,
    EMPLOYER_SOCIAL_BENEFITS_RATE, EMPLOYER_TRAINING_TAX_RATE, PROFESSIONAL_EXPENSE_CAP,
    PROFESSIONAL_EXPENSE_RATE, SOCIAL_INSURANCE_CAP,
};

/// Employee CNSS share: 4.48% of the base, capped at 6,000 per month.
pub fn employee_social_insurance(base: Money) -> Money {
    base.min(SOCIAL_INSURANCE_CAP)
        .apply_rate(EMPLOYEE_SOCIAL_INSURANCE_RATE)
}

/// Employee AMO share: 2.26% of taxable gross, uncapped.
pub fn employee_health_insurance(taxable_gross: Money) -> Money {
    taxable_gross.apply_rate(EMPLOYEE_HEALTH_INSURANCE_RATE)
}

/// Professional-expense deduction: 20% of taxable gross, at most 2,500.
pub fn professional_deduction(taxable_gross: Money) -> Money {
    taxable_gross
        .apply_rate(PROFESSIONAL_EXPENSE_RATE)
        .min(PROFESSIONAL_EXPENSE_CAP)
}

/// Employer-side contributions for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmployerContributions {
    pub family_allocation: Money,
    pub social_benefits: Money,
    pub training_tax: Money,
    pub health_insurance: Money,
}

impl EmployerContributions {
    /// Computes all four employer contributions on the uncapped base salary.
    ///
    /// Taxable gross (which includes the seniority bonus and allowances) is
    /// not the base for any of them. Family allocation and social benefits
    /// deliberately ignore the 6,000 cap used on the employee side.
    pub fn for_base_salary(base_salary: Money) -> Self {
        EmployerContributions {
            family_allocation: base_salary.apply_rate(EMPLOYER_FAMILY_ALLOCATION_RATE),
            social_benefits: base_salary.apply_rate(EMPLOYER_SOCIAL_BENEFITS_RATE),
            training_tax: base_salary.apply_rate(EMPLOYER_TRAINING_TAX_RATE),
            health_insurance: base_salary.apply_rate(EMPLOYER_HEALTH_INSURANCE_RATE),
        }
    }

    pub fn total(&self) -> Money {
        self.family_allocation + self.social_benefits + self.training_tax + self.health_insurance
    }
}
