//! Statutory Moroccan payroll tables.
//!
//! Pure constant data plus lookups. Nothing here is mutable at runtime, so
//! the tables can be read from any number of threads without coordination.

use crate::money::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// One progressive income-tax (IR) bracket on annual taxable income.
///
/// Income `x` falls in the bracket when `lower < x <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBracket {
    pub lower: Money,
    /// `None` for the open-ended top bracket.
    pub upper: Option<Money>,
    pub rate: Decimal,
    pub deduction: Money,
}

impl TaxBracket {
    pub fn contains(&self, annual: Money) -> bool {
        annual > self.lower && self.upper.map_or(true, |upper| annual <= upper)
    }
}

pub const INCOME_TAX_BRACKETS: [TaxBracket; 6] = [
    TaxBracket {
        lower: Money::from_units(0),
        upper: Some(Money::from_units(30_000)),
        rate: dec!(0),
        deduction: Money::from_units(0),
    },
    TaxBracket {
        lower: Money::from_units(30_000),
        upper: Some(Money::from_units(50_000)),
        rate: dec!(0.10),
        deduction: Money::from_units(3_000),
    },
    TaxBracket {
        lower: Money::from_units(50_000),
        upper: Some(Money::from_units(60_000)),
        rate: dec!(0.20),
        deduction: Money::from_units(8_000),
    },
    TaxBracket {
        lower: Money::from_units(60_000),
        upper: Some(Money::from_units(80_000)),
        rate: dec!(0.30),
        deduction: Money::from_units(14_000),
    },
    TaxBracket {
        lower: Money::from_units(80_000),
        upper: Some(Money::from_units(180_000)),
        rate: dec!(0.34),
        deduction: Money::from_units(17_200),
    },
    TaxBracket {
        lower: Money::from_units(180_000),
        upper: None,
        rate: dec!(0.38),
        deduction: Money::from_units(24_400),
    },
];

/// Bracket applicable to an annual taxable income.
///
/// Zero and negative incomes land in the first (0%) bracket.
pub fn bracket_for(annual: Money) -> &'static TaxBracket {
    INCOME_TAX_BRACKETS
        .iter()
        .find(|bracket| bracket.contains(annual))
        .unwrap_or(&INCOME_TAX_BRACKETS[0])
}

/// Seniority bonus tier, keyed by completed months of service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeniorityTier {
    pub min_months: u32,
    pub rate: Decimal,
}

/// Ordered from the highest threshold down.
pub const SENIORITY_TIERS: [SeniorityTier; 6] = [
    SeniorityTier {
        min_months: 300,
        rate: dec!(0.25),
    },
    SeniorityTier {
        min_months: 240,
        rate: dec!(0.20),
    },
    SeniorityTier {
        min_months: 144,
        rate: dec!(0.15),
    },
    SeniorityTier {
        min_months: 60,
        rate: dec!(0.10),
    },
    SeniorityTier {
        min_months: 24,
        rate: dec!(0.05),
    },
    SeniorityTier {
        min_months: 0,
        rate: dec!(0),
    },
];

pub fn seniority_rate(months: u32) -> Decimal {
    SENIORITY_TIERS
        .iter()
        .find(|tier| months >= tier.min_months)
        .map_or(Decimal::ZERO, |tier| tier.rate)
}

// Employee side.
pub const EMPLOYEE_SOCIAL_INSURANCE_RATE: Decimal = dec!(0.0448);
pub const SOCIAL_INSURANCE_CAP: Money = Money::from_units(6_000);
pub const EMPLOYEE_HEALTH_INSURANCE_RATE: Decimal = dec!(0.0226);

// Employer side. Family allocation and social benefits apply to the
// uncapped base salary, unlike the employee social-insurance share.
pub const EMPLOYER_FAMILY_ALLOCATION_RATE: Decimal = dec!(0.064);
pub const EMPLOYER_SOCIAL_BENEFITS_RATE: Decimal = dec!(0.0898);
pub const EMPLOYER_HEALTH_INSURANCE_RATE: Decimal = dec!(0.0411);
pub const EMPLOYER_TRAINING_TAX_RATE: Decimal = dec!(0.016);

pub const PROFESSIONAL_EXPENSE_RATE: Decimal = dec!(0.20);
pub const PROFESSIONAL_EXPENSE_CAP: Money = Money::from_units(2_500);

/// Monthly income-tax reduction per dependent.
pub const FAMILY_CHARGE_PER_DEPENDENT: Money = Money::from_units(30);
pub const MAX_FAMILY_CHARGE_DEPENDENTS: u8 = 6;

/// Largest monthly amount accepted on a profile (100 million dirhams).
///
/// Keeps every derived sum, the annualised income and the batch totals well
/// inside the `i64` centime range.
pub const MAX_MONTHLY_AMOUNT: Money = Money::from_units(100_000_000);

/// Largest dependent count a declaration record can carry (2 digits).
pub const MAX_DECLARED_DEPENDENTS: u8 = 99;

/// CNSS family allowance: the first children earn the full rate, the next
/// ones a reduced rate, and nothing beyond.
pub const FAMILY_ALLOWANCE_FULL_RATE: Money = Money::from_units(300);
pub const FAMILY_ALLOWANCE_FULL_RATE_CHILDREN: u8 = 3;
pub const FAMILY_ALLOWANCE_REDUCED_RATE: Money = Money::from_units(36);
pub const FAMILY_ALLOWANCE_REDUCED_RATE_CHILDREN: u8 = 3;

pub fn family_charge_deduction(dependents: u8) -> Money {
    FAMILY_CHARGE_PER_DEPENDENT * i64::from(dependents.min(MAX_FAMILY_CHARGE_DEPENDENTS))
}

/// Monthly CNSS family allowance due for `dependents` children.
pub fn family_allowance(dependents: u8) -> Money {
    let full = dependents.min(FAMILY_ALLOWANCE_FULL_RATE_CHILDREN);
    let reduced = dependents
        .saturating_sub(FAMILY_ALLOWANCE_FULL_RATE_CHILDREN)
        .min(FAMILY_ALLOWANCE_REDUCED_RATE_CHILDREN);
    FAMILY_ALLOWANCE_FULL_RATE * i64::from(full) + FAMILY_ALLOWANCE_REDUCED_RATE * i64::from(reduced)
}
