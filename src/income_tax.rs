//! Progressive income tax (IR).

use crate::contributions;
use crate::money::Money;
use crate::tables;

/// Annual tax for an annual taxable income: `max(0, x * rate - deduction)`,
/// rounded to the centime.
pub fn bracket_tax(annual: Money) -> Money {
    let bracket = tables::bracket_for(annual);
    (annual.apply_rate(bracket.rate) - bracket.deduction).non_negative()
}

/// Breakdown of the income-tax computation for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeTax {
    pub employee_social_insurance: Money,
    pub employee_health_insurance: Money,
    pub professional_deduction: Money,
    pub taxable_net: Money,
    pub annual_taxable_net: Money,
    pub gross_tax: Money,
    pub family_deduction: Money,
    pub net_tax: Money,
    pub net_pay: Money,
}

impl IncomeTax {
    /// Computes the monthly tax chain.
    ///
    /// `social_insurance_base` is capped internally; `taxable_gross` is the
    /// base for health insurance and the professional deduction. The family
    /// deduction reduces the tax, never the taxable base.
    pub fn compute(social_insurance_base: Money, taxable_gross: Money, dependents: u8) -> Self {
        let employee_social_insurance =
            contributions::employee_social_insurance(social_insurance_base);
        let employee_health_insurance = contributions::employee_health_insurance(taxable_gross);
        let professional_deduction = contributions::professional_deduction(taxable_gross);

        let taxable_net = taxable_gross
            - employee_social_insurance
            - employee_health_insurance
            - professional_deduction;
        let annual_taxable_net = taxable_net * 12;
        let gross_tax = bracket_tax(annual_taxable_net).divide_rounded(12);
        let family_deduction = tables::family_charge_deduction(dependents);
        let net_tax = (gross_tax - family_deduction).non_negative();

        IncomeTax {
            employee_social_insurance,
            employee_health_insurance,
            professional_deduction,
            taxable_net,
            annual_taxable_net,
            gross_tax,
            family_deduction,
            net_tax,
            net_pay: taxable_net - net_tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dh(centimes: i64) -> Money {
        Money::from_centimes(centimes)
    }

    #[test]
    fn test_no_tax_up_to_thirty_thousand() {
        assert_eq!(bracket_tax(Money::from_units(30_000)), Money::ZERO);
        assert_eq!(bracket_tax(Money::from_units(12_000)), Money::ZERO);
        assert_eq!(bracket_tax(Money::ZERO), Money::ZERO);
    }

    #[test]
    fn test_tax_starts_just_above_thirty_thousand() {
        assert_eq!(bracket_tax(Money::from_units(30_001)), dh(10));
        assert!(bracket_tax(Money::from_units(30_001)) > Money::ZERO);
    }

    #[test]
    fn test_bracket_boundaries_are_continuous() {
        assert_eq!(bracket_tax(Money::from_units(50_000)), Money::from_units(2_000));
        assert_eq!(bracket_tax(Money::from_units(60_000)), Money::from_units(4_000));
        assert_eq!(bracket_tax(Money::from_units(80_000)), Money::from_units(10_000));
        assert_eq!(bracket_tax(Money::from_units(180_000)), Money::from_units(44_000));

        for boundary in [50_000, 60_000, 80_000, 180_000] {
            let at = bracket_tax(Money::from_units(boundary));
            let above = bracket_tax(Money::from_units(boundary) + dh(1));
            assert!(above >= at, "jump down at {}", boundary);
            assert!(above - at <= dh(1), "jump up at {}", boundary);
        }
    }

    #[test]
    fn test_monthly_chain_for_reference_employee() {
        // Base 9,000 with 15% seniority: taxable gross 10,350, one dependent.
        let tax = IncomeTax::compute(Money::from_units(9_000), Money::from_units(10_350), 1);

        assert_eq!(tax.employee_social_insurance, dh(26_880));
        assert_eq!(tax.employee_health_insurance, dh(23_391));
        assert_eq!(tax.professional_deduction, dh(207_000));
        assert_eq!(tax.taxable_net, dh(777_729));
        assert_eq!(tax.annual_taxable_net, dh(9_332_748));
        // (93,327.48 * 34% - 17,200) = 14,531.34 per year -> 1,210.95 per month
        assert_eq!(tax.gross_tax, dh(121_095));
        assert_eq!(tax.family_deduction, Money::from_units(30));
        assert_eq!(tax.net_tax, dh(118_095));
        assert_eq!(tax.net_pay, dh(777_729 - 118_095));
    }

    #[test]
    fn test_family_deduction_never_makes_tax_negative() {
        let tax = IncomeTax::compute(Money::from_units(3_000), Money::from_units(3_000), 6);
        assert_eq!(tax.gross_tax, Money::ZERO);
        assert_eq!(tax.family_deduction, Money::from_units(180));
        assert_eq!(tax.net_tax, Money::ZERO);
        assert_eq!(tax.net_pay, tax.taxable_net);
    }

    #[test]
    fn test_zero_dependents_means_zero_deduction() {
        let tax = IncomeTax::compute(Money::from_units(9_000), Money::from_units(9_000), 0);
        assert_eq!(tax.family_deduction, Money::ZERO);
        assert_eq!(tax.net_tax, tax.gross_tax);
    }
}
