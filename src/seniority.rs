//! Seniority (prime d'ancienneté) computation.
//!
//! Seniority always runs from the original hire date. A change of contract
//! type (for example a freelancer converted to an employee) does not reset
//! it; only a genuine new hire does, by recording a new hire date.

use crate::money::Money;
use crate::tables;
use chrono::{Datelike, Months, NaiveDate};

/// Whole months of service between `hire_date` and `as_of`.
///
/// A month counts once the same day of month is reached; when that day does
/// not exist in the month (hired on the 31st), the last day of the month
/// completes it. Returns 0 when `as_of` precedes the hire date.
pub fn months_of_service(hire_date: NaiveDate, as_of: NaiveDate) -> u32 {
    if as_of <= hire_date {
        return 0;
    }

    let span = (as_of.year() - hire_date.year()) * 12 + as_of.month() as i32
        - hire_date.month() as i32;
    let mut months = span.max(0) as u32;

    // `checked_add_months` clamps to the end of shorter months.
    while months > 0 {
        match hire_date.checked_add_months(Months::new(months)) {
            Some(anniversary) if anniversary <= as_of => break,
            _ => months -= 1,
        }
    }
    months
}

/// Seniority bonus for a base salary after `months` of service.
pub fn bonus(base_salary: Money, months: u32) -> Money {
    base_salary.apply_rate(tables::seniority_rate(months))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_whole_months() {
        assert_eq!(months_of_service(date(2020, 1, 15), date(2020, 1, 31)), 0);
        assert_eq!(months_of_service(date(2020, 1, 15), date(2020, 2, 14)), 0);
        assert_eq!(months_of_service(date(2020, 1, 15), date(2020, 2, 15)), 1);
        assert_eq!(months_of_service(date(2010, 3, 31), date(2024, 3, 31)), 168);
    }

    #[test]
    fn test_month_end_hire_completes_on_shorter_month_end() {
        assert_eq!(months_of_service(date(2023, 1, 31), date(2023, 2, 28)), 1);
        assert_eq!(months_of_service(date(2023, 1, 31), date(2023, 4, 30)), 3);
        assert_eq!(months_of_service(date(2023, 1, 31), date(2023, 4, 29)), 2);
    }

    #[test]
    fn test_as_of_before_hire_is_zero() {
        assert_eq!(months_of_service(date(2024, 5, 1), date(2024, 4, 30)), 0);
        assert_eq!(months_of_service(date(2024, 5, 1), date(2024, 5, 1)), 0);
    }

    #[test]
    fn test_bonus_tiers() {
        let base = Money::from_units(9_000);
        assert_eq!(bonus(base, 23), Money::ZERO);
        assert_eq!(bonus(base, 24), Money::from_units(450));
        assert_eq!(bonus(base, 60), Money::from_units(900));
        assert_eq!(bonus(base, 168), Money::from_units(1_350));
        assert_eq!(bonus(base, 240), Money::from_units(1_800));
        assert_eq!(bonus(base, 300), Money::from_units(2_250));
    }

    #[test]
    fn test_bonus_rounds_to_the_centime() {
        // 3333.33 * 5% = 166.6665 -> 166.67
        assert_eq!(bonus(Money::from_centimes(333_333), 24).centimes(), 16_667);
    }
}
