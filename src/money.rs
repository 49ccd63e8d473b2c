//! Monetary amounts held as integer centimes.
//!
//! All arithmetic between amounts is exact integer arithmetic. Multiplying by
//! a rate goes through `rust_decimal` and is rounded back to a whole centime
//! half-away-from-zero, once per component.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// An amount of Moroccan dirhams stored as a whole number of centimes.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use moroccan_payroll::Money;
///
/// let amount = Money::from_str("10.5").unwrap();
/// assert_eq!(amount.centimes(), 1050);
/// assert_eq!(amount.to_string(), "10.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

/// Why a string could not be read as an amount.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    #[error("not a decimal number")]
    Malformed,

    #[error("more than 2 decimal places")]
    TooPrecise,

    #[error("amount out of range")]
    OutOfRange,
}

impl Money {
    /// Number of decimal places carried by an amount.
    pub const SCALE: u32 = 2;

    pub const ZERO: Self = Money(0);

    pub const fn from_centimes(centimes: i64) -> Self {
        Money(centimes)
    }

    /// Whole dirhams.
    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    pub const fn centimes(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Exact decimal value in dirhams, scale 2.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, Self::SCALE)
    }

    /// Rounds a dirham amount to the nearest centime, half away from zero.
    ///
    /// Returns `None` when the result does not fit in an `i64` of centimes.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let centimes = value
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        centimes.to_i64().map(Money)
    }

    /// Multiplies by `rate` and rounds to the nearest centime.
    ///
    /// Inputs bounded by `tables::MAX_MONTHLY_AMOUNT` never leave the `i64`
    /// range; anything beyond saturates.
    pub fn apply_rate(self, rate: Decimal) -> Self {
        Self::from_decimal(self.to_decimal() * rate).unwrap_or(if rate.is_sign_negative() {
            Money(i64::MIN)
        } else {
            Money(i64::MAX)
        })
    }

    /// Divides by a whole number and rounds to the nearest centime.
    pub fn divide_rounded(self, divisor: i64) -> Self {
        let quotient = Decimal::from(self.0) / Decimal::from(divisor);
        let rounded = quotient.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Money(rounded.to_i64().unwrap_or(0))
    }

    /// Zero when negative.
    pub fn non_negative(self) -> Self {
        Money(self.0.max(0))
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed).map_err(|_| MoneyParseError::Malformed)?;
        if decimal.normalize().scale() > Self::SCALE {
            return Err(MoneyParseError::TooPrecise);
        }
        Money::from_decimal(decimal).ok_or(MoneyParseError::OutOfRange)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Money(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}
