//! Pay periods and the per-employee calculation lifecycle.

use crate::error::{TransitionError, ValidationError};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a company pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodStatus {
    Draft,
    InProgress,
    Closed,
    Archived,
}

impl PeriodStatus {
    /// Payroll has been closed (archived periods stay closed).
    pub fn is_closed(self) -> bool {
        matches!(self, PeriodStatus::Closed | PeriodStatus::Archived)
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeriodStatus::Draft => "draft",
            PeriodStatus::InProgress => "in-progress",
            PeriodStatus::Closed => "closed",
            PeriodStatus::Archived => "archived",
        };
        f.write_str(name)
    }
}

impl FromStr for PeriodStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(PeriodStatus::Draft),
            "in-progress" | "in_progress" => Ok(PeriodStatus::InProgress),
            "closed" => Ok(PeriodStatus::Closed),
            "archived" => Ok(PeriodStatus::Archived),
            other => Err(format!("unknown period status {:?}", other)),
        }
    }
}

/// One monthly pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PayPeriod {
    month: u32,
    year: i32,
    status: PeriodStatus,
}

impl PayPeriod {
    /// Creates a period, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32, status: PeriodStatus) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ValidationError::InvalidMonth(month));
        }
        Ok(PayPeriod {
            month,
            year,
            status,
        })
    }

    /// Parses `YYYY-MM`.
    pub fn parse(value: &str, status: PeriodStatus) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            field: "period",
            value: value.to_string(),
        };
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        PayPeriod::new(year, month, status)
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn status(&self) -> PeriodStatus {
        self.status
    }

    pub fn start_date(&self) -> NaiveDate {
        // Validated in `new`.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last calendar day of the period.
    pub fn end_date(&self) -> NaiveDate {
        self.next_month_start()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    /// CNSS payment due date: the 20th of the following month.
    pub fn due_date(&self) -> NaiveDate {
        self.next_month_start()
            .with_day(20)
            .unwrap_or(NaiveDate::MAX)
    }

    /// `YYYYMM`, as used in declaration records.
    pub fn label(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// Moves the period forward. Reopening a closed period requires
    /// `admin_override`; archived periods never change.
    pub fn transition(
        &mut self,
        to: PeriodStatus,
        admin_override: bool,
    ) -> Result<(), TransitionError> {
        use PeriodStatus::*;
        let allowed = matches!(
            (self.status, to),
            (Draft, InProgress) | (InProgress, Closed) | (Closed, Archived)
        ) || (admin_override && self.status == Closed && to == InProgress);

        if !allowed {
            return Err(TransitionError {
                entity: "pay period",
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }

    fn next_month_start(&self) -> NaiveDate {
        self.start_date()
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Lifecycle of one employee's calculation for one period.
///
/// The engine only ever produces `Computed` or `Failed`; later states belong
/// to the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculationStatus {
    Pending,
    Computed,
    Verified,
    Approved,
    Sent,
    Archived,
    Failed,
}

impl CalculationStatus {
    pub fn can_transition_to(self, to: CalculationStatus) -> bool {
        use CalculationStatus::*;
        matches!(
            (self, to),
            (Pending, Computed)
                | (Computed, Computed)
                | (Computed, Verified)
                | (Verified, Approved)
                | (Approved, Sent)
                | (Sent, Archived)
                | (Pending, Failed)
                | (Computed, Failed)
        )
    }

    pub fn transition(self, to: CalculationStatus) -> Result<CalculationStatus, TransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TransitionError {
                entity: "calculation",
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Marks a calculation that could not complete.
    pub fn fail(self) -> Result<CalculationStatus, TransitionError> {
        self.transition(CalculationStatus::Failed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CalculationStatus::Archived | CalculationStatus::Failed)
    }
}

impl fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalculationStatus::Pending => "pending",
            CalculationStatus::Computed => "computed",
            CalculationStatus::Verified => "verified",
            CalculationStatus::Approved => "approved",
            CalculationStatus::Sent => "sent",
            CalculationStatus::Archived => "archived",
            CalculationStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_dates() {
        let p = PayPeriod::new(2024, 2, PeriodStatus::Draft).unwrap();
        assert_eq!(p.start_date(), date(2024, 2, 1));
        assert_eq!(p.end_date(), date(2024, 2, 29));
        assert_eq!(p.due_date(), date(2024, 3, 20));
        assert_eq!(p.label(), "202402");

        let december = PayPeriod::new(2023, 12, PeriodStatus::Closed).unwrap();
        assert_eq!(december.end_date(), date(2023, 12, 31));
        assert_eq!(december.due_date(), date(2024, 1, 20));
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(
            PayPeriod::new(2024, 13, PeriodStatus::Draft),
            Err(ValidationError::InvalidMonth(13))
        );
        assert_eq!(
            PayPeriod::new(2024, 0, PeriodStatus::Draft),
            Err(ValidationError::InvalidMonth(0))
        );
    }

    #[test]
    fn test_parse_period() {
        let p = PayPeriod::parse("2024-03", PeriodStatus::Closed).unwrap();
        assert_eq!((p.year(), p.month()), (2024, 3));
        assert_eq!(p.to_string(), "2024-03");
        assert!(PayPeriod::parse("202403", PeriodStatus::Closed).is_err());
    }

    #[test]
    fn test_period_lifecycle() {
        let mut p = PayPeriod::new(2024, 3, PeriodStatus::Draft).unwrap();
        p.transition(PeriodStatus::InProgress, false).unwrap();
        p.transition(PeriodStatus::Closed, false).unwrap();
        assert!(p.status().is_closed());

        assert!(p.transition(PeriodStatus::InProgress, false).is_err());
        p.transition(PeriodStatus::InProgress, true).unwrap();
        p.transition(PeriodStatus::Closed, false).unwrap();
        p.transition(PeriodStatus::Archived, false).unwrap();
        assert!(p.transition(PeriodStatus::InProgress, true).is_err());
        assert!(p.status().is_closed());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("closed".parse::<PeriodStatus>(), Ok(PeriodStatus::Closed));
        assert_eq!("In-Progress".parse::<PeriodStatus>(), Ok(PeriodStatus::InProgress));
        assert!("open".parse::<PeriodStatus>().is_err());
    }

    #[test]
    fn test_calculation_lifecycle() {
        use CalculationStatus::*;
        let status = Pending.transition(Computed).unwrap();
        let status = status.transition(Computed).unwrap();
        let status = status.transition(Verified).unwrap();
        let status = status.transition(Approved).unwrap();
        let status = status.transition(Sent).unwrap();
        let status = status.transition(Archived).unwrap();
        assert!(status.is_terminal());

        assert!(Pending.can_transition_to(Failed));
        assert!(Computed.can_transition_to(Failed));
        assert!(!Verified.can_transition_to(Failed));
        assert_eq!(Computed.fail(), Ok(Failed));
        assert!(Verified.fail().is_err());
        assert!(Failed.transition(Computed).is_err());
        assert!(Pending.transition(Approved).is_err());
    }
}
