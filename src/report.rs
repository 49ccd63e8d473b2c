//! Per-employee outcomes that are reported instead of failing a batch.

use crate::error::{FormatError, ValidationError};
use crate::period::CalculationStatus;
use serde::Serialize;
use std::fmt;

/// Why an employee was left out of an encoded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusionReason {
    /// Non-salaried profile; not declared to CNSS.
    Freelance,
    MissingAccount,
    /// Account present but not a 24-digit RIB.
    InvalidAccount,
    ZeroNetPay,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExclusionReason::Freelance => "freelance profile",
            ExclusionReason::MissingAccount => "missing bank account",
            ExclusionReason::InvalidAccount => "invalid bank account",
            ExclusionReason::ZeroNetPay => "zero net pay",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    pub employee_id: String,
    pub reason: ExclusionReason,
}

/// A record that could not be encoded and was dropped from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub employee_id: String,
    pub error: FormatError,
}

/// An employee whose data could not be ingested or computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// CSV row number (1-based, header included), when read from a file.
    pub row: Option<usize>,
    pub employee_id: Option<String>,
    /// Always `Failed`.
    pub status: CalculationStatus,
    pub error: ValidationError,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.row, &self.employee_id) {
            (Some(row), Some(id)) => write!(f, "row {} ({}): {}", row, id, self.error),
            (Some(row), None) => write!(f, "row {}: {}", row, self.error),
            (None, Some(id)) => write!(f, "{}: {}", id, self.error),
            (None, None) => write!(f, "{}", self.error),
        }
    }
}
