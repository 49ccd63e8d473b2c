//! Error types for the payroll engine.
//!
//! Validation and format errors are recoverable: they reject one employee or
//! one record and are collected into the batch report. Period state errors
//! abort the whole operation.

use crate::money::Money;
use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, PayrollError>;

/// Errors that can occur during engine operation.
#[derive(Error, Debug)]
pub enum PayrollError {
    /// Failed to open, read or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Company metadata could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input data failed validation
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A file-level field could not be encoded
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// The pay period is not in a state that allows the operation
    #[error("period state error: {0}")]
    PeriodState(#[from] PeriodStateError),

    /// A lifecycle transition was rejected
    #[error("invalid transition: {0}")]
    Transition(#[from] TransitionError),
}

/// Rejects a single employee's data. Never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must not be negative (got {value})")]
    NegativeAmount { field: &'static str, value: String },

    #[error("field `{field}` amount {value} exceeds the maximum of {max}")]
    AmountOutOfRange {
        field: &'static str,
        value: Money,
        max: Money,
    },

    #[error("field `{field}` is not a valid amount: {value:?}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("insurance number must be exactly 9 digits, got {0:?}")]
    InvalidInsuranceNumber(String),

    #[error("field `{field}` is not a valid YYYY-MM-DD date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("dependent count must not be negative (got {0})")]
    NegativeDependents(i64),

    #[error("dependent count {count} exceeds the maximum of {max}")]
    TooManyDependents { count: i64, max: u8 },

    #[error("hire date {hire_date} is after the period end {period_end}")]
    HireDateAfterPeriodEnd {
        hire_date: NaiveDate,
        period_end: NaiveDate,
    },

    #[error("month must be between 1 and 12 (got {0})")]
    InvalidMonth(u32),

    #[error("unknown contract type {0:?}")]
    UnknownContractType(String),

    #[error("unknown marital status {0:?}")]
    UnknownMaritalStatus(String),

    #[error("employee {0} appears more than once")]
    DuplicateEmployee(String),

    #[error("malformed CSV row: {0}")]
    MalformedRow(String),

    #[error("company field `{field}` is invalid: {reason}")]
    InvalidCompanyField { field: &'static str, reason: String },
}

/// A field could not be laid out in a fixed-width record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("field `{field}` value {value} does not fit in {width} digits")]
    Overflow {
        field: &'static str,
        value: String,
        width: usize,
    },

    #[error("required numeric field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("field `{field}` cannot hold a negative amount ({value})")]
    NegativeAmount { field: &'static str, value: String },

    #[error("field `{field}` must be numeric, got {value:?}")]
    NonNumeric { field: &'static str, value: String },

    #[error("record {record}: {message}")]
    LayoutMismatch {
        record: &'static str,
        message: String,
    },
}

/// The period does not allow the requested operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodStateError {
    #[error("period {period} is {status}; transfer batches require a closed period")]
    NotClosed { period: String, status: String },
}

/// A lifecycle state machine rejected a transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{entity}: cannot move from {from} to {to}")]
pub struct TransitionError {
    pub entity: &'static str,
    pub from: String,
    pub to: String,
}
