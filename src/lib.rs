//! # Moroccan Payroll Engine
//!
//! Computes monthly net pay under Moroccan labour and tax rules and encodes
//! the results into the two regulator file formats: the CNSS
//! pre-established declaration and the SIMT salary-transfer file.
//!
//! ## Design Principles
//!
//! - **Integer centimes**: every amount is a [`Money`]; rates go through
//!   `rust_decimal` and each component is rounded half away from zero once
//! - **Collect, don't abort**: one bad employee never blocks the period;
//!   failures, exclusions and rejected records are returned to the caller
//! - **Declarative layouts**: fixed-width records are `const` field tables
//!   checked against their declared length at compile time
//! - **Deterministic output**: CNSS details sorted by insurance number, SIMT
//!   operations in input order
//!
//! ## Example
//!
//! ```no_run
//! use moroccan_payroll::{PayPeriod, PayrollEngine, PeriodStatus};
//! use std::io::Cursor;
//!
//! let csv = "id,insurance_number,national_id,last_name,first_name,hire_date,base_salary\n\
//!            E1,123456789,BE1,Alaoui,Samir,2015-01-01,7000\n";
//! let mut engine = PayrollEngine::new();
//! engine.process_csv(Cursor::new(csv)).unwrap();
//! let period = PayPeriod::parse("2024-03", PeriodStatus::Closed).unwrap();
//! engine.run(&period).write_output(std::io::stdout()).unwrap();
//! ```

pub mod calculation;
pub mod cnss;
pub mod company;
pub mod contributions;
pub mod engine;
pub mod error;
pub mod fixed_width;
pub mod income_tax;
pub mod money;
pub mod period;
pub mod profile;
pub mod report;
pub mod seniority;
pub mod simt;
pub mod tables;

pub use calculation::Calculation;
pub use cnss::{CnssDeclarationEncoder, DeclarationFile, DeclarationOptions, DeclarationStatus};
pub use company::CompanyBankInfo;
pub use engine::{compute, PayrollEngine, PayrollRun};
pub use error::{FormatError, PayrollError, PeriodStateError, Result, ValidationError};
pub use fixed_width::{FixedWidthRecord, RecordLayout};
pub use money::Money;
pub use period::{CalculationStatus, PayPeriod, PeriodStatus};
pub use profile::{ContractType, EmployeePayrollProfile, EmployeeRecord, InsuranceNumber, Rib};
pub use report::{Exclusion, ExclusionReason, RejectedRecord, ValidationFailure};
pub use simt::{SimtTransferEncoder, TransferBatch, TransferOptions};
