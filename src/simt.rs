//! SIMT salary-transfer file.
//!
//! 400-byte records joined with CRLF: a header, an optional address record,
//! optional filler records, one operation per paid employee and a trailer.

use crate::calculation::Calculation;
use crate::company::CompanyBankInfo;
use crate::error::{FormatError, PeriodStateError, Result};
use crate::fixed_width::{join_records, split_lines, Field, FixedWidthRecord, RecordLayout, RecordWriter};
use crate::money::Money;
use crate::period::PayPeriod;
use crate::profile::Rib;
use crate::report::{Exclusion, ExclusionReason, RejectedRecord};
use chrono::NaiveDate;
use log::{debug, info, warn};

pub const RECORD_LEN: usize = 400;

/// Application code for salary transfers ("virement salaires").
pub const APPLICATION_CODE: &str = "VS";

pub const HEADER: RecordLayout = RecordLayout {
    name: "01",
    length: RECORD_LEN,
    fields: &[
        Field::text("type", 2),
        Field::text("application_code", 2),
        Field::digits("creation_date", 6),
        Field::digits("debit_account", 24),
        Field::text("company_name", 35),
        Field::text("batch_reference", 11),
        Field::text("currency", 3),
        Field::filler(317),
    ],
};

pub const ADDRESS: RecordLayout = RecordLayout {
    name: "02",
    length: RECORD_LEN,
    fields: &[
        Field::text("type", 2),
        Field::text("address", 120),
        Field::text("city", 20),
        Field::text("postal_code", 6),
        Field::filler(252),
    ],
};

pub const FILLER: RecordLayout = RecordLayout {
    name: "03",
    length: RECORD_LEN,
    fields: &[Field::text("type", 2), Field::filler(398)],
};

pub const OPERATION: RecordLayout = RecordLayout {
    name: "04",
    length: RECORD_LEN,
    fields: &[
        Field::text("type", 2),
        Field::count("sequence", 6),
        Field::digits("beneficiary_account", 24),
        Field::text("beneficiary_name", 35),
        Field::amount("amount", 16),
        Field::text("reference", 11),
        Field::digits("value_date", 6),
        Field::filler(300),
    ],
};

pub const TRAILER: RecordLayout = RecordLayout {
    name: "09",
    length: RECORD_LEN,
    fields: &[
        Field::text("type", 2),
        Field::count("operation_count", 6),
        Field::amount("total", 16),
        Field::filler(376),
    ],
};

const _: () = assert!(HEADER.is_consistent());
const _: () = assert!(ADDRESS.is_consistent());
const _: () = assert!(FILLER.is_consistent());
const _: () = assert!(OPERATION.is_consistent());
const _: () = assert!(TRAILER.is_consistent());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    pub creation_date: NaiveDate,
    /// Date the bank credits beneficiaries.
    pub value_date: NaiveDate,
    pub batch_reference: String,
    pub currency: String,
    /// Emit the company address record after the header.
    pub include_address: bool,
    /// Number of blank filler records before the operations.
    pub filler_records: usize,
}

impl TransferOptions {
    pub fn new(creation_date: NaiveDate, value_date: NaiveDate, batch_reference: impl Into<String>) -> Self {
        TransferOptions {
            creation_date,
            value_date,
            batch_reference: batch_reference.into(),
            currency: "MAD".to_string(),
            include_address: true,
            filler_records: 0,
        }
    }
}

/// An encoded transfer file for one company and period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferBatch {
    period: PayPeriod,
    bytes: Vec<u8>,
    pub operation_count: u64,
    pub total: Money,
    pub exclusions: Vec<Exclusion>,
    pub rejected: Vec<RejectedRecord>,
}

impl TransferBatch {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// `SIMT_VS_{MM}{YYYY}.smt`
    pub fn file_name(&self) -> String {
        format!(
            "SIMT_{}_{:02}{}.smt",
            APPLICATION_CODE,
            self.period.month(),
            self.period.year()
        )
    }
}

pub struct SimtTransferEncoder<'a> {
    company: &'a CompanyBankInfo,
    period: PayPeriod,
    options: TransferOptions,
}

impl<'a> SimtTransferEncoder<'a> {
    pub fn new(company: &'a CompanyBankInfo, period: PayPeriod, options: TransferOptions) -> Self {
        SimtTransferEncoder {
            company,
            period,
            options,
        }
    }

    /// Encodes one operation per employee with a valid RIB and a positive
    /// net payable, in input order.
    ///
    /// Fails outright if the period is not closed or the company metadata is
    /// unusable. Per-employee problems are reported on the batch.
    pub fn encode(&self, calculations: &[Calculation]) -> Result<TransferBatch> {
        if !self.period.status().is_closed() {
            return Err(PeriodStateError::NotClosed {
                period: self.period.to_string(),
                status: self.period.status().to_string(),
            }
            .into());
        }
        self.company.validate()?;
        let debit = self.company.debit_rib()?;

        let mut records = vec![self.header(&debit)?];
        if self.options.include_address {
            records.push(self.address()?);
        }
        for _ in 0..self.options.filler_records {
            let mut w = RecordWriter::new(&FILLER);
            w.text(FILLER.name)?;
            records.push(w.finish()?);
        }

        let mut exclusions = Vec::new();
        let mut rejected = Vec::new();
        let mut operation_count = 0u64;
        let mut total = Money::ZERO;

        for calculation in calculations {
            let rib = match beneficiary(calculation) {
                Ok(rib) => rib,
                Err(reason) => {
                    debug!("Excluding {} from transfer: {}", calculation.employee_id, reason);
                    exclusions.push(Exclusion {
                        employee_id: calculation.employee_id.clone(),
                        reason,
                    });
                    continue;
                }
            };

            match self.operation(operation_count + 1, &rib, calculation) {
                Ok(record) => {
                    operation_count += 1;
                    total += calculation.net_payable;
                    records.push(record);
                }
                Err(error) => {
                    warn!(
                        "Dropping transfer operation for employee {}: {}",
                        calculation.employee_id, error
                    );
                    rejected.push(RejectedRecord {
                        employee_id: calculation.employee_id.clone(),
                        error,
                    });
                }
            }
        }

        records.push(self.trailer(operation_count, total)?);

        info!(
            "SIMT transfer {}: {} operations totalling {}, {} excluded, {} rejected",
            self.period,
            operation_count,
            total,
            exclusions.len(),
            rejected.len()
        );

        Ok(TransferBatch {
            period: self.period,
            bytes: join_records(&records, b"\r\n"),
            operation_count,
            total,
            exclusions,
            rejected,
        })
    }

    fn header(&self, debit: &Rib) -> std::result::Result<FixedWidthRecord, FormatError> {
        let mut w = RecordWriter::new(&HEADER);
        w.text(HEADER.name)?;
        w.text(APPLICATION_CODE)?;
        w.digits(&self.options.creation_date.format("%d%m%y").to_string())?;
        w.digits(debit.as_str())?;
        w.text(&self.company.name)?;
        w.text(&self.options.batch_reference)?;
        w.text(&self.options.currency)?;
        w.finish()
    }

    fn address(&self) -> std::result::Result<FixedWidthRecord, FormatError> {
        let mut w = RecordWriter::new(&ADDRESS);
        w.text(ADDRESS.name)?;
        w.text(&self.company.address)?;
        w.text(&self.company.city)?;
        w.text(&self.company.postal_code)?;
        w.finish()
    }

    fn operation(
        &self,
        sequence: u64,
        rib: &Rib,
        calculation: &Calculation,
    ) -> std::result::Result<FixedWidthRecord, FormatError> {
        let mut w = RecordWriter::new(&OPERATION);
        w.text(OPERATION.name)?;
        w.count(sequence)?;
        w.digits(rib.as_str())?;
        w.text(&calculation.declared_name())?;
        w.amount(calculation.net_payable)?;
        w.text(&calculation.employee_id)?;
        w.digits(&self.options.value_date.format("%d%m%y").to_string())?;
        w.finish()
    }

    fn trailer(&self, count: u64, total: Money) -> std::result::Result<FixedWidthRecord, FormatError> {
        let mut w = RecordWriter::new(&TRAILER);
        w.text(TRAILER.name)?;
        w.count(count)?;
        w.amount(total)?;
        w.finish()
    }
}

fn beneficiary(calculation: &Calculation) -> std::result::Result<Rib, ExclusionReason> {
    let account = calculation
        .bank_account
        .as_deref()
        .ok_or(ExclusionReason::MissingAccount)?;
    let rib = Rib::parse(account).ok_or(ExclusionReason::InvalidAccount)?;
    if calculation.net_payable <= Money::ZERO {
        return Err(ExclusionReason::ZeroNetPay);
    }
    Ok(rib)
}

/// One decoded operation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOperation {
    pub sequence: u64,
    pub beneficiary_account: String,
    pub beneficiary_name: String,
    pub amount: Money,
    pub reference: String,
    pub value_date: String,
}

/// Decodes the operation records of a transfer file.
///
/// The trailer must be the last record and must agree with the operations
/// on both count and total.
pub fn parse_operations(bytes: &[u8]) -> std::result::Result<Vec<TransferOperation>, FormatError> {
    let lines = split_lines(bytes);
    let Some((last, body)) = lines.split_last() else {
        return Err(FormatError::LayoutMismatch {
            record: TRAILER.name,
            message: "empty transfer file".to_string(),
        });
    };

    let mut operations = Vec::new();
    for line in body {
        if !line.starts_with(OPERATION.name.as_bytes()) {
            continue;
        }
        let record = FixedWidthRecord::parse(&OPERATION, line)?;
        operations.push(TransferOperation {
            sequence: record.number("sequence")?,
            beneficiary_account: text(&record, "beneficiary_account"),
            beneficiary_name: text(&record, "beneficiary_name"),
            amount: amount(&record, "amount")?,
            reference: text(&record, "reference"),
            value_date: text(&record, "value_date"),
        });
    }

    let trailer = FixedWidthRecord::parse(&TRAILER, last)?;
    if !last.starts_with(TRAILER.name.as_bytes()) {
        return Err(FormatError::LayoutMismatch {
            record: TRAILER.name,
            message: "last record is not a trailer".to_string(),
        });
    }
    let count = trailer.number("operation_count")?;
    let total = amount(&trailer, "total")?;
    let sum: Money = operations.iter().map(|op| op.amount).sum();
    if count != operations.len() as u64 || total != sum {
        return Err(FormatError::LayoutMismatch {
            record: TRAILER.name,
            message: format!(
                "trailer declares {} operations totalling {}, found {} totalling {}",
                count,
                total,
                operations.len(),
                sum
            ),
        });
    }
    Ok(operations)
}

fn text(record: &FixedWidthRecord, name: &str) -> String {
    record
        .field(name)
        .map(|value| value.trim_end().to_string())
        .unwrap_or_default()
}

fn amount(record: &FixedWidthRecord, name: &'static str) -> std::result::Result<Money, FormatError> {
    let centimes = record.number(name)?;
    i64::try_from(centimes)
        .map(Money::from_centimes)
        .map_err(|_| FormatError::Overflow {
            field: name,
            value: centimes.to_string(),
            width: 16,
        })
}
