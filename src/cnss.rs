//! CNSS pre-established declaration file (AFFEBDS).
//!
//! One A00 (file nature), one A01 (company header), one A02 per salaried
//! employee in ascending insurance-number order, and one A03 summary. Every
//! record is 260 bytes; records are joined with a bare line feed.

use crate::calculation::Calculation;
use crate::company::CompanyBankInfo;
use crate::error::{FormatError, Result, TransitionError};
use crate::fixed_width::{join_records, split_lines, Field, FixedWidthRecord, RecordLayout, RecordWriter};
use crate::money::Money;
use crate::period::PayPeriod;
use crate::report::{Exclusion, ExclusionReason, RejectedRecord};
use crate::tables;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::fmt;

pub const RECORD_LEN: usize = 260;

pub const A00: RecordLayout = RecordLayout {
    name: "A00",
    length: RECORD_LEN,
    fields: &[
        Field::text("type", 3),
        Field::digits("transfer_reference", 14),
        Field::text("category", 2),
        Field::filler(241),
    ],
};

pub const A01: RecordLayout = RecordLayout {
    name: "A01",
    length: RECORD_LEN,
    fields: &[
        Field::text("type", 3),
        Field::digits("affiliation_number", 7),
        Field::digits("period", 6),
        Field::text("company_name", 40),
        Field::text("activity", 40),
        Field::text("address", 120),
        Field::text("city", 20),
        Field::text("postal_code", 6),
        Field::digits("agency_code", 2),
        Field::digits("issue_date", 8),
        Field::digits("due_date", 8),
    ],
};

pub const A02: RecordLayout = RecordLayout {
    name: "A02",
    length: RECORD_LEN,
    fields: &[
        Field::text("type", 3),
        Field::digits("affiliation_number", 7),
        Field::digits("period", 6),
        Field::digits("insurance_number", 9),
        Field::text("name", 60),
        Field::count("dependents", 2),
        Field::amount("allowance_due", 6),
        Field::amount("allowance_deducted", 6),
        Field::amount("allowance_net", 6),
        Field::filler(155),
    ],
};

pub const A03: RecordLayout = RecordLayout {
    name: "A03",
    length: RECORD_LEN,
    fields: &[
        Field::text("type", 3),
        Field::digits("affiliation_number", 7),
        Field::digits("period", 6),
        Field::count("employee_count", 6),
        Field::count("dependents_total", 6),
        Field::amount("total_due", 12),
        Field::amount("total_deducted", 12),
        Field::amount("total_net", 12),
        Field::digits("checksum", 15),
        Field::filler(181),
    ],
};

const _: () = assert!(A00.is_consistent());
const _: () = assert!(A01.is_consistent());
const _: () = assert!(A02.is_consistent());
const _: () = assert!(A03.is_consistent());

/// Per-file values that are not company metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationOptions {
    /// 14-digit transfer identifier assigned by the CNSS portal.
    pub transfer_reference: String,
    /// Two-character declaration category.
    pub category: String,
    pub issue_date: NaiveDate,
}

impl DeclarationOptions {
    pub fn new(transfer_reference: impl Into<String>, issue_date: NaiveDate) -> Self {
        DeclarationOptions {
            transfer_reference: transfer_reference.into(),
            category: "A0".to_string(),
            issue_date,
        }
    }
}

/// Lifecycle of a declaration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationStatus {
    Draft,
    Validated,
    Sent,
    Accepted,
    Rejected,
}

impl fmt::Display for DeclarationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclarationStatus::Draft => "draft",
            DeclarationStatus::Validated => "validated",
            DeclarationStatus::Sent => "sent",
            DeclarationStatus::Accepted => "accepted",
            DeclarationStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Totals carried by the A03 record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeclarationTotals {
    pub employee_count: u64,
    pub dependents: u64,
    pub due: Money,
    pub deducted: Money,
    pub net: Money,
    /// Sum of all declared insurance numbers, low-order 15 digits.
    pub checksum: u64,
}

/// An encoded declaration for one company and period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationFile {
    affiliation_number: String,
    period: PayPeriod,
    bytes: Vec<u8>,
    status: DeclarationStatus,
    pub totals: DeclarationTotals,
    pub exclusions: Vec<Exclusion>,
    pub rejected: Vec<RejectedRecord>,
}

impl DeclarationFile {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn status(&self) -> DeclarationStatus {
        self.status
    }

    /// `AFFEBDS_{affiliation}_{YYYYMM}.txt`, affiliation zero-filled to 7 digits.
    pub fn file_name(&self) -> String {
        format!(
            "AFFEBDS_{:0>7}_{}.txt",
            self.affiliation_number.trim(),
            self.period.label()
        )
    }

    /// Re-parses the encoded bytes and checks structure and totals, then
    /// moves the file from draft to validated.
    pub fn validate(&mut self) -> Result<()> {
        let parsed = parse_declaration(&self.bytes)?;
        parsed.verify()?;
        if parsed.totals != self.totals {
            return Err(FormatError::LayoutMismatch {
                record: "A03",
                message: "summary does not match the encoded totals".to_string(),
            }
            .into());
        }
        self.transition(DeclarationStatus::Validated)?;
        Ok(())
    }

    /// Applies a lifecycle transition: draft → validated → sent →
    /// accepted or rejected.
    pub fn transition(&mut self, to: DeclarationStatus) -> std::result::Result<(), TransitionError> {
        use DeclarationStatus::*;
        let allowed = matches!(
            (self.status, to),
            (Draft, Validated) | (Validated, Sent) | (Sent, Accepted) | (Sent, Rejected)
        );
        if !allowed {
            return Err(TransitionError {
                entity: "declaration",
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Builds the CNSS declaration for one company and period.
pub struct CnssDeclarationEncoder<'a> {
    company: &'a CompanyBankInfo,
    period: PayPeriod,
    options: DeclarationOptions,
}

impl<'a> CnssDeclarationEncoder<'a> {
    pub fn new(company: &'a CompanyBankInfo, period: PayPeriod, options: DeclarationOptions) -> Self {
        CnssDeclarationEncoder {
            company,
            period,
            options,
        }
    }

    /// Encodes the declaration.
    ///
    /// Freelance profiles are excluded up front. An employee whose A02
    /// record cannot be encoded is dropped and reported; the summary only
    /// counts records actually written. Header and summary failures are
    /// fatal.
    pub fn encode(&self, calculations: &[Calculation]) -> Result<DeclarationFile> {
        self.company.validate()?;

        let mut exclusions = Vec::new();
        let mut declared: Vec<&Calculation> = Vec::with_capacity(calculations.len());
        for calculation in calculations {
            if calculation.contract_type.is_salaried() {
                declared.push(calculation);
            } else {
                debug!("Excluding {} from CNSS declaration: freelance", calculation.employee_id);
                exclusions.push(Exclusion {
                    employee_id: calculation.employee_id.clone(),
                    reason: ExclusionReason::Freelance,
                });
            }
        }
        declared.sort_by(|a, b| {
            a.insurance_number
                .cmp(&b.insurance_number)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });

        let mut records = vec![self.a00()?, self.a01()?];
        let mut rejected = Vec::new();
        let mut totals = DeclarationTotals::default();
        let mut checksum: u128 = 0;

        for calculation in declared {
            let due = tables::family_allowance(calculation.dependents);
            let deducted = calculation.family_allowance_withheld;
            let net = due - deducted;

            match self.a02(calculation, due, deducted, net) {
                Ok(record) => {
                    totals.employee_count += 1;
                    totals.dependents += u64::from(calculation.dependents);
                    totals.due += due;
                    totals.deducted += deducted;
                    totals.net += net;
                    checksum += u128::from(calculation.insurance_number.value());
                    records.push(record);
                }
                Err(error) => {
                    warn!(
                        "Dropping A02 record for employee {}: {}",
                        calculation.employee_id, error
                    );
                    rejected.push(RejectedRecord {
                        employee_id: calculation.employee_id.clone(),
                        error,
                    });
                }
            }
        }

        let checksum_digits = low_order_digits(checksum, 15);
        totals.checksum = checksum_digits.parse().unwrap_or(0);
        records.push(self.a03(&totals, &checksum_digits)?);

        info!(
            "CNSS declaration {}: {} employees, {} excluded, {} rejected",
            self.period,
            totals.employee_count,
            exclusions.len(),
            rejected.len()
        );

        Ok(DeclarationFile {
            affiliation_number: self.company.affiliation_number.clone(),
            period: self.period,
            bytes: join_records(&records, b"\n"),
            status: DeclarationStatus::Draft,
            totals,
            exclusions,
            rejected,
        })
    }

    fn a00(&self) -> std::result::Result<FixedWidthRecord, FormatError> {
        let mut w = RecordWriter::new(&A00);
        w.text("A00")?;
        w.digits(&self.options.transfer_reference)?;
        w.text(&self.options.category)?;
        w.finish()
    }

    fn a01(&self) -> std::result::Result<FixedWidthRecord, FormatError> {
        let company = self.company;
        let mut w = RecordWriter::new(&A01);
        w.text("A01")?;
        w.digits(&company.affiliation_number)?;
        w.digits(&self.period.label())?;
        w.text(&company.name)?;
        w.text(&company.activity)?;
        w.text(&company.address)?;
        w.text(&company.city)?;
        w.text(&company.postal_code)?;
        w.digits(&company.agency_code)?;
        w.digits(&self.options.issue_date.format("%Y%m%d").to_string())?;
        w.digits(&self.period.due_date().format("%Y%m%d").to_string())?;
        w.finish()
    }

    fn a02(
        &self,
        calculation: &Calculation,
        due: Money,
        deducted: Money,
        net: Money,
    ) -> std::result::Result<FixedWidthRecord, FormatError> {
        let mut w = RecordWriter::new(&A02);
        w.text("A02")?;
        w.digits(&self.company.affiliation_number)?;
        w.digits(&self.period.label())?;
        w.digits(calculation.insurance_number.as_str())?;
        w.text(&calculation.declared_name())?;
        w.count(u64::from(calculation.dependents))?;
        w.amount(due)?;
        w.amount(deducted)?;
        w.amount(net)?;
        w.finish()
    }

    fn a03(
        &self,
        totals: &DeclarationTotals,
        checksum: &str,
    ) -> std::result::Result<FixedWidthRecord, FormatError> {
        let mut w = RecordWriter::new(&A03);
        w.text("A03")?;
        w.digits(&self.company.affiliation_number)?;
        w.digits(&self.period.label())?;
        w.count(totals.employee_count)?;
        w.count(totals.dependents)?;
        w.amount(totals.due)?;
        w.amount(totals.deducted)?;
        w.amount(totals.net)?;
        w.digits(checksum)?;
        w.finish()
    }
}

fn low_order_digits(value: u128, width: usize) -> String {
    let digits = value.to_string();
    digits[digits.len().saturating_sub(width)..].to_string()
}

/// One decoded A02 record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationDetail {
    pub insurance_number: String,
    pub name: String,
    pub dependents: u64,
    pub allowance_due: Money,
    pub allowance_deducted: Money,
    pub allowance_net: Money,
}

/// A declaration file decoded back into its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeclaration {
    pub transfer_reference: String,
    pub affiliation_number: String,
    pub period: String,
    pub company_name: String,
    pub due_date: String,
    pub details: Vec<DeclarationDetail>,
    pub totals: DeclarationTotals,
}

impl ParsedDeclaration {
    /// Checks that the summary matches the detail records.
    pub fn verify(&self) -> std::result::Result<(), FormatError> {
        let mut expected = DeclarationTotals {
            employee_count: self.details.len() as u64,
            ..DeclarationTotals::default()
        };
        let mut checksum: u128 = 0;
        for detail in &self.details {
            expected.dependents += detail.dependents;
            expected.due += detail.allowance_due;
            expected.deducted += detail.allowance_deducted;
            expected.net += detail.allowance_net;
            checksum += detail.insurance_number.parse::<u128>().unwrap_or(0);
        }
        expected.checksum = low_order_digits(checksum, 15).parse().unwrap_or(0);

        if expected != self.totals {
            return Err(FormatError::LayoutMismatch {
                record: "A03",
                message: format!(
                    "summary {:?} does not match details {:?}",
                    self.totals, expected
                ),
            });
        }
        Ok(())
    }
}

/// Decodes a declaration file using the record layouts.
pub fn parse_declaration(bytes: &[u8]) -> std::result::Result<ParsedDeclaration, FormatError> {
    let lines = split_lines(bytes);
    if lines.len() < 3 {
        return Err(FormatError::LayoutMismatch {
            record: "A00",
            message: format!("expected at least 3 records, found {}", lines.len()),
        });
    }

    let a00 = record_of(&A00, lines[0])?;
    let a01 = record_of(&A01, lines[1])?;
    let a03 = record_of(&A03, lines[lines.len() - 1])?;

    let mut details = Vec::with_capacity(lines.len() - 3);
    for line in &lines[2..lines.len() - 1] {
        let record = record_of(&A02, line)?;
        details.push(DeclarationDetail {
            insurance_number: text(&record, "insurance_number"),
            name: text(&record, "name"),
            dependents: record.number("dependents")?,
            allowance_due: amount(&record, "allowance_due")?,
            allowance_deducted: amount(&record, "allowance_deducted")?,
            allowance_net: amount(&record, "allowance_net")?,
        });
    }

    Ok(ParsedDeclaration {
        transfer_reference: text(&a00, "transfer_reference"),
        affiliation_number: text(&a01, "affiliation_number"),
        period: text(&a01, "period"),
        company_name: text(&a01, "company_name"),
        due_date: text(&a01, "due_date"),
        details,
        totals: DeclarationTotals {
            employee_count: a03.number("employee_count")?,
            dependents: a03.number("dependents_total")?,
            due: amount(&a03, "total_due")?,
            deducted: amount(&a03, "total_deducted")?,
            net: amount(&a03, "total_net")?,
            checksum: a03.number("checksum")?,
        },
    })
}

fn record_of(
    layout: &'static RecordLayout,
    line: &[u8],
) -> std::result::Result<FixedWidthRecord, FormatError> {
    let record = FixedWidthRecord::parse(layout, line)?;
    if record.field("type").as_deref() != Some(layout.name) {
        return Err(FormatError::LayoutMismatch {
            record: layout.name,
            message: format!("unexpected record type {:?}", record.field("type")),
        });
    }
    Ok(record)
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
            width: 18,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute;
    use crate::period::PeriodStatus;
    use crate::profile::EmployeeRecord;

    fn company() -> CompanyBankInfo {
        CompanyBankInfo {
            name: "Atlas Textiles SARL".to_string(),
            activity: "Textile".to_string(),
            address: "12 Rue Ibn Batouta".to_string(),
            city: "Casablanca".to_string(),
            postal_code: "20250".to_string(),
            affiliation_number: "12345".to_string(),
            agency_code: "5".to_string(),
            debit_account: "007780000123456789012345".to_string(),
        }
    }

    fn period() -> PayPeriod {
        PayPeriod::new(2024, 3, PeriodStatus::Closed).unwrap()
    }

    fn options() -> DeclarationOptions {
        DeclarationOptions::new("20240300000042", NaiveDate::from_ymd_opt(2024, 4, 2).unwrap())
    }

    fn calc(id: &str, insurance: &str, dependents: &str, contract: &str) -> Calculation {
        let record = EmployeeRecord {
            id: Some(id.to_string()),
            insurance_number: Some(insurance.to_string()),
            national_id: Some("X1".to_string()),
            last_name: Some("Alaoui".to_string()),
            first_name: Some("Samir".to_string()),
            hire_date: Some("2015-01-01".to_string()),
            dependents: Some(dependents.to_string()),
            base_salary: Some("7000".to_string()),
            contract_type: Some(contract.to_string()),
            ..EmployeeRecord::default()
        };
        compute(&record.parse().unwrap(), &period()).unwrap()
    }

    fn lines(file: &DeclarationFile) -> Vec<&[u8]> {
        split_lines(file.as_bytes())
    }

    #[test]
    fn test_layout_offsets() {
        assert_eq!(A01.span_of("company_name"), Some((16, 40)));
        assert_eq!(A01.span_of("due_date"), Some((252, 8)));
        assert_eq!(A02.span_of("insurance_number"), Some((16, 9)));
        assert_eq!(A02.span_of("name"), Some((25, 60)));
        assert_eq!(A02.span_of("allowance_net"), Some((99, 6)));
        assert_eq!(A03.span_of("checksum"), Some((64, 15)));
    }

    #[test]
    fn test_every_line_is_260_bytes_and_lf_joined() {
        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder
            .encode(&[calc("E1", "200000002", "2", "permanent"), calc("E2", "100000001", "0", "cdd")])
            .unwrap();

        assert!(!file.as_bytes().contains(&b'\r'));
        let lines = lines(&file);
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|line| line.len() == RECORD_LEN));
        assert_eq!(&lines[0][..3], b"A00");
        assert_eq!(&lines[1][..3], b"A01");
        assert_eq!(&lines[2][..3], b"A02");
        assert_eq!(&lines[4][..3], b"A03");
    }

    #[test]
    fn test_header_records() {
        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder.encode(&[]).unwrap();
        let lines = lines(&file);

        let a00 = std::str::from_utf8(lines[0]).unwrap();
        assert_eq!(&a00[..19], "A0020240300000042A0");
        assert!(a00[19..].bytes().all(|b| b == b' '));

        let a01 = std::str::from_utf8(lines[1]).unwrap();
        assert_eq!(&a01[3..10], "0012345");
        assert_eq!(&a01[10..16], "202403");
        assert_eq!(a01[16..56].trim_end(), "Atlas Textiles SARL");
        assert_eq!(&a01[242..244], "05");
        assert_eq!(&a01[244..252], "20240402");
        assert_eq!(&a01[252..260], "20240420");
    }

    #[test]
    fn test_details_sorted_by_insurance_number() {
        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder
            .encode(&[
                calc("E3", "300000003", "0", "permanent"),
                calc("E1", "100000001", "0", "permanent"),
                calc("E2", "200000002", "0", "permanent"),
            ])
            .unwrap();
        let parsed = parse_declaration(file.as_bytes()).unwrap();
        let numbers: Vec<&str> = parsed
            .details
            .iter()
            .map(|d| d.insurance_number.as_str())
            .collect();
        assert_eq!(numbers, ["100000001", "200000002", "300000003"]);
    }

    #[test]
    fn test_freelancers_are_excluded_entirely() {
        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder
            .encode(&[
                calc("E1", "100000001", "2", "permanent"),
                calc("F1", "900000009", "4", "freelance"),
            ])
            .unwrap();

        assert_eq!(
            file.exclusions,
            vec![Exclusion {
                employee_id: "F1".to_string(),
                reason: ExclusionReason::Freelance
            }]
        );
        assert_eq!(file.totals.employee_count, 1);
        assert_eq!(file.totals.dependents, 2);
        assert_eq!(file.totals.checksum, 100000001);
        assert_eq!(lines(&file).len(), 4);
    }

    #[test]
    fn test_family_allowance_amounts_and_totals() {
        let mut withheld = calc("E2", "200000002", "5", "permanent");
        withheld.family_allowance_withheld = Money::from_units(100);

        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder
            .encode(&[calc("E1", "100000001", "2", "permanent"), withheld])
            .unwrap();
        let parsed = parse_declaration(file.as_bytes()).unwrap();

        assert_eq!(parsed.details[0].allowance_due, Money::from_units(600));
        assert_eq!(parsed.details[0].allowance_net, Money::from_units(600));
        // 3 * 300 + 2 * 36
        assert_eq!(parsed.details[1].allowance_due, Money::from_units(972));
        assert_eq!(parsed.details[1].allowance_deducted, Money::from_units(100));
        assert_eq!(parsed.details[1].allowance_net, Money::from_units(872));

        assert_eq!(parsed.totals.due, Money::from_units(1572));
        assert_eq!(parsed.totals.deducted, Money::from_units(100));
        assert_eq!(parsed.totals.net, Money::from_units(1472));
        assert_eq!(parsed.totals.dependents, 7);
        assert_eq!(parsed.totals, file.totals);
        parsed.verify().unwrap();
    }

    #[test]
    fn test_empty_declaration_has_zero_summary() {
        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder.encode(&[]).unwrap();
        assert_eq!(lines(&file).len(), 3);
        assert_eq!(file.totals, DeclarationTotals::default());

        let a03 = std::str::from_utf8(lines(&file)[2]).unwrap();
        assert_eq!(&a03[16..79], "0".repeat(63));
    }

    #[test]
    fn test_checksum_keeps_low_order_fifteen_digits() {
        assert_eq!(low_order_digits(1_234_567_890_123_456_789, 15), "567890123456789");
        assert_eq!(low_order_digits(42, 15), "42");
    }

    #[test]
    fn test_overdrawn_allowance_rejects_only_that_record() {
        let mut bad = calc("E2", "200000002", "1", "permanent");
        bad.family_allowance_withheld = Money::from_units(400);

        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder
            .encode(&[calc("E1", "100000001", "1", "permanent"), bad])
            .unwrap();

        assert_eq!(file.rejected.len(), 1);
        assert_eq!(file.rejected[0].employee_id, "E2");
        assert!(matches!(
            file.rejected[0].error,
            FormatError::NegativeAmount { field: "allowance_net", .. }
        ));
        assert_eq!(file.totals.employee_count, 1);
        assert_eq!(file.totals.due, Money::from_units(300));
    }

    #[test]
    fn test_oversized_withholding_is_rejected_as_negative_net() {
        let mut bad = calc("E2", "200000002", "1", "permanent");
        bad.family_allowance_withheld = Money::from_centimes(1_234_567);

        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder
            .encode(&[calc("E1", "100000001", "1", "permanent"), bad])
            .unwrap();

        assert_eq!(file.rejected.len(), 1);
        assert!(matches!(
            file.rejected[0].error,
            FormatError::NegativeAmount { field: "allowance_net", .. }
        ));
        assert_eq!(file.totals.employee_count, 1);
    }

    #[test]
    fn test_long_names_are_truncated_and_uppercased() {
        let mut long = calc("E1", "100000001", "0", "permanent");
        long.last_name = "El Idrissi".to_string();
        long.first_name = "Mohammed Amine ".repeat(6);

        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder.encode(&[long]).unwrap();
        let parsed = parse_declaration(file.as_bytes()).unwrap();
        assert_eq!(parsed.details[0].name.chars().count(), 60);
        assert!(parsed.details[0].name.starts_with("EL IDRISSI MOHAMMED AMINE MOHAMMED"));
    }

    #[test]
    fn test_file_name_and_lifecycle() {
        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let mut file = encoder.encode(&[calc("E1", "100000001", "1", "permanent")]).unwrap();
        assert_eq!(file.file_name(), "AFFEBDS_0012345_202403.txt");

        assert_eq!(file.status(), DeclarationStatus::Draft);
        assert!(file.transition(DeclarationStatus::Sent).is_err());
        file.validate().unwrap();
        assert_eq!(file.status(), DeclarationStatus::Validated);
        file.transition(DeclarationStatus::Sent).unwrap();
        file.transition(DeclarationStatus::Rejected).unwrap();
        assert!(file.transition(DeclarationStatus::Accepted).is_err());
    }

    #[test]
    fn test_parse_rejects_tampered_summary() {
        let company = company();
        let encoder = CnssDeclarationEncoder::new(&company, period(), options());
        let file = encoder.encode(&[calc("E1", "100000001", "1", "permanent")]).unwrap();
        let mut bytes = file.into_bytes();
        let a03_start = bytes.len() - RECORD_LEN;
        // employee_count field starts at offset 16 of A03
        bytes[a03_start + 21] = b'2';
        let parsed = parse_declaration(&bytes).unwrap();
        assert!(parsed.verify().is_err());
    }

    #[test]
    fn test_invalid_company_is_fatal() {
        let mut bad = company();
        bad.affiliation_number = String::new();
        let encoder = CnssDeclarationEncoder::new(&bad, period(), options());
        assert!(encoder.encode(&[]).is_err());
    }
}
