//! Fixed-width record formatting.
//!
//! Record types are described by a static [`RecordLayout`]: an ordered table
//! of named fields with their width and kind. Layout totals are checked at
//! compile time with [`RecordLayout::is_consistent`], so a field table that
//! does not add up to the mandated record size fails the build.
//!
//! Truncation policy: every field silently truncates a value that is too
//! long. Text loses its tail; identifiers, amounts and counts lose their
//! leading digits. Only empty, non-numeric or negative values are errors.

use crate::error::FormatError;
use crate::money::Money;
use log::debug;
use rust_decimal::Decimal;

/// Which side of the field the value sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Pad on the right, truncate excess from the right.
    Left,
    /// Pad on the left, truncate excess from the left.
    Right,
}

/// Pads or truncates `value` to exactly `length` characters.
///
/// ```
/// use moroccan_payroll::fixed_width::{format_field, Align};
///
/// assert_eq!(format_field("AB", 4, Align::Left, ' '), "AB  ");
/// assert_eq!(format_field("42", 5, Align::Right, '0'), "00042");
/// assert_eq!(format_field("ABCDEF", 3, Align::Left, ' '), "ABC");
/// assert_eq!(format_field("123456", 3, Align::Right, '0'), "456");
/// ```
pub fn format_field(value: &str, length: usize, align: Align, fill: char) -> String {
    let chars: Vec<char> = value.chars().collect();
    let count = chars.len();

    if count >= length {
        return match align {
            Align::Left => chars[..length].iter().collect(),
            Align::Right => chars[count - length..].iter().collect(),
        };
    }

    let padding: String = std::iter::repeat(fill).take(length - count).collect();
    match align {
        Align::Left => format!("{}{}", value, padding),
        Align::Right => format!("{}{}", padding, value),
    }
}

/// Converts a dirham amount to centimes for an unsigned field.
///
/// Rounds half away from zero. Negative amounts are rejected.
pub fn amount_to_minor_units(field: &'static str, amount: Decimal) -> Result<u64, FormatError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(FormatError::NegativeAmount {
            field,
            value: amount.to_string(),
        });
    }
    Money::from_decimal(amount)
        .and_then(|money| u64::try_from(money.centimes()).ok())
        .ok_or_else(|| FormatError::Overflow {
            field,
            value: amount.to_string(),
            width: 19,
        })
}

/// How a field is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Left-aligned, space-filled, truncated on the right.
    Text,
    /// Numeric identifier: right-aligned, zero-filled, truncated on the left.
    Digits,
    /// Unsigned centime amount: right-aligned, zero-filled, truncated on the left.
    Amount,
    /// Unsigned count: right-aligned, zero-filled, truncated on the left.
    Count,
    /// Spaces.
    Filler,
}

/// One named field in a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub len: usize,
    pub kind: FieldKind,
}

impl Field {
    pub const fn text(name: &'static str, len: usize) -> Self {
        Field {
            name,
            len,
            kind: FieldKind::Text,
        }
    }

    pub const fn digits(name: &'static str, len: usize) -> Self {
        Field {
            name,
            len,
            kind: FieldKind::Digits,
        }
    }

    pub const fn amount(name: &'static str, len: usize) -> Self {
        Field {
            name,
            len,
            kind: FieldKind::Amount,
        }
    }

    pub const fn count(name: &'static str, len: usize) -> Self {
        Field {
            name,
            len,
            kind: FieldKind::Count,
        }
    }

    pub const fn filler(len: usize) -> Self {
        Field {
            name: "filler",
            len,
            kind: FieldKind::Filler,
        }
    }
}

/// Declarative description of one record type.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordLayout {
    pub name: &'static str,
    pub length: usize,
    pub fields: &'static [Field],
}

impl RecordLayout {
    /// Sum of all field widths.
    pub const fn declared_len(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].len;
            i += 1;
        }
        total
    }

    /// `true` when the field widths add up to the mandated record length.
    pub const fn is_consistent(&self) -> bool {
        self.declared_len() == self.length
    }

    /// Byte offset and width of the named field.
    pub fn span_of(&self, name: &str) -> Option<(usize, usize)> {
        let mut offset = 0;
        for field in self.fields {
            if field.name == name {
                return Some((offset, field.len));
            }
            offset += field.len;
        }
        None
    }
}

/// An immutable, exact-length record encoded as Latin-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWidthRecord {
    layout: &'static RecordLayout,
    bytes: Vec<u8>,
}

impl FixedWidthRecord {
    /// Wraps an existing line, checking its length against the layout.
    pub fn parse(layout: &'static RecordLayout, line: &[u8]) -> Result<Self, FormatError> {
        if line.len() != layout.length {
            return Err(FormatError::LayoutMismatch {
                record: layout.name,
                message: format!("expected {} bytes, got {}", layout.length, line.len()),
            });
        }
        Ok(FixedWidthRecord {
            layout,
            bytes: line.to_vec(),
        })
    }

    pub fn layout(&self) -> &'static RecordLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw content of the named field, padding included.
    pub fn field(&self, name: &str) -> Option<String> {
        let (offset, len) = self.layout.span_of(name)?;
        Some(self.bytes[offset..offset + len].iter().map(|&b| b as char).collect())
    }

    /// Numeric value of a zero-filled field.
    pub fn number(&self, name: &'static str) -> Result<u64, FormatError> {
        let raw = self.field(name).ok_or(FormatError::LayoutMismatch {
            record: self.layout.name,
            message: format!("no field named `{}`", name),
        })?;
        raw.trim().parse().map_err(|_| FormatError::NonNumeric {
            field: name,
            value: raw,
        })
    }
}

/// Joins records with the given line terminator. No trailing terminator.
pub fn join_records(records: &[FixedWidthRecord], terminator: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(terminator);
        }
        out.extend_from_slice(record.as_bytes());
    }
    out
}

/// Splits a file on `\n`, dropping a trailing `\r` from each line.
pub fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return Vec::new();
    }
    bytes
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect()
}

fn to_latin1(c: char) -> u8 {
    match c as u32 {
        0x00..=0x1F | 0x7F..=0x9F => b' ',
        code @ 0x20..=0xFF => code as u8,
        _ => b'?',
    }
}

/// Fills the fields of one layout in order.
///
/// Filler fields are written automatically. Each `put` method consumes the
/// next non-filler field and fails if its kind does not match.
#[derive(Debug)]
pub struct RecordWriter {
    layout: &'static RecordLayout,
    next: usize,
    bytes: Vec<u8>,
}

impl RecordWriter {
    pub fn new(layout: &'static RecordLayout) -> Self {
        RecordWriter {
            layout,
            next: 0,
            bytes: Vec::with_capacity(layout.length),
        }
    }

    /// Left-aligned text.
    pub fn text(&mut self, value: &str) -> Result<&mut Self, FormatError> {
        let field = self.next_field(FieldKind::Text)?;
        self.push(&format_field(value, field.len, Align::Left, ' '));
        Ok(self)
    }

    /// Numeric identifier. Longer values keep their low-order digits.
    pub fn digits(&mut self, value: &str) -> Result<&mut Self, FormatError> {
        let field = self.next_field(FieldKind::Digits)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FormatError::EmptyField(field.name));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FormatError::NonNumeric {
                field: field.name,
                value: trimmed.to_string(),
            });
        }
        self.push(&format_field(trimmed, field.len, Align::Right, '0'));
        Ok(self)
    }

    /// Unsigned centime amount.
    pub fn amount(&mut self, value: Money) -> Result<&mut Self, FormatError> {
        let field = self.next_field(FieldKind::Amount)?;
        let centimes = amount_to_minor_units(field.name, value.to_decimal())?;
        self.push_number(field, centimes);
        Ok(self)
    }

    /// Unsigned count.
    pub fn count(&mut self, value: u64) -> Result<&mut Self, FormatError> {
        let field = self.next_field(FieldKind::Count)?;
        self.push_number(field, value);
        Ok(self)
    }

    /// Writes any trailing filler and returns the finished record.
    pub fn finish(mut self) -> Result<FixedWidthRecord, FormatError> {
        self.skip_fillers();
        if self.next < self.layout.fields.len() {
            return Err(FormatError::LayoutMismatch {
                record: self.layout.name,
                message: format!(
                    "field `{}` was never written",
                    self.layout.fields[self.next].name
                ),
            });
        }
        if self.bytes.len() != self.layout.length {
            return Err(FormatError::LayoutMismatch {
                record: self.layout.name,
                message: format!(
                    "encoded {} bytes instead of {}",
                    self.bytes.len(),
                    self.layout.length
                ),
            });
        }
        Ok(FixedWidthRecord {
            layout: self.layout,
            bytes: self.bytes,
        })
    }

    fn next_field(&mut self, kind: FieldKind) -> Result<Field, FormatError> {
        self.skip_fillers();
        let field = *self
            .layout
            .fields
            .get(self.next)
            .ok_or_else(|| FormatError::LayoutMismatch {
                record: self.layout.name,
                message: "too many fields written".to_string(),
            })?;
        if field.kind != kind {
            return Err(FormatError::LayoutMismatch {
                record: self.layout.name,
                message: format!(
                    "field `{}` is {:?}, not {:?}",
                    field.name, field.kind, kind
                ),
            });
        }
        self.next += 1;
        Ok(field)
    }

    fn skip_fillers(&mut self) {
        while let Some(field) = self.layout.fields.get(self.next) {
            if field.kind != FieldKind::Filler {
                break;
            }
            self.bytes.extend(std::iter::repeat(b' ').take(field.len));
            self.next += 1;
        }
    }

    fn push_number(&mut self, field: Field, value: u64) {
        if value.to_string().len() > field.len {
            debug!("Truncating `{}` value {} to {} digits", field.name, value, field.len);
        }
        self.push(&format_field(&value.to_string(), field.len, Align::Right, '0'));
    }

    fn push(&mut self, formatted: &str) {
        self.bytes.extend(formatted.chars().map(to_latin1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: RecordLayout = RecordLayout {
        name: "T01",
        length: 20,
        fields: &[
            Field::text("type", 3),
            Field::digits("id", 4),
            Field::amount("amount", 5),
            Field::text("name", 5),
            Field::filler(3),
        ],
    };

    const _: () = assert!(SAMPLE.is_consistent());

    #[test]
    fn test_left_align_pads_and_truncates_on_the_right() {
        assert_eq!(format_field("ABC", 6, Align::Left, ' '), "ABC   ");
        assert_eq!(format_field("ABCDEFGH", 6, Align::Left, ' '), "ABCDEF");
        assert_eq!(format_field("", 3, Align::Left, ' '), "   ");
    }

    #[test]
    fn test_right_align_pads_and_truncates_on_the_left() {
        assert_eq!(format_field("123", 6, Align::Right, '0'), "000123");
        assert_eq!(format_field("12345678", 6, Align::Right, '0'), "345678");
        assert_eq!(format_field("AB", 4, Align::Right, ' '), "  AB");
    }

    #[test]
    fn test_exact_length_is_unchanged() {
        assert_eq!(format_field("ABCD", 4, Align::Left, ' '), "ABCD");
        assert_eq!(format_field("1234", 4, Align::Right, '0'), "1234");
    }

    #[test]
    fn test_format_field_counts_characters_not_bytes() {
        assert_eq!(format_field("ÉLÉ", 5, Align::Left, ' '), "ÉLÉ  ");
        assert_eq!(format_field("ÉLÉVE", 3, Align::Left, ' '), "ÉLÉ");
    }

    #[test]
    fn test_amount_to_minor_units() {
        assert_eq!(amount_to_minor_units("a", dec!(268.80)), Ok(26880));
        assert_eq!(amount_to_minor_units("a", dec!(0.005)), Ok(1));
        assert_eq!(amount_to_minor_units("a", dec!(0.004)), Ok(0));
        assert_eq!(amount_to_minor_units("a", dec!(0)), Ok(0));
        assert!(matches!(
            amount_to_minor_units("a", dec!(-0.01)),
            Err(FormatError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_writer_builds_exact_length_record() {
        let mut w = RecordWriter::new(&SAMPLE);
        w.text("T01").unwrap();
        w.digits("42").unwrap();
        w.amount(Money::from_centimes(1234)).unwrap();
        w.text("Zoé").unwrap();
        let record = w.finish().unwrap();

        assert_eq!(record.len(), 20);
        assert_eq!(record.as_bytes(), b"T01004201234Zo\xe9     ");
        assert_eq!(record.field("name").unwrap(), "Zoé  ");
        assert_eq!(record.number("amount").unwrap(), 1234);
    }

    #[test]
    fn test_writer_truncates_identifiers_from_the_left() {
        let mut w = RecordWriter::new(&SAMPLE);
        w.text("T01").unwrap();
        w.digits("987654").unwrap();
        w.amount(Money::ZERO).unwrap();
        w.text("LONGER NAME").unwrap();
        let record = w.finish().unwrap();

        assert_eq!(record.field("id").unwrap(), "7654");
        assert_eq!(record.field("name").unwrap(), "LONGE");
    }

    #[test]
    fn test_writer_truncates_amounts_from_the_left() {
        let mut w = RecordWriter::new(&SAMPLE);
        w.text("T01").unwrap();
        w.digits("1").unwrap();
        w.amount(Money::from_centimes(123456)).unwrap();
        w.text("").unwrap();
        let record = w.finish().unwrap();

        assert_eq!(record.len(), 20);
        assert_eq!(record.field("amount").unwrap(), "23456");
        assert_eq!(record.number("amount").unwrap(), 23456);
    }

    #[test]
    fn test_amount_to_minor_units_rejects_values_beyond_u64() {
        assert!(matches!(
            amount_to_minor_units("a", Decimal::MAX),
            Err(FormatError::Overflow { width: 19, .. })
        ));
    }

    #[test]
    fn test_writer_rejects_empty_and_non_numeric_identifiers() {
        let mut w = RecordWriter::new(&SAMPLE);
        w.text("T01").unwrap();
        assert_eq!(w.digits("  ").unwrap_err(), FormatError::EmptyField("id"));

        let mut w = RecordWriter::new(&SAMPLE);
        w.text("T01").unwrap();
        assert!(matches!(
            w.digits("12A4"),
            Err(FormatError::NonNumeric { .. })
        ));
    }

    #[test]
    fn test_writer_rejects_negative_amount() {
        let mut w = RecordWriter::new(&SAMPLE);
        w.text("T01").unwrap();
        w.digits("1").unwrap();
        assert!(matches!(
            w.amount(Money::from_centimes(-1)),
            Err(FormatError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_writer_enforces_field_order() {
        let mut w = RecordWriter::new(&SAMPLE);
        assert!(matches!(
            w.amount(Money::ZERO),
            Err(FormatError::LayoutMismatch { .. })
        ));

        let mut w = RecordWriter::new(&SAMPLE);
        w.text("T01").unwrap();
        assert!(matches!(w.finish(), Err(FormatError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_control_characters_become_spaces() {
        let mut w = RecordWriter::new(&SAMPLE);
        w.text("T\n1").unwrap();
        w.digits("1").unwrap();
        w.amount(Money::ZERO).unwrap();
        w.text("a€").unwrap();
        let record = w.finish().unwrap();
        assert_eq!(&record.as_bytes()[..3], b"T 1");
        assert_eq!(record.field("name").unwrap(), "a?   ");
    }

    #[test]
    fn test_span_of_and_parse() {
        assert_eq!(SAMPLE.span_of("amount"), Some((7, 5)));
        assert_eq!(SAMPLE.span_of("missing"), None);
        assert!(FixedWidthRecord::parse(&SAMPLE, b"short").is_err());
        assert!(FixedWidthRecord::parse(&SAMPLE, &[b' '; 20]).is_ok());
    }

    #[test]
    fn test_join_and_split_lines() {
        let a = FixedWidthRecord::parse(&SAMPLE, &[b'a'; 20]).unwrap();
        let b = FixedWidthRecord::parse(&SAMPLE, &[b'b'; 20]).unwrap();
        let joined = join_records(&[a, b], b"\r\n");
        assert_eq!(joined.len(), 42);
        let lines = split_lines(&joined);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], &[b'b'; 20][..]);
        assert!(split_lines(b"").is_empty());
    }
}
