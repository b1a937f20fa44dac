//! Field value ⇄ cell text.
//!
//! `stringify` turns a slot value into cell text; `parse` turns cell text
//! back into a slot value. Both dispatch on the descriptor's [`TypeTag`], so
//! every supported tag has exactly one rule in each direction and `Other`
//! maps to absent.
//!
//! Empty cells follow a two-way default policy:
//! - the field has an explicit, non-empty column default: the default text
//!   is parsed as if it had been in the cell;
//! - otherwise the implicit default applies: zero for numbers, `false`,
//!   `'\0'`, absent for everything else and for nullable slots.

use std::fmt::Display;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use sheetrow_common::{
    CANONICAL_DATE_FORMAT, CANONICAL_DATETIME_FORMAT, CANONICAL_TIME_FORMAT, CoercionError,
    FieldValue, TypeTag,
};

use crate::schema::FieldDescriptor;

/// Which default an empty cell takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCellPolicy<'a> {
    Implicit,
    Explicit(&'a str),
}

impl<'a> EmptyCellPolicy<'a> {
    pub fn for_field(field: &'a FieldDescriptor) -> Self {
        match field.explicit_default() {
            Some(default) => EmptyCellPolicy::Explicit(default),
            None => EmptyCellPolicy::Implicit,
        }
    }
}

/// Cell text for a field value. Absent values stay absent so the caller can
/// leave the cell empty.
pub fn stringify(
    value: Option<&FieldValue>,
    field: &FieldDescriptor,
) -> Result<Option<String>, CoercionError> {
    let Some(value) = value else {
        return Ok(None);
    };

    if field.tag().is_temporal()
        && let Some(pattern) = field.temporal_pattern()?
    {
        return match pattern.format(value) {
            Some(text) => Ok(Some(text)),
            None => Err(CoercionError::InvalidPattern {
                field: field.name().to_string(),
                pattern: pattern.source().to_string(),
                reason: format!("cannot render a {} value", value.tag()),
            }),
        };
    }

    Ok(Some(value.to_string()))
}

/// Field value for a cell. `None` and `Some("")` are the same empty cell.
pub fn parse(
    cell: Option<&str>,
    field: &FieldDescriptor,
) -> Result<Option<FieldValue>, CoercionError> {
    let text = match cell.filter(|text| !text.is_empty()) {
        Some(text) => text,
        None => match EmptyCellPolicy::for_field(field) {
            EmptyCellPolicy::Implicit => return Ok(field.implicit_default()),
            EmptyCellPolicy::Explicit(default) => default,
        },
    };
    convert(text, field)
}

fn convert(text: &str, field: &FieldDescriptor) -> Result<Option<FieldValue>, CoercionError> {
    let value = match field.tag() {
        TypeTag::Text => FieldValue::Text(text.to_string()),
        TypeTag::Byte => FieldValue::Byte(parse_text(text, field)?),
        TypeTag::Short => FieldValue::Short(parse_text(text, field)?),
        TypeTag::Int => FieldValue::Int(parse_text(text, field)?),
        TypeTag::Long => FieldValue::Long(parse_text(text, field)?),
        TypeTag::Float => FieldValue::Float(parse_text(text, field)?),
        TypeTag::Double => FieldValue::Double(parse_text(text, field)?),
        TypeTag::Char => match text.chars().next() {
            Some(c) => FieldValue::Char(c),
            None => return Err(malformed(text, field, "no character to read")),
        },
        // Anything but "true" is false; there is no error path.
        TypeTag::Boolean => FieldValue::Boolean(text.eq_ignore_ascii_case("true")),
        TypeTag::BigInteger => FieldValue::BigInteger(parse_big(text, field)?),
        TypeTag::BigDecimal => FieldValue::BigDecimal(parse_big(text, field)?),
        TypeTag::Date | TypeTag::Time | TypeTag::DateTime => parse_temporal(text, field)?,
        TypeTag::Other(_) => return Ok(None),
    };
    Ok(Some(value))
}

fn parse_text<T>(text: &str, field: &FieldDescriptor) -> Result<T, CoercionError>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse().map_err(|e| malformed(text, field, e))
}

/// `num-bigint` and `bigdecimal` accept `_` between digits; cell text must
/// not.
fn parse_big<T>(text: &str, field: &FieldDescriptor) -> Result<T, CoercionError>
where
    T: FromStr,
    T::Err: Display,
{
    if text.contains('_') {
        return Err(malformed(text, field, "digit separators are not allowed"));
    }
    parse_text(text, field)
}

fn parse_temporal(text: &str, field: &FieldDescriptor) -> Result<FieldValue, CoercionError> {
    let parsed = match field.temporal_pattern()? {
        Some(pattern) => pattern.parse(text),
        None => match field.tag() {
            TypeTag::Date => {
                NaiveDate::parse_from_str(text, CANONICAL_DATE_FORMAT).map(FieldValue::Date)
            }
            TypeTag::Time => {
                NaiveTime::parse_from_str(text, CANONICAL_TIME_FORMAT).map(FieldValue::Time)
            }
            _ => NaiveDateTime::parse_from_str(text, CANONICAL_DATETIME_FORMAT)
                .map(FieldValue::DateTime),
        },
    };
    parsed.map_err(|e| malformed(text, field, e))
}

fn malformed(text: &str, field: &FieldDescriptor, reason: impl Display) -> CoercionError {
    CoercionError::malformed(field.name(), field.tag(), text, reason)
}
