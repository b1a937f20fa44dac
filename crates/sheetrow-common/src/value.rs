use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use std::fmt::{self, Display};

/* ───────────────────── Canonical temporal text forms ─────────────────
Used whenever a temporal field has no explicit pattern:
  date      = 2024-03-07
  time      = 10:15:30[.fraction]
  date-time = 2024-03-07T10:15:30[.fraction]
`%.f` renders nothing for a zero fraction and 3/6/9 digits otherwise.
------------------------------------------------------------------- */

pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";
pub const CANONICAL_TIME_FORMAT: &str = "%H:%M:%S%.f";
pub const CANONICAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Declared type of a field slot.
///
/// The set is closed: every tag except `Other` has a stringify and a parse
/// rule. `Other` names a slot type the engine cannot convert; reading it
/// yields no value and parsing into it yields absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Text,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Char,
    BigInteger,
    BigDecimal,
    Date,
    Time,
    DateTime,
    Other(&'static str),
}

impl TypeTag {
    /// Every convertible tag, in declaration order.
    pub const ALL: [TypeTag; 14] = [
        TypeTag::Text,
        TypeTag::Byte,
        TypeTag::Short,
        TypeTag::Int,
        TypeTag::Long,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::Boolean,
        TypeTag::Char,
        TypeTag::BigInteger,
        TypeTag::BigDecimal,
        TypeTag::Date,
        TypeTag::Time,
        TypeTag::DateTime,
    ];

    /// The value an empty cell takes when no explicit default applies.
    ///
    /// Numbers read as zero, booleans as `false`, characters as NUL; every
    /// other type has no zero and reads as absent.
    pub fn zero_value(self) -> Option<FieldValue> {
        match self {
            TypeTag::Byte => Some(FieldValue::Byte(0)),
            TypeTag::Short => Some(FieldValue::Short(0)),
            TypeTag::Int => Some(FieldValue::Int(0)),
            TypeTag::Long => Some(FieldValue::Long(0)),
            TypeTag::Float => Some(FieldValue::Float(0.0)),
            TypeTag::Double => Some(FieldValue::Double(0.0)),
            TypeTag::Boolean => Some(FieldValue::Boolean(false)),
            TypeTag::Char => Some(FieldValue::Char('\0')),
            TypeTag::Text
            | TypeTag::BigInteger
            | TypeTag::BigDecimal
            | TypeTag::Date
            | TypeTag::Time
            | TypeTag::DateTime
            | TypeTag::Other(_) => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Text => "string",
            TypeTag::Byte => "i8",
            TypeTag::Short => "i16",
            TypeTag::Int => "i32",
            TypeTag::Long => "i64",
            TypeTag::Float => "f32",
            TypeTag::Double => "f64",
            TypeTag::Boolean => "bool",
            TypeTag::Char => "char",
            TypeTag::BigInteger => "big-integer",
            TypeTag::BigDecimal => "big-decimal",
            TypeTag::Date => "date",
            TypeTag::Time => "time",
            TypeTag::DateTime => "date-time",
            TypeTag::Other(name) => name,
        }
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime value held by a field slot.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Char(char),
    BigInteger(BigInt),
    BigDecimal(BigDecimal),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    pub fn tag(&self) -> TypeTag {
        match self {
            FieldValue::Text(_) => TypeTag::Text,
            FieldValue::Byte(_) => TypeTag::Byte,
            FieldValue::Short(_) => TypeTag::Short,
            FieldValue::Int(_) => TypeTag::Int,
            FieldValue::Long(_) => TypeTag::Long,
            FieldValue::Float(_) => TypeTag::Float,
            FieldValue::Double(_) => TypeTag::Double,
            FieldValue::Boolean(_) => TypeTag::Boolean,
            FieldValue::Char(_) => TypeTag::Char,
            FieldValue::BigInteger(_) => TypeTag::BigInteger,
            FieldValue::BigDecimal(_) => TypeTag::BigDecimal,
            FieldValue::Date(_) => TypeTag::Date,
            FieldValue::Time(_) => TypeTag::Time,
            FieldValue::DateTime(_) => TypeTag::DateTime,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Canonical cell text: plain decimal numbers, `true`/`false`, ISO dates.
/// Big decimals never switch to exponent notation.
impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Byte(n) => write!(f, "{n}"),
            FieldValue::Short(n) => write!(f, "{n}"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Long(n) => write!(f, "{n}"),
            FieldValue::Float(n) => write!(f, "{n}"),
            FieldValue::Double(n) => write!(f, "{n}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Char(c) => write!(f, "{c}"),
            FieldValue::BigInteger(n) => write!(f, "{n}"),
            FieldValue::BigDecimal(n) => f.write_str(&n.to_plain_string()),
            FieldValue::Date(d) => write!(f, "{}", d.format(CANONICAL_DATE_FORMAT)),
            FieldValue::Time(t) => write!(f, "{}", t.format(CANONICAL_TIME_FORMAT)),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format(CANONICAL_DATETIME_FORMAT)),
        }
    }
}
