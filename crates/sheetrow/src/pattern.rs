//! Temporal patterns.
//!
//! Fields annotated with a pattern such as `yyyy/MM/dd` or `HH:mm:ss.SSS`
//! format and parse their values through it. A pattern is compiled once into
//! `chrono` format items and reused for both directions.
//!
//! Supported letters (repeat count = width):
//!
//! | letter   | meaning                     | widths                          |
//! |----------|-----------------------------|---------------------------------|
//! | `y`, `u` | year                        | 1 unpadded, 2 two-digit, 3+ padded |
//! | `M`, `L` | month                       | 1, 2 numeric; 3 short; 4 full name |
//! | `d`      | day of month                | 1, 2                            |
//! | `D`      | day of year                 | 1, 3                            |
//! | `E`      | weekday name                | 1-3 short, 4 full               |
//! | `a`      | AM/PM marker                | 1                               |
//! | `H`      | hour 0-23                   | 1, 2                            |
//! | `h`      | hour 1-12                   | 1, 2                            |
//! | `m`      | minute                      | 1, 2                            |
//! | `s`      | second                      | 1, 2                            |
//! | `S`      | fraction of second          | 3, 6, 9                         |
//!
//! Text inside single quotes is literal, `''` is a quote, and any other
//! non-letter stands for itself.
//!
//! Two-digit years (`yy`, `uu`) read as 2000-2099. Fractions are limited to
//! millisecond, microsecond and nanosecond precision: `S`, `SS` and other
//! widths outside 3, 6 and 9 are rejected when the pattern compiles.

use std::fmt::Write as _;

use chrono::format::{self, Fixed, Item, Numeric, Pad, Parsed, StrftimeItems};
use sheetrow_common::{FieldValue, TypeTag};

const DATE_LETTERS: &str = "yuMLdDE";
const TIME_LETTERS: &str = "aHhmsS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("unknown pattern letter `{letter}` at offset {offset}")]
    UnknownLetter { letter: char, offset: usize },

    #[error("pattern letter `{letter}` does not support width {width}")]
    UnsupportedWidth { letter: char, width: usize },

    #[error("unterminated quoted literal starting at offset {0}")]
    UnterminatedQuote(usize),

    #[error("time letter `{0}` has no meaning for a date")]
    TimeLetterInDate(char),

    #[error("date letter `{0}` has no meaning for a time")]
    DateLetterInTime(char),

    #[error("pattern applies to date, time or date-time fields, not {0}")]
    NotTemporal(TypeTag),
}

/// A compiled pattern bound to one temporal type.
#[derive(Debug, Clone)]
pub struct TemporalPattern {
    source: String,
    tag: TypeTag,
    items: Vec<Item<'static>>,
}

impl TemporalPattern {
    pub fn compile(source: &str, tag: TypeTag) -> Result<Self, PatternError> {
        if !tag.is_temporal() {
            return Err(PatternError::NotTemporal(tag));
        }

        let chars: Vec<(usize, char)> = source.char_indices().collect();
        let mut items = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            let (offset, c) = chars[i];

            if c == '\'' {
                i = scan_quoted(&chars, i, &mut literal)?;
                continue;
            }

            if !c.is_ascii_alphabetic() {
                literal.push(c);
                i += 1;
                continue;
            }

            let width = chars[i..].iter().take_while(|(_, ch)| *ch == c).count();
            check_component(c, tag)?;
            flush_literal(&mut literal, &mut items);
            items.extend(letter_items(c, width, offset)?);
            i += width;
        }
        flush_literal(&mut literal, &mut items);

        Ok(Self {
            source: source.to_string(),
            tag,
            items,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Render a temporal value. `None` if the value is not temporal or the
    /// pattern asks for a component the value lacks.
    pub fn format(&self, value: &FieldValue) -> Option<String> {
        let items = self.items.iter();
        let mut out = String::new();
        let written = match value {
            FieldValue::Date(d) => write!(out, "{}", d.format_with_items(items)),
            FieldValue::Time(t) => write!(out, "{}", t.format_with_items(items)),
            FieldValue::DateTime(dt) => write!(out, "{}", dt.format_with_items(items)),
            _ => return None,
        };
        written.ok().map(|_| out)
    }

    /// Parse text into a value of the pattern's type.
    pub fn parse(&self, text: &str) -> Result<FieldValue, chrono::ParseError> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, text, self.items.iter())?;
        if parsed.year_mod_100().is_some()
            && parsed.year().is_none()
            && parsed.year_div_100().is_none()
        {
            parsed.set_year_div_100(20)?;
        }
        match self.tag {
            TypeTag::Date => parsed.to_naive_date().map(FieldValue::Date),
            TypeTag::Time => parsed.to_naive_time().map(FieldValue::Time),
            _ => parsed
                .to_naive_datetime_with_offset(0)
                .map(FieldValue::DateTime),
        }
    }
}

/// Consume a quoted section (or a `''` escape) starting at `start`; returns
/// the index just past it.
fn scan_quoted(
    chars: &[(usize, char)],
    start: usize,
    literal: &mut String,
) -> Result<usize, PatternError> {
    let is_quote = |idx: usize| matches!(chars.get(idx), Some((_, '\'')));

    if is_quote(start + 1) {
        literal.push('\'');
        return Ok(start + 2);
    }

    let mut j = start + 1;
    loop {
        match chars.get(j) {
            None => return Err(PatternError::UnterminatedQuote(chars[start].0)),
            Some((_, '\'')) if is_quote(j + 1) => {
                literal.push('\'');
                j += 2;
            }
            Some((_, '\'')) => return Ok(j + 1),
            Some((_, ch)) => {
                literal.push(*ch);
                j += 1;
            }
        }
    }
}

fn flush_literal(literal: &mut String, items: &mut Vec<Item<'static>>) {
    if !literal.is_empty() {
        items.push(Item::OwnedLiteral(std::mem::take(literal).into_boxed_str()));
    }
}

fn check_component(letter: char, tag: TypeTag) -> Result<(), PatternError> {
    match tag {
        TypeTag::Date if TIME_LETTERS.contains(letter) => {
            Err(PatternError::TimeLetterInDate(letter))
        }
        TypeTag::Time if DATE_LETTERS.contains(letter) => {
            Err(PatternError::DateLetterInTime(letter))
        }
        _ => Ok(()),
    }
}

type LetterItems = Result<Vec<Item<'static>>, PatternError>;

fn letter_items(letter: char, width: usize, offset: usize) -> LetterItems {
    let numeric = |n: Numeric, pad: Pad| -> LetterItems { Ok(vec![Item::Numeric(n, pad)]) };
    let fixed = |f: Fixed| -> LetterItems { Ok(vec![Item::Fixed(f)]) };
    let fraction = |spec: &'static str| -> LetterItems { Ok(StrftimeItems::new(spec).collect()) };

    match (letter, width) {
        ('y' | 'u', 1) => numeric(Numeric::Year, Pad::None),
        ('y' | 'u', 2) => numeric(Numeric::YearMod100, Pad::Zero),
        ('y' | 'u', _) => numeric(Numeric::Year, Pad::Zero),
        ('M' | 'L', 1) => numeric(Numeric::Month, Pad::None),
        ('M' | 'L', 2) => numeric(Numeric::Month, Pad::Zero),
        ('M' | 'L', 3) => fixed(Fixed::ShortMonthName),
        ('M' | 'L', 4) => fixed(Fixed::LongMonthName),
        ('d', 1) => numeric(Numeric::Day, Pad::None),
        ('d', 2) => numeric(Numeric::Day, Pad::Zero),
        ('D', 1) => numeric(Numeric::Ordinal, Pad::None),
        ('D', 3) => numeric(Numeric::Ordinal, Pad::Zero),
        ('E', 1..=3) => fixed(Fixed::ShortWeekdayName),
        ('E', 4) => fixed(Fixed::LongWeekdayName),
        ('a', 1) => fixed(Fixed::UpperAmPm),
        ('H', 1) => numeric(Numeric::Hour, Pad::None),
        ('H', 2) => numeric(Numeric::Hour, Pad::Zero),
        ('h', 1) => numeric(Numeric::Hour12, Pad::None),
        ('h', 2) => numeric(Numeric::Hour12, Pad::Zero),
        ('m', 1) => numeric(Numeric::Minute, Pad::None),
        ('m', 2) => numeric(Numeric::Minute, Pad::Zero),
        ('s', 1) => numeric(Numeric::Second, Pad::None),
        ('s', 2) => numeric(Numeric::Second, Pad::Zero),
        ('S', 3) => fraction("%3f"),
        ('S', 6) => fraction("%6f"),
        ('S', 9) => fraction("%9f"),
        (letter, width) if DATE_LETTERS.contains(letter) || TIME_LETTERS.contains(letter) => {
            Err(PatternError::UnsupportedWidth { letter, width })
        }
        (letter, _) => Err(PatternError::UnknownLetter { letter, offset }),
    }
}
