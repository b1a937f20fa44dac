//! Coercion errors.
//!
//! Every variant is a pure data-format or configuration problem: nothing here
//! is transient, so callers never retry. A single failing field aborts the
//! record it belongs to; whether to skip the row or abort the batch is the
//! caller's decision.

use crate::TypeTag;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    /// A value reached a slot that has no rule for it.
    #[error("field `{field}`: a {found} value cannot be stored in a {expected} slot")]
    UnsupportedType {
        field: String,
        expected: TypeTag,
        found: TypeTag,
    },

    /// Cell text does not parse as the field's type.
    #[error("field `{field}`: cannot read {text:?} as {tag}: {reason}")]
    MalformedValue {
        field: String,
        tag: TypeTag,
        text: String,
        reason: String,
    },

    /// The row carries more cells than the schema resolves fields.
    #[error("row has {actual} cells but the schema resolves {expected} fields")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// The field's temporal pattern is unusable for its type.
    #[error("field `{field}`: invalid temporal pattern {pattern:?}: {reason}")]
    InvalidPattern {
        field: String,
        pattern: String,
        reason: String,
    },

    /// A field key does not address a slot on the record.
    #[error("record `{record}` has no field slot #{index}")]
    UnknownField { record: &'static str, index: usize },
}

impl CoercionError {
    pub fn malformed(
        field: impl Into<String>,
        tag: TypeTag,
        text: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::MalformedValue {
            field: field.into(),
            tag,
            text: text.into(),
            reason: reason.to_string(),
        }
    }

    /// Name of the field the error is about, when it has one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnsupportedType { field, .. }
            | Self::MalformedValue { field, .. }
            | Self::InvalidPattern { field, .. } => Some(field),
            Self::ColumnCountMismatch { .. } | Self::UnknownField { .. } => None,
        }
    }
}

/// A slot refused a value of the wrong kind.
///
/// Raised by [`CellType`](crate::CellType) impls, which do not know the
/// field's name; [`SlotMismatch::for_field`] attaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMismatch {
    pub expected: TypeTag,
    pub found: TypeTag,
}

impl SlotMismatch {
    pub fn for_field(self, field: &str) -> CoercionError {
        CoercionError::UnsupportedType {
            field: field.to_string(),
            expected: self.expected,
            found: self.found,
        }
    }
}
