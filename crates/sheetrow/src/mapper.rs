//! Whole-record conversion between a [`Record`] and a row of cell texts.

use std::marker::PhantomData;
use std::sync::Arc;

use sheetrow_common::CoercionError;

use crate::cache;
use crate::coerce;
use crate::overlay::{OverlayError, SchemaOverlay};
use crate::resolver;
use crate::schema::{FieldDescriptor, FieldInclusionPolicy, Record};

/// One cell of an incoming row. Absent and empty text are the same cell.
pub trait AsCell {
    fn as_cell(&self) -> Option<&str>;
}

impl AsCell for str {
    fn as_cell(&self) -> Option<&str> {
        Some(self)
    }
}

impl AsCell for String {
    fn as_cell(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T: AsCell + ?Sized> AsCell for &T {
    fn as_cell(&self) -> Option<&str> {
        (**self).as_cell()
    }
}

impl<T: AsCell> AsCell for Option<T> {
    fn as_cell(&self) -> Option<&str> {
        self.as_ref().and_then(AsCell::as_cell)
    }
}

/// Cell texts for `record`, one per descriptor, in descriptor order.
pub fn to_row<R: Record>(
    record: &R,
    fields: &[FieldDescriptor],
) -> Result<Vec<Option<String>>, CoercionError> {
    fields
        .iter()
        .map(|field| coerce::stringify(record.field_value(field.key()).as_ref(), field))
        .collect()
}

/// Build a record from `row`, one cell per descriptor.
///
/// Cells past the end of a short row count as empty. A row longer than the
/// descriptor list is rejected. The first field that fails aborts the record.
pub fn from_row<R: Record, C: AsCell>(
    row: &[C],
    fields: &[FieldDescriptor],
) -> Result<R, CoercionError> {
    if row.len() > fields.len() {
        return Err(CoercionError::ColumnCountMismatch {
            expected: fields.len(),
            actual: row.len(),
        });
    }

    let mut record = R::default();
    for (index, field) in fields.iter().enumerate() {
        let cell = row.get(index).and_then(AsCell::as_cell);
        let decoded = coerce::parse(cell, field)
            .and_then(|value| record.set_field_value(field.key(), value));
        if let Err(err) = decoded {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                record = R::record_type().name(),
                column = index,
                field = field.name(),
                error = %err,
                "row decode failed"
            );
            return Err(err);
        }
    }
    Ok(record)
}

/// A record type bound to one resolved descriptor list.
///
/// `new` shares the process-wide cached schema; mappers built with an
/// explicit policy or an overlay resolve their own list once at
/// construction.
#[derive(Debug)]
pub struct RecordMapper<R> {
    fields: Arc<[FieldDescriptor]>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for RecordMapper<R> {
    fn clone(&self) -> Self {
        Self {
            fields: Arc::clone(&self.fields),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Default for RecordMapper<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordMapper<R> {
    /// Mapper under the record's declared policy.
    pub fn new() -> Self {
        Self::with_policy(R::record_type().policy())
    }

    pub fn with_policy(policy: FieldInclusionPolicy) -> Self {
        Self {
            fields: cache::fields_of::<R>(policy),
            _record: PhantomData,
        }
    }

    /// Mapper with `overlay` applied on top of the declared schema.
    pub fn with_overlay(overlay: &SchemaOverlay) -> Result<Self, OverlayError> {
        let record_type = R::record_type();
        let fields = resolver::resolve_with_overlay(record_type, record_type.policy(), overlay)?;
        Ok(Self {
            fields: fields.into(),
            _record: PhantomData,
        })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Column display names in field order.
    pub fn headers(&self) -> Vec<&str> {
        self.fields.iter().map(FieldDescriptor::column_name).collect()
    }

    pub fn to_row(&self, record: &R) -> Result<Vec<Option<String>>, CoercionError> {
        to_row(record, &self.fields)
    }

    pub fn from_row<C: AsCell>(&self, row: &[C]) -> Result<R, CoercionError> {
        from_row(row, &self.fields)
    }
}
