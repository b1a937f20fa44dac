use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;

use crate::{FieldValue, SlotMismatch, TypeTag};

/// A Rust type that can occupy a record field slot.
///
/// Plain types are non-nullable: writing "absent" into them stores
/// `Default::default()`. `Option<T>` is the nullable form of `T` and keeps
/// absent as `None`.
pub trait CellType: Sized {
    const TAG: TypeTag;
    const NULLABLE: bool = false;

    /// Read the slot. `None` means the slot holds no value.
    fn to_field_value(&self) -> Option<FieldValue>;

    /// Build a slot value from a parsed field value.
    fn from_field_value(value: Option<FieldValue>) -> Result<Self, SlotMismatch>;
}

macro_rules! impl_cell_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl CellType for $ty {
                const TAG: TypeTag = TypeTag::$variant;

                fn to_field_value(&self) -> Option<FieldValue> {
                    Some(FieldValue::$variant(self.clone()))
                }

                fn from_field_value(value: Option<FieldValue>) -> Result<Self, SlotMismatch> {
                    match value {
                        None => Ok(<$ty>::default()),
                        Some(FieldValue::$variant(v)) => Ok(v),
                        Some(other) => Err(SlotMismatch {
                            expected: Self::TAG,
                            found: other.tag(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_cell_type! {
    String => Text,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    bool => Boolean,
    char => Char,
    BigInt => BigInteger,
    BigDecimal => BigDecimal,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
}

impl<T: CellType> CellType for Option<T> {
    const TAG: TypeTag = T::TAG;
    const NULLABLE: bool = true;

    fn to_field_value(&self) -> Option<FieldValue> {
        self.as_ref().and_then(T::to_field_value)
    }

    fn from_field_value(value: Option<FieldValue>) -> Result<Self, SlotMismatch> {
        match value {
            None => Ok(None),
            some => T::from_field_value(some).map(Some),
        }
    }
}
