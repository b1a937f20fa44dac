//! Pure predicates over [`TypeTag`]. Total: unrecognised tags classify as
//! `false` rather than failing.

use crate::TypeTag;

/// Fixed-width integer and floating-point tags.
pub fn is_numeric_primitive(tag: TypeTag) -> bool {
    matches!(
        tag,
        TypeTag::Byte
            | TypeTag::Short
            | TypeTag::Int
            | TypeTag::Long
            | TypeTag::Float
            | TypeTag::Double
    )
}

/// Date, time and date-time tags; the only ones a pattern applies to.
pub fn is_temporal(tag: TypeTag) -> bool {
    matches!(tag, TypeTag::Date | TypeTag::Time | TypeTag::DateTime)
}

/// Whether the engine has a stringify/parse rule for the tag.
pub fn is_writable(tag: TypeTag) -> bool {
    !matches!(tag, TypeTag::Other(_))
}

impl TypeTag {
    pub fn is_numeric_primitive(self) -> bool {
        is_numeric_primitive(self)
    }

    pub fn is_temporal(self) -> bool {
        is_temporal(self)
    }

    pub fn is_writable(self) -> bool {
        is_writable(self)
    }
}
