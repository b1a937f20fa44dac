use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use sheetrow_common::{CellType, CoercionError, FieldValue, TypeTag};

use crate::mapper::AsCell;
use crate::pattern::TemporalPattern;

/// Which levels of a record's embedding chain take part in mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldInclusionPolicy {
    /// Only fields declared directly on the record.
    #[default]
    OwnFields,
    /// Ancestor fields too, most distant ancestor first.
    IncludesInherited,
}

/// Column annotation. Its presence alone is meaningful: a field may carry
/// column metadata with neither an override name nor a default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: Option<String>,
    pub default_value: Option<String>,
}

/// Coercion metadata attached to one declared field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMeta {
    pub ignore: bool,
    pub column: Option<ColumnMeta>,
    pub pattern: Option<String>,
}

/// One field as declared on a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: &'static str,
    tag: TypeTag,
    nullable: bool,
    meta: FieldMeta,
}

impl FieldDef {
    pub fn new(name: &'static str, tag: TypeTag, nullable: bool) -> Self {
        Self {
            name,
            tag,
            nullable,
            meta: FieldMeta::default(),
        }
    }

    /// Declare a field whose slot type is `T`.
    pub fn of<T: CellType>(name: &'static str) -> Self {
        Self::new(name, T::TAG, T::NULLABLE)
    }

    /// Declare an excluded field. Its type needs no [`CellType`] impl.
    pub fn ignored(name: &'static str, type_name: &'static str) -> Self {
        Self::new(name, TypeTag::Other(type_name), true).ignore()
    }

    pub fn with_column(mut self, name: Option<&str>, default_value: Option<&str>) -> Self {
        self.meta.column = Some(ColumnMeta {
            name: name.map(str::to_string),
            default_value: default_value.map(str::to_string),
        });
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.meta.pattern = Some(pattern.to_string());
        self
    }

    pub fn ignore(mut self) -> Self {
        self.meta.ignore = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }
}

/// Static description of a record type, built once per type.
///
/// Inheritance is modelled by embedding: a record names the record type of
/// its embedded parent, and the parent chain ends at a record with no parent.
#[derive(Debug)]
pub struct RecordType {
    name: &'static str,
    id: TypeId,
    policy: FieldInclusionPolicy,
    parent: Option<fn() -> &'static RecordType>,
    fields: Vec<FieldDef>,
}

impl RecordType {
    pub fn new<R: 'static>(name: &'static str) -> Self {
        Self {
            name,
            id: TypeId::of::<R>(),
            policy: FieldInclusionPolicy::default(),
            parent: None,
            fields: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: FieldInclusionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_parent(mut self, parent: fn() -> &'static RecordType) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Policy declared on the record; mappers use it unless told otherwise.
    pub fn policy(&self) -> FieldInclusionPolicy {
        self.policy
    }

    pub fn parent(&self) -> Option<&'static RecordType> {
        self.parent.map(|parent| parent())
    }

    /// Fields declared directly on this type, ignored ones included.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_key(&self, index: usize) -> FieldKey {
        FieldKey {
            owner: self.id,
            index,
        }
    }
}

/// Addresses one slot: the declaring record type plus the declaration index.
///
/// Two fields with the same name on different levels keep distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    owner: TypeId,
    index: usize,
}

impl FieldKey {
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// A struct that maps to a spreadsheet row.
///
/// Normally implemented through `#[derive(Record)]`, which generates the
/// accessor and mutator dispatch over [`FieldKey`]s. Keys owned by an
/// ancestor level are forwarded to the embedded parent.
pub trait Record: Default + 'static {
    fn record_type() -> &'static RecordType;

    fn field_value(&self, key: FieldKey) -> Option<FieldValue>;

    fn set_field_value(
        &mut self,
        key: FieldKey,
        value: Option<FieldValue>,
    ) -> Result<(), CoercionError>;

    /// Resolved fields under the declared policy, shared process-wide.
    fn schema() -> Arc<[FieldDescriptor]> {
        crate::cache::fields_of::<Self>(Self::record_type().policy())
    }

    fn to_row(&self) -> Result<Vec<Option<String>>, CoercionError> {
        crate::mapper::to_row(self, &Self::schema())
    }

    fn from_row<C: AsCell>(row: &[C]) -> Result<Self, CoercionError> {
        crate::mapper::from_row(row, &Self::schema())
    }
}

/// Resolved, immutable view of one field used to drive coercion.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    key: FieldKey,
    owner: &'static str,
    name: &'static str,
    tag: TypeTag,
    nullable: bool,
    meta: FieldMeta,
    pattern: OnceLock<Result<Option<TemporalPattern>, CoercionError>>,
}

impl FieldDescriptor {
    pub(crate) fn declared(owner: &RecordType, index: usize, def: &FieldDef) -> Self {
        Self {
            key: owner.field_key(index),
            owner: owner.name(),
            name: def.name,
            tag: def.tag,
            nullable: def.nullable,
            meta: def.meta.clone(),
            pattern: OnceLock::new(),
        }
    }

    /// A descriptor detached from any record, for coercing single values.
    pub fn standalone(def: FieldDef) -> Self {
        Self {
            key: FieldKey {
                owner: TypeId::of::<FieldDef>(),
                index: 0,
            },
            owner: "",
            name: def.name,
            tag: def.tag,
            nullable: def.nullable,
            meta: def.meta,
            pattern: OnceLock::new(),
        }
    }

    pub fn key(&self) -> FieldKey {
        self.key
    }

    /// Name of the record type that declares the field.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    pub fn is_ignored(&self) -> bool {
        self.meta.ignore
    }

    /// Header text: the column override when set and non-empty, else the
    /// field name.
    pub fn column_name(&self) -> &str {
        self.meta
            .column
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(self.name)
    }

    /// The explicit default for empty cells. An empty default string counts
    /// as no default.
    pub fn explicit_default(&self) -> Option<&str> {
        self.meta
            .column
            .as_ref()
            .and_then(|c| c.default_value.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// Value of an empty cell when no explicit default applies. Nullable
    /// slots stay absent.
    pub fn implicit_default(&self) -> Option<FieldValue> {
        if self.nullable {
            None
        } else {
            self.tag.zero_value()
        }
    }

    /// Compiled temporal pattern, or `None` when the field is not temporal
    /// or has no non-empty pattern. Compiled on first use.
    pub fn temporal_pattern(&self) -> Result<Option<&TemporalPattern>, CoercionError> {
        self.pattern
            .get_or_init(|| self.compile_pattern())
            .as_ref()
            .map(Option::as_ref)
            .map_err(Clone::clone)
    }

    fn compile_pattern(&self) -> Result<Option<TemporalPattern>, CoercionError> {
        let Some(source) = self.meta.pattern.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        if !self.tag.is_temporal() {
            return Ok(None);
        }
        TemporalPattern::compile(source, self.tag)
            .map(Some)
            .map_err(|e| CoercionError::InvalidPattern {
                field: self.name.to_string(),
                pattern: source.to_string(),
                reason: e.to_string(),
            })
    }

    /// Mutable metadata; drops any compiled pattern.
    pub(crate) fn meta_mut(&mut self) -> &mut FieldMeta {
        self.pattern = OnceLock::new();
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn column_name_falls_back_to_field_name() {
        let plain = FieldDescriptor::standalone(FieldDef::of::<String>("name"));
        assert_eq!(plain.column_name(), "name");

        let renamed = FieldDescriptor::standalone(
            FieldDef::of::<String>("name").with_column(Some("Product Name"), None),
        );
        assert_eq!(renamed.column_name(), "Product Name");

        let blank = FieldDescriptor::standalone(
            FieldDef::of::<String>("name").with_column(Some(""), None),
        );
        assert_eq!(blank.column_name(), "name");
    }

    #[test]
    fn empty_explicit_default_counts_as_absent() {
        let field = FieldDescriptor::standalone(
            FieldDef::of::<i32>("count").with_column(None, Some("")),
        );
        assert_eq!(field.explicit_default(), None);

        let field = FieldDescriptor::standalone(
            FieldDef::of::<i32>("count").with_column(None, Some("7")),
        );
        assert_eq!(field.explicit_default(), Some("7"));
    }

    #[test]
    fn implicit_default_respects_nullability() {
        let plain = FieldDescriptor::standalone(FieldDef::of::<i16>("n"));
        assert_eq!(plain.implicit_default(), Some(FieldValue::Short(0)));

        let nullable = FieldDescriptor::standalone(FieldDef::of::<Option<i16>>("n"));
        assert_eq!(nullable.implicit_default(), None);
    }

    #[test]
    fn pattern_only_compiles_for_temporal_fields() {
        let text = FieldDescriptor::standalone(
            FieldDef::of::<String>("label").with_pattern("yyyy"),
        );
        assert!(text.temporal_pattern().unwrap().is_none());

        let date = FieldDescriptor::standalone(
            FieldDef::of::<NaiveDate>("day").with_pattern("yyyy/MM/dd"),
        );
        assert!(date.temporal_pattern().unwrap().is_some());

        let empty = FieldDescriptor::standalone(FieldDef::of::<NaiveDate>("day").with_pattern(""));
        assert!(empty.temporal_pattern().unwrap().is_none());
    }

    #[test]
    fn bad_pattern_is_reported_with_field() {
        let field = FieldDescriptor::standalone(
            FieldDef::of::<NaiveDate>("day").with_pattern("yyyy-MM-dd HH"),
        );
        let err = field.temporal_pattern().unwrap_err();
        assert!(matches!(err, CoercionError::InvalidPattern { ref field, .. } if field == "day"));
    }

    #[test]
    fn ignored_fields_carry_other_tag() {
        let def = FieldDef::ignored("blob", "Vec<u8>");
        assert!(def.meta().ignore);
        assert_eq!(def.tag(), TypeTag::Other("Vec<u8>"));
    }
}
