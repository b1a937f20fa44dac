//! Schema overlays: per-deployment overrides of the declared column metadata,
//! loaded from YAML or JSON.
//!
//! ```yaml
//! policy: includes_inherited
//! fields:
//!   price: { column: "Unit Price", default: "0" }
//!   created: { pattern: "yyyy/MM/dd" }
//!   secret: { ignore: true }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sheetrow_common::CoercionError;

use crate::schema::{ColumnMeta, FieldDescriptor, FieldInclusionPolicy};

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("invalid overlay YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid overlay JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("overlay names unknown field `{name}` on record `{record}`")]
    UnknownField { record: String, name: String },

    #[error("overlay pattern {pattern:?} for field `{field}`: {reason}")]
    InvalidPattern {
        field: String,
        pattern: String,
        reason: String,
    },
}

/// Overrides for one field name. Unset entries keep the declared value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOverlay {
    /// Exclude the field. `false` never re-includes a declared-ignored field.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<FieldInclusionPolicy>,
    /// Keyed by field name; an entry applies to every level declaring that
    /// name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldOverlay>,
}

impl SchemaOverlay {
    pub fn from_yaml_reader<R: std::io::Read>(reader: R) -> Result<Self, OverlayError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, OverlayError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, OverlayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_yaml(&self) -> Result<String, OverlayError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.policy.is_none() && self.fields.is_empty()
    }

    /// Apply the overrides to `fields` in place, then check that every entry
    /// named a field and that every resulting temporal pattern compiles.
    pub(crate) fn apply(
        &self,
        record: &str,
        fields: &mut [FieldDescriptor],
    ) -> Result<(), OverlayError> {
        let known: BTreeSet<&str> = fields.iter().map(FieldDescriptor::name).collect();
        if let Some(name) = self.fields.keys().find(|name| !known.contains(name.as_str())) {
            return Err(OverlayError::UnknownField {
                record: record.to_string(),
                name: name.clone(),
            });
        }

        for field in fields.iter_mut() {
            let Some(entry) = self.fields.get(field.name()) else {
                continue;
            };
            entry.apply_to(field);
            if field.is_ignored() {
                continue;
            }
            if let Err(CoercionError::InvalidPattern {
                field,
                pattern,
                reason,
            }) = field.temporal_pattern()
            {
                return Err(OverlayError::InvalidPattern {
                    field,
                    pattern,
                    reason,
                });
            }
        }
        Ok(())
    }
}

impl FieldOverlay {
    fn apply_to(&self, field: &mut FieldDescriptor) {
        let meta = field.meta_mut();
        meta.ignore |= self.ignore;
        if self.column.is_some() || self.default.is_some() {
            let column = meta.column.get_or_insert_with(ColumnMeta::default);
            if let Some(name) = &self.column {
                column.name = Some(name.clone());
            }
            if let Some(default) = &self.default {
                column.default_value = Some(default.clone());
            }
        }
        if let Some(pattern) = &self.pattern {
            meta.pattern = Some(pattern.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::fixtures::{Base, Child};
    use crate::resolver::resolve_with_overlay;
    use crate::schema::{FieldKey, Record, RecordType};
    use std::sync::OnceLock;

    #[test]
    fn parses_yaml_overlay() {
        let overlay = SchemaOverlay::from_yaml_str(
            r#"
policy: own_fields
fields:
  id: { column: "ID", default: "-1" }
  name: { ignore: true }
"#,
        )
        .unwrap();
        assert_eq!(overlay.policy, Some(FieldInclusionPolicy::OwnFields));
        assert_eq!(overlay.fields["id"].column.as_deref(), Some("ID"));
        assert!(overlay.fields["name"].ignore);
        assert!(!overlay.fields["id"].ignore);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SchemaOverlay::from_yaml_str("fields:\n  id: { colum: ID }\n").unwrap_err();
        assert!(matches!(err, OverlayError::Yaml(_)));

        let err = SchemaOverlay::from_json_str(r#"{"polcy": "own_fields"}"#).unwrap_err();
        assert!(matches!(err, OverlayError::Json(_)));
    }

    #[test]
    fn yaml_round_trips() {
        let overlay = SchemaOverlay::from_json_str(
            r#"{"fields": {"score": {"column": "Points", "default": "10"}}}"#,
        )
        .unwrap();
        let yaml = overlay.to_yaml().unwrap();
        assert_eq!(SchemaOverlay::from_yaml_str(&yaml).unwrap(), overlay);
    }

    #[test]
    fn overrides_reach_descriptors() {
        let overlay = SchemaOverlay::from_yaml_str(
            "fields:\n  id: { column: ID, default: \"-1\" }\n  score: { ignore: true }\n",
        )
        .unwrap();
        let fields = resolve_with_overlay(
            Child::record_type(),
            FieldInclusionPolicy::IncludesInherited,
            &overlay,
        )
        .unwrap();
        let headers: Vec<_> = fields.iter().map(FieldDescriptor::column_name).collect();
        assert_eq!(headers, vec!["ID", "Name", "name"]);
        assert_eq!(fields[0].explicit_default(), Some("-1"));
    }

    #[test]
    fn name_entry_applies_to_every_level() {
        let overlay = SchemaOverlay::from_yaml_str("fields:\n  name: { column: Label }\n").unwrap();
        let fields = resolve_with_overlay(
            Child::record_type(),
            FieldInclusionPolicy::IncludesInherited,
            &overlay,
        )
        .unwrap();
        let labels = fields.iter().filter(|f| f.column_name() == "Label").count();
        assert_eq!(labels, 2);
    }

    #[test]
    fn overlay_cannot_unignore() {
        let overlay = SchemaOverlay::from_yaml_str("fields:\n  secret: { ignore: false }\n").unwrap();
        let fields =
            resolve_with_overlay(Base::record_type(), FieldInclusionPolicy::OwnFields, &overlay)
                .unwrap();
        assert!(fields.iter().all(|f| f.name() != "secret"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let overlay = SchemaOverlay::from_yaml_str("fields:\n  nope: { column: X }\n").unwrap();
        let err =
            resolve_with_overlay(Base::record_type(), FieldInclusionPolicy::OwnFields, &overlay)
                .unwrap_err();
        assert!(matches!(
            err,
            OverlayError::UnknownField { ref record, ref name } if record == "Base" && name == "nope"
        ));
    }

    #[test]
    fn unknown_field_names_record_without_fields() {
        #[derive(Debug, Default)]
        struct Marker;

        impl Record for Marker {
            fn record_type() -> &'static RecordType {
                static TYPE: OnceLock<RecordType> = OnceLock::new();
                TYPE.get_or_init(|| RecordType::new::<Marker>("Marker"))
            }

            fn field_value(&self, _key: FieldKey) -> Option<sheetrow_common::FieldValue> {
                None
            }

            fn set_field_value(
                &mut self,
                key: FieldKey,
                _value: Option<sheetrow_common::FieldValue>,
            ) -> Result<(), CoercionError> {
                Err(CoercionError::UnknownField {
                    record: "Marker",
                    index: key.index(),
                })
            }
        }

        let overlay = SchemaOverlay::from_yaml_str("fields:\n  id: { column: ID }\n").unwrap();
        let err =
            resolve_with_overlay(Marker::record_type(), FieldInclusionPolicy::OwnFields, &overlay)
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "overlay names unknown field `id` on record `Marker`"
        );
    }

    #[test]
    fn overlay_policy_wins() {
        let overlay = SchemaOverlay::from_yaml_str("policy: own_fields\n").unwrap();
        let fields = resolve_with_overlay(
            Child::record_type(),
            FieldInclusionPolicy::IncludesInherited,
            &overlay,
        )
        .unwrap();
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn empty_overlay() {
        assert!(SchemaOverlay::from_yaml_str("{}").unwrap().is_empty());
        assert!(!SchemaOverlay::from_yaml_str("policy: own_fields").unwrap().is_empty());
    }
}
