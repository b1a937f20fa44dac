//! Field resolution: which fields of a record take part in mapping, and in
//! what order.

use std::iter;

use crate::overlay::{OverlayError, SchemaOverlay};
use crate::schema::{FieldDescriptor, FieldInclusionPolicy, RecordType};

/// Ordered, filtered descriptor list for `record_type` under `policy`.
///
/// With [`FieldInclusionPolicy::IncludesInherited`] the most distant ancestor
/// comes first and the record's own fields last. Duplicate names on different
/// levels stay separate descriptors. Ignored fields are dropped.
pub fn resolve(record_type: &'static RecordType, policy: FieldInclusionPolicy) -> Vec<FieldDescriptor> {
    retain_mapped(declared(record_type, policy))
}

/// Like [`resolve`], but with a configuration overlay applied before ignored
/// fields are dropped. A policy set in the overlay replaces `policy`.
pub fn resolve_with_overlay(
    record_type: &'static RecordType,
    policy: FieldInclusionPolicy,
    overlay: &SchemaOverlay,
) -> Result<Vec<FieldDescriptor>, OverlayError> {
    let policy = overlay.policy.unwrap_or(policy);
    let mut fields = declared(record_type, policy);
    overlay.apply(record_type.name(), &mut fields)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        record = record_type.name(),
        ?policy,
        overrides = overlay.fields.len(),
        "applied schema overlay"
    );

    Ok(retain_mapped(fields))
}

/// Levels taking part under `policy`, most distant ancestor first.
pub fn levels(record_type: &'static RecordType, policy: FieldInclusionPolicy) -> Vec<&'static RecordType> {
    match policy {
        FieldInclusionPolicy::OwnFields => vec![record_type],
        FieldInclusionPolicy::IncludesInherited => {
            let mut chain: Vec<_> = iter::successors(Some(record_type), |t| t.parent()).collect();
            chain.reverse();
            chain
        }
    }
}

/// Every declared field of the participating levels, ignored ones included.
fn declared(record_type: &'static RecordType, policy: FieldInclusionPolicy) -> Vec<FieldDescriptor> {
    levels(record_type, policy)
        .into_iter()
        .flat_map(|level| {
            level
                .fields()
                .iter()
                .enumerate()
                .map(move |(index, def)| FieldDescriptor::declared(level, index, def))
        })
        .collect()
}

fn retain_mapped(mut fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    fields.retain(|field| !field.is_ignored());
    fields
}
