use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::{any::TypeId, sync::Arc};

use crate::resolver;
use crate::schema::{FieldDescriptor, FieldInclusionPolicy, Record};

type SchemaKey = (TypeId, FieldInclusionPolicy);

static SCHEMAS: Lazy<DashMap<SchemaKey, Arc<[FieldDescriptor]>>> = Lazy::new(DashMap::new);

/// Resolved fields of `R` under `policy`, derived on first use and shared for
/// the life of the process.
///
/// Concurrent first calls may each derive the list; the first insert wins and
/// every caller gets that same allocation.
pub fn fields_of<R: Record>(policy: FieldInclusionPolicy) -> Arc<[FieldDescriptor]> {
    let key = (TypeId::of::<R>(), policy);
    if let Some(hit) = SCHEMAS.get(&key) {
        return Arc::clone(hit.value());
    }

    let record_type = R::record_type();
    let derived: Arc<[FieldDescriptor]> = resolver::resolve(record_type, policy).into();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        record = record_type.name(),
        ?policy,
        fields = derived.len(),
        "derived record schema"
    );

    Arc::clone(SCHEMAS.entry(key).or_insert(derived).value())
}

/// Number of cached (type, policy) schemas.
pub fn cached_schemas() -> usize {
    SCHEMAS.len()
}
