//! Fields eligible for relational "populate" expansion.

use indexmap::{IndexMap, IndexSet};

use crate::error::SchemaError;
use crate::flatten::root_fields;
use crate::schema::Schema;

const ID_FIELD: &str = "id";

/// Top-level fields of the *unflattened* schema that reference another
/// entity: an object with an `id` field, or a union whose every member is
/// one. Declaration order is kept.
pub fn select_populate_fields(schema: &Schema) -> Result<IndexSet<String>, SchemaError> {
    let fields = root_fields(schema)?;
    Ok(fields
        .iter()
        .filter(|(_, ty)| is_populatable(ty.unwrapped()))
        .map(|(name, _)| name.clone())
        .collect())
}

fn is_populatable(ty: &Schema) -> bool {
    fn has_id(fields: &IndexMap<String, Schema>) -> bool { fields.contains_key(ID_FIELD) }

    match ty {
        Schema::Object { fields, .. } => has_id(fields),
        Schema::Union { .. } => ty
            .object_members()
            .is_some_and(|members| members.into_iter().all(has_id)),
        _ => false,
    }
}
