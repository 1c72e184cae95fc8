//! Object-shape utilities: pick a subset of fields, merge two objects.

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::flatten::root_fields;
use crate::schema::Schema;

/// Keep only `keys`, in the object's own declaration order. With
/// `optional`, every kept field becomes Optional.
pub fn pick<S: AsRef<str>>(schema: &Schema, keys: &[S], optional: bool) -> Result<Schema, SchemaError> {
    let fields = root_fields(schema)?;
    let wanted: Vec<&str> = keys.iter().map(|k| k.as_ref()).collect();
    if let Some(missing) = wanted.iter().find(|k| !fields.contains_key(**k)) {
        return Err(SchemaError::UnknownField { field: missing.to_string() });
    }

    let picked: IndexMap<String, Schema> = fields
        .iter()
        .filter(|(name, _)| wanted.contains(&name.as_str()))
        .map(|(name, ty)| {
            let ty = if optional { ty.clone().optional() } else { ty.clone() };
            (name.clone(), ty)
        })
        .collect();

    Ok(Schema::Object { fields: picked, strict: is_strict(schema) })
}

/// Left-to-right merge. On a shared key the right definition wins but the
/// key keeps its left position; object config comes from `right`.
pub fn merge(left: &Schema, right: &Schema) -> Result<Schema, SchemaError> {
    let mut fields = root_fields(left)?.clone();
    for (name, ty) in root_fields(right)? {
        fields.insert(name.clone(), ty.clone());
    }
    Ok(Schema::Object { fields, strict: is_strict(right) })
}

fn is_strict(schema: &Schema) -> bool {
    matches!(schema, Schema::Object { strict: true, .. })
}
