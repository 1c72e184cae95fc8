//! Order-by / populate / paging options accepted next to a query.

use log::debug;

use crate::combine::merge;
use crate::error::SchemaError;
use crate::flatten::{flatten, FlattenOptions};
use crate::populate::select_populate_fields;
use crate::schema::Schema;

pub const ORDER_DIRECTIONS: [&str; 2] = ["asc", "desc"];

/// `{orderBy?, populate?, limit?, offset?}`, strict.
///
/// `orderBy` ranges over the flattened keys. `populate` is left out
/// altogether when the entity has nothing to populate.
pub fn options_schema(entity: &Schema, options: &FlattenOptions) -> Result<Schema, SchemaError> {
    let flat = flatten(entity, options)?;
    let order_by = Schema::strict_object(
        flat.keys().map(|k| (k.clone(), Schema::enumeration(ORDER_DIRECTIONS).optional())),
    );
    let paging = Schema::strict_object([
        ("limit", Schema::Number.optional()),
        ("offset", Schema::Number.optional()),
    ]);

    let mut out = merge(&Schema::strict_object([("orderBy", order_by.optional())]), &paging)?;

    let populate = select_populate_fields(entity)?;
    if !populate.is_empty() {
        debug!("populate candidates: {populate:?}");
        let field = Schema::array(Schema::enumeration(populate)).optional();
        out = merge(&out, &Schema::strict_object([("populate", field)]))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use serde_json::json;

    fn article() -> Schema {
        Schema::object([
            ("title", Schema::String),
            ("stats", Schema::object([("views", Schema::Number)])),
            ("author", Schema::object([("id", Schema::String), ("name", Schema::String)])),
        ])
    }

    #[test]
    fn order_by_ranges_over_flattened_keys() {
        let schema = options_schema(&article(), &FlattenOptions::default()).unwrap();
        let fields = schema.fields().unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["orderBy", "limit", "offset", "populate"]);

        let ok = json!({
            "orderBy": {"stats_views": "desc", "author_name": "asc"},
            "populate": ["author"],
            "limit": 10
        });
        assert!(validate(&schema, &ok).is_ok());
        assert!(validate(&schema, &json!({"orderBy": {"stats": "asc"}})).is_err());
        assert!(validate(&schema, &json!({"orderBy": {"title": "up"}})).is_err());
        assert!(validate(&schema, &json!({"populate": ["title"]})).is_err());
    }

    #[test]
    fn populate_omitted_when_nothing_to_populate() {
        let flat = Schema::object([("title", Schema::String)]);
        let schema = options_schema(&flat, &FlattenOptions::default()).unwrap();
        assert!(!schema.fields().unwrap().contains_key("populate"));
        assert!(validate(&schema, &json!({"populate": []})).is_err());
    }
}
