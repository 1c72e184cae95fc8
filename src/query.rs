//! Per-leaf filter types and the entity-wide query schema.
pub mod ops;

use log::debug;

use crate::error::SchemaError;
use crate::flatten::{flatten, FlattenOptions};
use crate::schema::Schema;

pub use ops::{date_operators, number_operators, string_operators};

/// Map a leaf to the filter it accepts.
///
/// String/Number/Date leaves take the bare value, a list of values, or their
/// relational operator object. Booleans are matched exactly. Anything else
/// takes the value or a list of it. Optional/Nullable wrappers are peeled
/// first; optionality of the filter itself is the caller's concern.
pub fn derive_query_type(leaf: &Schema) -> Schema {
    let leaf = leaf.unwrapped();
    let ops = match leaf {
        Schema::String => Some(string_operators()),
        Schema::Number => Some(number_operators()),
        Schema::Date => Some(date_operators()),
        Schema::Boolean => return Schema::Boolean,
        _ => None,
    };
    let mut members = vec![leaf.clone(), Schema::array(leaf.clone())];
    members.extend(ops);
    Schema::union(members)
}

/// Strict object of every flattened key to its optional filter.
pub fn query_schema(entity: &Schema, options: &FlattenOptions) -> Result<Schema, SchemaError> {
    let flat = flatten(entity, options)?;
    debug!("query schema over {} flattened keys", flat.len());
    Ok(Schema::strict_object(
        flat.into_iter().map(|(key, field)| (key, field.query.optional())),
    ))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use serde_json::json;

    #[test]
    fn string_leaf_accepts_value_list_and_operators() {
        let q = derive_query_type(&Schema::String);
        assert!(validate(&q, &json!("ada")).is_ok());
        assert!(validate(&q, &json!(["ada", "grace"])).is_ok());
        assert!(validate(&q, &json!({"startsWith": "a", "notIn": ["b"]})).is_ok());
        assert!(validate(&q, &json!({})).is_ok());
        assert!(validate(&q, &json!({"gt": "a"})).is_err());
        assert!(validate(&q, &json!(3)).is_err());
    }

    #[test]
    fn number_leaf_operators() {
        let q = derive_query_type(&Schema::Number.optional());
        assert!(validate(&q, &json!(4)).is_ok());
        assert!(validate(&q, &json!([1, 2.5])).is_ok());
        // contradictory bounds are a downstream concern
        assert!(validate(&q, &json!({"gt": 10, "lt": 5})).is_ok());
        assert!(validate(&q, &json!({"contains": 1})).is_err());
        assert!(validate(&q, &json!({"gt": "10"})).is_err());
    }

    #[test]
    fn date_leaf_operators() {
        let q = derive_query_type(&Schema::Date);
        assert!(validate(&q, &json!("2024-05-01")).is_ok());
        assert!(validate(&q, &json!(["2024-05-01T10:00:00Z"])).is_ok());
        assert!(validate(&q, &json!({"gte": "2024-01-01", "in": ["2024-02-02"]})).is_ok());
        assert!(validate(&q, &json!({"startsWith": "2024"})).is_err());
        assert!(validate(&q, &json!("yesterday")).is_err());
    }

    #[test]
    fn boolean_leaf_is_exact() {
        assert_eq!(derive_query_type(&Schema::Boolean), Schema::Boolean);
        assert_eq!(derive_query_type(&Schema::Boolean.nullable()), Schema::Boolean);
        let q = derive_query_type(&Schema::Boolean);
        assert!(validate(&q, &json!([true])).is_err());
    }

    #[test]
    fn other_leaves_take_value_or_list() {
        let status = Schema::enumeration(["draft", "live"]);
        assert_eq!(
            derive_query_type(&status),
            Schema::union(vec![status.clone(), Schema::array(status.clone())])
        );
        let q = derive_query_type(&status);
        assert!(validate(&q, &json!(["draft"])).is_ok());
        assert!(validate(&q, &json!({"in": ["draft"]})).is_err());
    }

    #[test]
    fn query_schema_wraps_each_filter_optional() {
        let entity = Schema::object([
            ("name", Schema::String),
            ("address", Schema::object([("city", Schema::String)])),
            ("active", Schema::Boolean),
        ]);
        let q = query_schema(&entity, &FlattenOptions::default()).unwrap();
        let fields = q.fields().unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["name", "address_city", "active"]);
        assert!(fields.values().all(Schema::is_optional));

        assert!(validate(&q, &json!({})).is_ok());
        assert!(validate(&q, &json!({"address_city": {"contains": "Ber"}, "active": true})).is_ok());
        assert!(validate(&q, &json!({"address": {"city": "Berlin"}})).is_err());
    }
}
