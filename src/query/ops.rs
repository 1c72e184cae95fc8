//! Relational operator objects, one fixed shape per comparable leaf kind.
//! Every operator is optional and independent of the others; the shapes are
//! syntactic descriptors only (`gt: 10, lt: 5` is accepted).

use crate::schema::Schema;

pub const STRING_OPS: [&str; 5] = ["in", "notIn", "contains", "startsWith", "endsWith"];
pub const NUMBER_OPS: [&str; 6] = ["in", "notIn", "gt", "gte", "lt", "lte"];
pub const DATE_OPS: [&str; 6] = NUMBER_OPS;

/// `in`/`notIn` take a list of the leaf, the rest take a single leaf.
fn operators(names: &[&str], leaf: &Schema) -> Schema {
    Schema::strict_object(names.iter().map(|&name| {
        let ty = match name {
            "in" | "notIn" => Schema::array(leaf.clone()),
            _ => leaf.clone(),
        };
        (name, ty.optional())
    }))
}

pub fn string_operators() -> Schema { operators(&STRING_OPS, &Schema::String) }
pub fn number_operators() -> Schema { operators(&NUMBER_OPS, &Schema::Number) }
pub fn date_operators() -> Schema { operators(&DATE_OPS, &Schema::Date) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_operators_shape() {
        let ops = string_operators();
        let fields = ops.fields().unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), STRING_OPS);
        assert_eq!(fields["in"], Schema::array(Schema::String).optional());
        assert_eq!(fields["contains"], Schema::String.optional());
        assert!(matches!(ops, Schema::Object { strict: true, .. }));
    }

    #[test]
    fn date_operators_mirror_number_operators() {
        let fields = date_operators().fields().unwrap().clone();
        assert_eq!(fields.keys().collect::<Vec<_>>(), NUMBER_OPS);
        assert_eq!(fields["notIn"], Schema::array(Schema::Date).optional());
        assert_eq!(fields["lte"], Schema::Date.optional());
    }
}
