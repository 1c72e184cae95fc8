//! Reflective schema tree.
//!
//! A `Schema` is the static shape description of an entity: what kind each
//! node is, the wrapped child of Optional/Nullable/Array, the ordered field
//! mapping of an Object and the member list of a Union. Nothing here knows
//! how to validate values; see `validate`.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schema {
    Object {
        fields: IndexMap<String, Schema>, // declaration order is significant
        #[serde(default, skip_serializing_if = "is_false")]
        strict: bool,                     // reject unknown keys on validation
    },
    String,
    Number,
    Boolean,
    Date,
    Array { item: Box<Schema> },
    Union { members: Vec<Schema> },
    Optional { inner: Box<Schema> },
    Nullable { inner: Box<Schema> },
    Literal { value: Literal },
    Enum { values: Vec<String> },
    Record { value: Box<Schema> },
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(OrderedFloat<f64>),
    String(String),
}

/// Kind tag without payload, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Object,
    String,
    Number,
    Boolean,
    Date,
    Array,
    Union,
    Optional,
    Nullable,
    Literal,
    Enum,
    Record,
    Never,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Kind::Object => "object",
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Date => "date",
            Kind::Array => "array",
            Kind::Union => "union",
            Kind::Optional => "optional",
            Kind::Nullable => "nullable",
            Kind::Literal => "literal",
            Kind::Enum => "enum",
            Kind::Record => "record",
            Kind::Never => "never",
        };
        f.write_str(s)
    }
}

fn is_false(b: &bool) -> bool { !*b }

// ------------------------------ Constructors ------------------------------ //

impl Schema {
    /// Non-strict object from `(name, schema)` pairs, order preserved.
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Schema::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            strict: false,
        }
    }

    pub fn strict_object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        let mut out = Schema::object(fields);
        if let Schema::Object { strict, .. } = &mut out {
            *strict = true;
        }
        out
    }

    pub fn array(item: Schema) -> Self { Schema::Array { item: Box::new(item) } }
    pub fn union(members: Vec<Schema>) -> Self { Schema::Union { members } }
    pub fn record(value: Schema) -> Self { Schema::Record { value: Box::new(value) } }
    pub fn literal(value: Literal) -> Self { Schema::Literal { value } }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::Enum { values: values.into_iter().map(Into::into).collect() }
    }

    /// Wrap in Optional unless already optional.
    pub fn optional(self) -> Self {
        match self {
            Schema::Optional { .. } => self,
            other => Schema::Optional { inner: Box::new(other) },
        }
    }

    pub fn nullable(self) -> Self {
        match self {
            Schema::Nullable { .. } => self,
            other => Schema::Nullable { inner: Box::new(other) },
        }
    }
}

// ------------------------------- Inspection ------------------------------- //

impl Schema {
    pub fn kind(&self) -> Kind {
        match self {
            Schema::Object { .. } => Kind::Object,
            Schema::String => Kind::String,
            Schema::Number => Kind::Number,
            Schema::Boolean => Kind::Boolean,
            Schema::Date => Kind::Date,
            Schema::Array { .. } => Kind::Array,
            Schema::Union { .. } => Kind::Union,
            Schema::Optional { .. } => Kind::Optional,
            Schema::Nullable { .. } => Kind::Nullable,
            Schema::Literal { .. } => Kind::Literal,
            Schema::Enum { .. } => Kind::Enum,
            Schema::Record { .. } => Kind::Record,
            Schema::Never => Kind::Never,
        }
    }

    /// Peel Optional/Nullable wrappers (any depth, any order).
    pub fn unwrapped(&self) -> &Schema {
        let mut cur = self;
        while let Schema::Optional { inner } | Schema::Nullable { inner } = cur {
            cur = inner.as_ref();
        }
        cur
    }

    pub fn is_optional(&self) -> bool {
        let mut cur = self;
        loop {
            match cur {
                Schema::Optional { .. } => return true,
                Schema::Nullable { inner } => cur = inner.as_ref(),
                _ => return false,
            }
        }
    }

    pub fn fields(&self) -> Option<&IndexMap<String, Schema>> {
        match self {
            Schema::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Members of a union whose every member (after unwrapping) is an object.
    pub fn object_members(&self) -> Option<Vec<&IndexMap<String, Schema>>> {
        let Schema::Union { members } = self else { return None };
        if members.is_empty() { return None; }
        members.iter().map(|m| m.unwrapped().fields()).collect()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_tagged_documents() {
        let doc = json!({
            "kind": "object",
            "fields": {
                "title": { "kind": "string" },
                "tags": { "kind": "array", "item": { "kind": "string" } },
                "status": { "kind": "enum", "values": ["draft", "live"] },
                "score": { "kind": "optional", "inner": { "kind": "literal", "value": 3 } }
            }
        });
        let schema: Schema = serde_json::from_value(doc).unwrap();
        let fields = schema.fields().unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["title", "tags", "status", "score"]);
        assert_eq!(fields["tags"], Schema::array(Schema::String));
        assert_eq!(
            fields["score"],
            Schema::literal(Literal::Number(OrderedFloat(3.0))).optional()
        );
    }

    #[test]
    fn unwrap_peels_mixed_wrappers() {
        let s = Schema::Date.nullable().optional();
        assert_eq!(s.unwrapped(), &Schema::Date);
        assert!(s.is_optional());
        assert!(!Schema::Date.nullable().is_optional());
        // no double wrapping
        assert_eq!(Schema::String.optional().optional(), Schema::String.optional());
    }

    #[test]
    fn object_members_requires_all_objects() {
        let a = Schema::object([("id", Schema::String)]);
        let b = Schema::object([("id", Schema::Number)]).nullable();
        assert_eq!(Schema::union(vec![a.clone(), b]).object_members().map(|m| m.len()), Some(2));
        assert!(Schema::union(vec![a, Schema::String]).object_members().is_none());
        assert!(Schema::union(vec![]).object_members().is_none());
    }
}
