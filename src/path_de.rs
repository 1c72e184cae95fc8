use serde::de::DeserializeOwned;

use crate::error::SchemaError;
use crate::schema::Schema;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, SchemaError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| SchemaError::Decode {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// Same as [`from_str_with_path`] for an already-parsed document.
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, SchemaError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| SchemaError::Decode {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn parse_schema(src: &str) -> Result<Schema, SchemaError> {
    from_str_with_path(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_is_a_decode_error() {
        let src = r#"{"kind": "object", "fields": {"author": {"kind": "object", "fields": {"id": {"kind": "uuid"}}}}}"#;
        let err = parse_schema(src).unwrap_err();
        let SchemaError::Decode { message, .. } = err else { panic!("expected decode error") };
        assert!(message.contains("unknown variant `uuid`"), "{message}");
    }

    #[test]
    fn parses_valid_document() {
        let src = r#"{"kind": "object", "strict": true, "fields": {"n": {"kind": "number"}}}"#;
        let schema = parse_schema(src).unwrap();
        assert_eq!(schema, Schema::strict_object([("n", Schema::Number)]));
    }

    #[test]
    fn demo_post_schema_derives() {
        use crate::{flatten, select_populate_fields, FlattenOptions};

        let schema = parse_schema(include_str!("../demos/post.schema.json")).unwrap();
        let flat = flatten(&schema, &FlattenOptions::default()).unwrap();
        assert_eq!(
            flat.keys().map(String::as_str).collect::<Vec<_>>(),
            [
                "id", "title", "views", "published", "publishedAt", "status",
                "author_id", "author_name", "author_profile_bio",
                "reviewer_id", "reviewer_team", "reviewer_bot",
            ]
        );
        let populate = select_populate_fields(&schema).unwrap();
        assert_eq!(populate.into_iter().collect::<Vec<_>>(), ["author", "reviewer"]);
    }
}
