use thiserror::Error;

use crate::schema::Kind;

/// Schema-definition defects. Reported once; nothing here is transient.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("expected {expected} schema, found {found}")]
    InvalidSchemaKind { expected: Kind, found: Kind },

    #[error("fields `{first}` and `{second}` both flatten to `{key}`")]
    PathCollision { key: String, first: String, second: String },

    #[error("union members disagree on the type of `{key}`")]
    UnionConflict { key: String },

    #[error("no field named `{field}`")]
    UnknownField { field: String },

    #[error("at JSON path {path} → {message}")]
    Decode { path: String, message: String },
}

/// A value rejected by a schema, with the JSON path of the offending node.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{path}: {reason}")]
pub struct ValidationError {
    pub path: String,
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(path: &str, reason: impl Into<String>) -> Self {
        let path = if path.is_empty() { "/".to_string() } else { path.to_string() };
        Self { path, reason: reason.into() }
    }
}
