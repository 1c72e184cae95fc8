//! Check a JSON value against a schema.
//!
//! Semantics follow the usual validation-library conventions:
//! - a missing object key is fine only when the field is Optional;
//! - Optional does not admit `null`, Nullable does;
//! - strict objects reject unknown keys, others ignore them;
//! - Date takes an RFC 3339 date-time or a `YYYY-MM-DD` string.
//!
//! The first failure wins; its path is a JSON pointer into `value`.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::error::ValidationError;
use crate::schema::{Literal, Schema};

pub fn validate(schema: &Schema, value: &Value) -> Result<(), ValidationError> {
    check(schema, value, "")
}

fn check(schema: &Schema, value: &Value, path: &str) -> Result<(), ValidationError> {
    let mismatch = |expected: &str| -> Result<(), ValidationError> {
        Err(ValidationError::new(path, format!("expected {expected}, found {}", type_name(value))))
    };

    match schema {
        Schema::Object { fields, strict } => {
            let Some(map) = value.as_object() else { return mismatch("object") };
            for (key, ty) in fields {
                let child = pointer(path, key);
                match map.get(key) {
                    Some(v) => check(ty, v, &child)?,
                    None if ty.is_optional() => {}
                    None => return Err(ValidationError::new(&child, "required field is missing")),
                }
            }
            if *strict {
                if let Some(extra) = map.keys().find(|k| !fields.contains_key(*k)) {
                    return Err(ValidationError::new(path, format!("unrecognized key `{extra}`")));
                }
            }
            Ok(())
        }
        Schema::Optional { inner } => check(inner, value, path),
        Schema::Nullable { inner } => {
            if value.is_null() { Ok(()) } else { check(inner, value, path) }
        }
        Schema::String => if value.is_string() { Ok(()) } else { mismatch("string") },
        Schema::Number => if value.is_number() { Ok(()) } else { mismatch("number") },
        Schema::Boolean => if value.is_boolean() { Ok(()) } else { mismatch("boolean") },
        Schema::Date => match value.as_str() {
            Some(s) if is_date(s) => Ok(()),
            Some(s) => Err(ValidationError::new(path, format!("`{s}` is not a date"))),
            None => mismatch("date string"),
        },
        Schema::Array { item } => {
            let Some(items) = value.as_array() else { return mismatch("array") };
            for (i, v) in items.iter().enumerate() {
                check(item, v, &pointer(path, &i.to_string()))?;
            }
            Ok(())
        }
        Schema::Union { members } => {
            if members.iter().any(|m| check(m, value, path).is_ok()) {
                Ok(())
            } else {
                Err(ValidationError::new(path, "no union member matched"))
            }
        }
        Schema::Literal { value: lit } => {
            let matched = match lit {
                Literal::Bool(b) => value.as_bool() == Some(*b),
                Literal::Number(n) => value.as_f64() == Some(n.0),
                Literal::String(s) => value.as_str() == Some(s.as_str()),
            };
            if matched { Ok(()) } else { mismatch(&format!("literal {}", literal_text(lit))) }
        }
        Schema::Enum { values } => match value.as_str() {
            Some(s) if values.iter().any(|v| v == s) => Ok(()),
            Some(s) => Err(ValidationError::new(path, format!("`{s}` is not one of {values:?}"))),
            None => mismatch("string"),
        },
        Schema::Record { value: ty } => {
            let Some(map) = value.as_object() else { return mismatch("object") };
            for (key, v) in map {
                check(ty, v, &pointer(path, key))?;
            }
            Ok(())
        }
        Schema::Never => Err(ValidationError::new(path, "no value is allowed here")),
    }
}

// ------------------------------- Helpers ---------------------------------- //

fn is_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn pointer(base: &str, token: &str) -> String {
    format!("{base}/{}", token.replace('~', "~0").replace('/', "~1"))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn literal_text(lit: &Literal) -> String {
    match lit {
        Literal::Bool(b) => b.to_string(),
        Literal::Number(n) => n.0.to_string(),
        Literal::String(s) => format!("{s:?}"),
    }
}

// ------------------------------- Tests ------------------------------------ //
