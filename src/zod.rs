//! Render a schema as a Zod expression.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{Literal, Schema};

static JS_IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex")
});

pub fn render_zod(schema: &Schema) -> String {
    let mut out = String::new();
    write_schema(&mut out, schema, 0);
    out
}

/// `export const <name>Schema = ...;` plus the inferred type alias.
pub fn render_zod_module(items: &[(&str, &Schema)]) -> String {
    let mut out = String::from("import { z } from \"zod\";\n");
    for (name, schema) in items {
        out.push_str(&format!(
            "\nexport const {name}Schema = {};\nexport type {name} = z.infer<typeof {name}Schema>;\n",
            render_zod(schema)
        ));
    }
    out
}

fn write_schema(out: &mut String, schema: &Schema, indent: usize) {
    match schema {
        Schema::Object { fields, strict } => {
            if fields.is_empty() {
                out.push_str("z.object({})");
            } else {
                out.push_str("z.object({\n");
                for (key, ty) in fields {
                    push_indent(out, indent + 1);
                    out.push_str(&property_key(key));
                    out.push_str(": ");
                    write_schema(out, ty, indent + 1);
                    out.push_str(",\n");
                }
                push_indent(out, indent);
                out.push_str("})");
            }
            if *strict {
                out.push_str(".strict()");
            }
        }
        Schema::String => out.push_str("z.string()"),
        Schema::Number => out.push_str("z.number()"),
        Schema::Boolean => out.push_str("z.boolean()"),
        Schema::Date => out.push_str("z.coerce.date()"),
        Schema::Array { item } => {
            write_schema(out, item, indent);
            out.push_str(".array()");
        }
        // z.union needs at least two options
        Schema::Union { members } if members.is_empty() => out.push_str("z.never()"),
        Schema::Union { members } if members.len() == 1 => write_schema(out, &members[0], indent),
        Schema::Union { members } => {
            out.push_str("z.union([");
            for (i, m) in members.iter().enumerate() {
                if i > 0 { out.push_str(", "); }
                write_schema(out, m, indent);
            }
            out.push_str("])");
        }
        Schema::Optional { inner } => {
            write_schema(out, inner, indent);
            out.push_str(".optional()");
        }
        Schema::Nullable { inner } => {
            write_schema(out, inner, indent);
            out.push_str(".nullable()");
        }
        Schema::Literal { value } => {
            let text = match value {
                Literal::Bool(b) => b.to_string(),
                Literal::Number(n) => n.0.to_string(),
                Literal::String(s) => js_string(s),
            };
            out.push_str(&format!("z.literal({text})"));
        }
        Schema::Enum { values } if values.is_empty() => out.push_str("z.never()"),
        Schema::Enum { values } => {
            let items = values.iter().map(|v| js_string(v)).collect::<Vec<_>>().join(", ");
            out.push_str(&format!("z.enum([{items}])"));
        }
        Schema::Record { value } => {
            out.push_str("z.record(z.string(), ");
            write_schema(out, value, indent);
            out.push(')');
        }
        Schema::Never => out.push_str("z.never()"),
    }
}

fn property_key(key: &str) -> String {
    if JS_IDENT.is_match(key) { key.to_string() } else { js_string(key) }
}

fn js_string(s: &str) -> String {
    // JSON string literals are valid JS string literals
    serde_json::Value::from(s).to_string()
}

fn push_indent(out: &mut String, level: usize) {
    out.push_str(&"  ".repeat(level));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::derive_query_type;

    #[test]
    fn renders_nested_object() {
        let schema = Schema::strict_object([
            ("name", Schema::String),
            ("created-at", Schema::Date.optional()),
            ("tags", Schema::array(Schema::enumeration(["a", "b"])).nullable()),
        ]);
        let expected = "z.object({\n  name: z.string(),\n  \"created-at\": z.coerce.date().optional(),\n  tags: z.enum([\"a\", \"b\"]).array().nullable(),\n}).strict()";
        assert_eq!(render_zod(&schema), expected);
    }

    #[test]
    fn renders_number_query_type() {
        let rendered = render_zod(&derive_query_type(&Schema::Number));
        assert!(rendered.starts_with("z.union([z.number(), z.number().array(), z.object({"));
        assert!(rendered.contains("gte: z.number().optional(),"));
        assert!(rendered.ends_with("}).strict()])"));
    }

    #[test]
    fn degenerate_unions_and_enums() {
        assert_eq!(render_zod(&Schema::union(vec![])), "z.never()");
        assert_eq!(render_zod(&Schema::union(vec![Schema::String])), "z.string()");
        assert_eq!(
            render_zod(&Schema::union(vec![Schema::String, Schema::Number]).optional()),
            "z.union([z.string(), z.number()]).optional()"
        );
        assert_eq!(render_zod(&Schema::enumeration(Vec::<String>::new())), "z.never()");
    }

    #[test]
    fn module_exports_schema_and_type() {
        let schema = Schema::object([("ok", Schema::Boolean)]);
        let module = render_zod_module(&[("Flag", &schema)]);
        assert!(module.starts_with("import { z } from \"zod\";\n"));
        assert!(module.contains("export const FlagSchema = z.object({\n  ok: z.boolean(),\n});"));
        assert!(module.contains("export type Flag = z.infer<typeof FlagSchema>;"));
    }
}
