//! Flattener: collapse nested object fields into underscore-joined keys.
//!
//! `{a: string, b: {c: number}}` becomes `{"a": .., "b_c": ..}`, each key
//! carrying the declared leaf, its filter type and the path it came from.
//!
//! Policies:
//! - Optional/Nullable wrappers are transparent (no path segment).
//! - A union whose members are all objects is walked member by member under
//!   the same prefix; members agreeing on a key merge, members disagreeing
//!   are a schema-definition error.
//! - Recursion is bounded only when `depth_limit` is set; past the bound a
//!   nested object is kept as an opaque leaf and reported.
//! - Two distinct field paths landing on the same key are resolved by
//!   `CollisionPolicy`.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::query::derive_query_type;
use crate::schema::{Kind, Schema};

const SEPARATOR: &str = "_";

// ------------------------------- Options ---------------------------------- //

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// fail with `PathCollision`
    #[default]
    Reject,
    /// keep the later path's leaf (at the earlier key position) and warn
    LastWins,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    /// Object nesting levels to descend; `None` is unbounded.
    pub depth_limit: Option<usize>,
    pub on_collision: CollisionPolicy,
}

// ------------------------------- Output ----------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathStep {
    Field(String),
    /// index into a union's member list
    Member(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatField {
    pub path: Vec<PathStep>,
    pub leaf: Schema,   // as declared, wrappers included
    pub query: Schema,
    /// object kept whole because the depth limit was hit
    #[serde(skip_serializing_if = "is_false")]
    pub opaque: bool,
}

fn is_false(b: &bool) -> bool { !*b }

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatMap {
    pub fields: IndexMap<String, FlatField>,
    /// keys recorded as opaque objects because the depth limit was hit
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub truncated: Vec<String>,
}

impl FlatMap {
    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
    pub fn get(&self, key: &str) -> Option<&FlatField> { self.fields.get(key) }
    pub fn keys(&self) -> impl Iterator<Item = &String> { self.fields.keys() }

    /// Follow the recorded path of `key` back into `root`. For an opaque key
    /// merged from several union members this is the first member's node.
    pub fn resolve<'s>(&self, root: &'s Schema, key: &str) -> Option<&'s Schema> {
        let field = self.fields.get(key)?;
        let mut cur = root;
        for step in &field.path {
            cur = match (step, cur.unwrapped()) {
                (PathStep::Field(name), Schema::Object { fields, .. }) => fields.get(name)?,
                (PathStep::Member(i), Schema::Union { members }) => members.get(*i)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Object of every key to its declared leaf.
    pub fn to_schema(&self) -> Schema {
        Schema::object(self.fields.iter().map(|(k, f)| (k.clone(), f.leaf.clone())))
    }
}

impl IntoIterator for FlatMap {
    type Item = (String, FlatField);
    type IntoIter = indexmap::map::IntoIter<String, FlatField>;
    fn into_iter(self) -> Self::IntoIter { self.fields.into_iter() }
}

// ------------------------------- Front API -------------------------------- //

pub fn flatten(schema: &Schema, options: &FlattenOptions) -> Result<FlatMap, SchemaError> {
    let fields = root_fields(schema)?;
    let mut flattener = Flattener { options, out: FlatMap::default(), shapes: IndexMap::new() };
    flattener.walk(fields, "", &mut Vec::new(), 0)?;
    debug!("flattened {} keys ({} truncated)", flattener.out.len(), flattener.out.truncated.len());
    Ok(flattener.out)
}

pub(crate) fn root_fields(schema: &Schema) -> Result<&IndexMap<String, Schema>, SchemaError> {
    schema.fields().ok_or(SchemaError::InvalidSchemaKind {
        expected: Kind::Object,
        found: schema.kind(),
    })
}

// ------------------------------- Walk ------------------------------------- //

struct Flattener<'o> {
    options: &'o FlattenOptions,
    out: FlatMap,
    /// field-name path → descended into (true) or recorded as a leaf (false)
    shapes: IndexMap<Vec<String>, bool>,
}

impl Flattener<'_> {
    fn exhausted(&self, depth: usize) -> bool {
        matches!(self.options.depth_limit, Some(limit) if depth >= limit)
    }

    fn walk(
        &mut self,
        fields: &IndexMap<String, Schema>,
        prefix: &str,
        trail: &mut Vec<PathStep>,
        depth: usize,
    ) -> Result<(), SchemaError> {
        for (key, child) in fields {
            let path = format!("{prefix}{key}");
            trail.push(PathStep::Field(key.clone()));

            let groups = nested_groups(child.unwrapped());
            self.note_shape(trail, &path, groups.is_some())?;

            match groups {
                Some(groups) if !self.exhausted(depth) => {
                    let next = format!("{path}{SEPARATOR}");
                    for (member, fields) in groups {
                        if let Some(i) = member { trail.push(PathStep::Member(i)); }
                        self.walk(fields, &next, trail, depth + 1)?;
                        if member.is_some() { trail.pop(); }
                    }
                }
                Some(_) => {
                    warn!("depth limit reached at `{path}`; keeping it as an opaque object");
                    self.record(path, trail, child, true)?;
                }
                None => self.record(path, trail, child, false)?,
            }

            trail.pop();
        }
        Ok(())
    }

    /// Union members may only agree on whether a field is an object.
    fn note_shape(&mut self, trail: &[PathStep], key: &str, nested: bool) -> Result<(), SchemaError> {
        let names: Vec<String> = field_names(trail).into_iter().map(str::to_owned).collect();
        match self.shapes.get(&names) {
            Some(&seen) if seen != nested => Err(SchemaError::UnionConflict { key: key.to_string() }),
            Some(_) => Ok(()),
            None => {
                self.shapes.insert(names, nested);
                Ok(())
            }
        }
    }

    fn record(
        &mut self,
        key: String,
        trail: &[PathStep],
        child: &Schema,
        opaque: bool,
    ) -> Result<(), SchemaError> {
        let mut field = FlatField {
            path: trail.to_vec(),
            leaf: child.clone(),
            query: derive_query_type(child),
            opaque,
        };

        if let Some(existing) = self.out.fields.get(&key) {
            if field_names(&existing.path) == field_names(&field.path) {
                // reached again through another union member
                if existing.leaf.unwrapped() == field.leaf.unwrapped() {
                    debug!("union members agree on `{key}`");
                    return Ok(());
                }
                if !(existing.opaque && field.opaque) {
                    return Err(SchemaError::UnionConflict { key });
                }
                let leaf = merge_opaque(&existing.leaf, &field.leaf);
                debug!("merged opaque union members at `{key}`");
                field = FlatField {
                    path: existing.path.clone(),
                    query: derive_query_type(&leaf),
                    leaf,
                    opaque: true,
                };
            } else {
                let first = dotted(&existing.path);
                match self.options.on_collision {
                    CollisionPolicy::Reject => {
                        return Err(SchemaError::PathCollision { key, first, second: dotted(&field.path) });
                    }
                    CollisionPolicy::LastWins => {
                        warn!("`{}` replaces `{first}` at flattened key `{key}`", dotted(&field.path));
                    }
                }
            }
        }

        if field.opaque {
            if !self.out.truncated.contains(&key) {
                self.out.truncated.push(key.clone());
            }
        } else {
            self.out.truncated.retain(|k| k != &key);
        }
        self.out.fields.insert(key, field);
        Ok(())
    }
}

/// Union of the objects two members kept whole at the same key.
fn merge_opaque(a: &Schema, b: &Schema) -> Schema {
    let mut members: Vec<Schema> = Vec::new();
    for side in [a, b] {
        let parts = match side.unwrapped() {
            Schema::Union { members } => members.clone(),
            other => vec![other.clone()],
        };
        for part in parts {
            if !members.contains(&part) {
                members.push(part);
            }
        }
    }
    Schema::union(members)
}

type Group<'s> = (Option<usize>, &'s IndexMap<String, Schema>);

/// Field groups to descend into: the object itself, or each member of a
/// union of objects. `None` means the node is a leaf.
fn nested_groups(node: &Schema) -> Option<Vec<Group<'_>>> {
    match node {
        Schema::Object { fields, .. } => Some(vec![(None, fields)]),
        Schema::Union { .. } => node
            .object_members()
            .map(|members| members.into_iter().enumerate().map(|(i, f)| (Some(i), f)).collect()),
        _ => None,
    }
}

fn field_names(path: &[PathStep]) -> Vec<&str> {
    path.iter()
        .filter_map(|step| match step {
            PathStep::Field(name) => Some(name.as_str()),
            PathStep::Member(_) => None,
        })
        .collect()
}

fn dotted(path: &[PathStep]) -> String {
    field_names(path).join(".")
}

// ------------------------------- Tests ------------------------------------ //
