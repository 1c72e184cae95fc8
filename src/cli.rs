//! Minimal CLI: schema document → (flatten | query | options | populate | zod)
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use rayon::prelude::*;
use serde_json::Value;

use entity_schema::{
    flatten, options_schema, path_de, query_schema, render_zod_module, select_populate_fields,
    CollisionPolicy, FlattenOptions, Schema,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// derive flattened keys, query filters and order-by/populate options from an entity schema
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the flattened field map (key → leaf, query type, source path)
    Flatten(JsonOut),
    /// print the entity query (filter) schema
    Query(JsonOut),
    /// print the order-by/populate options schema
    Options(JsonOut),
    /// print the fields eligible for populate
    Populate(JsonOut),
    /// emit Zod source for the entity, its query and its options
    Zod(ZodOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to the schema inside each document (e.g. /definitions/post)
    #[arg(long)]
    json_pointer: Option<String>,

    /// object nesting levels to flatten (unbounded if omitted)
    #[arg(long)]
    depth_limit: Option<usize>,

    /// what to do when two fields flatten to the same key
    #[arg(long, value_enum, default_value_t = CollisionPolicy::Reject)]
    on_collision: CollisionPolicy,

    /// One or more schema documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct JsonOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ZodOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// entity type name used for the exported consts
    #[arg(long, default_value = "Entity")]
    name: String,

    /// output .ts file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            depth_limit: self.depth_limit,
            on_collision: self.on_collision,
        }
    }

    /// Load every input and run `apply` on each schema; files are independent
    /// so they are processed in parallel, results stay in input order.
    fn load_process<T, F>(&self, apply: F) -> Result<Vec<(PathBuf, T)>>
    where
        T: Send,
        F: Fn(&Schema, &FlattenOptions) -> Result<T> + Sync,
    {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let options = self.flatten_options();
        source_paths
            .into_par_iter()
            .map(|source_path| {
                let schema = self.load_schema(&source_path)?;
                let result = apply(&schema, &options)
                    .with_context(|| format!("in schema {}", source_path.display()))?;
                Ok((source_path, result))
            })
            .collect()
    }

    fn load_schema(&self, source_path: &Path) -> Result<Schema> {
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read source file {}", source_path.display()))?;
        let schema = match self.json_pointer.as_ref() {
            None => path_de::parse_schema(&source)?,
            Some(pointer) => {
                let document: Value = serde_json::from_str(&source)
                    .with_context(|| format!("failed to parse JSON source file {}", source_path.display()))?;
                let node = document
                    .pointer(pointer)
                    .ok_or_else(|| anyhow!("{pointer} not found in {}", source_path.display()))?;
                path_de::from_value_with_path(node.clone())?
            }
        };
        info!("loaded schema from {}", source_path.display());
        Ok(schema)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Flatten(target) => target.emit(|schema, options| {
                Ok(serde_json::to_value(flatten(schema, options)?)?)
            }),
            Command::Query(target) => target.emit(|schema, options| {
                Ok(serde_json::to_value(query_schema(schema, options)?)?)
            }),
            Command::Options(target) => target.emit(|schema, options| {
                Ok(serde_json::to_value(options_schema(schema, options)?)?)
            }),
            Command::Populate(target) => target.emit(|schema, _| {
                Ok(serde_json::to_value(select_populate_fields(schema)?)?)
            }),
            Command::Zod(target) => {
                let name = target.name.as_str();
                let modules = target.input_settings.load_process(|schema, options| {
                    let query = query_schema(schema, options)?;
                    let opts = options_schema(schema, options)?;
                    let query_name = format!("{name}Query");
                    let options_name = format!("{name}Options");
                    Ok(render_zod_module(&[
                        (name, schema),
                        (query_name.as_str(), &query),
                        (options_name.as_str(), &opts),
                    ]))
                })?;
                let src = match modules.as_slice() {
                    [(_, single)] => single.clone(),
                    _ => modules
                        .iter()
                        .map(|(path, module)| format!("// {}\n{module}", path.display()))
                        .collect::<Vec<_>>()
                        .join("\n"),
                };
                write_output(target.out.as_deref(), &src)
            }
        }
    }
}

impl JsonOut {
    fn emit<F>(&self, derive: F) -> Result<()>
    where
        F: Fn(&Schema, &FlattenOptions) -> Result<Value> + Sync,
    {
        let results = self.input_settings.load_process(derive)?;
        let output = match results.len() {
            0 => bail!("no input schemas"),
            1 => results.into_iter().map(|(_, v)| v).next().unwrap_or(Value::Null),
            _ => Value::Object(
                results
                    .into_iter()
                    .map(|(path, v)| (path.display().to_string(), v))
                    .collect(),
            ),
        };
        write_output(self.out.as_deref(), &serde_json::to_string_pretty(&output)?)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{src}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
