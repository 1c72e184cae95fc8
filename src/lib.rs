pub mod schema;
pub mod error;
pub mod flatten;
pub mod query;
pub mod populate;
pub mod combine;
pub mod options;
pub mod validate;
pub mod zod;
pub mod path_de;

pub use combine::{merge, pick};
pub use error::{SchemaError, ValidationError};
pub use flatten::{flatten, CollisionPolicy, FlatField, FlatMap, FlattenOptions, PathStep};
pub use options::options_schema;
pub use populate::select_populate_fields;
pub use query::{derive_query_type, query_schema};
pub use schema::{Kind, Literal, Schema};
pub use validate::validate;
pub use zod::{render_zod, render_zod_module};
