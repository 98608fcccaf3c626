pub mod api;
pub mod builder;
pub mod combinators;
pub mod containers;
pub mod error;
pub mod options;
mod primitives;
pub mod resolver;
pub mod schema;
pub mod serialization;
pub mod utils;

pub use api::{convert, convert_json_str, convert_yaml_str, json_schema_to_zod, Conversion};
pub use builder::ZodBuilder;
pub use error::{BuildError, ResolveError, ZodGenError};
pub use options::{Options, ZodVersion};
