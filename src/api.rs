use crate::error::{ResolveError, ZodGenError};
use crate::options::Options;
use crate::resolver::Resolver;
use log::debug;
use serde_json::Value;
use std::fmt::Display;

/// The result of a successful conversion.
///
/// `diagnostics` lists every fragment that was replaced by `z.any()`, either
/// because it was malformed (non-strict mode) or because it uses a construct
/// the converter does not translate, such as a reference to another document.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub expression: String,
    pub diagnostics: Vec<ResolveError>,
}

impl Conversion {
    /// True when nothing in the schema had to be degraded.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Converts a JSON Schema document into a Zod expression and the diagnostics
/// collected on the way.
///
/// # Errors
///
/// In strict mode, returns the first structural error found in the schema.
pub fn convert(schema: &Value, options: &Options) -> Result<Conversion, ZodGenError> {
    let mut resolver = Resolver::new(schema, options);
    let builder = resolver.resolve_document()?;
    let expression = builder.render(options.zod_version);
    let diagnostics = resolver.into_diagnostics();
    debug!(
        "converted schema for zod {} with {} diagnostic(s)",
        options.zod_version,
        diagnostics.len()
    );
    Ok(Conversion {
        expression,
        diagnostics,
    })
}

/// Converts a JSON Schema document into the source text of a Zod expression.
///
/// # Errors
///
/// In strict mode, returns the first structural error found in the schema.
pub fn json_schema_to_zod(schema: &Value, options: &Options) -> Result<String, ZodGenError> {
    convert(schema, options).map(|conversion| conversion.expression)
}

/// Parses `source` as JSON, then converts it.
///
/// # Errors
///
/// Returns `ZodGenError::InvalidInput` if `source` is not JSON, or any error
/// `convert` returns.
pub fn convert_json_str(source: &str, options: &Options) -> Result<Conversion, ZodGenError> {
    let schema: Value = serde_json::from_str(source).map_err(|err| ZodGenError::InvalidInput {
        reason: err.to_string(),
    })?;
    convert(&schema, options)
}

/// Parses `source` as YAML, then converts it.
///
/// # Errors
///
/// Returns `ZodGenError::InvalidInput` if `source` is not YAML representable
/// as JSON, or any error `convert` returns.
pub fn convert_yaml_str(source: &str, options: &Options) -> Result<Conversion, ZodGenError> {
    let schema: Value = serde_yaml::from_str(source).map_err(|err| ZodGenError::InvalidInput {
        reason: err.to_string(),
    })?;
    convert(&schema, options)
}
