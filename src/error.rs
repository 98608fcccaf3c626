use crate::schema::SchemaPath;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ZodGenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),

    #[error("Invalid schema input: {reason}")]
    #[diagnostic(
        code(zodgen::invalid_input),
        help("The schema text could not be parsed. Check that it is valid JSON or YAML.")
    )]
    InvalidInput { reason: String },

    #[error("Invalid options: {reason}")]
    #[diagnostic(
        code(zodgen::invalid_options),
        help("Recognized keys are zodVersion, name, naming, withoutDefaults, strict and discriminatedUnions.")
    )]
    InvalidOptions { reason: String },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Malformed schema at {path}: `{keyword}` must be {expected}, found {found}")]
    #[diagnostic(
        code(resolver::malformed_schema),
        help("The keyword's value does not have the shape JSON Schema requires.")
    )]
    MalformedSchema {
        path: SchemaPath,
        keyword: String,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid schema node at {path}: expected an object or a boolean, found {found}")]
    #[diagnostic(
        code(resolver::invalid_schema_node),
        help("Every schema position must hold a keyword object, `true` or `false`.")
    )]
    InvalidSchemaNode { path: SchemaPath, found: String },

    #[error("Unresolvable reference `{reference}` at {path}")]
    #[diagnostic(
        code(resolver::unresolvable_reference),
        help("Local references must be JSON pointers into this document, e.g. `#/definitions/Name`.")
    )]
    UnresolvableReference { path: SchemaPath, reference: String },

    #[error("Unsupported construct at {path}: {detail}")]
    #[diagnostic(
        code(resolver::unsupported_construct),
        severity(Warning),
        help("This fragment was converted to `z.any()`.")
    )]
    UnsupportedConstruct { path: SchemaPath, detail: String },

    #[error("Invalid modifier argument at {path}")]
    #[diagnostic(code(resolver::builder))]
    Builder {
        path: SchemaPath,
        #[source]
        #[diagnostic_source]
        source: BuildError,
    },
}

impl ResolveError {
    pub fn path(&self) -> &SchemaPath {
        match self {
            ResolveError::MalformedSchema { path, .. }
            | ResolveError::InvalidSchemaNode { path, .. }
            | ResolveError::UnresolvableReference { path, .. }
            | ResolveError::UnsupportedConstruct { path, .. }
            | ResolveError::Builder { path, .. } => path,
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum BuildError {
    #[error("Value passed to `{modifier}` cannot be represented as a literal: {reason}")]
    #[diagnostic(
        code(builder::unserializable),
        help("Default and catch values must serialize to JSON.")
    )]
    Unserializable {
        modifier: &'static str,
        reason: String,
    },
}
