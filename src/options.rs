use crate::error::ZodGenError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Zod major version the emitted expression targets.
///
/// Only spellings differ between versions: loose objects, string formats and
/// custom error parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodVersion {
    V3,
    #[default]
    V4,
}

impl Display for ZodVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZodVersion::V3 => write!(f, "v3"),
            ZodVersion::V4 => write!(f, "v4"),
        }
    }
}

/// Conversion settings. Every field has a default, so an empty document is a
/// valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Options {
    pub zod_version: ZodVersion,
    /// Binding name of the root document. Recursive references to `#` point at it.
    pub name: Option<String>,
    /// Per-path custom names. Not read by the converter; carried for the
    /// code that embeds the expression into a source file.
    pub naming: BTreeMap<String, String>,
    pub without_defaults: bool,
    /// Fail on malformed input instead of degrading the fragment to `z.any()`.
    pub strict: bool,
    pub discriminated_unions: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_version(mut self, version: ZodVersion) -> Self {
        self.zod_version = version;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[must_use]
    pub fn without_defaults(mut self) -> Self {
        self.without_defaults = true;
        self
    }

    #[must_use]
    pub fn with_discriminated_unions(mut self) -> Self {
        self.discriminated_unions = true;
        self
    }

    /// Name used for the root binding when the document refers to itself.
    pub fn root_name(&self) -> &str {
        self.name.as_deref().unwrap_or("schema")
    }

    /// # Errors
    /// Returns `ZodGenError::InvalidOptions` if the text is not a valid configuration.
    pub fn from_json_str(source: &str) -> Result<Self, ZodGenError> {
        serde_json::from_str(source).map_err(|err| ZodGenError::InvalidOptions {
            reason: err.to_string(),
        })
    }

    /// # Errors
    /// Returns `ZodGenError::InvalidOptions` if the text is not a valid configuration.
    pub fn from_yaml_str(source: &str) -> Result<Self, ZodGenError> {
        serde_yaml::from_str(source).map_err(|err| ZodGenError::InvalidOptions {
            reason: err.to_string(),
        })
    }
}
