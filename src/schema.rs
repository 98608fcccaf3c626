//! Read-only views over JSON Schema input.
//!
//! Schema nodes are plain `serde_json::Value`s owned by the caller. This module
//! adds the location type used in diagnostics and the positional wrapper used
//! when iterating arrays of sub-schemas.

use crate::utils::{escape_pointer_token, percent_decode, unescape_pointer_token};
use serde_json::{Map, Value};
use std::fmt;

/// One step from a schema node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Location of a schema node, from the document root.
///
/// Displayed as a JSON pointer fragment, e.g. `#/properties/tags/items`.
/// Reference targets are identified by their path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SchemaPath {
    segments: Vec<PathSegment>,
}

impl SchemaPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path one segment deeper. `self` is left untouched.
    #[must_use]
    pub fn join(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parses a local reference (`#`, `#/definitions/Node`) into a path.
    /// Returns `None` for anything that is not a fragment-only reference.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let fragment = reference.strip_prefix('#')?;
        let decoded = percent_decode(fragment)?;
        if decoded.is_empty() {
            return Some(Self::root());
        }
        let rest = decoded.strip_prefix('/')?;
        let segments = rest
            .split('/')
            .map(|token| PathSegment::Key(unescape_pointer_token(token)))
            .collect();
        Some(Self { segments })
    }

    /// Follows this path inside `root`. Keys address object members, and keys
    /// that parse as integers also address array elements.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut node = root;
        for segment in &self.segments {
            node = match (node, segment) {
                (Value::Object(map), PathSegment::Key(key)) => map.get(key)?,
                (Value::Array(items), PathSegment::Index(i)) => items.get(*i)?,
                (Value::Array(items), PathSegment::Key(key)) => {
                    items.get(key.parse::<usize>().ok()?)?
                }
                _ => return None,
            };
        }
        Some(node)
    }

    /// Last key segment, used to derive binding names.
    pub fn last_key(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|segment| match segment {
            PathSegment::Key(key) => Some(key.as_str()),
            PathSegment::Index(_) => None,
        })
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, "/{}", escape_pointer_token(key))?,
                PathSegment::Index(index) => write!(f, "/{index}")?,
            }
        }
        Ok(())
    }
}

/// A sub-schema paired with its position in the array it was taken from.
///
/// Combinators filter their operands; the original index keeps diagnostics
/// pointing at the authored position.
#[derive(Debug, Clone, Copy)]
pub struct Indexed<'a> {
    pub index: usize,
    pub schema: &'a Value,
}

pub fn indexed(items: &[Value]) -> Vec<Indexed<'_>> {
    items
        .iter()
        .enumerate()
        .map(|(index, schema)| Indexed { index, schema })
        .collect()
}

/// Human-readable JSON type of a value, for "found ..." diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Keywords whose presence implies `type: "string"`.
pub const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern", "format"];

/// Keywords whose presence implies `type: "number"`.
pub const NUMBER_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];

/// Keywords whose presence implies `type: "array"`.
pub const ARRAY_KEYWORDS: &[&str] = &["items", "prefixItems", "minItems", "maxItems"];

/// Keywords whose presence implies `type: "object"`.
pub const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "additionalProperties",
    "patternProperties",
    "required",
    "propertyNames",
];

/// Infers the primitive type of a schema object that has no `type` keyword.
pub fn implied_type(schema: &Map<String, Value>) -> Option<&'static str> {
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| schema.contains_key(*k));
    if has_any(OBJECT_KEYWORDS) {
        Some("object")
    } else if has_any(ARRAY_KEYWORDS) {
        Some("array")
    } else if has_any(STRING_KEYWORDS) {
        Some("string")
    } else if has_any(NUMBER_KEYWORDS) {
        Some("number")
    } else {
        None
    }
}
