//! Keyword mapping for string and number schemas, plus the small readers the
//! resolver uses to pull typed values out of a schema object.

use crate::builder::{NumberCheckKind, NumberSchema, StringFormat, StringSchema, ZodBuilder};
use crate::error::ResolveError;
use crate::schema::{json_type_name, SchemaPath};
use log::trace;
use serde_json::{Map, Number, Value};

pub(crate) fn malformed(
    path: &SchemaPath,
    keyword: &str,
    expected: &'static str,
    found: &Value,
) -> ResolveError {
    ResolveError::MalformedSchema {
        path: path.join(keyword),
        keyword: keyword.to_string(),
        expected,
        found: json_type_name(found).to_string(),
    }
}

/// Custom message for `keyword` from an object-valued `errorMessage`.
pub(crate) fn error_message(schema: &Map<String, Value>, keyword: &str) -> Option<String> {
    schema
        .get("errorMessage")?
        .as_object()?
        .get(keyword)?
        .as_str()
        .map(str::to_string)
}

pub(crate) fn non_negative_integer(
    schema: &Map<String, Value>,
    keyword: &str,
    path: &SchemaPath,
) -> Result<Option<u64>, ResolveError> {
    let Some(value) = schema.get(keyword) else {
        return Ok(None);
    };
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                // integral floats such as `2.0`, within `u64` range
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        })
        .map(Some)
        .ok_or_else(|| malformed(path, keyword, "a non-negative integer", value))
}

fn number(
    schema: &Map<String, Value>,
    keyword: &str,
    path: &SchemaPath,
) -> Result<Option<Number>, ResolveError> {
    match schema.get(keyword) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(other) => Err(malformed(path, keyword, "a number", other)),
    }
}

fn string_keyword<'s>(
    schema: &'s Map<String, Value>,
    keyword: &str,
    path: &SchemaPath,
) -> Result<Option<&'s str>, ResolveError> {
    match schema.get(keyword) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(malformed(path, keyword, "a string", other)),
    }
}

/// `type: "string"`
pub(crate) fn parse_string(
    schema: &Map<String, Value>,
    path: &SchemaPath,
) -> Result<ZodBuilder, ResolveError> {
    let mut string = StringSchema::new();

    if let Some(format) = string_keyword(schema, "format", path)? {
        match StringFormat::from_keyword(format) {
            Some(known) => string = string.format(known, error_message(schema, "format")),
            None => trace!("ignoring unknown string format `{format}` at {path}"),
        }
    }
    if let Some(min) = non_negative_integer(schema, "minLength", path)? {
        string = string.min_length(min, error_message(schema, "minLength"));
    }
    if let Some(max) = non_negative_integer(schema, "maxLength", path)? {
        string = string.max_length(max, error_message(schema, "maxLength"));
    }
    if let Some(pattern) = string_keyword(schema, "pattern", path)? {
        string = string.pattern(pattern, error_message(schema, "pattern"));
    }

    Ok(string.into())
}

/// `type: "number"` and `type: "integer"`.
///
/// Exclusive bounds come in two dialects: a number (draft 6 and later) adds its
/// own strict bound, a boolean (draft 4) makes the paired inclusive bound strict.
pub(crate) fn parse_number(
    schema: &Map<String, Value>,
    integer: bool,
    path: &SchemaPath,
) -> Result<ZodBuilder, ResolveError> {
    let mut number_schema = NumberSchema::new();
    if integer {
        number_schema = number_schema.integer();
    }

    let bounds = [
        ("minimum", "exclusiveMinimum", NumberCheckKind::Gte, NumberCheckKind::Gt),
        ("maximum", "exclusiveMaximum", NumberCheckKind::Lte, NumberCheckKind::Lt),
    ];
    for (inclusive_key, exclusive_key, inclusive, exclusive) in bounds {
        let bound = number(schema, inclusive_key, path)?;
        match schema.get(exclusive_key) {
            None | Some(Value::Bool(false)) => {
                if let Some(value) = bound {
                    number_schema = number_schema.check(
                        inclusive,
                        value,
                        error_message(schema, inclusive_key),
                    );
                }
            }
            Some(Value::Bool(true)) => {
                if let Some(value) = bound {
                    let message = error_message(schema, exclusive_key)
                        .or_else(|| error_message(schema, inclusive_key));
                    number_schema = number_schema.check(exclusive, value, message);
                }
            }
            Some(Value::Number(strict)) => {
                if let Some(value) = bound {
                    number_schema = number_schema.check(
                        inclusive,
                        value,
                        error_message(schema, inclusive_key),
                    );
                }
                number_schema = number_schema.check(
                    exclusive,
                    strict.clone(),
                    error_message(schema, exclusive_key),
                );
            }
            Some(other) => {
                return Err(malformed(path, exclusive_key, "a number or a boolean", other));
            }
        }
    }

    if let Some(step) = number(schema, "multipleOf", path)? {
        number_schema = number_schema.check(
            NumberCheckKind::MultipleOf,
            step,
            error_message(schema, "multipleOf"),
        );
    }

    Ok(number_schema.into())
}
