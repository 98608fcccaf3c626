use crate::error::BuildError;
use serde::Serialize;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Converts a caller-supplied modifier argument into a JSON value.
pub(crate) fn to_value<T: Serialize + ?Sized>(
    modifier: &'static str,
    value: &T,
) -> Result<Value, BuildError> {
    serde_json::to_value(value).map_err(|err| BuildError::Unserializable {
        modifier,
        reason: err.to_string(),
    })
}

/// Quotes `text` as a JavaScript string literal (JSON escaping).
pub fn quote(text: &str) -> String {
    Value::from(text).to_string()
}

/// Encodes a JSON value as canonical JavaScript literal text.
///
/// Object keys are emitted in sorted order whatever the input map order is,
/// integral floats print without a fraction (`1.0` becomes `1`), and no
/// whitespace is inserted, matching `JSON.stringify`.
pub fn to_literal(value: &Value) -> String {
    let mut out = String::new();
    write_literal(value, &mut out);
    out
}

fn write_literal(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(n)),
        Value::String(s) => out.push_str(&quote(s)),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_literal(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            out.push('{');
            for (i, (key, item)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&quote(key));
                out.push(':');
                write_literal(item, out);
            }
            out.push('}');
        }
    }
}

fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // f64 Display is shortest round-trip and never appends `.0`
        n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
    }
}
