//! Bracketed key flattening

use serde_json::Value;
use url::form_urlencoded;

/// How array elements are addressed in flattened keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayStyle {
    /// `key[]` for scalar elements, `key[i]` for nested ones
    Appended,
    /// Always `key[i]`
    Indexed,
}

/// Flatten a parameter tree into ordered `(key, value)` pairs.
///
/// `null` leaves and empty objects produce nothing. Scalars at the root are
/// ignored since they have no key.
pub fn flatten(params: &Value, style: ArrayStyle) -> Vec<(String, String)> {
    let mut out = Vec::new();
    if let Value::Object(map) = params {
        for (key, value) in map {
            walk(key, value, style, &mut out);
        }
    }
    out
}

/// Encode a parameter tree as a URL query string
pub fn encode_query(params: &Value) -> String {
    serialize(flatten(params, ArrayStyle::Appended))
}

/// Encode a parameter tree as an `application/x-www-form-urlencoded` body
pub fn encode_form(params: &Value) -> String {
    serialize(flatten(params, ArrayStyle::Indexed))
}

fn serialize(pairs: Vec<(String, String)>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn walk(key: &str, value: &Value, style: ArrayStyle, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let child = match style {
                    ArrayStyle::Appended if !is_composite(item) => format!("{key}[]"),
                    _ => format!("{key}[{i}]"),
                };
                walk(&child, item, style, out);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                walk(&format!("{key}[{sub}]"), item, style, out);
            }
        }
        Value::String(s) => out.push((key.to_string(), s.clone())),
        Value::Number(n) => out.push((key.to_string(), n.to_string())),
        Value::Bool(b) => out.push((key.to_string(), b.to_string())),
    }
}

fn is_composite(value: &Value) -> bool {
    value.is_array() || value.is_object()
}
