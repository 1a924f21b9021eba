//! Field lookup across key casings

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static INTEGER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("integer prefix pattern is valid"));

/// Resolves canonical field names against the casing a raw record uses.
///
/// Candidate keys are tried in order: the key as given, upper-cased,
/// lower-cased, then snake-to-camel (`CREATED_DATE` -> `createdDate`).
/// Duplicates are dropped so each variant is looked up once.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldAccessor;

impl FieldAccessor {
    /// Candidate key variants for `key`, deduplicated, in lookup order
    pub fn variants(key: &str) -> Vec<String> {
        let mut variants: Vec<String> = Vec::with_capacity(4);
        for candidate in [
            key.to_string(),
            key.to_uppercase(),
            key.to_lowercase(),
            to_camel_case_key(key),
        ] {
            if !candidate.is_empty() && !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants
    }

    /// Look up `key` on `record`, returning the first variant present.
    ///
    /// Returns `None` for non-object records, an empty key, or when no
    /// variant is present.
    pub fn resolve<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
        let map = record.as_object()?;
        if key.is_empty() {
            return None;
        }
        Self::variants(key)
            .iter()
            .find_map(|variant| map.get(variant.as_str()))
    }
}

/// Convert a snake-case key into lower camel case (`CLOSED_DATE` -> `closedDate`)
pub fn to_camel_case_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let lowered = key.to_lowercase();
    let mut chars = lowered.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            match chars.peek() {
                Some(next) if next.is_ascii_lowercase() => {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a JSON value as a finite integer.
///
/// Numbers are truncated toward zero; strings are trimmed and their leading
/// integer prefix is parsed (`"42abc"` -> 42). Anything else is `None`.
pub fn normalize_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            INTEGER_PREFIX
                .find(trimmed)
                .and_then(|m| m.as_str().parse::<i64>().ok())
        }
        _ => None,
    }
}
