//! Envelope types

use super::extractors::{NumberLocator, ITEM_EXTRACTORS, NEXT_LOCATORS, TOTAL_LOCATORS};
use crate::record::normalize_number;
use serde::Serialize;
use serde_json::Value;

/// Item list and paging metadata pulled out of one response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    /// Raw collection items, in response order
    pub items: Vec<Value>,
    /// Reported collection size, if any candidate parsed
    pub total: Option<u64>,
    /// Offset of the next page, if any candidate parsed
    pub next_cursor: Option<u64>,
}

/// Tolerant multi-shape response unwrapper
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeUnwrapper;

impl EnvelopeUnwrapper {
    /// Create a new unwrapper
    pub fn new() -> Self {
        Self
    }

    /// Unwrap a raw response body. Never fails; unknown shapes yield an
    /// empty envelope.
    pub fn unwrap(&self, response: &Value) -> Envelope {
        let items = ITEM_EXTRACTORS
            .iter()
            .find_map(|extract| extract(response))
            .map(<[Value]>::to_vec)
            .unwrap_or_default();

        Envelope {
            items,
            total: first_integer(response, TOTAL_LOCATORS),
            next_cursor: first_integer(response, NEXT_LOCATORS),
        }
    }
}

/// First candidate that parses as a non-negative integer
fn first_integer(response: &Value, locators: &[NumberLocator]) -> Option<u64> {
    locators
        .iter()
        .filter_map(|locate| locate(response))
        .find_map(|candidate| normalize_number(candidate).and_then(|n| u64::try_from(n).ok()))
}

/// Normalized view of a single remote call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// The body's `result` field, or null
    pub result: Value,
    /// Parsed `total`, if present
    pub total: Option<u64>,
    /// Parsed `next`, if present
    pub next: Option<u64>,
    /// Remote timing block, if present
    pub time: Option<Value>,
    /// The full response body
    pub raw: Value,
}

impl ApiResponse {
    /// Build from a raw body. Non-object bodies keep only `raw`.
    pub fn from_body(body: Value) -> Self {
        if !body.is_object() {
            return Self {
                result: Value::Null,
                total: None,
                next: None,
                time: None,
                raw: body,
            };
        }

        let as_count = |key: &str| {
            body.get(key)
                .and_then(normalize_number)
                .and_then(|n| u64::try_from(n).ok())
        };
        let result = body.get("result").cloned().unwrap_or(Value::Null);
        let total = as_count("total");
        let next = as_count("next");
        let time = body.get("time").filter(|t| !t.is_null()).cloned();

        Self {
            result,
            total,
            next,
            time,
            raw: body,
        }
    }
}
