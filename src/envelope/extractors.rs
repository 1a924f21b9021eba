//! Ordered extractor tables
//!
//! Each extractor looks in one known place and returns `None` when the shape
//! does not match, so the tables can be read top to bottom as the resolution
//! order.

use serde_json::Value;

/// Property names under which a `result` object carries its item array
pub const ITEM_KEYS: &[&str] = &["tasks", "items", "elements"];

/// Finds the item array in one envelope shape
pub type ItemExtractor = fn(&Value) -> Option<&[Value]>;

/// Finds one candidate location for a numeric field
pub type NumberLocator = fn(&Value) -> Option<&Value>;

/// Item list resolution order, first match wins
pub const ITEM_EXTRACTORS: &[ItemExtractor] = &[
    result_items,
    result_array,
    raw_result_items,
    raw_result_array,
    bare_array,
];

/// `total` candidates, first finite integer wins
pub const TOTAL_LOCATORS: &[NumberLocator] = &[
    top_total,
    raw_total,
    result_total,
    result_tasks_total,
    result_tasks_count,
    result_tasks_count_camel,
];

/// `next` cursor candidates, first finite integer wins
pub const NEXT_LOCATORS: &[NumberLocator] = &[top_next, raw_next, result_next];

/// `response.result.<items>` when `result` is an object holding an array
pub fn result_items(response: &Value) -> Option<&[Value]> {
    items_property(response.get("result")?)
}

/// `response.result` when it is itself an array
pub fn result_array(response: &Value) -> Option<&[Value]> {
    response.get("result")?.as_array().map(Vec::as_slice)
}

/// `response.raw.result.<items>`
pub fn raw_result_items(response: &Value) -> Option<&[Value]> {
    items_property(raw(response)?.get("result")?)
}

/// `response.raw.result` as an array
pub fn raw_result_array(response: &Value) -> Option<&[Value]> {
    raw(response)?.get("result")?.as_array().map(Vec::as_slice)
}

/// The response itself, when array-shaped
pub fn bare_array(response: &Value) -> Option<&[Value]> {
    response.as_array().map(Vec::as_slice)
}

fn items_property(result: &Value) -> Option<&[Value]> {
    let map = result.as_object()?;
    ITEM_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
}

fn raw(response: &Value) -> Option<&Value> {
    response.get("raw").filter(|v| v.is_object())
}

/// The `result` slot when it holds an object.
///
/// The slot is `result`, or `raw.result` only when `result` is absent or
/// null; an array-shaped `result` never reaches into `raw`.
fn result_object(response: &Value) -> Option<&Value> {
    let present = |v: &&Value| !v.is_null();
    response
        .get("result")
        .filter(present)
        .or_else(|| raw(response)?.get("result").filter(present))
        .filter(|v| v.is_object())
}

fn top_total(response: &Value) -> Option<&Value> {
    response.get("total")
}

fn raw_total(response: &Value) -> Option<&Value> {
    raw(response)?.get("total")
}

fn result_total(response: &Value) -> Option<&Value> {
    result_object(response)?.get("total")
}

fn result_tasks_total(response: &Value) -> Option<&Value> {
    result_object(response)?.get("tasks_total")
}

fn result_tasks_count(response: &Value) -> Option<&Value> {
    result_object(response)?.get("tasks_count")
}

fn result_tasks_count_camel(response: &Value) -> Option<&Value> {
    result_object(response)?.get("tasksCount")
}

fn top_next(response: &Value) -> Option<&Value> {
    response.get("next")
}

fn raw_next(response: &Value) -> Option<&Value> {
    raw(response)?.get("next")
}

fn result_next(response: &Value) -> Option<&Value> {
    result_object(response)?.get("next")
}
