//! Canonical record construction

use super::field::FieldAccessor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Properties some methods wrap the real record under
const WRAPPER_KEYS: &[&str] = &["task", "item"];

/// Key prefix of list-element custom properties (`PROPERTY_101`)
const PROPERTY_PREFIX: &str = "PROPERTY_";

/// The fixed set of domain fields a canonical record can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalField {
    Id,
    Title,
    Name,
    Description,
    Status,
    Deadline,
    CreatedDate,
    ClosedDate,
    Priority,
    /// Custom `PROPERTY_*` values of a list element, gathered into one object
    Properties,
}

impl CanonicalField {
    /// Fields of a task, in remote `select` order
    pub const TASK_FIELDS: [CanonicalField; 8] = [
        CanonicalField::Id,
        CanonicalField::Title,
        CanonicalField::Description,
        CanonicalField::Status,
        CanonicalField::Deadline,
        CanonicalField::CreatedDate,
        CanonicalField::ClosedDate,
        CanonicalField::Priority,
    ];

    /// Fields of a list element
    pub const LIST_ELEMENT_FIELDS: [CanonicalField; 3] = [
        CanonicalField::Id,
        CanonicalField::Name,
        CanonicalField::Properties,
    ];

    /// Remote key for this field
    pub fn key(self) -> &'static str {
        match self {
            CanonicalField::Id => "ID",
            CanonicalField::Title => "TITLE",
            CanonicalField::Name => "NAME",
            CanonicalField::Description => "DESCRIPTION",
            CanonicalField::Status => "STATUS",
            CanonicalField::Deadline => "DEADLINE",
            CanonicalField::CreatedDate => "CREATED_DATE",
            CanonicalField::ClosedDate => "CLOSED_DATE",
            CanonicalField::Priority => "PRIORITY",
            CanonicalField::Properties => "PROPERTIES",
        }
    }

    /// Fields always stored as strings regardless of the remote type
    pub fn is_string_coerced(self) -> bool {
        matches!(
            self,
            CanonicalField::Id | CanonicalField::Status | CanonicalField::Priority
        )
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A normalized remote item.
///
/// Absent fields are omitted; a field the remote sent as `null` is kept as
/// `Value::Null`. `ID`, `STATUS` and `PRIORITY` are always strings or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalRecord {
    fields: BTreeMap<CanonicalField, Value>,
}

impl CanonicalRecord {
    /// Raw value of a field, if present
    pub fn get(&self, field: CanonicalField) -> Option<&Value> {
        self.fields.get(&field)
    }

    /// String value of a field, if present and a string
    pub fn get_str(&self, field: CanonicalField) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Record identifier
    pub fn id(&self) -> Option<&str> {
        self.get_str(CanonicalField::Id)
    }

    /// Whether the field was present on the raw item
    pub fn contains(&self, field: CanonicalField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no canonical field was found
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate present fields in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// Render as a JSON object keyed by remote field names
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.key().to_string(), v.clone()))
            .collect();
        Value::Object(map)
    }
}

/// Converts raw collection items into [`CanonicalRecord`]s over a field set
#[derive(Debug, Clone, Copy)]
pub struct RecordNormalizer {
    fields: &'static [CanonicalField],
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordNormalizer {
    /// Normalizer for tasks
    pub fn new() -> Self {
        Self::with_fields(&CanonicalField::TASK_FIELDS)
    }

    /// Normalizer for list elements
    pub fn list_elements() -> Self {
        Self::with_fields(&CanonicalField::LIST_ELEMENT_FIELDS)
    }

    /// Normalizer reading only `fields`
    pub fn with_fields(fields: &'static [CanonicalField]) -> Self {
        Self { fields }
    }

    /// Fields this normalizer reads
    pub fn fields(&self) -> &'static [CanonicalField] {
        self.fields
    }

    /// Normalize one raw item. Non-object input yields an empty record.
    pub fn normalize(&self, raw: &Value) -> CanonicalRecord {
        let Some(source) = unwrap_record(raw) else {
            return CanonicalRecord::default();
        };

        let mut fields = BTreeMap::new();
        for &field in self.fields {
            if field == CanonicalField::Properties {
                if let Some(properties) = collect_properties(source) {
                    fields.insert(field, properties);
                }
                continue;
            }
            if let Some(value) = FieldAccessor::resolve(source, field.key()) {
                let value = if field.is_string_coerced() {
                    coerce_to_string(value)
                } else {
                    value.clone()
                };
                fields.insert(field, value);
            }
        }

        CanonicalRecord { fields }
    }

    /// Normalize a batch, preserving order
    pub fn normalize_all(&self, items: &[Value]) -> Vec<CanonicalRecord> {
        items.iter().map(|item| self.normalize(item)).collect()
    }
}

/// Peel one wrapper level off an item (`{"task": {...}}`)
fn unwrap_record(raw: &Value) -> Option<&Value> {
    let map = raw.as_object()?;
    let nested = WRAPPER_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|v| v.is_object()));
    Some(nested.unwrap_or(raw))
}

/// Gather `PROPERTY_*` keys (any casing) into one object, or `None` if there are none
fn collect_properties(source: &Value) -> Option<Value> {
    let map = source.as_object()?;
    let properties: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| {
            key.get(..PROPERTY_PREFIX.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(PROPERTY_PREFIX))
        })
        .map(|(key, value)| (key.to_uppercase(), value.clone()))
        .collect();
    (!properties.is_empty()).then_some(Value::Object(properties))
}

fn coerce_to_string(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) => Value::String(s.clone()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => Value::String(other.to_string()),
    }
}
