use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Loosely typed field inputs keyed by field name.
pub type RawFields = BTreeMap<String, Value>;

/// One record as supplied by the caller: a register tag and its raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Register tag, e.g. `C100`.
    #[serde(rename = "reg")]
    pub tag: String,
    /// Raw field values.
    #[serde(default)]
    pub fields: RawFields,
}

impl RawRecord {
    /// Creates a raw record.
    pub fn new(tag: impl Into<String>, fields: RawFields) -> Self {
        Self {
            tag: tag.into(),
            fields,
        }
    }
}

/// Whether a raw value counts as "not supplied".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
