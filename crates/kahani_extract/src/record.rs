//! Parsed records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One parsed record: field name to value, plus a placeholder flag.
///
/// Text fields hold strings, number and index fields hold non-negative
/// integers, list fields hold arrays of strings. Fields are kept in name
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Field values.
    pub values: Map<String, Value>,
    /// True when this record stands in for data that could not be parsed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl ExtractedRecord {
    /// Empty, non-synthetic record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty placeholder record.
    pub fn placeholder() -> Self {
        Self {
            values: Map::new(),
            synthetic: true,
        }
    }

    /// Text value of `field`, if present.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(Value::as_str)
    }

    /// Integer value of `field`, if present.
    pub fn number(&self, field: &str) -> Option<u64> {
        self.values.get(field).and_then(Value::as_u64)
    }

    /// Index value of `field`, if present and in range.
    pub fn index(&self, field: &str) -> Option<usize> {
        self.number(field).and_then(|n| usize::try_from(n).ok())
    }

    /// List value of `field`; empty when absent.
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.values.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether `field` holds a non-empty value after trimming.
    pub fn has(&self, field: &str) -> bool {
        match self.values.get(field) {
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }

    pub(crate) fn set_text(&mut self, field: &str, value: impl Into<String>) {
        self.values
            .insert(field.to_string(), Value::String(value.into()));
    }

    pub(crate) fn set_number(&mut self, field: &str, value: u64) {
        self.values.insert(field.to_string(), Value::from(value));
    }

    pub(crate) fn set_list(&mut self, field: &str, items: Vec<String>) {
        self.values.insert(
            field.to_string(),
            Value::Array(items.into_iter().map(Value::String).collect()),
        );
    }

    pub(crate) fn remove(&mut self, field: &str) {
        self.values.remove(field);
    }
}
