//! Attribute values used for repository lookups

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use uuid::Uuid;

/// A polymorphic attribute value that can hold different types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Compare against a serialized attribute.
    ///
    /// UUIDs and timestamps serialize as strings, so they are parsed back
    /// before comparison. A missing attribute only matches `Null`.
    pub fn matches(&self, attribute: Option<&Value>) -> bool {
        let Some(attribute) = attribute else {
            return self.is_null();
        };

        match self {
            FieldValue::String(s) => attribute.as_str() == Some(s.as_str()),
            FieldValue::Integer(i) => attribute.as_i64() == Some(*i),
            FieldValue::Float(f) => attribute.as_f64() == Some(*f),
            FieldValue::Boolean(b) => attribute.as_bool() == Some(*b),
            FieldValue::Uuid(u) => attribute
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .is_some_and(|parsed| parsed == *u),
            FieldValue::DateTime(dt) => attribute
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .is_some_and(|parsed| parsed.with_timezone(&Utc) == *dt),
            FieldValue::Null => attribute.is_null(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

/// Whether `name` is a plain attribute identifier (safe to embed in a JSON path)
pub fn is_attribute_name(name: &str) -> bool {
    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("attribute name pattern is valid")
    });
    regex.is_match(name)
}
