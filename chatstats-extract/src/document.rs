//! Typed field access over MongoDB extended JSON documents.
//!
//! Exports may use canonical (`{"$numberLong": "5"}`) or relaxed (`5`)
//! encodings; both are accepted.

use crate::error::{ExtractError, ExtractResult};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Borrowed view of one source document.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Document<'a> {
    pub fn new(value: &'a Value) -> ExtractResult<Self> {
        value
            .as_object()
            .map(|fields| Self { fields })
            .ok_or(ExtractError::NotAnObject)
    }

    /// Raw value, treating `null` as absent.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn require(&self, field: &str) -> ExtractResult<&'a Value> {
        self.get(field)
            .ok_or_else(|| ExtractError::MissingField(field.to_string()))
    }

    /// Required string; ObjectIds (`{"$oid": ..}`) are rendered as their hex.
    pub fn string(&self, field: &str) -> ExtractResult<String> {
        let value = self.require(field)?;
        as_id_string(value).ok_or_else(|| invalid(field, "string"))
    }

    /// Optional string; absent or `null` becomes the empty string.
    pub fn string_or_empty(&self, field: &str) -> ExtractResult<String> {
        match self.get(field) {
            None => Ok(String::new()),
            Some(value) => as_id_string(value).ok_or_else(|| invalid(field, "string")),
        }
    }

    pub fn optional_str(&self, field: &str) -> Option<&'a str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn boolean(&self, field: &str) -> ExtractResult<bool> {
        self.require(field)?
            .as_bool()
            .ok_or_else(|| invalid(field, "boolean"))
    }

    pub fn integer(&self, field: &str) -> ExtractResult<i64> {
        as_i64(self.require(field)?).ok_or_else(|| invalid(field, "integer"))
    }

    pub fn float(&self, field: &str) -> ExtractResult<f64> {
        as_f64(self.require(field)?).ok_or_else(|| invalid(field, "number"))
    }

    pub fn timestamp(&self, field: &str) -> ExtractResult<DateTime<Utc>> {
        as_timestamp(self.require(field)?).ok_or_else(|| invalid(field, "date"))
    }

    /// `None` when the field is absent; an error when present but not a date.
    pub fn optional_timestamp(&self, field: &str) -> ExtractResult<Option<DateTime<Utc>>> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => as_timestamp(value)
                .map(Some)
                .ok_or_else(|| invalid(field, "date")),
        }
    }
}

fn invalid(field: &str, expected: &'static str) -> ExtractError {
    ExtractError::InvalidField {
        field: field.to_string(),
        expected,
    }
}

/// Unwrap a single-key `{"$tag": inner}` wrapper.
fn tagged<'v>(value: &'v Value, tag: &str) -> Option<&'v Value> {
    let object = value.as_object()?;
    if object.len() == 1 {
        object.get(tag)
    } else {
        None
    }
}

fn as_id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        other => tagged(other, "$oid")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    if let Some(n) = value.as_f64() {
        return Some(n);
    }
    ["$numberDouble", "$numberInt", "$numberLong", "$numberDecimal"]
        .iter()
        .find_map(|tag| tagged(value, tag))
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

fn as_i64(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(s) = ["$numberInt", "$numberLong"]
        .iter()
        .find_map(|tag| tagged(value, tag))
        .and_then(Value::as_str)
    {
        return s.parse().ok();
    }
    as_f64(value)
        .filter(|f| f.is_finite())
        .map(|f| f.round() as i64)
}

fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let inner = tagged(value, "$date").unwrap_or(value);
    match inner {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        other => as_i64(other).and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
    }
}
