//! Validation and parameter binding for JSON rows.

use crate::schema::{FieldMode, FieldType, SchemaField, TableSchema};
use chrono::{DateTime, Utc};
use duckdb::ToSql;
use duckdb::types::{ToSqlOutput, Value};

/// A row value ready to bind to an `INSERT` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Text(s) => ToSqlOutput::Owned(Value::Text(s.clone())),
            Self::Integer(v) => ToSqlOutput::Owned(Value::BigInt(*v)),
            Self::Float(v) => ToSqlOutput::Owned(Value::Double(*v)),
            Self::Null => ToSqlOutput::Owned(Value::Null),
        })
    }
}

/// Placeholder for a column. Timestamps are bound as text and cast.
pub(crate) fn placeholder(field: &SchemaField) -> &'static str {
    match field.field_type {
        FieldType::Timestamp => "CAST(? AS TIMESTAMP)",
        _ => "?",
    }
}

/// Convert one JSON object into values ordered like `schema.fields`,
/// collecting every problem instead of stopping at the first.
pub(crate) fn bind_row(
    schema: &TableSchema,
    row: &serde_json::Value,
) -> Result<Vec<SqlValue>, Vec<String>> {
    let Some(object) = row.as_object() else {
        return Err(vec!["row is not a JSON object".to_string()]);
    };

    let mut errors: Vec<String> = object
        .keys()
        .filter(|key| schema.field(key).is_none())
        .map(|key| format!("no such field: {key}"))
        .collect();

    let mut values = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match bind_value(field, object.get(&field.name)) {
            Ok(value) => values.push(value),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

fn bind_value(field: &SchemaField, value: Option<&serde_json::Value>) -> Result<SqlValue, String> {
    let value = match value {
        None | Some(serde_json::Value::Null) => {
            return match field.mode {
                FieldMode::Required => Err(format!("missing required field: {}", field.name)),
                FieldMode::Nullable => Ok(SqlValue::Null),
            };
        }
        Some(v) => v,
    };

    let mismatch = || {
        format!(
            "invalid value for {} ({}): {value}",
            field.name,
            field.field_type.sql_type()
        )
    };

    match field.field_type {
        FieldType::String => value
            .as_str()
            .map(|s| SqlValue::Text(s.to_string()))
            .ok_or_else(mismatch),
        FieldType::Integer => value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .map(SqlValue::Integer)
            .ok_or_else(mismatch),
        FieldType::Float64 => value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .map(SqlValue::Float)
            .ok_or_else(mismatch),
        FieldType::Timestamp => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| SqlValue::Text(format_timestamp(&ts.with_timezone(&Utc))))
            .ok_or_else(mismatch),
    }
}

/// UTC wall-clock text DuckDB casts to `TIMESTAMP` without loss.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}
