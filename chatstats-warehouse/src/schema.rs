//! Table schemas and DDL helpers for the warehouse.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column type, named after the warehouse's logical types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Integer,
    Float64,
    Timestamp,
}

impl FieldType {
    /// DuckDB type used for the column.
    pub fn sql_type(&self) -> &str {
        match self {
            Self::String => "VARCHAR",
            Self::Integer => "BIGINT",
            Self::Float64 => "DOUBLE",
            Self::Timestamp => "TIMESTAMP",
        }
    }

    /// Map a DuckDB `information_schema` type name back to our enum.
    pub fn from_duckdb(type_name: &str) -> Option<Self> {
        let upper = type_name.to_uppercase();
        match upper.as_str() {
            "VARCHAR" | "TEXT" | "STRING" => Some(Self::String),
            "BIGINT" | "INTEGER" | "INT8" | "INT64" => Some(Self::Integer),
            "DOUBLE" | "FLOAT8" | "FLOAT64" => Some(Self::Float64),
            "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" | "DATETIME" => Some(Self::Timestamp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Required,
    Nullable,
}

/// A single column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub mode: FieldMode,
}

impl SchemaField {
    pub fn required(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            mode: FieldMode::Required,
        }
    }

    pub fn nullable(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            mode: FieldMode::Nullable,
        }
    }

    fn column_ddl(&self) -> String {
        let not_null = match self.mode {
            FieldMode::Required => " NOT NULL",
            FieldMode::Nullable => "",
        };
        format!(
            "{} {}{not_null}",
            quote_identifier(&self.name),
            self.field_type.sql_type()
        )
    }
}

/// Ordered list of columns for a table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<SchemaField>,
}

impl TableSchema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// `CREATE TABLE` statement for this schema at `table`.
    pub fn create_table_sql(&self, table: &TableRef) -> String {
        let columns: Vec<String> = self.fields.iter().map(SchemaField::column_ddl).collect();
        format!("CREATE TABLE {} ({})", table.sql(), columns.join(", "))
    }
}

/// Fully qualified table reference: `dataset.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn new(dataset: &str, table: &str) -> Self {
        Self {
            dataset: dataset.to_string(),
            table: table.to_string(),
        }
    }

    /// Quoted form for use inside SQL text. Table names such as `user` and
    /// `transaction` are reserved words, so quoting is mandatory.
    pub fn sql(&self) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.dataset),
            quote_identifier(&self.table)
        )
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

/// Double-quote an identifier, escaping embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Schema of the migration ledger.
pub fn ledger_schema() -> TableSchema {
    TableSchema::new(vec![
        SchemaField::required("id", FieldType::String),
        SchemaField::required("apply_date", FieldType::Timestamp),
    ])
}
