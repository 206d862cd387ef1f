//! Error types for warehouse operations.

use std::fmt;
use thiserror::Error;

/// A row the warehouse refused to insert, with every reason it gave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub index: usize,
    pub errors: Vec<String>,
}

impl RowError {
    pub fn new(index: usize, error: impl Into<String>) -> Self {
        Self {
            index,
            errors: vec![error.into()],
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.index, self.errors.join("; "))
    }
}

fn join_row_errors(errors: &[RowError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// All errors that can occur in warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Warehouse {path} is locked by another process: {source}")]
    Locked {
        path: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("warehouse client error: {0}")]
    Client(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table {0} has no id column")]
    MissingIdColumn(String),

    #[error("Unsupported column type {data_type} for {table}.{column}")]
    UnsupportedType {
        table: String,
        column: String,
        data_type: String,
    },

    #[error("{} row(s) rejected by {table}: {}", .errors.len(), join_row_errors(.errors))]
    RowsRejected { table: String, errors: Vec<RowError> },

    #[error("Migration {name} failed: {source}")]
    Migration {
        name: String,
        #[source]
        source: Box<WarehouseError>,
    },

    #[error("Failed to delete staging table {table}: {source}")]
    Cleanup {
        table: String,
        #[source]
        source: Box<WarehouseError>,
    },

    #[error("{original} (staging table {table} could not be deleted either: {cleanup})")]
    CleanupFailed {
        table: String,
        #[source]
        original: Box<WarehouseError>,
        cleanup: Box<WarehouseError>,
    },
}

impl WarehouseError {
    /// Rows rejected during a bulk insert, if this is (or wraps) such a failure.
    pub fn rejected_rows(&self) -> Option<&[RowError]> {
        match self {
            Self::RowsRejected { errors, .. } => Some(errors),
            Self::CleanupFailed { original, .. } => original.rejected_rows(),
            _ => None,
        }
    }
}

pub type WarehouseResult<T> = Result<T, WarehouseError>;
