//! Error types for extraction.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while reading and mapping source documents.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}:{line}: {source}", .path.display())]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}:{line}: {source}", .path.display())]
    Document {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<ExtractError>,
    },

    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("field {field} is not a valid {expected}")]
    InvalidField { field: String, expected: &'static str },

    #[error("unknown {field} value: {value}")]
    UnknownValue { field: String, value: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;
