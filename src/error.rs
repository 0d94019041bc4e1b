//! Error types for schema loading and graph construction

use std::path::PathBuf;

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema graph errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unsupported type: {descriptor}")]
    UnsupportedType { descriptor: String },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Unable to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("Unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl SchemaError {
    /// Build an `UnsupportedType` error from the offending JSON value
    pub fn unsupported(value: &serde_json::Value) -> Self {
        Self::UnsupportedType {
            descriptor: value.to_string(),
        }
    }
}
