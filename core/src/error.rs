use thiserror::Error;

use crate::Field;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Caller-facing failures. Degenerate data (empty query, empty store,
/// missing fields) is never an error; only bad configuration is.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("result count must be at least 1, got {0}")]
    InvalidResultCount(usize),

    #[error("boost for field '{field}' must be positive and finite, got {value}")]
    InvalidBoost { field: Field, value: f64 },

    #[error("bm25 parameter {param} out of range: {value}")]
    InvalidBm25 { param: &'static str, value: f64 },

    #[error("unknown field '{0}' (expected content or filename)")]
    UnknownField(String),

    #[error("filter on '{0}', which is not a declared keyword field")]
    UnknownFilterField(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
