//! Error types for the analyzer library

use std::path::PathBuf;
use thiserror::Error;

/// A request field outside its accepted range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: f64,
        value: f64,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

impl ValidationError {
    /// Dotted path of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::BelowMinimum { field, .. }
            | ValidationError::NotFinite { field }
            | ValidationError::TooLong { field, .. } => field,
        }
    }
}

/// Errors surfaced by the analysis entry points
#[derive(Debug, Error)]
pub enum IceaError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to encode request: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("failed to read catalog directory {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type IceaResult<T> = Result<T, IceaError>;
