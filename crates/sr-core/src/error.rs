//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `SrError` as one variant
//! where they need to surface configuration or parse failures.

use thiserror::Error;

use crate::LocationId;

#[derive(Debug, Error)]
pub enum SrError {
    #[error("location {0} not found")]
    LocationNotFound(LocationId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `sr-core`.
pub type SrResult<T> = Result<T, SrError>;
