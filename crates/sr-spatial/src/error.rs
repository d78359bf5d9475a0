//! Spatial-subsystem error type.

use std::time::Duration;

use thiserror::Error;

use sr_core::{LocationId, SrError};

/// Errors produced by `sr-spatial`.
///
/// Disconnected endpoints are not an error: route searches return
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node {0} not found in graph")]
    NodeNotFound(LocationId),

    #[error("location {0} appears more than once")]
    DuplicateLocation(LocationId),

    #[error("{locations} locations but {scores} risk scores")]
    LengthMismatch { locations: usize, scores: usize },

    #[error("non-finite coordinate or risk score for {0}")]
    NonFinite(LocationId),

    #[error("{stage} exceeded its deadline after {elapsed:?}")]
    DeadlineExceeded { stage: &'static str, elapsed: Duration },

    #[error(transparent)]
    Core(#[from] SrError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
