//! Risk-model error type.

use thiserror::Error;

use sr_core::SrError;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("risk model must be fitted before prediction")]
    NotFitted,

    #[error("cannot fit a risk model on an empty feature table")]
    EmptyInput,

    #[error("{clusters} clusters requested but only {locations} locations supplied")]
    TooFewLocations { clusters: usize, locations: usize },

    #[error(transparent)]
    Core(#[from] SrError),
}

pub type RiskResult<T> = Result<T, RiskError>;
