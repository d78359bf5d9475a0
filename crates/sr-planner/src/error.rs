use sr_core::SrError;
use sr_risk::RiskError;
use sr_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("planner needs at least one location")]
    NoLocations,

    #[error("risk model error: {0}")]
    Risk(#[from] RiskError),

    #[error("graph error: {0}")]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] SrError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
