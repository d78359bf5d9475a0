//! `sr-risk`: per-location risk scoring.
//!
//! # Pipeline
//!
//! ```text
//! Location + IncidentRecord ──aggregate_features──▶ LocationFeatures
//!        ──fit──▶ FittedRiskModel ──predict──▶ risk score ∈ [0, 1] per row
//! ```
//!
//! `fit` standardises the four feature columns, partitions them with
//! k-means, ranks clusters by mean incident count, and trains a logistic
//! classifier to recognise the top-ranked cluster.  `predict` fuses the
//! normalised cluster rank, the classifier probability, and a lighting
//! penalty into one clipped score.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`features`]   | `LocationFeatures`, `aggregate_features`              |
//! | [`scaler`]     | `StandardScaler` (frozen mean / scale)                |
//! | [`kmeans`]     | `KMeans`, k-means++ init + Lloyd iterations           |
//! | [`logistic`]   | `LogisticRegression` (L2, Newton / IRLS)              |
//! | [`model`]      | `FittedRiskModel`, `RiskModel`, `RiskCategory`        |
//! | [`error`]      | `RiskError`, `RiskResult<T>`                          |

pub mod error;
pub mod features;
pub mod kmeans;
pub mod logistic;
pub mod model;
pub mod scaler;

#[cfg(test)]
mod tests;

pub use error::{RiskError, RiskResult};
pub use features::{FeatureRow, LocationFeatures, N_FEATURES, aggregate_features};
pub use kmeans::KMeans;
pub use logistic::LogisticRegression;
pub use model::{FittedRiskModel, RiskCategory, RiskModel, ScoreBreakdown};
pub use scaler::StandardScaler;
