//! Pipeline configuration.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature enabled) and handed to the planner.  Every field has a
//! default, so a partial file only overrides what it names.

use std::time::Duration;

use crate::{SrError, SrResult};

/// Tuning parameters for risk scoring, graph construction, and routing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouteConfig {
    /// Number of k-means risk clusters (K).  Default: 3.
    pub n_clusters: usize,

    /// Longest edge the pairwise builder will create, in metres.  Default: 500.
    pub max_connection_distance_m: f64,

    /// Hour of day (0–23) whose neighbourhood counts as "recent".  Default: 12.
    pub query_hour: u8,

    /// Half-width of the recent-incident window in hours.  Default: 3.
    pub recent_window_hours: u8,

    /// Independent k-means++ initialisations; the lowest-inertia run wins.
    pub kmeans_restarts: usize,

    /// Lloyd iteration cap per restart.
    pub kmeans_max_iter: usize,

    /// Convergence threshold on total squared centroid movement.
    pub kmeans_tol: f64,

    /// Inverse L2 regularisation strength of the logistic classifier.
    pub logistic_c: f64,

    /// Newton iteration cap for the logistic classifier.
    pub logistic_max_iter: usize,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Wall-clock budget for graph construction.  `None` = unbounded.
    pub build_deadline_ms: Option<u64>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            n_clusters: 3,
            max_connection_distance_m: 500.0,
            query_hour: 12,
            recent_window_hours: 3,
            kmeans_restarts: 10,
            kmeans_max_iter: 300,
            kmeans_tol: 1e-4,
            logistic_c: 1.0,
            logistic_max_iter: 100,
            seed: 42,
            build_deadline_ms: None,
        }
    }
}

impl RouteConfig {
    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> SrResult<()> {
        if self.n_clusters == 0 {
            return Err(SrError::Config("n_clusters must be at least 1".into()));
        }
        if !(self.max_connection_distance_m.is_finite() && self.max_connection_distance_m > 0.0) {
            return Err(SrError::Config(format!(
                "max_connection_distance_m must be positive and finite, got {}",
                self.max_connection_distance_m
            )));
        }
        if self.query_hour > 23 {
            return Err(SrError::Config(format!(
                "query_hour must be in 0..=23, got {}",
                self.query_hour
            )));
        }
        if self.kmeans_restarts == 0 || self.kmeans_max_iter == 0 {
            return Err(SrError::Config(
                "kmeans_restarts and kmeans_max_iter must be at least 1".into(),
            ));
        }
        if !(self.logistic_c.is_finite() && self.logistic_c > 0.0) {
            return Err(SrError::Config(format!(
                "logistic_c must be positive and finite, got {}",
                self.logistic_c
            )));
        }
        Ok(())
    }

    /// `build_deadline_ms` as a `Duration`.
    pub fn build_deadline(&self) -> Option<Duration> {
        self.build_deadline_ms.map(Duration::from_millis)
    }
}
