//! Fused risk model.
//!
//! [`FittedRiskModel`] is an immutable value produced by
//! [`FittedRiskModel::fit`]: frozen scaler, centroids with their rank
//! mapping, and classifier coefficients.  Prediction is a pure function of
//! the model and one feature row:
//!
//! ```text
//! score = clip( 0.6 · rank / (K − 1)
//!             + 0.4 · P(high risk)
//!             + 0.2 · (1 − lighting), 0, 1 )
//! ```
//!
//! Clustering and classification see the standardised incident columns
//! only: the lighting column is held at its training mean (0 after
//! standardisation), so lighting reaches the score solely through the
//! penalty term and a brighter location can never score higher than an
//! otherwise identical darker one.
//!
//! [`RiskModel`] wraps an optional fitted model for callers that want a
//! fit-then-predict object and an explicit [`RiskError::NotFitted`].

use std::cmp::Ordering;
use std::fmt;

use sr_core::{RouteConfig, SeededRng};

use crate::features::{LIGHTING_COL, TOTAL_INCIDENTS_COL};
use crate::kmeans::KMeansParams;
use crate::{
    FeatureRow, KMeans, LocationFeatures, LogisticRegression, RiskError, RiskResult,
    StandardScaler,
};

/// Weight of the normalised cluster rank in the fused score.
pub const CLUSTER_WEIGHT: f64 = 0.6;
/// Weight of the classifier probability in the fused score.
pub const PROBABILITY_WEIGHT: f64 = 0.4;
/// Penalty applied per unit of darkness (`1 − lighting`).
pub const LIGHTING_PENALTY: f64 = 0.2;

// ── RiskCategory ──────────────────────────────────────────────────────────────

/// Coarse band of a risk score.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// `< 0.33` → Low, `< 0.67` → Medium, otherwise High.
    pub fn from_score(score: f64) -> Self {
        if score < 0.33 {
            RiskCategory::Low
        } else if score < 0.67 {
            RiskCategory::Medium
        } else {
            RiskCategory::High
        }
    }

    /// `[low, medium, high]` counts over `scores`.
    pub fn tally(scores: &[f64]) -> [usize; 3] {
        let mut out = [0; 3];
        for &s in scores {
            out[RiskCategory::from_score(s) as usize] += 1;
        }
        out
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        })
    }
}

// ── ScoreBreakdown ────────────────────────────────────────────────────────────

/// The individual terms behind one fused score.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoreBreakdown {
    pub cluster_rank: usize,
    pub normalized_rank: f64,
    pub high_risk_probability: f64,
    pub lighting_penalty: f64,
    /// Final clipped score in `[0, 1]`.
    pub score: f64,
}

// ── FittedRiskModel ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FittedRiskModel {
    pub scaler: StandardScaler,
    pub kmeans: KMeans,
    /// `cluster_rank[c]` = ordinal risk rank of cluster `c` (0 = fewest
    /// incidents on average).
    pub cluster_rank: Vec<usize>,
    pub classifier: LogisticRegression,
}

impl FittedRiskModel {
    /// Fit scaler, clusters, and classifier on a feature table.
    pub fn fit(features: &[LocationFeatures], config: &RouteConfig) -> RiskResult<Self> {
        config.validate()?;
        let k = config.n_clusters;
        if features.is_empty() {
            return Err(RiskError::EmptyInput);
        }
        if features.len() < k {
            return Err(RiskError::TooFewLocations { clusters: k, locations: features.len() });
        }

        let rows: Vec<FeatureRow> = features.iter().map(LocationFeatures::row).collect();
        let scaler = StandardScaler::fit(&rows);
        let scaled: Vec<FeatureRow> = rows.iter().map(|r| structural(&scaler, r)).collect();

        let params = KMeansParams {
            k,
            restarts: config.kmeans_restarts,
            max_iter: config.kmeans_max_iter,
            tol: config.kmeans_tol,
        };
        let clustering = KMeans::fit(&scaled, params, &SeededRng::new(config.seed));
        let cluster_rank = rank_clusters(&rows, &clustering.labels, k);

        let top = k - 1;
        let targets: Vec<bool> =
            clustering.labels.iter().map(|&c| cluster_rank[c] == top).collect();
        let classifier =
            LogisticRegression::fit(&scaled, &targets, config.logistic_c, config.logistic_max_iter);

        log::info!(
            "risk model fitted on {} locations: {k} clusters, inertia {:.3}, {} high-risk",
            features.len(),
            clustering.inertia,
            targets.iter().filter(|&&t| t).count(),
        );

        Ok(Self { scaler, kmeans: clustering.model, cluster_rank, classifier })
    }

    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.kmeans.k()
    }

    /// Ordinal risk rank of the cluster nearest to `features`.
    pub fn cluster_rank(&self, features: &LocationFeatures) -> usize {
        let scaled = structural(&self.scaler, &features.row());
        self.cluster_rank[self.kmeans.predict(&scaled)]
    }

    /// Classifier probability that `features` belongs to the top cluster.
    pub fn high_risk_probability(&self, features: &LocationFeatures) -> f64 {
        self.classifier.predict_proba(&structural(&self.scaler, &features.row()))
    }

    /// Fused score with its components.
    pub fn breakdown(&self, features: &LocationFeatures) -> ScoreBreakdown {
        let row = features.row();
        let scaled = structural(&self.scaler, &row);

        let cluster_rank = self.cluster_rank[self.kmeans.predict(&scaled)];
        let k = self.n_clusters();
        let normalized_rank = if k > 1 { cluster_rank as f64 / (k - 1) as f64 } else { 0.0 };
        let high_risk_probability = self.classifier.predict_proba(&scaled);
        let lighting_penalty = LIGHTING_PENALTY * (1.0 - row[LIGHTING_COL].clamp(0.0, 1.0));

        let raw = CLUSTER_WEIGHT * normalized_rank
            + PROBABILITY_WEIGHT * high_risk_probability
            + lighting_penalty;

        ScoreBreakdown {
            cluster_rank,
            normalized_rank,
            high_risk_probability,
            lighting_penalty,
            score: raw.clamp(0.0, 1.0),
        }
    }

    /// Risk score in `[0, 1]` for one location.
    #[inline]
    pub fn score(&self, features: &LocationFeatures) -> f64 {
        self.breakdown(features).score
    }

    /// One score per row, same order as `features`.
    pub fn predict(&self, features: &[LocationFeatures]) -> Vec<f64> {
        features.iter().map(|f| self.score(f)).collect()
    }
}

/// Standardised row with the lighting column pinned to its training mean.
fn structural(scaler: &StandardScaler, row: &FeatureRow) -> FeatureRow {
    let mut scaled = scaler.transform(row);
    scaled[LIGHTING_COL] = 0.0;
    scaled
}

/// Rank clusters by mean raw `total_incidents`, ascending.
///
/// Empty clusters sort after every populated one; equal means keep cluster
/// index order.
fn rank_clusters(rows: &[FeatureRow], labels: &[usize], k: usize) -> Vec<usize> {
    let mut sums = vec![0.0; k];
    let mut counts = vec![0usize; k];
    for (row, &c) in rows.iter().zip(labels) {
        sums[c] += row[TOTAL_INCIDENTS_COL];
        counts[c] += 1;
    }
    let means: Vec<Option<f64>> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &n)| (n > 0).then(|| s / n as f64))
        .collect();

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| match (means[a], means[b]) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let mut rank = vec![0; k];
    for (r, &c) in order.iter().enumerate() {
        rank[c] = r;
    }
    rank
}

// ── RiskModel ─────────────────────────────────────────────────────────────────

/// Fit-then-predict wrapper around [`FittedRiskModel`].
pub struct RiskModel {
    config: RouteConfig,
    fitted: Option<FittedRiskModel>,
}

impl RiskModel {
    pub fn new(config: RouteConfig) -> Self {
        Self { config, fitted: None }
    }

    /// Fit (or refit) on `features`, replacing any previous model.  On error
    /// the previous model is discarded.
    pub fn fit(&mut self, features: &[LocationFeatures]) -> RiskResult<&FittedRiskModel> {
        self.fitted = None;
        let model = FittedRiskModel::fit(features, &self.config)?;
        Ok(self.fitted.insert(model))
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn fitted(&self) -> RiskResult<&FittedRiskModel> {
        self.fitted.as_ref().ok_or(RiskError::NotFitted)
    }

    /// Risk scores for `features`.  Fails with [`RiskError::NotFitted`]
    /// before a successful [`fit`](Self::fit).
    pub fn predict(&self, features: &[LocationFeatures]) -> RiskResult<Vec<f64>> {
        Ok(self.fitted()?.predict(features))
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }
}
