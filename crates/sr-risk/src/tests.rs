//! Unit tests for sr-risk.
//!
//! Fixtures are small hand-built feature tables with clearly separated
//! groups, so cluster assignments are unambiguous for any seed.

#[cfg(test)]
mod helpers {
    use sr_core::LocationId;

    use crate::LocationFeatures;

    /// `(lighting, total, high, recent)` tuples → feature rows with ids
    /// `0..n`.
    pub fn table(rows: &[(f64, f64, f64, f64)]) -> Vec<LocationFeatures> {
        rows.iter()
            .enumerate()
            .map(|(i, &(lighting, total, high, recent))| LocationFeatures {
                location: LocationId(i as u32),
                lighting,
                total_incidents: total,
                high_severity: high,
                recent_incidents: recent,
            })
            .collect()
    }

    /// Three well-separated tiers of four locations each:
    ///   0..4  safe       (bright, no incidents)
    ///   4..8  medium     (dim, a few incidents)
    ///   8..12 dangerous  (dark, many incidents)
    pub fn three_tiers() -> Vec<LocationFeatures> {
        table(&[
            (0.90, 0.0, 0.0, 0.0),
            (0.92, 1.0, 0.0, 0.0),
            (0.88, 0.0, 0.0, 0.0),
            (0.91, 1.0, 0.0, 1.0),
            (0.50, 5.0, 1.0, 2.0),
            (0.52, 4.0, 1.0, 1.0),
            (0.48, 5.0, 1.0, 1.0),
            (0.50, 4.0, 2.0, 2.0),
            (0.10, 12.0, 5.0, 5.0),
            (0.12, 11.0, 4.0, 4.0),
            (0.08, 12.0, 5.0, 4.0),
            (0.10, 13.0, 4.0, 5.0),
        ])
    }
}

// ── Feature aggregation ───────────────────────────────────────────────────────

#[cfg(test)]
mod features {
    use sr_core::{IncidentRecord, Location, LocationId, Severity};

    use crate::{LocationFeatures, aggregate_features};

    fn locations() -> Vec<Location> {
        vec![
            Location::new(LocationId(10), 40.0, -74.0, 0.8),
            Location::new(LocationId(20), 40.001, -74.0, 0.2),
            Location::new(LocationId(30), 40.002, -74.0, 0.5),
        ]
    }

    #[test]
    fn counts_per_location() {
        let incidents = vec![
            IncidentRecord::new(LocationId(10), 20, Severity::High),
            IncidentRecord::new(LocationId(10), 2, Severity::Low),
            IncidentRecord::new(LocationId(20), 19, Severity::Medium),
            IncidentRecord::new(LocationId(20), 23, Severity::High),
            IncidentRecord::new(LocationId(20), 17, Severity::High),
        ];
        let f = aggregate_features(&locations(), &incidents, 20, 3);

        assert_eq!(f.len(), 3);
        assert_eq!(f[0].location, LocationId(10));
        assert_eq!(f[0].total_incidents, 2.0);
        assert_eq!(f[0].high_severity, 1.0);
        assert_eq!(f[0].recent_incidents, 1.0); // hour 2 is outside 17..=23

        assert_eq!(f[1].total_incidents, 3.0);
        assert_eq!(f[1].high_severity, 2.0);
        assert_eq!(f[1].recent_incidents, 3.0); // 17 and 23 are both window edges
        assert_eq!(f[1].lighting, 0.2);
    }

    #[test]
    fn locations_without_incidents_default_to_zero() {
        let f = aggregate_features(&locations(), &[], 12, 3);
        assert!(f.iter().all(|x| x.total_incidents == 0.0
            && x.high_severity == 0.0
            && x.recent_incidents == 0.0));
    }

    #[test]
    fn window_does_not_wrap_midnight() {
        let incidents = vec![IncidentRecord::new(LocationId(30), 23, Severity::Low)];
        let f = aggregate_features(&locations(), &incidents, 1, 3);
        assert_eq!(f[2].total_incidents, 1.0);
        assert_eq!(f[2].recent_incidents, 0.0);
    }

    #[test]
    fn unknown_locations_are_ignored() {
        let incidents = vec![IncidentRecord::new(LocationId(99), 12, Severity::High)];
        let f = aggregate_features(&locations(), &incidents, 12, 3);
        assert!(f.iter().all(|x| x.total_incidents == 0.0));
    }

    #[test]
    fn partial_rows_fill_missing_counts() {
        let f = LocationFeatures::from_partial(LocationId(1), 1.4, Some(3.0), None, Some(f64::NAN));
        assert_eq!(f.lighting, 1.0);
        assert_eq!(f.total_incidents, 3.0);
        assert_eq!(f.high_severity, 0.0);
        assert_eq!(f.recent_incidents, 0.0);
    }
}

// ── Scaler ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scaler {
    use crate::StandardScaler;

    #[test]
    fn standardises_columns() {
        let rows = [[0.0, 2.0, 5.0, 1.0], [1.0, 4.0, 5.0, 3.0]];
        let s = StandardScaler::fit(&rows);
        assert_eq!(s.mean, [0.5, 3.0, 5.0, 2.0]);
        assert_eq!(s.scale, [0.5, 1.0, 1.0, 1.0]); // constant column → scale 1
        assert_eq!(s.transform(&rows[0]), [-1.0, -1.0, 0.0, -1.0]);
        assert_eq!(s.transform(&rows[1]), [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn frozen_after_fit() {
        let s = StandardScaler::fit(&[[0.0; 4], [2.0; 4]]);
        // A new row far outside the training range is mapped, not refitted.
        assert_eq!(s.transform(&[4.0; 4]), [3.0; 4]);
    }
}

// ── k-means ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod kmeans {
    use sr_core::SeededRng;

    use crate::kmeans::KMeansParams;
    use crate::{FeatureRow, KMeans};

    fn blobs() -> Vec<FeatureRow> {
        vec![
            [0.0, 0.0, 0.0, 0.0],
            [0.1, 0.0, 0.1, 0.0],
            [0.0, 0.1, 0.0, 0.1],
            [10.0, 10.0, 10.0, 10.0],
            [10.1, 10.0, 9.9, 10.0],
            [9.9, 10.1, 10.0, 10.0],
        ]
    }

    fn params(k: usize) -> KMeansParams {
        KMeansParams { k, restarts: 5, max_iter: 100, tol: 1e-6 }
    }

    #[test]
    fn separates_two_blobs() {
        let fit = KMeans::fit(&blobs(), params(2), &SeededRng::new(42));
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[1], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[4], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
        assert!(fit.inertia < 1.0, "inertia {}", fit.inertia);
    }

    #[test]
    fn predict_matches_training_labels() {
        let data = blobs();
        let fit = KMeans::fit(&data, params(2), &SeededRng::new(1));
        for (p, &l) in data.iter().zip(&fit.labels) {
            assert_eq!(fit.model.predict(p), l);
        }
    }

    #[test]
    fn deterministic_for_seed() {
        let a = KMeans::fit(&blobs(), params(3), &SeededRng::new(9));
        let b = KMeans::fit(&blobs(), params(3), &SeededRng::new(9));
        assert_eq!(a.model, b.model);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn identical_points_collapse_into_one_cluster() {
        let data = vec![[1.0, 2.0, 3.0, 4.0]; 5];
        let fit = KMeans::fit(&data, params(3), &SeededRng::new(0));
        assert!(fit.labels.iter().all(|&l| l == 0));
        assert_eq!(fit.inertia, 0.0);
    }
}

// ── Logistic regression ───────────────────────────────────────────────────────

#[cfg(test)]
mod logistic {
    use crate::LogisticRegression;
    use crate::logistic::sigmoid;

    #[test]
    fn sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn learns_a_separating_direction() {
        let x = [
            [-2.0, 0.0, 0.0, 0.0],
            [-1.5, 0.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [1.5, 0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0, 0.0],
        ];
        let y = [false, false, false, true, true, true];
        let clf = LogisticRegression::fit(&x, &y, 1.0, 100);

        assert!(clf.weights[0] > 0.0);
        assert!(clf.predict_proba(&[2.0, 0.0, 0.0, 0.0]) > 0.8);
        assert!(clf.predict_proba(&[-2.0, 0.0, 0.0, 0.0]) < 0.2);
        // Symmetric data → boundary at the origin.
        assert!((clf.predict_proba(&[0.0; 4]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn single_class_target_is_constant() {
        let x = [[1.0, 0.0, 0.0, 0.0], [-1.0, 0.0, 0.0, 0.0]];
        let never = LogisticRegression::fit(&x, &[false, false], 1.0, 100);
        assert!(never.predict_proba(&x[0]) < 1e-12);
        let always = LogisticRegression::fit(&x, &[true, true], 1.0, 100);
        assert!(always.predict_proba(&x[1]) > 1.0 - 1e-12);
    }

    #[test]
    fn stronger_regularisation_shrinks_weights() {
        let x = [
            [-1.0, 0.0, 0.0, 0.0],
            [-0.5, 0.0, 0.0, 0.0],
            [0.5, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
        ];
        let y = [false, false, true, true];
        let loose = LogisticRegression::fit(&x, &y, 10.0, 100);
        let tight = LogisticRegression::fit(&x, &y, 0.1, 100);
        assert!(tight.weights[0].abs() < loose.weights[0].abs());
    }
}

// ── Fused model ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod model {
    use sr_core::RouteConfig;

    use super::helpers::{table, three_tiers};
    use crate::{FittedRiskModel, RiskCategory, RiskError, RiskModel};

    #[test]
    fn scores_are_bounded() {
        let features = three_tiers();
        let model = FittedRiskModel::fit(&features, &RouteConfig::default()).unwrap();
        let scores = model.predict(&features);
        assert_eq!(scores.len(), features.len());
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)), "{scores:?}");
    }

    #[test]
    fn tiers_rank_in_order() {
        let features = three_tiers();
        let model = FittedRiskModel::fit(&features, &RouteConfig::default()).unwrap();

        assert_eq!(model.cluster_rank(&features[0]), 0);
        assert_eq!(model.cluster_rank(&features[5]), 1);
        assert_eq!(model.cluster_rank(&features[9]), 2);

        let scores = model.predict(&features);
        let max_safe = scores[0..4].iter().cloned().fold(f64::MIN, f64::max);
        let min_med = scores[4..8].iter().cloned().fold(f64::MAX, f64::min);
        let max_med = scores[4..8].iter().cloned().fold(f64::MIN, f64::max);
        let min_danger = scores[8..12].iter().cloned().fold(f64::MAX, f64::min);
        assert!(max_safe < min_med, "{scores:?}");
        assert!(max_med < min_danger, "{scores:?}");

        assert_eq!(RiskCategory::from_score(scores[0]), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(scores[10]), RiskCategory::High);
    }

    #[test]
    fn breakdown_matches_fusion_formula() {
        let features = three_tiers();
        let model = FittedRiskModel::fit(&features, &RouteConfig::default()).unwrap();
        let b = model.breakdown(&features[5]);
        let expected = 0.6 * b.normalized_rank + 0.4 * b.high_risk_probability + b.lighting_penalty;
        assert!((b.score - expected.clamp(0.0, 1.0)).abs() < 1e-12);
        assert!((b.lighting_penalty - 0.2 * (1.0 - 0.52)).abs() < 1e-12);
        assert_eq!(b.normalized_rank, 0.5);
    }

    #[test]
    fn more_light_never_raises_risk() {
        let features = three_tiers();
        let model = FittedRiskModel::fit(&features, &RouteConfig::default()).unwrap();

        for base in &features {
            let mut brighter = *base;
            brighter.lighting = (base.lighting + 0.05).min(1.0);
            assert!(
                model.score(&brighter) <= model.score(base) + 1e-12,
                "lighting {} → {} raised risk",
                base.lighting,
                brighter.lighting
            );
        }
    }

    #[test]
    fn light_lowers_risk_even_where_bright_streets_are_busy() {
        // Lighting correlates with danger here, the opposite of three_tiers.
        let features = table(&[
            (0.05, 0.0, 0.0, 0.0),
            (0.10, 1.0, 0.0, 0.0),
            (0.08, 0.0, 0.0, 1.0),
            (0.12, 1.0, 0.0, 0.0),
            (0.50, 5.0, 1.0, 2.0),
            (0.55, 4.0, 1.0, 1.0),
            (0.45, 5.0, 2.0, 1.0),
            (0.50, 4.0, 1.0, 2.0),
            (0.95, 12.0, 5.0, 5.0),
            (0.90, 11.0, 4.0, 4.0),
            (0.92, 12.0, 5.0, 4.0),
            (0.98, 13.0, 4.0, 5.0),
        ]);
        let model = FittedRiskModel::fit(&features, &RouteConfig::default()).unwrap();
        assert_eq!(model.classifier.weights[0], 0.0);

        for base in &features {
            let mut prev = f64::INFINITY;
            for step in 0..=20 {
                let mut lit = *base;
                lit.lighting = step as f64 * 0.05;
                let score = model.score(&lit);
                assert!(
                    score <= prev + 1e-12,
                    "{}: lighting {:.2} raised risk to {score:.4} from {prev:.4}",
                    base.location,
                    lit.lighting
                );
                assert_eq!(model.cluster_rank(&lit), model.cluster_rank(base));
                prev = score;
            }
        }
    }

    #[test]
    fn identical_locations_get_identical_scores() {
        let features = table(&[(0.4, 3.0, 1.0, 1.0); 6]);
        let model = FittedRiskModel::fit(&features, &RouteConfig::default()).unwrap();
        let scores = model.predict(&features);
        assert!(scores.windows(2).all(|w| w[0] == w[1]), "{scores:?}");
    }

    #[test]
    fn fit_is_deterministic() {
        let features = three_tiers();
        let a = FittedRiskModel::fit(&features, &RouteConfig::default()).unwrap();
        let b = FittedRiskModel::fit(&features, &RouteConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        let cfg = RouteConfig::default();
        assert!(matches!(FittedRiskModel::fit(&[], &cfg), Err(RiskError::EmptyInput)));
        let two = table(&[(0.5, 1.0, 0.0, 0.0), (0.5, 2.0, 0.0, 0.0)]);
        assert!(matches!(
            FittedRiskModel::fit(&two, &cfg),
            Err(RiskError::TooFewLocations { clusters: 3, locations: 2 })
        ));
        let bad = RouteConfig { n_clusters: 0, ..RouteConfig::default() };
        assert!(matches!(FittedRiskModel::fit(&two, &bad), Err(RiskError::Core(_))));
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = RiskModel::new(RouteConfig::default());
        assert!(!model.is_fitted());
        assert!(matches!(model.predict(&three_tiers()), Err(RiskError::NotFitted)));
    }

    #[test]
    fn wrapper_fit_then_predict() {
        let features = three_tiers();
        let mut model = RiskModel::new(RouteConfig::default());
        model.fit(&features).unwrap();
        let scores = model.predict(&features).unwrap();
        assert_eq!(scores, model.fitted().unwrap().predict(&features));
    }

    #[test]
    fn failed_refit_discards_previous_model() {
        let mut model = RiskModel::new(RouteConfig::default());
        model.fit(&three_tiers()).unwrap();
        assert!(model.fit(&[]).is_err());
        assert!(matches!(model.predict(&three_tiers()), Err(RiskError::NotFitted)));
    }

    #[test]
    fn category_thresholds() {
        assert_eq!(RiskCategory::from_score(0.0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(0.3299), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(0.33), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(0.6699), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(0.67), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(1.0), RiskCategory::High);
        assert_eq!(RiskCategory::tally(&[0.1, 0.5, 0.9, 0.95]), [1, 1, 2]);
    }
}
