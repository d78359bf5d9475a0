//! Centroid-based partitioning (k-means).
//!
//! # Algorithm
//!
//! Each restart seeds centroids with k-means++ (first centroid uniform, each
//! further centroid drawn with probability proportional to its squared
//! distance from the nearest chosen one), then runs Lloyd iterations:
//!
//! 1. assign every point to its nearest centroid (ties → lowest index);
//! 2. move each centroid to the mean of its points (an empty cluster keeps
//!    its previous centroid);
//! 3. stop when total squared centroid movement ≤ `tol` or after
//!    `max_iter` rounds.
//!
//! The restart with the lowest inertia wins; on equal inertia the earliest
//! restart is kept, so results depend only on the seed.

use sr_core::SeededRng;

use crate::FeatureRow;

#[inline]
fn dist_2(a: &FeatureRow, b: &FeatureRow) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Lloyd parameters for one [`KMeans::fit`] call.
#[derive(Copy, Clone, Debug)]
pub struct KMeansParams {
    pub k: usize,
    pub restarts: usize,
    pub max_iter: usize,
    pub tol: f64,
}

/// Fitted cluster centroids.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeans {
    pub centroids: Vec<FeatureRow>,
}

/// Result of [`KMeans::fit`]: the model plus the training assignment.
#[derive(Clone, Debug)]
pub struct KMeansFit {
    pub model: KMeans,
    /// Cluster of each training point, same order as the input.
    pub labels: Vec<usize>,
    /// Sum of squared distances from each point to its centroid.
    pub inertia: f64,
    /// Lloyd iterations run by the winning restart.
    pub iterations: usize,
}

impl KMeans {
    /// Partition `points` into `params.k` clusters.
    ///
    /// Callers guarantee `points.len() >= params.k >= 1`.
    pub fn fit(points: &[FeatureRow], params: KMeansParams, rng: &SeededRng) -> KMeansFit {
        let restart = |r: usize| {
            let mut child = rng.child(r as u64);
            let run = lloyd(points, init_plus_plus(points, params.k, &mut child), params);
            log::debug!(
                "k-means restart {r}: inertia {:.4} after {} iterations",
                run.inertia,
                run.iterations
            );
            run
        };

        let mut best = restart(0);
        for r in 1..params.restarts {
            let run = restart(r);
            if run.inertia < best.inertia {
                best = run;
            }
        }
        best
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Index of the nearest centroid (ties → lowest index).
    pub fn predict(&self, point: &FeatureRow) -> usize {
        nearest(&self.centroids, point).0
    }
}

/// `(index, squared distance)` of the nearest centroid.
fn nearest(centroids: &[FeatureRow], point: &FeatureRow) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = dist_2(c, point);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn init_plus_plus(points: &[FeatureRow], k: usize, rng: &mut SeededRng) -> Vec<FeatureRow> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    let mut d2: Vec<f64> = points.iter().map(|p| dist_2(p, &centroids[0])).collect();
    while centroids.len() < k {
        // All-zero weights (duplicate points) fall back to a uniform pick.
        let idx = rng.weighted_index(&d2).unwrap_or(0);
        let c = points[idx];
        centroids.push(c);
        for (d, p) in d2.iter_mut().zip(points) {
            *d = d.min(dist_2(p, &c));
        }
    }
    centroids
}

fn lloyd(points: &[FeatureRow], mut centroids: Vec<FeatureRow>, params: KMeansParams) -> KMeansFit {
    let k = centroids.len();
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    for _ in 0..params.max_iter {
        iterations += 1;
        for (label, p) in labels.iter_mut().zip(points) {
            *label = nearest(&centroids, p).0;
        }

        let mut sums = vec![[0.0; crate::N_FEATURES]; k];
        let mut counts = vec![0usize; k];
        for (&label, p) in labels.iter().zip(points) {
            counts[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(p) {
                *s += x;
            }
        }

        let mut shift = 0.0;
        for c in 0..k {
            if counts[c] == 0 {
                continue;
            }
            let n = counts[c] as f64;
            let moved: FeatureRow = std::array::from_fn(|j| sums[c][j] / n);
            shift += dist_2(&moved, &centroids[c]);
            centroids[c] = moved;
        }

        if shift <= params.tol {
            break;
        }
    }

    // Final assignment against the converged centroids.
    let mut inertia = 0.0;
    for (label, p) in labels.iter_mut().zip(points) {
        let (i, d) = nearest(&centroids, p);
        *label = i;
        inertia += d;
    }

    KMeansFit { model: KMeans { centroids }, labels, inertia, iterations }
}
