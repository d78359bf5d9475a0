//! Binary logistic classifier.
//!
//! Maximises the L2-penalised log-likelihood
//!
//! ```text
//! Σ [ yᵢ log pᵢ + (1 − yᵢ) log(1 − pᵢ) ] − ‖w‖² / (2C),   pᵢ = σ(w·xᵢ + b)
//! ```
//!
//! by Newton's method (iteratively reweighted least squares).  The intercept
//! is not penalised.  With only [`N_FEATURES`] + 1 parameters each Newton
//! step is a dense 5×5 solve.

use crate::{FeatureRow, N_FEATURES};

const DIM: usize = N_FEATURES + 1;

/// Logit stored for a degenerate single-class target; σ(36) rounds to 1.
const SATURATED_LOGIT: f64 = 36.0;

/// Diagonal jitter keeping the Hessian invertible when probabilities
/// saturate.
const HESSIAN_JITTER: f64 = 1e-9;

/// Newton steps smaller than this (max-norm) count as converged.
const STEP_TOL: f64 = 1e-8;

/// Numerically stable logistic function.
#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogisticRegression {
    pub weights: FeatureRow,
    pub intercept: f64,
}

impl LogisticRegression {
    /// Fit on standardised rows `x` against boolean labels `y`.
    ///
    /// A target with a single class has no decision boundary to learn; the
    /// classifier then returns that class's probability (≈ 0 or ≈ 1) for
    /// every input.
    pub fn fit(x: &[FeatureRow], y: &[bool], c: f64, max_iter: usize) -> Self {
        let positives = y.iter().filter(|&&v| v).count();
        if positives == 0 || positives == y.len() {
            let sign = if positives == 0 { -1.0 } else { 1.0 };
            return Self { weights: [0.0; N_FEATURES], intercept: sign * SATURATED_LOGIT };
        }

        let lambda = 1.0 / c;
        // theta = [w_0 .. w_{n-1}, b]
        let mut theta = [0.0; DIM];
        let mut iterations = 0;

        for _ in 0..max_iter {
            iterations += 1;
            let mut grad = [0.0; DIM];
            let mut hess = [[0.0; DIM]; DIM];

            for (row, &label) in x.iter().zip(y) {
                let xi = augment(row);
                let p = sigmoid(dot(&theta, &xi));
                let r = p - if label { 1.0 } else { 0.0 };
                let s = p * (1.0 - p);
                for a in 0..DIM {
                    grad[a] += r * xi[a];
                    for b in 0..DIM {
                        hess[a][b] += s * xi[a] * xi[b];
                    }
                }
            }
            for j in 0..N_FEATURES {
                grad[j] += lambda * theta[j];
                hess[j][j] += lambda;
            }
            for (a, row) in hess.iter_mut().enumerate() {
                row[a] += HESSIAN_JITTER;
            }

            let Some(step) = solve(hess, grad) else {
                log::debug!("logistic Hessian became singular; stopping early");
                break;
            };
            for (t, s) in theta.iter_mut().zip(&step) {
                *t -= s;
            }
            if step.iter().all(|s| s.abs() < STEP_TOL) {
                break;
            }
        }
        log::debug!("logistic regression fitted in {iterations} Newton iterations");

        let mut weights = [0.0; N_FEATURES];
        weights.copy_from_slice(&theta[..N_FEATURES]);
        Self { weights, intercept: theta[N_FEATURES] }
    }

    /// Linear decision value `w·x + b`.
    #[inline]
    pub fn decision(&self, row: &FeatureRow) -> f64 {
        self.weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + self.intercept
    }

    /// Probability of the positive class.
    #[inline]
    pub fn predict_proba(&self, row: &FeatureRow) -> f64 {
        sigmoid(self.decision(row))
    }
}

#[inline]
fn augment(row: &FeatureRow) -> [f64; DIM] {
    std::array::from_fn(|j| if j < N_FEATURES { row[j] } else { 1.0 })
}

#[inline]
fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: [[f64; DIM]; DIM], mut b: [f64; DIM]) -> Option<[f64; DIM]> {
    for col in 0..DIM {
        let pivot = (col..DIM).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < f64::MIN_POSITIVE {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..DIM {
            let f = a[row][col] / a[col][col];
            if f == 0.0 {
                continue;
            }
            for k in col..DIM {
                a[row][k] -= f * a[col][k];
            }
            b[row] -= f * b[col];
        }
    }

    let mut x = [0.0; DIM];
    for row in (0..DIM).rev() {
        let tail: f64 = (row + 1..DIM).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
