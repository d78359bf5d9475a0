//! Column standardisation.
//!
//! Fitted once on the training table and frozen; prediction reuses the
//! stored mean and scale so new rows land in the same coordinate system.

use crate::{FeatureRow, N_FEATURES};

/// Per-column `(x - mean) / scale`.
///
/// `scale` is the population standard deviation.  A constant column has
/// scale 1, so it standardises to 0 instead of dividing by zero.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandardScaler {
    pub mean: FeatureRow,
    pub scale: FeatureRow,
}

impl StandardScaler {
    /// Compute column means and standard deviations.  `rows` must be
    /// non-empty.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let n = rows.len().max(1) as f64;

        let mut mean = [0.0; N_FEATURES];
        for row in rows {
            for (m, &x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut scale = [0.0; N_FEATURES];
        for row in rows {
            for ((s, &x), &m) in scale.iter_mut().zip(row).zip(&mean) {
                *s += (x - m) * (x - m);
            }
        }
        for s in &mut scale {
            let sd = (*s / n).sqrt();
            *s = if sd > f64::EPSILON { sd } else { 1.0 };
        }

        Self { mean, scale }
    }

    #[inline]
    pub fn transform(&self, row: &FeatureRow) -> FeatureRow {
        std::array::from_fn(|j| (row[j] - self.mean[j]) / self.scale[j])
    }

    pub fn transform_all(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}
