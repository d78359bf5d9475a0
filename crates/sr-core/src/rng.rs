//! Deterministic RNG wrapper for model fitting.
//!
//! k-means initialisation is the only randomised step in the pipeline.  All
//! randomness flows from one `SeededRng` built from `RouteConfig::seed`, so a
//! fixed seed and a fixed input always yield the same fitted model, the same
//! risk scores, and therefore the same routes.
//!
//! Independent restarts each take a `child` RNG so that changing the number
//! of restarts does not disturb the seeds of the earlier ones.

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

pub struct SeededRng {
    seed: u64,
    inner: SmallRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        SeededRng { seed, inner: SmallRng::seed_from_u64(seed) }
    }

    /// Derive the `n`-th child RNG.  Depends only on the root seed and `n`.
    pub fn child(&self, n: u64) -> SeededRng {
        SeededRng::new(self.seed ^ (n + 1).wrapping_mul(MIXING_CONSTANT))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.inner
    }

    /// Uniform sample in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.inner.r#gen::<f64>()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.inner.gen_range(range)
    }

    /// Pick an index with probability proportional to `weights[i]`.
    ///
    /// Falls back to a uniform pick when every weight is zero or some weight
    /// is negative or NaN.  Returns `None` for an empty slice.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        match WeightedIndex::new(weights) {
            Ok(dist) => Some(dist.sample(&mut self.inner)),
            Err(WeightedError::NoItem) => None,
            Err(_) => Some(self.gen_range(0..weights.len())),
        }
    }
}
