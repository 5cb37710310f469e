use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Uniform};

use super::ParamGen;
use crate::{MlErr, Result};

/// A parameter generator that follows a certain probabilistic distribution.
#[derive(Debug, Clone)]
pub struct RandParamGen<R: Rng, D: Distribution<f32>> {
    rng: R,
    distribution: D,
    remaining: usize,
}

impl<R: Rng, D: Distribution<f32>> RandParamGen<R, D> {
    /// Creates a new `RandParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the random numbers from.
    /// * `limit` - The maximum amount of numbers to generate.
    pub fn new(rng: R, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            remaining: limit,
        }
    }
}

impl<R: Rng> RandParamGen<R, Uniform<f32>> {
    /// Creates a new `RandParamGen` parameter generator with a uniform distribution.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `limit` - The maximum amount of numbers to generate.
    /// * `low` - The inclusive lower limit.
    /// * `high` - The exclusive upper limit.
    ///
    /// # Returns
    /// An error if the range is invalid (low >= high).
    pub fn uniform(rng: R, limit: usize, low: f32, high: f32) -> Result<Self> {
        let distribution =
            Uniform::new(low, high).map_err(|e| MlErr::InvalidInit(e.to_string()))?;
        Ok(Self::new(rng, distribution, limit))
    }
}

impl RandParamGen<StdRng, Uniform<f32>> {
    /// Creates a reproducible uniform generator out of a seed.
    pub fn seeded_uniform(seed: u64, limit: usize, low: f32, high: f32) -> Result<Self> {
        Self::uniform(StdRng::seed_from_u64(seed), limit, low, high)
    }
}

impl<R: Rng, D: Distribution<f32>> ParamGen for RandParamGen<R, D> {
    fn sample(&mut self, mut n: usize) -> Option<Vec<f32>> {
        if self.remaining == 0 {
            return None;
        }

        n = n.min(self.remaining);
        self.remaining -= n;

        let values = (0..n)
            .map(|_| self.distribution.sample(&mut self.rng))
            .collect();

        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_stays_in_range() {
        let mut param_gen = RandParamGen::seeded_uniform(7, 64, -0.5, 0.5).unwrap();
        let values = param_gen.sample(64).unwrap();

        assert_eq!(values.len(), 64);
        assert!(values.iter().all(|v| (-0.5..0.5).contains(v)));
        assert_eq!(param_gen.sample(1), None);
    }

    #[test]
    fn test_same_seed_same_values() {
        let mut a = RandParamGen::seeded_uniform(42, 8, -1.0, 1.0).unwrap();
        let mut b = RandParamGen::seeded_uniform(42, 8, -1.0, 1.0).unwrap();
        assert_eq!(a.sample(8), b.sample(8));
    }

    #[test]
    fn test_uniform_rejects_empty_range() {
        let err = RandParamGen::seeded_uniform(0, 1, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, MlErr::InvalidInit(_)));
    }
}
