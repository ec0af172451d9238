use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dtype::Float;
use crate::error::{TensorError, TensorResult};

/// Seeded source of randomness for tensor construction.
///
/// Two generators built from the same seed yield the same stream, so every
/// tensor drawn from them is reproducible.
#[derive(Debug, Clone)]
pub struct Generator {
    rng: StdRng,
    seed: u64,
}

impl Generator {
    pub fn new(seed: u64) -> Self {
        Generator {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from OS entropy. The chosen seed is still recorded.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Reset the stream to the start of `seed`.
    pub fn manual_seed(&mut self, seed: u64) -> &mut Self {
        trace!("reseeding generator: {} -> {}", self.seed, seed);
        self.rng = StdRng::seed_from_u64(seed);
        self.seed = seed;
        self
    }

    pub fn initial_seed(&self) -> u64 {
        self.seed
    }

    /// Uniform sample from `[0, 1)`.
    pub fn uniform<T: Float>(&mut self) -> T {
        T::sample_unit(&mut self.rng)
    }

    /// Uniform integer from `[low, high)`.
    pub fn randint(&mut self, low: i64, high: i64) -> TensorResult<i64> {
        if low >= high {
            return Err(TensorError::InvalidRange { low, high });
        }
        Ok(self.rng.gen_range(low..high))
    }

    /// Pair of independent standard normal samples (Box-Muller).
    pub fn normal_pair(&mut self) -> (f64, f64) {
        let u1: f64 = self.rng.gen::<f64>().max(1e-10);
        let u2: f64 = self.rng.gen::<f64>();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;
        (r * theta.cos(), r * theta.sin())
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::from_entropy()
    }
}
