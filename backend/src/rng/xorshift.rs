//! xorshift64* generator backing every random draw in a run
//!
//! A run is reproducible bit-for-bit only if all randomness flows through a
//! single seeded stream in a fixed call order. The engine owns exactly one
//! `RngManager` (inside its variate source) and never touches a global or
//! entropy-seeded generator.

use serde::{Deserialize, Serialize};

const MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;

/// Seeded xorshift64* stream
///
/// # Example
/// ```
/// use er_simulator_core::RngManager;
///
/// let mut rng = RngManager::new(42);
/// let severity = rng.range(1, 6); // [1, 6)
/// assert!((1..6).contains(&severity));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    seed: u64,
    state: u64,
}

impl RngManager {
    /// Create a generator from a seed
    ///
    /// xorshift has an all-zero fixed point, so seed 0 is mapped to 1.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { seed, state }
    }

    /// Seed this generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current internal state
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Restart the stream from the original seed
    pub fn reseed(&mut self) {
        *self = Self::new(self.seed);
    }

    /// Next raw 64-bit value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(MULTIPLIER)
    }

    /// Uniform integer in `[min, max)`
    ///
    /// # Panics
    /// Panics if `min >= max`.
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let span = (max - min) as u64;
        min + (self.next() % span) as i64
    }

    /// Uniform float in `[0.0, 1.0)` with 53 bits of precision
    pub fn next_f64(&mut self) -> f64 {
        (self.next() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }
}
