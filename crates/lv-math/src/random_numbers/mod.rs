//! Random number generators.
//!
//! The generator wraps the MT19937-64 of `rand_mt`.  There is no
//! shared or global generator: every simulation batch builds its own from a
//! seed derived with [`stream_seed`], which keeps results reproducible no
//! matter how batches are scheduled across threads.

use lv_core::Real;
use rand::Rng;
use rand_distr::StandardNormal;
use rand_mt::Mt64;

/// Derive the seed of sub-stream `stream` from a master `seed`.
///
/// SplitMix64 finaliser over `seed + (stream + 1)·φ`, with φ the 64-bit
/// golden-ratio increment, so neighbouring streams get decorrelated seeds.
pub fn stream_seed(seed: u64, stream: u64) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut z = seed.wrapping_add(stream.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A standard-normal generator: MT19937-64 driving the ziggurat sampler of
/// `rand_distr::StandardNormal`.
pub struct GaussianRng {
    rng: Mt64,
}

impl GaussianRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { rng: Mt64::new(seed) }
    }

    /// Generator for sub-stream `stream` of master `seed`.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        Self::new(stream_seed(seed, stream))
    }

    /// Fill `out` with independent standard-normal deviates.
    pub fn fill(&mut self, out: &mut [Real]) {
        for z in out.iter_mut() {
            *z = self.rng.sample(StandardNormal);
        }
    }
}
