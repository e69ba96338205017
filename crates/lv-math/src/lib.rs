//! # lv-math
//!
//! Mathematical utilities: 1D/2D interpolation, natural and bicubic splines
//! with analytic derivatives, the normal distribution
//! (via statrs), seeded random streams (via rand_mt / rand_distr) and
//! statistics accumulators.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// 1D and 2D interpolation schemes.
pub mod interpolations;

/// Random number generators and stream partitioning.
pub mod random_numbers;

/// Statistics accumulators.
pub mod statistics;

mod tridiagonal;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::normal_cdf;
pub use interpolations::{
    BicubicSpline, BilinearInterpolation, CubicNaturalSpline, Interpolation1D, Interpolation2D,
    LinearInterpolation, SplinePoint, SplineSlice,
};
pub use random_numbers::{stream_seed, GaussianRng};
pub use statistics::IncrementalStatistics;
