//! Probability distributions.
//!
//! Only the standard normal is needed; its CDF delegates to `statrs`.

pub mod normal;

pub use normal::normal_cdf;
