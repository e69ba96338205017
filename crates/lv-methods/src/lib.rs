//! # lv-methods
//!
//! Numerical methods.  Currently the Monte Carlo simulator that advances
//! asset prices under a Dupire local volatility field.
//!
//! # Modules
//!
//! * [`monte_carlo`]: log-Euler path simulation in seeded batches,
//!   sequential or spread over the rayon thread pool

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Monte Carlo simulation: batched log-Euler paths under local volatility.
pub mod monte_carlo;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use monte_carlo::{PathEnsemble, PathSimulator};
