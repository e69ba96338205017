//! # lv-pricingengines
//!
//! European option pricing: Monte Carlo under a calibrated Dupire local
//! volatility field, and the closed-form Black-Scholes-Merton price used as
//! its reference.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Analytic Black-Scholes-Merton European prices.
pub mod analytic_european_engine;

/// Monte Carlo European prices under Dupire local volatility.
pub mod dupire_mc_engine;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use analytic_european_engine::{black_scholes_price, OptionType};
pub use dupire_mc_engine::{DupirePricer, McResult};
