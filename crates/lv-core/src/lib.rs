//! # lv-core
//!
//! Core types, error definitions, clamp diagnostics and settings for
//! localvol-rs.
//!
//! This crate provides the building blocks shared across the other crates in
//! the workspace – type aliases, the error taxonomy, the observable
//! numerical-clamp counters and the configuration structs.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Observable numerical clamps (`NumericalClampEvent`, `ClampCounters`).
pub mod clamp;

/// Error types and the `ensure!` / `require!` macros.
pub mod errors;

/// Numerical and Monte Carlo settings.
pub mod settings;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A continuously-compounded, annualised rate (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A discount factor in [0, 1].
pub type DiscountFactor = Real;

/// A price or value.
pub type Price = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use clamp::{ClampCounters, ClampKind, ClampStats, NumericalClampEvent};
pub use errors::{Error, Result};
pub use settings::{McSettings, Settings};
