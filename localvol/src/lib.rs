//! # localvol
//!
//! Dupire local-volatility calibration and Monte Carlo pricing of European
//! equity options.
//!
//! This crate is a **façade** that re-exports the public items of the
//! `lv-*` workspace crates.  The pipeline runs one way:
//!
//! ```text
//! MarketData → VarianceSurface → LocalVolatilityField → PathSimulator → DupirePricer
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use localvol::prelude::*;
//!
//! let strikes: Vec<f64> = (0..9).map(|i| 60.0 + 10.0 * i as f64).collect();
//! let grid = ImpliedVolatilityGrid::new(&[0.5, 1.0, 2.0], &strikes, &vec![vec![0.2; 9]; 3])?;
//! let market = Arc::new(MarketData::with_flat_curves(100.0, 0.01, 0.0, grid)?);
//!
//! let calibration = DupireCalibrator::new(Arc::clone(&market)).calibrate()?;
//! assert!((calibration.local_vol.local_vol(100.0, 1.0) - 0.2).abs() < 1e-3);
//!
//! let pricer = DupirePricer::new(&market, &calibration.local_vol);
//! let price = pricer.price_european_call(100.0, 1.0, 2_000, 20, 42)?;
//! assert!(price > 0.0);
//! # Ok::<(), localvol::core::Error>(())
//! ```
//!
//! ## Diagnostics
//!
//! The library logs through `tracing` and never installs a subscriber.
//! Clamp activations are `trace` events, arbitrage found at calibration and
//! clamping during pricing are `warn` events.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, errors, clamp diagnostics and settings.
pub use lv_core as core;

/// Interpolation, splines, distributions, RNG streams and statistics.
pub use lv_math as math;

/// Curves, implied-vol grid, market data, variance and local vol surfaces.
pub use lv_termstructures as termstructures;

/// Monte Carlo path simulation.
pub use lv_methods as methods;

/// Pricing engines.
pub use lv_pricingengines as pricingengines;

/// The types needed to calibrate and price, in one import.
pub mod prelude {
    pub use lv_core::{ClampStats, Error, McSettings, Result, Settings};
    pub use lv_methods::{PathEnsemble, PathSimulator};
    pub use lv_pricingengines::{black_scholes_price, DupirePricer, McResult, OptionType};
    pub use lv_termstructures::{
        Calibration, CurveExtrapolation, DupireCalibrator, DupireDenominator, FlatCurve,
        ImpliedVolatilityGrid, InterpolatedCurve, LocalVolatilityField, MarketData,
        TermStructure, VarianceSurface,
    };
}
