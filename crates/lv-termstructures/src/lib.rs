//! # lv-termstructures
//!
//! Rate curves, the market implied-volatility grid, the market-data
//! container, the fitted total-variance surface and the Dupire
//! local-volatility field derived from it.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `TermStructure`: rate and dividend curves over year fractions.
pub mod term_structure;

/// `ImpliedVolatilityGrid`: discrete (maturity, strike) implied vols.
pub mod implied_vol_grid;

/// `MarketData`: spot, curves and implied-vol grid.
pub mod market_data;

/// `VarianceSurface`: total variance over (maturity, log-moneyness).
pub mod variance_surface;

/// `LocalVolatilityField`: Dupire local volatility from a `VarianceSurface`.
pub mod local_vol_surface;

/// `DupireCalibrator`: market data to variance surface to local vol field.
pub mod calibration;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use calibration::{Calibration, DupireCalibrator};
pub use implied_vol_grid::ImpliedVolatilityGrid;
pub use local_vol_surface::{DupireDenominator, LocalVolSlice, LocalVolatilityField};
pub use market_data::MarketData;
pub use term_structure::{CurveExtrapolation, FlatCurve, InterpolatedCurve, TermStructure};
pub use variance_surface::{CalendarViolation, VarianceSample, VarianceSlice, VarianceSurface};
