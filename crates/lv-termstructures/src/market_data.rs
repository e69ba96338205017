//! `MarketData`: everything the calibration reads from the market.
//!
//! Spot, a discount-rate curve, a dividend-yield curve and the implied-vol
//! grid.  The forward is defined here once, and every consumer (surface
//! fit, surface queries, local vol) goes through [`MarketData::forward`].

use std::sync::Arc;

use lv_core::{require, DiscountFactor, Error, Price, Rate, Real, Result, Time, Volatility};

use crate::implied_vol_grid::ImpliedVolatilityGrid;
use crate::term_structure::{FlatCurve, TermStructure};

/// Equity market data for one underlying.
#[derive(Debug, Clone)]
pub struct MarketData {
    spot: Price,
    discount_curve: Arc<dyn TermStructure>,
    dividend_curve: Arc<dyn TermStructure>,
    vol_grid: ImpliedVolatilityGrid,
}

impl MarketData {
    /// Assemble market data.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `spot` is not positive and finite.
    pub fn new(
        spot: Price,
        discount_curve: Arc<dyn TermStructure>,
        dividend_curve: Arc<dyn TermStructure>,
        vol_grid: ImpliedVolatilityGrid,
    ) -> Result<Self> {
        require!(
            spot.is_finite() && spot > 0.0,
            Error::InvalidArgument,
            "spot must be positive and finite, got {spot}"
        );
        Ok(Self {
            spot,
            discount_curve,
            dividend_curve,
            vol_grid,
        })
    }

    /// Market data with constant rate and dividend yield.
    pub fn with_flat_curves(
        spot: Price,
        rate: Rate,
        dividend: Rate,
        vol_grid: ImpliedVolatilityGrid,
    ) -> Result<Self> {
        Self::new(
            spot,
            Arc::new(FlatCurve::new(rate)),
            Arc::new(FlatCurve::new(dividend)),
            vol_grid,
        )
    }

    /// Spot price.
    pub fn spot(&self) -> Price {
        self.spot
    }

    /// Continuously-compounded discount rate `r(t)`.
    pub fn discount_rate(&self, t: Time) -> Rate {
        self.discount_curve.value_at(t)
    }

    /// Continuously-compounded dividend yield `q(t)`.
    pub fn dividend_rate(&self, t: Time) -> Rate {
        self.dividend_curve.value_at(t)
    }

    /// `exp(−r(t)·t)`.
    pub fn discount_factor(&self, t: Time) -> DiscountFactor {
        (-self.discount_rate(t) * t).exp()
    }

    /// Forward price `spot · exp((r(t) − q(t))·t)`.
    pub fn forward(&self, t: Time) -> Price {
        self.spot * ((self.discount_rate(t) - self.dividend_rate(t)) * t).exp()
    }

    /// Market implied vol at `(strike, maturity)`.
    pub fn implied_vol(&self, strike: Real, maturity: Time) -> Volatility {
        self.vol_grid.vol_at(strike, maturity)
    }

    /// Market implied vols at each of `strikes` for one maturity.
    pub fn implied_vols(&self, strikes: &[Real], maturity: Time) -> Vec<Volatility> {
        self.vol_grid.vols_at(strikes, maturity)
    }

    /// The implied-vol grid.
    pub fn vol_grid(&self) -> &ImpliedVolatilityGrid {
        &self.vol_grid
    }

    /// The discount-rate curve.
    pub fn discount_curve(&self) -> &Arc<dyn TermStructure> {
        &self.discount_curve
    }

    /// The dividend-yield curve.
    pub fn dividend_curve(&self) -> &Arc<dyn TermStructure> {
        &self.dividend_curve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term_structure::InterpolatedCurve;
    use approx::assert_abs_diff_eq;

    fn grid() -> ImpliedVolatilityGrid {
        ImpliedVolatilityGrid::new(
            &[0.5, 1.0, 2.0],
            &[80.0, 100.0, 120.0],
            &vec![vec![0.2; 3]; 3],
        )
        .unwrap()
    }

    #[test]
    fn forward_and_discounting() {
        let md = MarketData::with_flat_curves(100.0, 0.05, 0.02, grid()).unwrap();
        assert_eq!(md.spot(), 100.0);
        assert_abs_diff_eq!(md.forward(2.0), 100.0 * (0.06_f64).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(md.discount_factor(2.0), (-0.1_f64).exp(), epsilon = 1e-15);
        assert_eq!(md.forward(0.0), 100.0);
    }

    #[test]
    fn curves_are_read_at_the_query_time() {
        let r = InterpolatedCurve::new(&[0.5, 2.0], &[0.01, 0.04]).unwrap();
        let q = InterpolatedCurve::new(&[1.0], &[0.02]).unwrap();
        let md = MarketData::new(100.0, Arc::new(r), Arc::new(q), grid()).unwrap();
        assert_abs_diff_eq!(md.discount_rate(1.0), 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(md.dividend_rate(5.0), 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(md.forward(1.0), 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(md.discount_curve().value_at(2.0), 0.04, epsilon = 1e-15);
    }

    #[test]
    fn implied_vol_lookup() {
        let md = MarketData::with_flat_curves(100.0, 0.0, 0.0, grid()).unwrap();
        assert_abs_diff_eq!(md.implied_vol(95.0, 1.5), 0.2, epsilon = 1e-15);
        assert_eq!(md.implied_vols(&[70.0, 130.0], 3.0).len(), 2);
        assert_eq!(md.vol_grid().strikes().len(), 3);
    }

    #[test]
    fn rejects_bad_spot() {
        for spot in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                MarketData::with_flat_curves(spot, 0.0, 0.0, grid()),
                Err(Error::InvalidArgument(_))
            ));
        }
    }
}
