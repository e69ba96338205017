//! `ImpliedVolatilityGrid`: market implied volatilities on a
//! (maturity × strike) grid.
//!
//! Queries between nodes are bilinear; queries outside the grid continue the
//! boundary cell linearly instead of failing.  Wing values are therefore
//! approximate, which is accepted in exchange for never refusing a query.

use lv_core::{require, Error, Real, Result, Time, Volatility};
use lv_math::{BilinearInterpolation, Interpolation2D};

/// Implied volatilities on a rectangular (maturity × strike) grid.
#[derive(Debug, Clone)]
pub struct ImpliedVolatilityGrid {
    maturities: Vec<Time>,
    strikes: Vec<Real>,
    vols: Vec<Vec<Volatility>>,
    // x = strike, y = maturity
    interp: BilinearInterpolation,
}

impl ImpliedVolatilityGrid {
    /// Build a grid where `vols[i][j]` is the implied vol for
    /// `maturities[i]` and `strikes[j]`.
    ///
    /// Both axes must be non-empty, positive and strictly increasing; vols
    /// must be finite and non-negative.  A single maturity or strike is
    /// accepted (the grid is then constant along that axis).
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for any violation.
    pub fn new(maturities: &[Time], strikes: &[Real], vols: &[Vec<Volatility>]) -> Result<Self> {
        for (name, axis) in [("maturities", maturities), ("strikes", strikes)] {
            require!(!axis.is_empty(), Error::InvalidArgument, "no {name}");
            require!(
                axis.iter().all(|v| v.is_finite() && *v > 0.0),
                Error::InvalidArgument,
                "{name} must be positive and finite"
            );
            require!(
                axis.windows(2).all(|w| w[1] > w[0]),
                Error::InvalidArgument,
                "{name} must be strictly increasing"
            );
        }
        require!(
            vols.len() == maturities.len(),
            Error::InvalidArgument,
            "{} vol rows for {} maturities",
            vols.len(),
            maturities.len()
        );
        for (i, row) in vols.iter().enumerate() {
            require!(
                row.len() == strikes.len(),
                Error::InvalidArgument,
                "vol row {i} has {} entries for {} strikes",
                row.len(),
                strikes.len()
            );
            require!(
                row.iter().all(|v| v.is_finite() && *v >= 0.0),
                Error::InvalidArgument,
                "vol row {i} must be finite and non-negative"
            );
        }

        let flat: Vec<Real> = vols.iter().flatten().copied().collect();
        let interp = BilinearInterpolation::new(strikes, maturities, &flat)
            .map_err(|e| Error::InvalidArgument(e.to_string()))?;

        Ok(Self {
            maturities: maturities.to_vec(),
            strikes: strikes.to_vec(),
            vols: vols.to_vec(),
            interp,
        })
    }

    /// Grid maturities.
    pub fn maturities(&self) -> &[Time] {
        &self.maturities
    }

    /// Grid strikes.
    pub fn strikes(&self) -> &[Real] {
        &self.strikes
    }

    /// Grid vols, one row per maturity.
    pub fn vols(&self) -> &[Vec<Volatility>] {
        &self.vols
    }

    /// Implied vol at `(strike, maturity)`.
    pub fn vol_at(&self, strike: Real, maturity: Time) -> Volatility {
        self.interp.operator(strike, maturity)
    }

    /// Implied vols at each of `strikes` for one maturity.
    pub fn vols_at(&self, strikes: &[Real], maturity: Time) -> Vec<Volatility> {
        strikes.iter().map(|&k| self.vol_at(k, maturity)).collect()
    }

    /// Implied vols at the points `(strikes[i], maturities[i])`.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if the slices differ in length.
    pub fn vols_at_points(&self, strikes: &[Real], maturities: &[Time]) -> Result<Vec<Volatility>> {
        require!(
            strikes.len() == maturities.len(),
            Error::InvalidArgument,
            "{} strikes but {} maturities",
            strikes.len(),
            maturities.len()
        );
        Ok(strikes
            .iter()
            .zip(maturities.iter())
            .map(|(&k, &t)| self.vol_at(k, t))
            .collect())
    }
}
