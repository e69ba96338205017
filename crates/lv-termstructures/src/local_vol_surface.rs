//! `LocalVolatilityField`: Dupire local volatility from a total-variance
//! surface.
//!
//! With `w = w(k, T)` the total implied variance at log-moneyness
//! `k = ln(K/F(T))`, the local variance is
//!
//! ```text
//!                         ∂w/∂T
//! σ²(K,T) = ───────────────────────────────────────────────────────────
//!           1 − (k/w)·∂w/∂k + ¼·(−¼ − 1/w + c·k²/w²)·(∂w/∂k)² + ½·∂²w/∂k²
//! ```
//!
//! with `c = 0` for [`DupireDenominator::Reduced`] (the default) and `c = 1`
//! for [`DupireDenominator::Gatheral`].  `∂w/∂T` and `∂w/∂k` are the
//! surface's analytic partials.  `∂²w/∂k²` is the centred difference
//! `(w(K·e^δ) − 2w(K) + w(K·e^−δ)) / δ²` on the same total-variance query.
//!
//! # Numerical floors
//!
//! Three floors keep every query finite on a badly fitted surface:
//!
//! * a total variance `w ≤ 0` is raised to `eps` before it divides `k` and 1,
//! * the denominator is raised to `eps`,
//! * a negative local variance is raised to zero.
//!
//! A strike `K ≤ 0` has no log-moneyness; the local variance there is zero,
//! so a price level that reaches zero stays there.
//!
//! They are safety clamps, not model features.  Each activation is counted
//! (see [`LocalVolatilityField::clamp_stats`]) and logged at `trace` level.
//! Non-finite values are not clamped; they reach the caller, which decides
//! whether they are fatal.

use std::sync::Arc;

use lv_core::settings::{DEFAULT_DENOMINATOR_FLOOR, DEFAULT_FD_STEP};
use lv_core::{
    require, ClampCounters, ClampKind, ClampStats, Error, NumericalClampEvent, Real, Result,
    Time, Volatility,
};

use crate::variance_surface::{VarianceSlice, VarianceSurface};

/// Form of the Dupire denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DupireDenominator {
    /// `1 − (k/w)·w' + ¼·(−¼ − 1/w)·w'² + ½·w''`.
    #[default]
    Reduced,
    /// The reduced form plus `¼·(k²/w²)·w'²` (Gatheral, *The Volatility
    /// Surface*, eq. 1.10).
    Gatheral,
}

/// Local volatility field over (strike or spot level, time).
#[derive(Debug)]
pub struct LocalVolatilityField {
    surface: Arc<VarianceSurface>,
    fd_step: Real,
    eps: Real,
    denominator: DupireDenominator,
    clamps: ClampCounters,
}

impl LocalVolatilityField {
    /// Field over `surface` with the default step (`1e-4`), floor (`1e-6`)
    /// and denominator.
    pub fn new(surface: Arc<VarianceSurface>) -> Self {
        Self {
            surface,
            fd_step: DEFAULT_FD_STEP,
            eps: DEFAULT_DENOMINATOR_FLOOR,
            denominator: DupireDenominator::default(),
            clamps: ClampCounters::new(),
        }
    }

    /// Set the log-moneyness step of the second difference.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] unless `fd_step` is positive and finite.
    pub fn with_fd_step(mut self, fd_step: Real) -> Result<Self> {
        require!(
            fd_step.is_finite() && fd_step > 0.0,
            Error::InvalidArgument,
            "fd_step must be positive and finite, got {fd_step}"
        );
        self.fd_step = fd_step;
        Ok(self)
    }

    /// Set the denominator / total-variance floor.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] unless `eps` is positive and finite.
    pub fn with_eps(mut self, eps: Real) -> Result<Self> {
        require!(
            eps.is_finite() && eps > 0.0,
            Error::InvalidArgument,
            "eps must be positive and finite, got {eps}"
        );
        self.eps = eps;
        Ok(self)
    }

    /// Select the denominator form.
    pub fn with_denominator(mut self, denominator: DupireDenominator) -> Self {
        self.denominator = denominator;
        self
    }

    /// The underlying total-variance surface.
    pub fn surface(&self) -> &Arc<VarianceSurface> {
        &self.surface
    }

    /// Step `δ` of the second difference.
    pub fn fd_step(&self) -> Real {
        self.fd_step
    }

    /// Floor `eps`.
    pub fn eps(&self) -> Real {
        self.eps
    }

    /// Denominator form.
    pub fn denominator(&self) -> DupireDenominator {
        self.denominator
    }

    /// The field at time `t`, ready for many strike queries.
    pub fn slice(&self, t: Time) -> LocalVolSlice<'_> {
        LocalVolSlice {
            field: self,
            variance: self.surface.slice(t),
            up: self.fd_step.exp(),
            down: (-self.fd_step).exp(),
        }
    }

    /// Local variance at `(strike, t)`.
    pub fn local_variance(&self, strike: Real, t: Time) -> Real {
        self.slice(t).local_variance(strike)
    }

    /// Local volatility at `(strike, t)`.
    pub fn local_vol(&self, strike: Real, t: Time) -> Volatility {
        self.local_variance(strike, t).sqrt()
    }

    /// Local variances at each of `strikes` for one time.
    pub fn local_variances(&self, strikes: &[Real], t: Time) -> Vec<Real> {
        let slice = self.slice(t);
        strikes.iter().map(|&k| slice.local_variance(k)).collect()
    }

    /// Local vols at each of `strikes` for one time.
    pub fn local_vols(&self, strikes: &[Real], t: Time) -> Vec<Volatility> {
        let slice = self.slice(t);
        strikes.iter().map(|&k| slice.local_vol(k)).collect()
    }

    /// Local vols at the points `(strikes[i], times[i])`.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if the slices differ in length.
    pub fn local_vols_at(&self, strikes: &[Real], times: &[Time]) -> Result<Vec<Volatility>> {
        require!(
            strikes.len() == times.len(),
            Error::InvalidArgument,
            "{} strikes but {} times",
            strikes.len(),
            times.len()
        );
        Ok(strikes
            .iter()
            .zip(times.iter())
            .map(|(&k, &t)| self.local_vol(k, t))
            .collect())
    }

    /// Write the local vol at each of `strikes` for time `t` into `out`.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `out` and `strikes` differ in length.
    pub fn local_vols_into(&self, strikes: &[Real], t: Time, out: &mut [Volatility]) -> Result<()> {
        require!(
            strikes.len() == out.len(),
            Error::InvalidArgument,
            "{} strikes but output holds {}",
            strikes.len(),
            out.len()
        );
        self.slice(t).local_vols_into(strikes, out);
        Ok(())
    }

    /// Clamp activations since construction or the last reset.
    pub fn clamp_stats(&self) -> ClampStats {
        self.clamps.snapshot()
    }

    /// Zero the clamp counters.
    pub fn reset_clamp_stats(&self) {
        self.clamps.reset();
    }
}

/// A [`LocalVolatilityField`] at a fixed time.
#[derive(Debug, Clone)]
pub struct LocalVolSlice<'a> {
    field: &'a LocalVolatilityField,
    variance: VarianceSlice<'a>,
    up: Real,
    down: Real,
}

impl LocalVolSlice<'_> {
    /// The slice time.
    pub fn time(&self) -> Time {
        self.variance.maturity()
    }

    /// Local variance at `strike`; zero for `strike ≤ 0`.
    pub fn local_variance(&self, strike: Real) -> Real {
        if strike <= 0.0 {
            self.clamp(ClampKind::Strike, strike, strike);
            return 0.0;
        }
        let field = self.field;
        let eps = field.eps;
        let s = self.variance.evaluate(strike);

        let w_up = self.variance.total_variance(strike * self.up);
        let w_down = self.variance.total_variance(strike * self.down);
        let d2w_dk2 =
            (w_up - 2.0 * s.total_variance + w_down) / (field.fd_step * field.fd_step);

        let mut w = s.total_variance;
        if w <= 0.0 {
            self.clamp(ClampKind::TotalVariance, strike, w);
            w = eps;
        }

        let k = s.log_moneyness;
        let dw_dk = s.dw_dk;
        let skew_term = match field.denominator {
            DupireDenominator::Reduced => -0.25 - 1.0 / w,
            DupireDenominator::Gatheral => -0.25 - 1.0 / w + k * k / (w * w),
        };
        let mut denominator =
            1.0 - k / w * dw_dk + 0.25 * skew_term * dw_dk * dw_dk + 0.5 * d2w_dk2;
        if denominator < eps {
            self.clamp(ClampKind::Denominator, strike, denominator);
            denominator = eps;
        }

        let local_variance = s.dw_dt / denominator;
        if local_variance < 0.0 {
            self.clamp(ClampKind::LocalVariance, strike, local_variance);
            return 0.0;
        }
        local_variance
    }

    /// Local vol at `strike`.
    pub fn local_vol(&self, strike: Real) -> Volatility {
        self.local_variance(strike).sqrt()
    }

    /// Write the local vol at each of `strikes` into `out`, pairwise up to
    /// the shorter of the two.
    pub fn local_vols_into(&self, strikes: &[Real], out: &mut [Volatility]) {
        for (o, &k) in out.iter_mut().zip(strikes.iter()) {
            *o = self.local_vol(k);
        }
    }

    fn clamp(&self, kind: ClampKind, strike: Real, raw: Real) {
        self.field.clamps.record(NumericalClampEvent {
            kind,
            strike,
            maturity: self.variance.maturity(),
            raw,
        });
    }
}
