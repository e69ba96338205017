//! `VarianceSurface`: total implied variance `w = σ²·T` as a smooth function
//! of maturity and log forward-moneyness `k = ln(K / F(T))`.
//!
//! At construction every grid node `(Tᵢ, Kⱼ)` is moved to
//! `(Tᵢ, ln(Kⱼ / F(Tᵢ)))`.  Each maturity row keeps its own log-moneyness
//! nodes: with `r ≠ q` the rows are shifted against each other, and the fit
//! must see each total variance at the moneyness it was quoted at.  The fit
//! is a tensor natural cubic spline (see [`lv_math::BicubicSpline`]): C² in
//! both directions, analytic first partials, linear continuation outside the
//! grid.
//!
//! Every query maps `(K, T)` to `(k, T)` through [`VarianceSurface::slice`],
//! so the value and both partials at a point always share one forward.
//!
//! The fit does not enforce absence of arbitrage.
//! [`VarianceSurface::calendar_arbitrage`] and
//! [`VarianceSurface::negative_variance_points`] report where it fails.

use std::sync::Arc;

use lv_core::{Error, Price, Real, Result, Time, Volatility};
use lv_math::{BicubicSpline, Interpolation2D, SplineSlice};

use crate::market_data::MarketData;

/// Total variance and its first partials at one `(K, T)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceSample {
    /// `k = ln(K / F(T))`.
    pub log_moneyness: Real,
    /// `w(k, T)`.
    pub total_variance: Real,
    /// `∂w/∂T` at fixed `k`.
    pub dw_dt: Real,
    /// `∂w/∂k` at fixed `T`.
    pub dw_dk: Real,
}

/// Total variance decreasing between two consecutive grid maturities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarViolation {
    /// Log-moneyness of the check.
    pub log_moneyness: Real,
    /// Earlier maturity.
    pub t_start: Time,
    /// Later maturity.
    pub t_end: Time,
    /// `w(k, t_start)`.
    pub w_start: Real,
    /// `w(k, t_end)`, smaller than `w_start`.
    pub w_end: Real,
}

/// Fitted total-variance surface.
#[derive(Debug)]
pub struct VarianceSurface {
    market: Arc<MarketData>,
    // x = log-moneyness, y = maturity
    spline: BicubicSpline,
}

impl VarianceSurface {
    /// Fit the surface to the implied-vol grid of `market`.
    ///
    /// # Errors
    /// [`Error::InsufficientGrid`] if the grid has fewer than 2 maturities
    /// or fewer than 2 strikes; [`Error::InvalidArgument`] if the curves
    /// produce a non-finite forward at a grid maturity.
    pub fn new(market: Arc<MarketData>) -> Result<Self> {
        let grid = market.vol_grid();
        let maturities = grid.maturities();
        let strikes = grid.strikes();
        if maturities.len() < 2 || strikes.len() < 2 {
            return Err(Error::InsufficientGrid {
                maturities: maturities.len(),
                strikes: strikes.len(),
            });
        }

        let mut rows_k = Vec::with_capacity(maturities.len());
        let mut rows_w = Vec::with_capacity(maturities.len());
        for (&t, vols) in maturities.iter().zip(grid.vols().iter()) {
            let forward = market.forward(t);
            lv_core::require!(
                forward.is_finite() && forward > 0.0,
                Error::InvalidArgument,
                "forward at T={t} is {forward}"
            );
            rows_k.push(strikes.iter().map(|&k| (k / forward).ln()).collect::<Vec<_>>());
            rows_w.push(vols.iter().map(|&v| v * v * t).collect::<Vec<_>>());
        }

        let spline = BicubicSpline::from_rows(maturities, &rows_k, &rows_w)
            .map_err(|e| Error::InvalidArgument(e.to_string()))?;

        tracing::debug!(
            maturities = maturities.len(),
            strikes = strikes.len(),
            k_min = spline.x_min(),
            k_max = spline.x_max(),
            "fitted total-variance surface"
        );

        Ok(Self { market, spline })
    }

    /// The market data the surface was fitted to.
    pub fn market(&self) -> &Arc<MarketData> {
        &self.market
    }

    /// Grid maturities.
    pub fn maturities(&self) -> &[Time] {
        self.spline.ys()
    }

    /// Log-moneyness nodes of each maturity row.
    pub fn log_moneyness_nodes(&self) -> Vec<&[Real]> {
        self.spline.rows().iter().map(|r| r.xs()).collect()
    }

    /// The surface at maturity `t`, ready for many strike queries.
    pub fn slice(&self, t: Time) -> VarianceSlice<'_> {
        VarianceSlice {
            maturity: t,
            forward: self.market.forward(t),
            spline: self.spline.slice(t),
        }
    }

    /// `k = ln(K / F(T))`.
    pub fn log_moneyness(&self, strike: Real, t: Time) -> Real {
        (strike / self.market.forward(t)).ln()
    }

    /// Value and first partials at `(strike, t)`.
    pub fn evaluate(&self, strike: Real, t: Time) -> VarianceSample {
        self.slice(t).evaluate(strike)
    }

    /// Total variance `w(K, T)`.
    pub fn total_variance(&self, strike: Real, t: Time) -> Real {
        self.slice(t).total_variance(strike)
    }

    /// `∂w/∂T` at fixed log-moneyness.
    pub fn dw_dt(&self, strike: Real, t: Time) -> Real {
        self.evaluate(strike, t).dw_dt
    }

    /// `∂w/∂k` at fixed maturity.
    pub fn dw_dk(&self, strike: Real, t: Time) -> Real {
        self.evaluate(strike, t).dw_dk
    }

    /// Implied vol `sqrt(max(w, 0) / T)`; zero for `T ≤ 0`.
    pub fn implied_vol(&self, strike: Real, t: Time) -> Volatility {
        if t <= 0.0 {
            return 0.0;
        }
        (self.total_variance(strike, t).max(0.0) / t).sqrt()
    }

    /// Total variance at each of `strikes` for one maturity.
    pub fn total_variances(&self, strikes: &[Real], t: Time) -> Vec<Real> {
        let slice = self.slice(t);
        strikes.iter().map(|&k| slice.total_variance(k)).collect()
    }

    /// [`evaluate`](Self::evaluate) at each of `strikes` for one maturity.
    pub fn evaluate_all(&self, strikes: &[Real], t: Time) -> Vec<VarianceSample> {
        let slice = self.slice(t);
        strikes.iter().map(|&k| slice.evaluate(k)).collect()
    }

    /// Fitted total variance at log-moneyness `k` and maturity `t`.
    pub fn total_variance_at_log_moneyness(&self, k: Real, t: Time) -> Real {
        self.spline.operator(k, t)
    }

    /// Pairs of consecutive grid maturities across which the fitted total
    /// variance decreases, checked at each log-moneyness in `ks`.
    pub fn calendar_arbitrage(&self, ks: &[Real]) -> Vec<CalendarViolation> {
        let ts = self.maturities();
        let mut out = Vec::new();
        for &k in ks {
            let ws: Vec<Real> = ts.iter().map(|&t| self.spline.operator(k, t)).collect();
            for i in 0..ts.len() - 1 {
                if ws[i + 1] < ws[i] {
                    out.push(CalendarViolation {
                        log_moneyness: k,
                        t_start: ts[i],
                        t_end: ts[i + 1],
                        w_start: ws[i],
                        w_end: ws[i + 1],
                    });
                }
            }
        }
        out
    }

    /// Points `(k, T, w)` on the grid maturities where the fitted total
    /// variance is negative.  Each row is checked at its nodes and at the
    /// midpoints between them, where spline overshoot shows first.
    pub fn negative_variance_points(&self) -> Vec<(Real, Time, Real)> {
        let mut out = Vec::new();
        for (row, &t) in self.spline.rows().iter().zip(self.spline.ys().iter()) {
            let xs = row.xs();
            let mids = xs.windows(2).map(|w| 0.5 * (w[0] + w[1]));
            for k in xs.iter().copied().chain(mids) {
                let w = row.value_and_derivative(k).0;
                if w < 0.0 {
                    out.push((k, t, w));
                }
            }
        }
        out
    }
}

/// A [`VarianceSurface`] at a fixed maturity.
///
/// Holds the forward and the column-spline weights for that maturity, so a
/// strike query costs one pass over the maturity rows.
#[derive(Debug, Clone)]
pub struct VarianceSlice<'a> {
    maturity: Time,
    forward: Price,
    spline: SplineSlice<'a>,
}

impl VarianceSlice<'_> {
    /// The slice maturity.
    pub fn maturity(&self) -> Time {
        self.maturity
    }

    /// `F(T)` at the slice maturity.
    pub fn forward(&self) -> Price {
        self.forward
    }

    /// `k = ln(K / F(T))`.
    pub fn log_moneyness(&self, strike: Real) -> Real {
        (strike / self.forward).ln()
    }

    /// Total variance at `strike`.
    pub fn total_variance(&self, strike: Real) -> Real {
        self.spline.value(self.log_moneyness(strike))
    }

    /// Value and first partials at `strike`.
    pub fn evaluate(&self, strike: Real) -> VarianceSample {
        let k = self.log_moneyness(strike);
        let p = self.spline.evaluate(k);
        VarianceSample {
            log_moneyness: k,
            total_variance: p.value,
            dw_dt: p.d_y,
            dw_dk: p.d_x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implied_vol_grid::ImpliedVolatilityGrid;
    use crate::term_structure::{FlatCurve, InterpolatedCurve};
    use approx::assert_abs_diff_eq;

    const MATURITIES: [Time; 3] = [0.5, 1.0, 2.0];

    fn strikes() -> Vec<Real> {
        (0..9).map(|i| 60.0 + 10.0 * i as Real).collect()
    }

    fn flat_market(sigma: Real, r: Real, q: Real) -> Arc<MarketData> {
        let vols = vec![vec![sigma; 9]; 3];
        let grid = ImpliedVolatilityGrid::new(&MATURITIES, &strikes(), &vols).unwrap();
        Arc::new(MarketData::with_flat_curves(100.0, r, q, grid).unwrap())
    }

    /// σ(K, T) = 0.2 + 0.1·(ln(K/100))² + 0.02·T
    fn smile_market(r: Real, q: Real) -> Arc<MarketData> {
        let vols: Vec<Vec<Real>> = MATURITIES
            .iter()
            .map(|&t| {
                strikes()
                    .iter()
                    .map(|&k| 0.2 + 0.1 * (k / 100.0).ln().powi(2) + 0.02 * t)
                    .collect()
            })
            .collect();
        let grid = ImpliedVolatilityGrid::new(&MATURITIES, &strikes(), &vols).unwrap();
        Arc::new(MarketData::with_flat_curves(100.0, r, q, grid).unwrap())
    }

    #[test]
    fn flat_vol_gives_linear_total_variance() {
        let s = VarianceSurface::new(flat_market(0.2, 0.03, 0.01)).unwrap();
        for &t in &[0.25, 0.5, 1.3, 2.0, 3.0] {
            for &k in &[50.0, 80.0, 100.0, 135.0, 200.0] {
                let p = s.evaluate(k, t);
                assert_abs_diff_eq!(p.total_variance, 0.04 * t, epsilon = 1e-12);
                assert_abs_diff_eq!(p.dw_dt, 0.04, epsilon = 1e-12);
                assert_abs_diff_eq!(p.dw_dk, 0.0, epsilon = 1e-12);
                assert_abs_diff_eq!(s.implied_vol(k, t), 0.2, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn reproduces_market_total_variance_at_nodes() {
        let md = smile_market(0.04, 0.0);
        let s = VarianceSurface::new(Arc::clone(&md)).unwrap();
        for &t in &MATURITIES {
            for &k in &strikes() {
                let sigma = md.vol_grid().vol_at(k, t);
                assert_abs_diff_eq!(s.total_variance(k, t), sigma * sigma * t, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn rows_keep_their_own_log_moneyness() {
        let s = VarianceSurface::new(smile_market(0.05, 0.0)).unwrap();
        let nodes = s.log_moneyness_nodes();
        assert_eq!(nodes.len(), 3);
        for (row, &t) in nodes.iter().zip(MATURITIES.iter()) {
            assert_abs_diff_eq!(row[0], (60.0 / (100.0 * (0.05 * t).exp())).ln(), epsilon = 1e-14);
        }
        assert!(nodes[0][0] != nodes[2][0]);
    }

    #[test]
    fn partials_match_finite_differences_in_k_and_t() {
        let s = VarianceSurface::new(smile_market(0.03, 0.01)).unwrap();
        let md = s.market().clone();
        let h = 1e-5;
        for (strike, t) in [(90.0, 0.8), (110.0, 1.5), (75.0, 0.6)] {
            let p = s.evaluate(strike, t);
            let k = p.log_moneyness;
            let fd_k = (s.total_variance_at_log_moneyness(k + h, t)
                - s.total_variance_at_log_moneyness(k - h, t))
                / (2.0 * h);
            let fd_t = (s.total_variance_at_log_moneyness(k, t + h)
                - s.total_variance_at_log_moneyness(k, t - h))
                / (2.0 * h);
            assert_abs_diff_eq!(p.dw_dk, fd_k, epsilon = 1e-6);
            assert_abs_diff_eq!(p.dw_dt, fd_t, epsilon = 1e-6);
            assert_abs_diff_eq!(k, (strike / md.forward(t)).ln(), epsilon = 1e-15);
        }
    }

    #[test]
    fn scalar_and_slice_queries_agree() {
        let s = VarianceSurface::new(smile_market(0.02, 0.0)).unwrap();
        let ks = [70.0, 95.0, 100.0, 130.0];
        let ws = s.total_variances(&ks, 1.2);
        let samples = s.evaluate_all(&ks, 1.2);
        for ((&k, &w), p) in ks.iter().zip(ws.iter()).zip(samples.iter()) {
            assert_eq!(w, s.total_variance(k, 1.2));
            assert_eq!(p.total_variance, w);
            assert_eq!(p.dw_dk, s.dw_dk(k, 1.2));
            assert_eq!(p.dw_dt, s.dw_dt(k, 1.2));
        }
        let slice = s.slice(1.2);
        assert_eq!(slice.maturity(), 1.2);
        assert_eq!(slice.forward(), s.market().forward(1.2));
    }

    #[test]
    fn all_queries_share_one_forward() {
        // Perturb the dividend curve: all three quantities must move exactly as
        // a shift of the log-moneyness by the change in ln F.
        let base = smile_market(0.03, 0.0);
        let bumped_q = InterpolatedCurve::new(&[0.5, 1.5], &[0.01, 0.03]).unwrap();
        let bumped = Arc::new(
            MarketData::new(
                100.0,
                Arc::new(FlatCurve::new(0.03)),
                Arc::new(bumped_q),
                base.vol_grid().clone(),
            )
            .unwrap(),
        );
        let s0 = VarianceSurface::new(base).unwrap();
        let s1 = VarianceSurface::new(Arc::clone(&bumped)).unwrap();

        let t = 1.0;
        let strike = 100.0;
        let k1 = s1.log_moneyness(strike, t);
        let p1 = s1.evaluate(strike, t);
        assert_abs_diff_eq!(k1, (strike / bumped.forward(t)).ln(), epsilon = 1e-15);
        assert_eq!(p1.log_moneyness, k1);
        assert_eq!(p1.total_variance, s1.total_variance(strike, t));
        assert_eq!(p1.dw_dt, s1.dw_dt(strike, t));
        assert_eq!(p1.dw_dk, s1.dw_dk(strike, t));

        // The bump moves k by +0.02; the fitted values follow the smile.
        let k0 = s0.log_moneyness(strike, t);
        assert_abs_diff_eq!(k1 - k0, 0.02, epsilon = 1e-12);
        assert!(p1.total_variance != s0.total_variance(strike, t));
    }

    #[test]
    fn insufficient_grids_fail_fast() {
        let one_t =
            ImpliedVolatilityGrid::new(&[1.0], &[90.0, 100.0, 110.0], &[vec![0.2; 3]]).unwrap();
        let md = Arc::new(MarketData::with_flat_curves(100.0, 0.0, 0.0, one_t).unwrap());
        assert_eq!(
            VarianceSurface::new(md).unwrap_err(),
            Error::InsufficientGrid {
                maturities: 1,
                strikes: 3
            }
        );

        let one_k = ImpliedVolatilityGrid::new(&[0.5, 1.0], &[100.0], &[vec![0.2], vec![0.2]])
            .unwrap();
        let md = Arc::new(MarketData::with_flat_curves(100.0, 0.0, 0.0, one_k).unwrap());
        assert_eq!(
            VarianceSurface::new(md).unwrap_err(),
            Error::InsufficientGrid {
                maturities: 2,
                strikes: 1
            }
        );
    }

    #[test]
    fn detects_calendar_arbitrage() {
        // total variance drops from 0.09·1 to 0.01·2 between T=1 and T=2
        let grid = ImpliedVolatilityGrid::new(
            &[1.0, 2.0],
            &[90.0, 110.0],
            &[vec![0.3, 0.3], vec![0.1, 0.1]],
        )
        .unwrap();
        let md = Arc::new(MarketData::with_flat_curves(100.0, 0.0, 0.0, grid).unwrap());
        let s = VarianceSurface::new(md).unwrap();
        let v = s.calendar_arbitrage(&[-0.1, 0.0, 0.1]);
        assert_eq!(v.len(), 3);
        assert_eq!((v[0].t_start, v[0].t_end), (1.0, 2.0));
        assert!(v.iter().all(|c| c.w_end < c.w_start));

        let clean = VarianceSurface::new(flat_market(0.2, 0.0, 0.0)).unwrap();
        assert!(clean.calendar_arbitrage(&[-0.5, 0.0, 0.5]).is_empty());
        assert!(clean.negative_variance_points().is_empty());
    }

    #[test]
    fn detects_spline_overshoot_below_zero() {
        // a low plateau between high wings makes the row spline dip
        let strikes = [80.0, 90.0, 100.0, 110.0, 120.0];
        let row = vec![0.6, 0.05, 0.05, 0.6, 0.6];
        let grid =
            ImpliedVolatilityGrid::new(&[1.0, 2.0], &strikes, &[row.clone(), row]).unwrap();
        let md = Arc::new(MarketData::with_flat_curves(100.0, 0.0, 0.0, grid).unwrap());
        let s = VarianceSurface::new(md).unwrap();
        let neg = s.negative_variance_points();
        assert!(!neg.is_empty());
        assert!(neg.iter().all(|&(_, _, w)| w < 0.0));
    }
}
