//! Monte Carlo simulation under a local volatility field.
//!
//! The risk-neutral dynamics `dS = (r(t) − q(t))·S·dt + σ(S,t)·S·dW` are
//! advanced with the log-Euler step
//!
//! ```text
//! t  = (i + 1)·dt
//! σ  = σ_loc(S, t)
//! S ← S · exp((r(t) − q(t) − ½σ²)·dt + σ·√dt·Z),    Z ~ N(0, 1)
//! ```
//!
//! which keeps prices positive.  For finite `dt` the scheme carries a
//! discretisation bias wherever `σ_loc` varies; it vanishes as `n_steps`
//! grows.
//!
//! # Random streams
//!
//! Paths are simulated in batches of [`PathSimulator::batch_size`].  Batch
//! `b` draws from its own MT19937-64 generator seeded with
//! [`stream_seed(seed, b)`](lv_math::stream_seed), one normal per path per
//! step.  Output depends only on `(seed, batch_size)`: sequential and
//! parallel runs are bit-identical, whatever the thread count.
//!
//! # Failure
//!
//! A non-finite local vol or price anywhere aborts the whole call with
//! [`Error::Simulation`]; no partial ensemble is returned.

use rayon::prelude::*;

use lv_core::settings::DEFAULT_BATCH_SIZE;
use lv_core::{require, Error, Rate, Real, Result, Size, Time};
use lv_math::GaussianRng;
use lv_termstructures::{LocalVolatilityField, MarketData};

// ─── PathEnsemble ─────────────────────────────────────────────────────────────

/// Full price trajectories from [`PathSimulator::simulate_paths`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathEnsemble {
    /// Time grid `0, dt, …, T` (length `n_steps + 1`).
    pub times: Vec<Time>,
    /// One trajectory per path, each aligned with `times`; entry 0 is spot.
    pub paths: Vec<Vec<Real>>,
}

impl PathEnsemble {
    /// Number of paths.
    pub fn n_paths(&self) -> usize {
        self.paths.len()
    }

    /// Number of time steps.
    pub fn n_steps(&self) -> usize {
        self.times.len().saturating_sub(1)
    }

    /// One trajectory.
    pub fn path(&self, i: usize) -> &[Real] {
        &self.paths[i]
    }

    /// The last price of every path.
    pub fn terminal_prices(&self) -> Vec<Real> {
        self.paths
            .iter()
            .filter_map(|p| p.last().copied())
            .collect()
    }
}

// ─── Time grid ────────────────────────────────────────────────────────────────

/// Per-step quantities shared by every batch.
#[derive(Debug)]
struct StepGrid {
    dt: Time,
    sqrt_dt: Real,
    /// `(i + 1)·dt`
    times: Vec<Time>,
    /// `r(t) − q(t)` at each of `times`
    carry: Vec<Rate>,
}

impl StepGrid {
    fn new(market: &MarketData, n_steps: Size, maturity: Time) -> Self {
        let dt = maturity / n_steps as Real;
        let times: Vec<Time> = (0..n_steps).map(|i| (i + 1) as Real * dt).collect();
        let carry = times
            .iter()
            .map(|&t| market.discount_rate(t) - market.dividend_rate(t))
            .collect();
        Self {
            dt,
            sqrt_dt: dt.sqrt(),
            times,
            carry,
        }
    }
}

// ─── PathSimulator ────────────────────────────────────────────────────────────

/// Simulates asset prices under a [`LocalVolatilityField`].
#[derive(Debug, Clone)]
pub struct PathSimulator<'a> {
    market: &'a MarketData,
    field: &'a LocalVolatilityField,
    batch_size: Size,
}

impl<'a> PathSimulator<'a> {
    /// Simulator over `market` (spot, rates) and `field` (volatility).
    pub fn new(market: &'a MarketData, field: &'a LocalVolatilityField) -> Self {
        Self {
            market,
            field,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the number of paths per batch.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `batch_size` is zero.
    pub fn with_batch_size(mut self, batch_size: Size) -> Result<Self> {
        require!(
            batch_size > 0,
            Error::InvalidArgument,
            "batch_size must be at least 1"
        );
        self.batch_size = batch_size;
        Ok(self)
    }

    /// Paths per batch.
    pub fn batch_size(&self) -> Size {
        self.batch_size
    }

    /// Terminal prices of `n_paths` paths over `[0, maturity]`.
    pub fn simulate(
        &self,
        n_paths: Size,
        n_steps: Size,
        maturity: Time,
        seed: u64,
    ) -> Result<Vec<Real>> {
        check_inputs(n_paths, n_steps, maturity)?;
        let grid = StepGrid::new(self.market, n_steps, maturity);
        let mut terminal = Vec::with_capacity(n_paths);
        for (b, n) in self.batches(n_paths) {
            terminal.extend(self.run_batch(&grid, b, n, seed, |_| {})?);
        }
        Ok(terminal)
    }

    /// [`simulate`](Self::simulate) with batches spread over the rayon
    /// thread pool.  Same output, bit for bit.
    pub fn simulate_parallel(
        &self,
        n_paths: Size,
        n_steps: Size,
        maturity: Time,
        seed: u64,
    ) -> Result<Vec<Real>> {
        check_inputs(n_paths, n_steps, maturity)?;
        let grid = StepGrid::new(self.market, n_steps, maturity);
        let batches: Vec<(u64, Size)> = self.batches(n_paths).collect();
        let results = batches
            .into_par_iter()
            .map(|(b, n)| self.run_batch(&grid, b, n, seed, |_| {}))
            .collect::<Result<Vec<_>>>()?;
        Ok(results.into_iter().flatten().collect())
    }

    /// Full trajectories of `n_paths` paths.  The terminal column equals
    /// [`simulate`](Self::simulate) with the same arguments.
    pub fn simulate_paths(
        &self,
        n_paths: Size,
        n_steps: Size,
        maturity: Time,
        seed: u64,
    ) -> Result<PathEnsemble> {
        check_inputs(n_paths, n_steps, maturity)?;
        let grid = StepGrid::new(self.market, n_steps, maturity);
        let mut paths = Vec::with_capacity(n_paths);
        for (b, n) in self.batches(n_paths) {
            let mut batch: Vec<Vec<Real>> = (0..n).map(|_| Vec::with_capacity(n_steps + 1)).collect();
            self.run_batch(&grid, b, n, seed, |prices| {
                for (path, &s) in batch.iter_mut().zip(prices.iter()) {
                    path.push(s);
                }
            })?;
            paths.extend(batch);
        }

        let mut times = Vec::with_capacity(n_steps + 1);
        times.push(0.0);
        times.extend_from_slice(&grid.times);
        Ok(PathEnsemble { times, paths })
    }

    /// `(batch index, paths in batch)` covering `n_paths`.
    fn batches(&self, n_paths: Size) -> impl Iterator<Item = (u64, Size)> {
        let size = self.batch_size;
        (0..n_paths.div_ceil(size)).map(move |b| (b as u64, size.min(n_paths - b * size)))
    }

    /// Advance one batch of `n` paths; `observe` sees the prices at every
    /// grid time including 0.
    fn run_batch(
        &self,
        grid: &StepGrid,
        batch: u64,
        n: Size,
        seed: u64,
        mut observe: impl FnMut(&[Real]),
    ) -> Result<Vec<Real>> {
        let mut rng = GaussianRng::for_stream(seed, batch);
        let mut prices = vec![self.market.spot(); n];
        let mut sigma = vec![0.0; n];
        let mut z = vec![0.0; n];
        observe(&prices);

        for (&t, &carry) in grid.times.iter().zip(grid.carry.iter()) {
            rng.fill(&mut z);
            self.field.slice(t).local_vols_into(&prices, &mut sigma);
            for ((s, &vol), &dz) in prices.iter_mut().zip(sigma.iter()).zip(z.iter()) {
                if !vol.is_finite() {
                    return Err(abort(format!(
                        "non-finite local vol {vol} at S={s}, t={t} (batch {batch})"
                    )));
                }
                *s *= ((carry - 0.5 * vol * vol) * grid.dt + vol * grid.sqrt_dt * dz).exp();
                if !s.is_finite() {
                    return Err(abort(format!(
                        "non-finite price {s} at t={t}, local vol {vol} (batch {batch})"
                    )));
                }
            }
            observe(&prices);
        }
        Ok(prices)
    }
}

fn check_inputs(n_paths: Size, n_steps: Size, maturity: Time) -> Result<()> {
    require!(n_paths > 0, Error::InvalidArgument, "n_paths must be at least 1");
    require!(n_steps > 0, Error::InvalidArgument, "n_steps must be at least 1");
    require!(
        maturity.is_finite() && maturity > 0.0,
        Error::InvalidArgument,
        "maturity must be positive and finite, got {maturity}"
    );
    Ok(())
}

fn abort(msg: String) -> Error {
    tracing::error!("{msg}");
    Error::Simulation(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lv_math::IncrementalStatistics;
    use lv_termstructures::{ImpliedVolatilityGrid, InterpolatedCurve, VarianceSurface};
    use std::sync::Arc;

    fn flat_setup(sigma: Real, r: Real, q: Real) -> (MarketData, LocalVolatilityField) {
        let strikes: Vec<Real> = (0..9).map(|i| 60.0 + 10.0 * i as Real).collect();
        let grid =
            ImpliedVolatilityGrid::new(&[0.5, 1.0, 2.0], &strikes, &vec![vec![sigma; 9]; 3])
                .unwrap();
        let md = MarketData::with_flat_curves(100.0, r, q, grid).unwrap();
        let surface = VarianceSurface::new(Arc::new(md.clone())).unwrap();
        (md, LocalVolatilityField::new(Arc::new(surface)))
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let (md, field) = flat_setup(0.2, 0.03, 0.0);
        let sim = PathSimulator::new(&md, &field);
        let a = sim.simulate(500, 10, 1.0, 7).unwrap();
        let b = sim.simulate(500, 10, 1.0, 7).unwrap();
        assert_eq!(a, b);
        let c = sim.simulate(500, 10, 1.0, 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn parallel_matches_sequential() {
        let (md, field) = flat_setup(0.25, 0.02, 0.01);
        // 1000 paths in batches of 128: the last batch is partial
        let sim = PathSimulator::new(&md, &field).with_batch_size(128).unwrap();
        let seq = sim.simulate(1000, 12, 0.75, 42).unwrap();
        let par = sim.simulate_parallel(1000, 12, 0.75, 42).unwrap();
        assert_eq!(seq.len(), 1000);
        assert_eq!(seq, par);
    }

    #[test]
    fn flat_vol_matches_lognormal_moments() {
        let (sigma, r, q, t) = (0.2, 0.03, 0.01, 1.0);
        let (md, field) = flat_setup(sigma, r, q);
        let terminal = PathSimulator::new(&md, &field)
            .simulate_parallel(20_000, 20, t, 2024)
            .unwrap();

        let mut prices = IncrementalStatistics::new();
        let mut log_returns = IncrementalStatistics::new();
        for &s in &terminal {
            prices.add(s);
            log_returns.add((s / 100.0).ln());
        }
        let forward = md.forward(t);
        let se = prices.error_estimate().unwrap();
        assert!(
            (prices.mean().unwrap() - forward).abs() < 4.0 * se,
            "mean {} vs forward {forward} (se {se})",
            prices.mean().unwrap()
        );
        let var = log_returns.variance().unwrap();
        assert!((var - sigma * sigma * t).abs() < 2e-3, "log-return variance {var}");
        assert!(terminal.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn trajectories_end_at_the_simulated_terminals() {
        let (md, field) = flat_setup(0.2, 0.01, 0.0);
        let sim = PathSimulator::new(&md, &field).with_batch_size(16).unwrap();
        let ens = sim.simulate_paths(40, 8, 2.0, 3).unwrap();
        assert_eq!(ens.n_paths(), 40);
        assert_eq!(ens.n_steps(), 8);
        assert_eq!(ens.times.len(), 9);
        assert_eq!(ens.times[0], 0.0);
        assert_abs_diff_eq!(ens.times[8], 2.0, epsilon = 1e-15);
        assert!(ens.paths.iter().all(|p| p.len() == 9 && p[0] == 100.0));
        assert_eq!(ens.path(3).len(), 9);
        assert_eq!(ens.terminal_prices(), sim.simulate(40, 8, 2.0, 3).unwrap());
    }

    #[test]
    fn rejects_invalid_inputs() {
        let (md, field) = flat_setup(0.2, 0.0, 0.0);
        let sim = PathSimulator::new(&md, &field);
        for (n, m, t) in [(0, 10, 1.0), (10, 0, 1.0), (10, 10, 0.0), (10, 10, -1.0), (10, 10, f64::NAN)] {
            assert!(matches!(sim.simulate(n, m, t, 1), Err(Error::InvalidArgument(_))));
            assert!(matches!(sim.simulate_parallel(n, m, t, 1), Err(Error::InvalidArgument(_))));
            assert!(matches!(sim.simulate_paths(n, m, t, 1), Err(Error::InvalidArgument(_))));
        }
        assert!(matches!(
            PathSimulator::new(&md, &field).with_batch_size(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn non_finite_values_abort_the_simulation() {
        // the discount curve extrapolates linearly to rates that overflow the
        // forward and the price long before T = 20
        let strikes: Vec<Real> = (0..5).map(|i| 80.0 + 10.0 * i as Real).collect();
        let grid =
            ImpliedVolatilityGrid::new(&[0.5, 1.0], &strikes, &vec![vec![0.2; 5]; 2]).unwrap();
        let r = InterpolatedCurve::new(&[0.5, 1.0], &[0.0, 100.0]).unwrap();
        let md = MarketData::new(
            100.0,
            Arc::new(r),
            Arc::new(lv_termstructures::FlatCurve::new(0.0)),
            grid,
        )
        .unwrap();
        let surface = VarianceSurface::new(Arc::new(md.clone())).unwrap();
        let field = LocalVolatilityField::new(Arc::new(surface));
        let sim = PathSimulator::new(&md, &field);
        assert!(matches!(sim.simulate(64, 10, 20.0, 1), Err(Error::Simulation(_))));
        assert!(matches!(sim.simulate_parallel(64, 10, 20.0, 1), Err(Error::Simulation(_))));
    }

    proptest::proptest! {
        #[test]
        fn batches_partition_the_paths(n_paths in 1usize..5_000, batch_size in 1usize..700) {
            let (md, field) = flat_setup(0.2, 0.0, 0.0);
            let sim = PathSimulator::new(&md, &field).with_batch_size(batch_size).unwrap();
            let batches: Vec<_> = sim.batches(n_paths).collect();
            proptest::prop_assert_eq!(batches.iter().map(|&(_, n)| n).sum::<usize>(), n_paths);
            proptest::prop_assert!(batches.iter().all(|&(_, n)| n >= 1 && n <= batch_size));
            proptest::prop_assert!(batches.iter().enumerate().all(|(i, &(b, _))| b == i as u64));
        }
    }
}
