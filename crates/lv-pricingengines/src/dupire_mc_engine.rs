//! Monte Carlo pricing of European options under Dupire local volatility.
//!
//! Terminal prices come from [`PathSimulator`]; the estimate is
//! `DF(T) · mean(payoff(S_T))` with `DF(T) = exp(−r(T)·T)`, and its standard
//! error is `DF(T) · stdev(payoff) / √n_paths`.

use lv_core::{require, ClampStats, Error, McSettings, Price, Real, Result, Size, Time};
use lv_math::IncrementalStatistics;
use lv_methods::PathSimulator;
use lv_termstructures::{LocalVolatilityField, MarketData};

use crate::analytic_european_engine::OptionType;

/// Outcome of one Monte Carlo pricing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McResult {
    /// Discounted mean payoff.
    pub price: Price,
    /// Standard error of `price`; NaN for a single path.
    pub std_error: Real,
    /// Paths simulated.
    pub n_paths: Size,
    /// Time steps per path.
    pub n_steps: Size,
    /// Local-vol clamps that fired during the run.
    pub clamps: ClampStats,
}

impl McResult {
    /// `price ± z·std_error`.
    pub fn confidence_interval(&self, z: Real) -> (Price, Price) {
        (self.price - z * self.std_error, self.price + z * self.std_error)
    }
}

/// European option pricer under a [`LocalVolatilityField`].
#[derive(Debug, Clone)]
pub struct DupirePricer<'a> {
    market: &'a MarketData,
    field: &'a LocalVolatilityField,
    parallel: bool,
}

impl<'a> DupirePricer<'a> {
    /// Pricer over `market` and a field calibrated to it.
    pub fn new(market: &'a MarketData, field: &'a LocalVolatilityField) -> Self {
        Self {
            market,
            field,
            parallel: false,
        }
    }

    /// Simulate batches on the rayon thread pool.  Prices do not change.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Monte Carlo price of a European call.
    pub fn price_european_call(
        &self,
        strike: Real,
        maturity: Time,
        n_paths: Size,
        n_steps: Size,
        seed: u64,
    ) -> Result<Price> {
        let settings = McSettings::new(n_paths, n_steps, seed);
        self.price_european(OptionType::Call, strike, maturity, &settings)
            .map(|r| r.price)
    }

    /// Monte Carlo price of a European option, with its error estimate.
    ///
    /// Runs in parallel if either `settings.parallel` or
    /// [`with_parallelism`](Self::with_parallelism) asks for it.  `clamps`
    /// is the change in the field's counters over the run, so it also
    /// includes clamps from concurrent users of the same field.
    pub fn price_european(
        &self,
        option_type: OptionType,
        strike: Real,
        maturity: Time,
        settings: &McSettings,
    ) -> Result<McResult> {
        require!(
            strike.is_finite() && strike >= 0.0,
            Error::InvalidArgument,
            "strike must be non-negative and finite, got {strike}"
        );
        settings.validate()?;

        let simulator =
            PathSimulator::new(self.market, self.field).with_batch_size(settings.batch_size)?;
        let before = self.field.clamp_stats();
        let terminal = if self.parallel || settings.parallel {
            simulator.simulate_parallel(settings.n_paths, settings.n_steps, maturity, settings.seed)?
        } else {
            simulator.simulate(settings.n_paths, settings.n_steps, maturity, settings.seed)?
        };
        let clamps = self.field.clamp_stats().since(&before);

        let mut payoffs = IncrementalStatistics::new();
        for &s in &terminal {
            payoffs.add(option_type.payoff(s, strike));
        }
        let df = self.market.discount_factor(maturity);
        let result = McResult {
            price: df * payoffs.mean().unwrap_or(0.0),
            std_error: df * payoffs.error_estimate().unwrap_or(Real::NAN),
            n_paths: payoffs.samples(),
            n_steps: settings.n_steps,
            clamps,
        };

        if !clamps.is_clean() {
            tracing::warn!(
                denominator = clamps.denominator,
                local_variance = clamps.local_variance,
                total_variance = clamps.total_variance,
                strike_clamps = clamps.strike,
                strike,
                maturity,
                "local volatility clamps fired during pricing; check the surface for arbitrage"
            );
        }
        tracing::debug!(
            ?option_type,
            strike,
            maturity,
            price = result.price,
            std_error = result.std_error,
            n_paths = result.n_paths,
            "priced European option"
        );
        Ok(result)
    }
}
