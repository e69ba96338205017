//! `DupireCalibrator`: market data → total-variance surface → local vol.

use std::sync::Arc;

use lv_core::{Result, Settings};

use crate::local_vol_surface::{DupireDenominator, LocalVolatilityField};
use crate::market_data::MarketData;
use crate::variance_surface::VarianceSurface;

/// Output of [`DupireCalibrator::calibrate`].
#[derive(Debug, Clone)]
pub struct Calibration {
    /// The fitted total-variance surface.
    pub variance_surface: Arc<VarianceSurface>,
    /// The local volatility field over it.
    pub local_vol: Arc<LocalVolatilityField>,
}

/// Builds a [`LocalVolatilityField`] from [`MarketData`].
#[derive(Debug, Clone)]
pub struct DupireCalibrator {
    market: Arc<MarketData>,
    settings: Settings,
    denominator: DupireDenominator,
}

impl DupireCalibrator {
    /// Calibrator with default settings.
    pub fn new(market: Arc<MarketData>) -> Self {
        Self {
            market,
            settings: Settings::default(),
            denominator: DupireDenominator::default(),
        }
    }

    /// Use the finite-difference step and floor of `settings`.
    ///
    /// # Errors
    /// [`lv_core::Error::Config`] if the settings do not validate.
    pub fn with_settings(mut self, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        self.settings = settings.clone();
        Ok(self)
    }

    /// Select the Dupire denominator form.
    pub fn with_denominator(mut self, denominator: DupireDenominator) -> Self {
        self.denominator = denominator;
        self
    }

    /// The market data being calibrated.
    pub fn market(&self) -> &Arc<MarketData> {
        &self.market
    }

    /// Fit the total-variance surface and derive the local vol field.
    ///
    /// Calendar arbitrage and negative total variance in the fit are logged
    /// as warnings; they do not fail the calibration.
    pub fn calibrate(&self) -> Result<Calibration> {
        let surface = Arc::new(VarianceSurface::new(Arc::clone(&self.market))?);

        let node_ks: Vec<_> = surface
            .log_moneyness_nodes()
            .into_iter()
            .flatten()
            .copied()
            .collect();
        let calendar = surface.calendar_arbitrage(&node_ks);
        if !calendar.is_empty() {
            tracing::warn!(
                violations = calendar.len(),
                first_k = calendar[0].log_moneyness,
                first_t = calendar[0].t_start,
                "total variance decreases with maturity"
            );
        }
        let negative = surface.negative_variance_points();
        if !negative.is_empty() {
            tracing::warn!(points = negative.len(), "fitted total variance is negative");
        }

        let local_vol = LocalVolatilityField::new(Arc::clone(&surface))
            .with_fd_step(self.settings.fd_step)?
            .with_eps(self.settings.denominator_floor)?
            .with_denominator(self.denominator);

        tracing::debug!(
            fd_step = local_vol.fd_step(),
            eps = local_vol.eps(),
            denominator = ?local_vol.denominator(),
            "calibrated local volatility field"
        );

        Ok(Calibration {
            variance_surface: surface,
            local_vol: Arc::new(local_vol),
        })
    }
}
