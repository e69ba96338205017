//! Numerical and Monte Carlo settings.
//!
//! [`Settings`] gathers the knobs of one calibration + pricing session: the
//! Dupire finite-difference step and denominator floor, and the default
//! Monte Carlo configuration ([`McSettings`]).  Settings are plain values
//! passed to the objects that need them; there is no process-wide instance.
//!
//! With the `serde` feature the structs can be read from TOML:
//!
//! ```toml
//! fd_step = 1e-4
//! denominator_floor = 1e-6
//!
//! [monte_carlo]
//! n_paths = 200000
//! n_steps = 200
//! seed = 42
//! ```

use crate::errors::{Error, Result};
use crate::{Real, Size};

/// Default step `δ` of the centred log-moneyness difference.
pub const DEFAULT_FD_STEP: Real = 1e-4;

/// Default floor applied to the Dupire denominator.
pub const DEFAULT_DENOMINATOR_FLOOR: Real = 1e-6;

/// Default number of paths simulated by one worker batch.
pub const DEFAULT_BATCH_SIZE: Size = 4096;

/// Monte Carlo configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct McSettings {
    /// Number of simulated paths.
    pub n_paths: Size,
    /// Number of time steps per path.
    pub n_steps: Size,
    /// Seed of the random stream.
    pub seed: u64,
    /// Paths per batch; each batch owns an independently seeded generator.
    pub batch_size: Size,
    /// Distribute batches over the rayon thread pool.
    pub parallel: bool,
}

impl Default for McSettings {
    fn default() -> Self {
        Self {
            n_paths: 100_000,
            n_steps: 200,
            seed: 42,
            batch_size: DEFAULT_BATCH_SIZE,
            parallel: false,
        }
    }
}

impl McSettings {
    /// Settings with the given path/step counts and seed, other fields
    /// defaulted.
    pub fn new(n_paths: Size, n_steps: Size, seed: u64) -> Self {
        Self {
            n_paths,
            n_steps,
            seed,
            ..Self::default()
        }
    }

    /// Enable or disable batch parallelism.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: Size) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Check the counts are usable.
    pub fn validate(&self) -> Result<()> {
        if self.n_paths == 0 {
            return Err(Error::InvalidArgument("n_paths must be at least 1".into()));
        }
        if self.n_steps == 0 {
            return Err(Error::InvalidArgument("n_steps must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidArgument(
                "batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Step `δ` of the centred second difference in log-moneyness.
    pub fd_step: Real,
    /// Floor `eps` of the Dupire denominator (and of the total variance).
    pub denominator_floor: Real,
    /// Monte Carlo defaults.
    pub monte_carlo: McSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fd_step: DEFAULT_FD_STEP,
            denominator_floor: DEFAULT_DENOMINATOR_FLOOR,
            monte_carlo: McSettings::default(),
        }
    }
}

impl Settings {
    /// Check every field is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.fd_step.is_finite() && self.fd_step > 0.0) {
            return Err(Error::Config(format!(
                "fd_step must be positive and finite, got {}",
                self.fd_step
            )));
        }
        if !(self.denominator_floor.is_finite() && self.denominator_floor > 0.0) {
            return Err(Error::Config(format!(
                "denominator_floor must be positive and finite, got {}",
                self.denominator_floor
            )));
        }
        self.monte_carlo
            .validate()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Parse and validate settings from a TOML document.  Missing fields take
    /// their default values.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}
