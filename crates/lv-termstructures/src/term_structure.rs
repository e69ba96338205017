//! Rate and dividend-yield curves.
//!
//! A curve maps a year fraction `t` to a continuously-compounded annualised
//! rate.  It is defined everywhere: between samples it interpolates
//! linearly, beyond them it extrapolates according to its
//! [`CurveExtrapolation`] policy.

use lv_core::{require, DiscountFactor, Error, Rate, Real, Result, Time};
use lv_math::{Interpolation1D, LinearInterpolation};

/// A scalar curve over time.
pub trait TermStructure: std::fmt::Debug + Send + Sync {
    /// Curve value at time `t`.
    fn value_at(&self, t: Time) -> Rate;

    /// Curve values at each of `times`.
    fn values_at(&self, times: &[Time]) -> Vec<Rate> {
        times.iter().map(|&t| self.value_at(t)).collect()
    }

    /// `exp(−value(t)·t)`, the discount factor implied by reading the curve
    /// as a zero rate.
    fn discount(&self, t: Time) -> DiscountFactor {
        (-self.value_at(t) * t).exp()
    }
}

/// What an [`InterpolatedCurve`] does outside its sampled range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CurveExtrapolation {
    /// Continue the first/last segment with its slope.
    #[default]
    Linear,
    /// Hold the nearest sampled value.
    Flat,
}

/// A curve linearly interpolated between `(time, value)` samples.
#[derive(Debug, Clone)]
pub struct InterpolatedCurve {
    times: Vec<Time>,
    values: Vec<Rate>,
    // `None` for a single-sample (flat) curve
    interpolation: Option<LinearInterpolation>,
    extrapolation: CurveExtrapolation,
}

impl InterpolatedCurve {
    /// Build a curve from parallel `times` / `values`.
    ///
    /// # Errors
    /// [`Error::InvalidCurve`] if the inputs are empty, of different
    /// lengths, non-finite, or if `times` is not strictly increasing.
    pub fn new(times: &[Time], values: &[Rate]) -> Result<Self> {
        require!(!times.is_empty(), Error::InvalidCurve, "no samples");
        require!(
            times.len() == values.len(),
            Error::InvalidCurve,
            "{} times but {} values",
            times.len(),
            values.len()
        );
        require!(
            times.iter().chain(values.iter()).all(|v| v.is_finite()),
            Error::InvalidCurve,
            "samples must be finite"
        );
        require!(
            times.windows(2).all(|w| w[1] > w[0]),
            Error::InvalidCurve,
            "times must be strictly increasing"
        );

        let interpolation = if times.len() >= 2 {
            Some(
                LinearInterpolation::new(times, values)
                    .map_err(|e| Error::InvalidCurve(e.to_string()))?,
            )
        } else {
            None
        };

        Ok(Self {
            times: times.to_vec(),
            values: values.to_vec(),
            interpolation,
            extrapolation: CurveExtrapolation::default(),
        })
    }

    /// Select the extrapolation policy.
    pub fn with_extrapolation(mut self, extrapolation: CurveExtrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Sample times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Sample values.
    pub fn values(&self) -> &[Rate] {
        &self.values
    }

    /// The extrapolation policy.
    pub fn extrapolation(&self) -> CurveExtrapolation {
        self.extrapolation
    }
}

impl TermStructure for InterpolatedCurve {
    fn value_at(&self, t: Time) -> Rate {
        match &self.interpolation {
            None => self.values[0],
            Some(interp) => match self.extrapolation {
                CurveExtrapolation::Linear => interp.operator(t),
                CurveExtrapolation::Flat => {
                    interp.operator(t.clamp(interp.x_min(), interp.x_max()))
                }
            },
        }
    }
}

/// A constant curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCurve {
    value: Rate,
}

impl FlatCurve {
    /// A curve equal to `value` at every time.
    pub fn new(value: Rate) -> Self {
        Self { value }
    }

    /// The constant value.
    pub fn value(&self) -> Rate {
        self.value
    }
}

impl TermStructure for FlatCurve {
    fn value_at(&self, _t: Time) -> Rate {
        self.value
    }

    fn values_at(&self, times: &[Time]) -> Vec<Real> {
        vec![self.value; times.len()]
    }
}
