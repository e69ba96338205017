//! Observable numerical clamps.
//!
//! The Dupire transform floors its denominator, the resulting local variance
//! and (for badly fitted surfaces) the total variance, and it maps a
//! non-positive strike to zero local variance.  Those floors keep a
//! query finite but hide the pathology that caused them, so every activation
//! is reported as a [`NumericalClampEvent`]: logged at `trace` level and
//! counted in a [`ClampCounters`] instance.  Repeated clamping points at a
//! miscalibrated or arbitrage-violating market input.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Real, Time};

/// Which floor was activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClampKind {
    /// Dupire denominator raised to the `eps` floor.
    Denominator,
    /// Negative local variance raised to zero.
    LocalVariance,
    /// Non-positive fitted total variance raised to the `eps` floor.
    TotalVariance,
    /// Non-positive strike, where log-moneyness is undefined; the local
    /// variance is zero there.
    Strike,
}

impl fmt::Display for ClampKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClampKind::Denominator => "denominator",
            ClampKind::LocalVariance => "local_variance",
            ClampKind::TotalVariance => "total_variance",
            ClampKind::Strike => "strike",
        };
        f.write_str(s)
    }
}

/// A single, non-fatal clamp activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericalClampEvent {
    /// The floor that fired.
    pub kind: ClampKind,
    /// Strike (or current asset level) of the query.
    pub strike: Real,
    /// Maturity of the query.
    pub maturity: Time,
    /// The value before clamping.
    pub raw: Real,
}

impl NumericalClampEvent {
    /// Log the event at `trace` level.
    pub fn emit(&self) {
        tracing::trace!(
            kind = %self.kind,
            strike = self.strike,
            maturity = self.maturity,
            raw = self.raw,
            "numerical clamp activated"
        );
    }
}

/// A snapshot of clamp activation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClampStats {
    /// Denominator floor activations.
    pub denominator: u64,
    /// Local-variance floor activations.
    pub local_variance: u64,
    /// Total-variance floor activations.
    pub total_variance: u64,
    /// Queries at a non-positive strike.
    pub strike: u64,
}

impl ClampStats {
    /// Total number of activations across all kinds.
    pub fn total(&self) -> u64 {
        self.denominator + self.local_variance + self.total_variance + self.strike
    }

    /// Whether no clamp fired.
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    /// Activations accumulated since an earlier snapshot.
    pub fn since(&self, earlier: &ClampStats) -> ClampStats {
        ClampStats {
            denominator: self.denominator.saturating_sub(earlier.denominator),
            local_variance: self.local_variance.saturating_sub(earlier.local_variance),
            total_variance: self.total_variance.saturating_sub(earlier.total_variance),
            strike: self.strike.saturating_sub(earlier.strike),
        }
    }
}

/// Thread-safe clamp counters.
///
/// Counters use relaxed atomics: they are diagnostics, shared read-mostly
/// between simulation workers, and carry no ordering obligations.
#[derive(Debug, Default)]
pub struct ClampCounters {
    denominator: AtomicU64,
    local_variance: AtomicU64,
    total_variance: AtomicU64,
    strike: AtomicU64,
}

impl ClampCounters {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count and log an event.
    pub fn record(&self, event: NumericalClampEvent) {
        self.counter(event.kind).fetch_add(1, Ordering::Relaxed);
        event.emit();
    }

    /// Current counts.
    pub fn snapshot(&self) -> ClampStats {
        ClampStats {
            denominator: self.denominator.load(Ordering::Relaxed),
            local_variance: self.local_variance.load(Ordering::Relaxed),
            total_variance: self.total_variance.load(Ordering::Relaxed),
            strike: self.strike.load(Ordering::Relaxed),
        }
    }

    /// Zero all counters.
    pub fn reset(&self) {
        self.denominator.store(0, Ordering::Relaxed);
        self.local_variance.store(0, Ordering::Relaxed);
        self.total_variance.store(0, Ordering::Relaxed);
        self.strike.store(0, Ordering::Relaxed);
    }

    fn counter(&self, kind: ClampKind) -> &AtomicU64 {
        match kind {
            ClampKind::Denominator => &self.denominator,
            ClampKind::LocalVariance => &self.local_variance,
            ClampKind::TotalVariance => &self.total_variance,
            ClampKind::Strike => &self.strike,
        }
    }
}
