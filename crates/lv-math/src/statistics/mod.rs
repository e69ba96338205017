//! Incremental statistics accumulator.

use lv_core::Real;

/// Running mean and variance of a sample stream.
///
/// Keeps the count, the sum and the sum of squares, so samples can be fed
/// one at a time without storing them.
#[derive(Debug, Clone, Default)]
pub struct IncrementalStatistics {
    count: usize,
    sum: Real,
    sum_sq: Real,
}

impl IncrementalStatistics {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single sample.
    pub fn add(&mut self, x: Real) {
        self.count += 1;
        self.sum += x;
        self.sum_sq += x * x;
    }

    /// Number of samples.
    pub fn samples(&self) -> usize {
        self.count
    }

    /// Mean.  Returns `None` if no samples have been added.
    pub fn mean(&self) -> Option<Real> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as Real)
        }
    }

    /// Unbiased (Bessel-corrected) variance.  Returns `None` for fewer than
    /// 2 samples.
    pub fn variance(&self) -> Option<Real> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as Real;
        let m = self.sum / n;
        let s2 = (self.sum_sq / n - m * m).max(0.0);
        Some(s2 * n / (n - 1.0))
    }

    /// Standard error of the mean, `σ / √n`.
    pub fn error_estimate(&self) -> Option<Real> {
        self.variance().map(|v| (v / self.count as Real).sqrt())
    }
}
