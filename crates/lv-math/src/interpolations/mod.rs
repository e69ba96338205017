//! 1D and 2D interpolation.
//!
//! All schemes extrapolate outside their node range: linear schemes continue
//! the boundary segment, the natural cubic spline continues with its boundary
//! slope.  Callers that need another policy clamp their abscissas first.

use lv_core::{errors::Result, Real};

mod bicubic;
mod bilinear;
mod cubic;

pub use bicubic::{BicubicSpline, SplinePoint, SplineSlice};
pub use bilinear::BilinearInterpolation;
pub use cubic::CubicNaturalSpline;

/// A 1D interpolation function `f: R → R` defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug + Send + Sync {
    /// Evaluate the interpolation at `x`.
    fn operator(&self, x: Real) -> Real;

    /// First derivative at `x`.
    fn derivative(&self, x: Real) -> Real;

    /// Second derivative at `x`.
    fn second_derivative(&self, x: Real) -> Real;

    /// Return the lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Return the upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// A surface `f: R² → R` interpolated from values on a node grid.
pub trait Interpolation2D: std::fmt::Debug + Send + Sync {
    /// Value at `(x, y)`.
    fn operator(&self, x: Real, y: Real) -> Real;

    /// First x node.
    fn x_min(&self) -> Real;

    /// Last x node.
    fn x_max(&self) -> Real;

    /// First y node.
    fn y_min(&self) -> Real;

    /// Last y node.
    fn y_max(&self) -> Real;
}

/// Binary search: find `i` such that `xs[i] <= x < xs[i+1]`, clamped to
/// `[0, n-2]`.  Requires `xs.len() >= 2`.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Validate interpolation nodes: enough points, matching lengths, finite and
/// strictly increasing abscissas, finite ordinates.
pub(crate) fn check_nodes(xs: &[Real], ys: &[Real], min_points: usize) -> Result<()> {
    lv_core::ensure!(
        xs.len() >= min_points,
        "need at least {min_points} points for interpolation, got {}",
        xs.len()
    );
    lv_core::ensure!(
        xs.len() == ys.len(),
        "xs ({}) and ys ({}) must have the same length",
        xs.len(),
        ys.len()
    );
    lv_core::ensure!(
        xs.iter().chain(ys.iter()).all(|v| v.is_finite()),
        "interpolation nodes must be finite"
    );
    lv_core::ensure!(
        xs.windows(2).all(|w| w[1] > w[0]),
        "xs must be strictly increasing"
    );
    Ok(())
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`
///
/// Outside `[x_min, x_max]` the first/last segment is continued.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from sorted `xs` and corresponding `ys`.
    ///
    /// # Errors
    /// Returns an error if the slices have different lengths, fewer than 2
    /// points, or `xs` is not strictly increasing.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    fn slope(&self, i: usize) -> Real {
        (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i])
    }
}

impl Interpolation1D for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        self.ys[i] + (x - self.xs[i]) * self.slope(i)
    }

    fn derivative(&self, x: Real) -> Real {
        self.slope(locate(&self.xs, x))
    }

    fn second_derivative(&self, _x: Real) -> Real {
        0.0
    }
}
