//! Natural cubic spline interpolation.
//!
//! The spline is stored in Hermite form: node values `yᵢ` and node slopes
//! `tᵢ`.  On `[xᵢ, xᵢ₊₁]`, with `dx = x - xᵢ`,
//!
//!   `f(x) = yᵢ + dx·(aᵢ + dx·(bᵢ + dx·cᵢ))`
//!
//! where `aᵢ = tᵢ`, `bᵢ = (3sᵢ − tᵢ₊₁ − 2tᵢ)/hᵢ`, `cᵢ = (tᵢ₊₁ + tᵢ − 2sᵢ)/hᵢ²`
//! and `sᵢ` is the secant slope.  Slopes come from the natural end
//! condition (zero curvature at both ends), so continuing the spline
//! linearly beyond the nodes keeps it C².

use lv_core::{errors::Result, Real};

use super::{check_nodes, locate, Interpolation1D};
use crate::tridiagonal::solve_tridiagonal;

/// Node slopes of the natural cubic spline through `(xs, ys)`.
///
/// `xs` must be strictly increasing with at least 2 points; two points give
/// the straight line.
pub(crate) fn natural_slopes(xs: &[Real], ys: &[Real]) -> Vec<Real> {
    let n = xs.len();
    let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let s: Vec<Real> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();
    if n == 2 {
        return vec![s[0], s[0]];
    }

    // Interior curvatures M₁..Mₙ₋₂; M₀ = Mₙ₋₁ = 0.
    let m = n - 2;
    let mut lower = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut upper = vec![0.0; m];
    let mut rhs = vec![0.0; m];
    for r in 0..m {
        let i = r + 1;
        lower[r] = h[i - 1];
        diag[r] = 2.0 * (h[i - 1] + h[i]);
        upper[r] = h[i];
        rhs[r] = 6.0 * (s[i] - s[i - 1]);
    }
    let interior = solve_tridiagonal(&lower, &diag, &upper, &rhs);

    let mut curv = vec![0.0; n];
    curv[1..n - 1].copy_from_slice(&interior);

    let mut ts = Vec::with_capacity(n);
    for i in 0..n - 1 {
        ts.push(s[i] - h[i] * (2.0 * curv[i] + curv[i + 1]) / 6.0);
    }
    ts.push(s[n - 2] + h[n - 2] * (curv[n - 2] + 2.0 * curv[n - 1]) / 6.0);
    ts
}

/// Value, first and second derivative of a Hermite cubic at `x`, continued
/// linearly outside the node range.
pub(crate) fn hermite_eval(xs: &[Real], ys: &[Real], ts: &[Real], x: Real) -> (Real, Real, Real) {
    let n = xs.len();
    if x < xs[0] {
        return (ys[0] + ts[0] * (x - xs[0]), ts[0], 0.0);
    }
    if x > xs[n - 1] {
        return (ys[n - 1] + ts[n - 1] * (x - xs[n - 1]), ts[n - 1], 0.0);
    }
    let i = locate(xs, x);
    let h = xs[i + 1] - xs[i];
    let s = (ys[i + 1] - ys[i]) / h;
    let a = ts[i];
    let b = (3.0 * s - ts[i + 1] - 2.0 * ts[i]) / h;
    let c = (ts[i + 1] + ts[i] - 2.0 * s) / (h * h);
    let dx = x - xs[i];
    (
        ys[i] + dx * (a + dx * (b + dx * c)),
        a + dx * (2.0 * b + 3.0 * c * dx),
        2.0 * b + 6.0 * c * dx,
    )
}

/// Natural cubic spline (zero second derivative at both ends).
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    ts: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Build a natural cubic spline through `(xs, ys)`.
    ///
    /// Requires at least 2 points and strictly increasing `xs`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        Ok(Self {
            ts: natural_slopes(xs, ys),
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    /// Value and first derivative at `x` in one pass.
    pub fn value_and_derivative(&self, x: Real) -> (Real, Real) {
        let (v, d, _) = hermite_eval(&self.xs, &self.ys, &self.ts, x);
        (v, d)
    }

    /// Node abscissas.
    pub fn xs(&self) -> &[Real] {
        &self.xs
    }

    /// Node values.
    pub fn ys(&self) -> &[Real] {
        &self.ys
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        hermite_eval(&self.xs, &self.ys, &self.ts, x).0
    }

    fn derivative(&self, x: Real) -> Real {
        hermite_eval(&self.xs, &self.ys, &self.ts, x).1
    }

    fn second_derivative(&self, x: Real) -> Real {
        hermite_eval(&self.xs, &self.ys, &self.ts, x).2
    }
}
