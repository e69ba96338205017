//! Bicubic spline interpolation on a (possibly skewed) 2D grid.
//!
//! For each row `j` of the grid, a 1D natural cubic spline is built along
//! `x` through that row's own abscissas.  For a query `(x, y)` the row
//! splines are evaluated at `x` and the resulting column is interpolated
//! along `y` with another natural cubic spline.  Row abscissas may differ
//! between rows (e.g. log-moneyness nodes that shift with the forward), the
//! only requirement is that each row is strictly increasing.
//!
//! Both partial derivatives are analytic: `∂/∂y` differentiates the column
//! spline, `∂/∂x` interpolates the row-spline slopes along `y` (the natural
//! spline is linear in its ordinates, so this is exact).
//!
//! The same linearity gives [`SplineSlice`]: at a fixed `y` the surface is a
//! weighted sum of the row splines, with weights taken from the cardinal
//! column splines.  Many queries at one `y` then cost one pass over the rows
//! each.

use lv_core::{errors::Result, Real};

use super::cubic::{hermite_eval, natural_slopes};
use super::{check_nodes, CubicNaturalSpline, Interpolation2D};

/// Value and first partials of a [`BicubicSpline`] at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplinePoint {
    /// `f(x, y)`.
    pub value: Real,
    /// `∂f/∂x`.
    pub d_x: Real,
    /// `∂f/∂y`.
    pub d_y: Real,
}

/// Bicubic spline interpolation.
#[derive(Debug, Clone)]
pub struct BicubicSpline {
    ys: Vec<Real>,
    /// One cubic spline per y-row, interpolating along x.
    row_splines: Vec<CubicNaturalSpline>,
}

impl BicubicSpline {
    /// Build a bicubic spline on the rectangular grid `(xs × ys → z)`.
    ///
    /// `z` is row-major: `z[j * nx + i]` = f(xs\[i\], ys\[j\]).  Both axes need
    /// at least 2 points.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        let nx = xs.len();
        let ny = ys.len();
        lv_core::ensure!(
            z.len() == nx * ny,
            "z length ({}) must equal nx*ny ({}*{}={})",
            z.len(),
            nx,
            ny,
            nx * ny
        );
        let rows_x = vec![xs.to_vec(); ny];
        let rows_z: Vec<Vec<Real>> = z.chunks(nx.max(1)).map(|c| c.to_vec()).collect();
        Self::from_rows(ys, &rows_x, &rows_z)
    }

    /// Build a bicubic spline whose rows carry their own abscissas:
    /// row `j` interpolates `(rows_x[j][i], rows_z[j][i])` at `y = ys[j]`.
    pub fn from_rows(ys: &[Real], rows_x: &[Vec<Real>], rows_z: &[Vec<Real>]) -> Result<Self> {
        let ny = ys.len();
        lv_core::ensure!(ny >= 2, "bicubic spline needs at least 2 y grid points");
        lv_core::ensure!(
            rows_x.len() == ny && rows_z.len() == ny,
            "expected {ny} rows, got {} abscissa rows and {} value rows",
            rows_x.len(),
            rows_z.len()
        );
        check_nodes(ys, ys, 2)?;

        let row_splines = rows_x
            .iter()
            .zip(rows_z.iter())
            .map(|(xs, zs)| CubicNaturalSpline::new(xs, zs))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            ys: ys.to_vec(),
            row_splines,
        })
    }

    /// Value and both first partials at `(x, y)`.
    pub fn evaluate(&self, x: Real, y: Real) -> SplinePoint {
        let n = self.row_splines.len();
        let mut column = Vec::with_capacity(n);
        let mut column_dx = Vec::with_capacity(n);
        for s in &self.row_splines {
            let (v, d) = s.value_and_derivative(x);
            column.push(v);
            column_dx.push(d);
        }

        let ts = natural_slopes(&self.ys, &column);
        let (value, d_y, _) = hermite_eval(&self.ys, &column, &ts, y);
        let ts_dx = natural_slopes(&self.ys, &column_dx);
        let (d_x, _, _) = hermite_eval(&self.ys, &column_dx, &ts_dx, y);

        SplinePoint { value, d_x, d_y }
    }

    /// Restrict the spline to the line `y`.
    pub fn slice(&self, y: Real) -> SplineSlice<'_> {
        let n = self.ys.len();
        let mut weights = Vec::with_capacity(n);
        let mut d_weights = Vec::with_capacity(n);
        let mut unit = vec![0.0; n];
        for j in 0..n {
            unit[j] = 1.0;
            let ts = natural_slopes(&self.ys, &unit);
            let (w, dw, _) = hermite_eval(&self.ys, &unit, &ts, y);
            weights.push(w);
            d_weights.push(dw);
            unit[j] = 0.0;
        }
        SplineSlice {
            rows: &self.row_splines,
            y,
            weights,
            d_weights,
        }
    }

    /// The y nodes (one per row).
    pub fn ys(&self) -> &[Real] {
        &self.ys
    }

    /// The row splines, in y order.
    pub fn rows(&self) -> &[CubicNaturalSpline] {
        &self.row_splines
    }
}

/// A [`BicubicSpline`] restricted to a fixed `y`.
#[derive(Debug, Clone)]
pub struct SplineSlice<'a> {
    rows: &'a [CubicNaturalSpline],
    y: Real,
    weights: Vec<Real>,
    d_weights: Vec<Real>,
}

impl SplineSlice<'_> {
    /// The `y` this slice was taken at.
    pub fn y(&self) -> Real {
        self.y
    }

    /// `f(x, y)`.
    pub fn value(&self, x: Real) -> Real {
        self.rows
            .iter()
            .zip(self.weights.iter())
            .map(|(row, &w)| w * row.value_and_derivative(x).0)
            .sum()
    }

    /// Value and both first partials at `(x, y)`.
    pub fn evaluate(&self, x: Real) -> SplinePoint {
        let mut p = SplinePoint {
            value: 0.0,
            d_x: 0.0,
            d_y: 0.0,
        };
        for ((row, &w), &dw) in self
            .rows
            .iter()
            .zip(self.weights.iter())
            .zip(self.d_weights.iter())
        {
            let (v, d) = row.value_and_derivative(x);
            p.value += w * v;
            p.d_x += w * d;
            p.d_y += dw * v;
        }
        p
    }
}

impl Interpolation2D for BicubicSpline {
    fn x_min(&self) -> Real {
        self.row_splines
            .iter()
            .map(|s| s.xs()[0])
            .fold(Real::INFINITY, Real::min)
    }

    fn x_max(&self) -> Real {
        self.row_splines
            .iter()
            .map(|s| s.xs()[s.xs().len() - 1])
            .fold(Real::NEG_INFINITY, Real::max)
    }

    fn y_min(&self) -> Real {
        self.ys[0]
    }

    fn y_max(&self) -> Real {
        self.ys[self.ys.len() - 1]
    }

    fn operator(&self, x: Real, y: Real) -> Real {
        let column: Vec<Real> = self.row_splines.iter().map(|s| s.value_and_derivative(x).0).collect();
        let ts = natural_slopes(&self.ys, &column);
        hermite_eval(&self.ys, &column, &ts, y).0
    }
}
