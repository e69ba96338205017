//! Piecewise-bilinear interpolation on a rectangular node grid.
//!
//! Outside the grid the boundary cell is continued linearly.  An axis with
//! a single node carries no information along it, so the surface is
//! constant in that direction.

use lv_core::{errors::Result, Real};

use super::{locate, Interpolation2D};

/// Bilinear interpolation of `z` over `xs × ys`.
///
/// Values are row-major with one row per `y` node: the value at
/// `(xs[i], ys[j])` is `z[j * xs.len() + i]`.
#[derive(Debug, Clone)]
pub struct BilinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    z: Vec<Real>,
}

impl BilinearInterpolation {
    /// Interpolate `z` over the grid `xs × ys`.
    ///
    /// Both axes must be non-empty, finite and strictly increasing, and `z`
    /// must hold exactly one value per grid node.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        lv_core::ensure!(
            !xs.is_empty() && !ys.is_empty(),
            "bilinear grid needs at least one node per axis"
        );
        lv_core::ensure!(
            z.len() == xs.len() * ys.len(),
            "expected {} grid values for a {}x{} grid, got {}",
            xs.len() * ys.len(),
            xs.len(),
            ys.len(),
            z.len()
        );
        for (name, axis) in [("x", xs), ("y", ys)] {
            lv_core::ensure!(
                axis.iter().all(|v| v.is_finite()) && axis.windows(2).all(|w| w[0] < w[1]),
                "{name} nodes must be finite and strictly increasing"
            );
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            z: z.to_vec(),
        })
    }

    fn node(&self, i: usize, j: usize) -> Real {
        self.z[j * self.xs.len() + i]
    }
}

/// Cell containing `v` as `(lower index, upper index, weight of upper)`.
/// The weight is not clamped, so queries off the grid extrapolate.
fn cell(nodes: &[Real], v: Real) -> (usize, usize, Real) {
    if nodes.len() == 1 {
        return (0, 0, 0.0);
    }
    let lo = locate(nodes, v);
    (lo, lo + 1, (v - nodes[lo]) / (nodes[lo + 1] - nodes[lo]))
}

impl Interpolation2D for BilinearInterpolation {
    fn operator(&self, x: Real, y: Real) -> Real {
        let (i0, i1, wx) = cell(&self.xs, x);
        let (j0, j1, wy) = cell(&self.ys, y);
        let lower = self.node(i0, j0) + wx * (self.node(i1, j0) - self.node(i0, j0));
        let upper = self.node(i0, j1) + wx * (self.node(i1, j1) - self.node(i0, j1));
        lower + wy * (upper - lower)
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn y_min(&self) -> Real {
        self.ys[0]
    }

    fn y_max(&self) -> Real {
        self.ys[self.ys.len() - 1]
    }
}
