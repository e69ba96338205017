//! Tridiagonal linear systems.
//!
//! The natural cubic spline needs one solve per fit for its node curvatures.

use lv_core::Real;

/// Solve `A · x = rhs` for the tridiagonal `A` with sub-diagonal `lower`,
/// diagonal `diag` and super-diagonal `upper` (Thomas algorithm).
///
/// All slices have the system size; `lower[0]` and `upper[n - 1]` are
/// ignored.  No pivoting: `A` must be diagonally dominant, which spline
/// systems are.
pub(crate) fn solve_tridiagonal(
    lower: &[Real],
    diag: &[Real],
    upper: &[Real],
    rhs: &[Real],
) -> Vec<Real> {
    let n = diag.len();
    debug_assert!(
        lower.len() == n && upper.len() == n && rhs.len() == n,
        "tridiagonal bands and rhs must all have length {n}"
    );
    if n == 0 {
        return Vec::new();
    }

    // Forward sweep: eliminate the sub-diagonal, keeping the scaled
    // super-diagonal in `gamma` and the running solution in `x`.
    let mut gamma = vec![0.0; n];
    let mut x = Vec::with_capacity(n);
    let mut pivot = diag[0];
    x.push(rhs[0] / pivot);
    for i in 1..n {
        gamma[i - 1] = upper[i - 1] / pivot;
        pivot = diag[i] - lower[i] * gamma[i - 1];
        x.push((rhs[i] - lower[i] * x[i - 1]) / pivot);
    }

    // Back substitution.
    for i in (0..n - 1).rev() {
        x[i] -= gamma[i] * x[i + 1];
    }
    x
}
