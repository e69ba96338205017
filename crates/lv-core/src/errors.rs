//! Error types for localvol-rs.
//!
//! Every fallible operation in the workspace returns the single
//! `thiserror`-derived [`Error`] enum.  Construction-time malformations
//! (curves, grids, market inputs) fail fast; simulation failures abort the
//! whole pricing call.  Numerical clamps are *not* errors, see
//! [`crate::clamp`].

use thiserror::Error;

/// The top-level error type used throughout localvol-rs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Malformed term-structure input (mismatched lengths, non-increasing
    /// times, non-finite samples).
    #[error("invalid curve: {0}")]
    InvalidCurve(String),

    /// The implied-volatility grid is too sparse for a bivariate fit.
    #[error(
        "insufficient grid: need at least 2 maturities and 2 strikes, \
         got {maturities} maturities and {strikes} strikes"
    )]
    InsufficientGrid {
        /// Number of distinct maturities in the grid.
        maturities: usize,
        /// Number of distinct strikes in the grid.
        strikes: usize,
    },

    /// Non-finite local volatility or price encountered while advancing
    /// paths.
    #[error("simulation error: {0}")]
    Simulation(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Settings could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Precondition violated (see [`ensure!`](crate::ensure)).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),
}

/// Shorthand `Result` type used throughout localvol-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use lv_core::{ensure, errors::Error};
/// fn positive(x: f64) -> lv_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err($variant(...))` if `$cond` is false, for any single-`String`
/// variant of [`Error`].
///
/// # Example
/// ```
/// use lv_core::{require, errors::Error};
/// fn check(times: &[f64]) -> lv_core::errors::Result<()> {
///     require!(!times.is_empty(), Error::InvalidCurve, "no samples");
///     Ok(())
/// }
/// assert_eq!(check(&[]), Err(Error::InvalidCurve("no samples".into())));
/// ```
#[macro_export]
macro_rules! require {
    ($cond:expr, $variant:path, $($msg:tt)*) => {
        if !$cond {
            return Err($variant(format!($($msg)*)));
        }
    };
}
