//! numerical_stability — robust scalar transforms and dense factorizations.
//!
//! Purpose
//! -------
//! Collect the numerically delicate building blocks shared by the
//! likelihoods and the Laplace core: overflow-safe scalar transforms,
//! element-wise curvature helpers, and the `ndarray`/`nalgebra` bridge for
//! Cholesky, triangular solves and pivoted LU.
//!
//! Key behaviors
//! -------------
//! - Stable `softplus`, its inverse and `logistic` for likelihood
//!   evaluation without overflow.
//! - Signed square root and `(2/df)·dlp²` regularization of an indefinite
//!   curvature vector `W`.
//! - Factorizations that report breakdown as
//!   [`OptError`](crate::optimization::errors::OptError) instead of
//!   propagating NaNs.
//!
//! Conventions
//! -----------
//! - All routines take `ndarray` views and return owned `ndarray`
//!   containers; `nalgebra` types never leak out of [`factorization`].
//! - Nothing here logs or touches global state.
//!
//! Testing notes
//! -------------
//! - [`transformations`]: agreement with naïve formulas, tail behavior,
//!   sign handling and regularization.
//! - [`factorization`]: reconstruction checks on small matrices with
//!   known factors and the failure paths.

pub mod factorization;
pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::factorization::{
    cholesky_solve_vec, lu_inverse_with_det, solve_upper, solve_upper_transpose, upper_cholesky,
};
pub use self::transformations::{
    min_coeff, regularize_curvature, safe_logistic, safe_softplus, signed_sqrt,
};

pub mod prelude {
    pub use super::transformations::{safe_logistic, safe_softplus};
}
