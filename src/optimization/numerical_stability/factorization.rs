//! numerical_stability::factorization — dense factorizations over `ndarray`.
//!
//! Purpose
//! -------
//! The crate stores matrices as `ndarray` containers but delegates dense
//! factorizations to `nalgebra`. This module owns the bridge: it copies
//! between the two representations and exposes the handful of operations
//! the Laplace core needs as `ndarray`-in / `ndarray`-out functions.
//!
//! Key behaviors
//! -------------
//! - Upper Cholesky factor `U` with `A = Uᵀ U` ([`upper_cholesky`]).
//! - Triangular solves against `U` and `Uᵀ` for matrices and vectors.
//! - Full-pivot LU inverse plus determinant ([`lu_inverse_with_det`]) for
//!   matrices that are not symmetric positive definite.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are square where a factorization is requested; shape problems
//!   surface as [`OptError::ShapeMismatch`].
//! - Breakdown (not positive definite, singular) surfaces as
//!   [`OptError::FactorizationFailed`], never as NaN output.
//!
//! Conventions
//! -----------
//! - The `matrix` label passed to the helpers names the operand in error
//!   messages (e.g. `"B"`, `"A"`).
//! - Copies are column-major on the `nalgebra` side; no symmetrization is
//!   performed on the way through.
use crate::optimization::errors::{OptError, OptResult};
use nalgebra::{DMatrix, DVector, FullPivLU};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

// ---- ndarray <-> nalgebra bridge ----

/// Copy an `ndarray` matrix into a `DMatrix`.
pub fn to_dmatrix(a: ArrayView2<'_, f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Copy a `DMatrix` back into an `ndarray` matrix.
pub fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

fn to_dvector(v: ArrayView1<'_, f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

fn from_dvector(v: &DVector<f64>) -> Array1<f64> {
    v.iter().copied().collect()
}

fn ensure_square(a: ArrayView2<'_, f64>) -> OptResult<usize> {
    let (r, c) = a.dim();
    if r != c {
        return Err(OptError::ShapeMismatch { expected: (r, r), found: (r, c) });
    }
    Ok(r)
}

fn ensure_rows(n: usize, found: (usize, usize)) -> OptResult<()> {
    if found.0 != n {
        return Err(OptError::ShapeMismatch { expected: (n, found.1), found });
    }
    Ok(())
}

// ---- Cholesky ----

/// Upper-triangular Cholesky factor `U` of a symmetric positive definite
/// matrix, `A = Uᵀ U`.
///
/// # Errors
/// - [`OptError::ShapeMismatch`] if `a` is not square.
/// - [`OptError::FactorizationFailed`] if `a` is not positive definite.
pub fn upper_cholesky(a: ArrayView2<'_, f64>, matrix: &'static str) -> OptResult<Array2<f64>> {
    ensure_square(a)?;
    let chol = nalgebra::Cholesky::new(to_dmatrix(a)).ok_or(OptError::FactorizationFailed {
        matrix,
        reason: "matrix is not positive definite",
    })?;
    Ok(from_dmatrix(&chol.l().transpose()))
}

/// Solve `U X = B` for upper-triangular `U`.
///
/// # Errors
/// - [`OptError::ShapeMismatch`] on incompatible shapes.
/// - [`OptError::FactorizationFailed`] if `U` has a zero on its diagonal.
pub fn solve_upper(
    u: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>, matrix: &'static str,
) -> OptResult<Array2<f64>> {
    let n = ensure_square(u)?;
    ensure_rows(n, b.dim())?;
    to_dmatrix(u)
        .solve_upper_triangular(&to_dmatrix(b))
        .map(|x| from_dmatrix(&x))
        .ok_or(OptError::FactorizationFailed { matrix, reason: "triangular factor is singular" })
}

/// Solve `Uᵀ X = B` for upper-triangular `U`.
///
/// # Errors
/// Same as [`solve_upper`].
pub fn solve_upper_transpose(
    u: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>, matrix: &'static str,
) -> OptResult<Array2<f64>> {
    let n = ensure_square(u)?;
    ensure_rows(n, b.dim())?;
    to_dmatrix(u)
        .tr_solve_upper_triangular(&to_dmatrix(b))
        .map(|x| from_dmatrix(&x))
        .ok_or(OptError::FactorizationFailed { matrix, reason: "triangular factor is singular" })
}

/// Solve `(Uᵀ U) x = b` for a vector right-hand side through two
/// triangular solves.
///
/// # Errors
/// Same as [`solve_upper`].
pub fn cholesky_solve_vec(
    u: ArrayView2<'_, f64>, b: ArrayView1<'_, f64>, matrix: &'static str,
) -> OptResult<Array1<f64>> {
    let n = ensure_square(u)?;
    ensure_rows(n, (b.len(), 1))?;
    let um = to_dmatrix(u);
    let singular = OptError::FactorizationFailed { matrix, reason: "triangular factor is singular" };
    let y = um.tr_solve_upper_triangular(&to_dvector(b)).ok_or_else(|| singular.clone())?;
    let x = um.solve_upper_triangular(&y).ok_or(singular)?;
    Ok(from_dvector(&x))
}

// ---- LU ----

/// Inverse and determinant of a general square matrix from a full-pivot LU
/// decomposition.
///
/// # Errors
/// - [`OptError::ShapeMismatch`] if `a` is not square.
/// - [`OptError::FactorizationFailed`] if `a` is singular.
pub fn lu_inverse_with_det(
    a: ArrayView2<'_, f64>, matrix: &'static str,
) -> OptResult<(Array2<f64>, f64)> {
    ensure_square(a)?;
    let lu = FullPivLU::new(to_dmatrix(a));
    let det = lu.determinant();
    let inv = lu
        .try_inverse()
        .ok_or(OptError::FactorizationFailed { matrix, reason: "matrix is singular" })?;
    Ok((from_dmatrix(&inv), det))
}
