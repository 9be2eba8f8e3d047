//! Numerical stability utilities.
//!
//! Safe implementations of the scalar transforms used by the likelihoods
//! and the element-wise curvature helpers used by the Laplace core.
//!
//! # Provided items
//! - [`safe_softplus(x)`]: stable `ln(1 + exp(x))`, mapping ℝ → (0, ∞).
//! - [`safe_logistic(x)`]: stable `1 / (1 + exp(−x))`.
//! - [`signed_sqrt`]: `√((|w|+w)/2) − √((|w|−w)/2)`, a square root that
//!   keeps the sign of negative curvature entries.
//! - [`regularize_curvature`]: lifts an indefinite `W` by `(2/df)·dlp²`.
//! - [`min_coeff`]: smallest entry of a vector.
use ndarray::{Array1, ArrayView1, Zip};

/// Cutoff above which `exp(−x)` is negligible relative to 1 in `f64`.
const SOFTPLUS_CUTOFF: f64 = 20.0;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// For large `x`, `softplus(x) ≈ x`; otherwise `ln1p(exp(x))`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > SOFTPLUS_CUTOFF { x } else { x.exp().ln_1p() }
}

/// Numerically stable logistic `σ(x) = 1 / (1 + exp(−x))`.
///
/// Evaluates `exp` only on non-positive arguments so neither branch
/// overflows.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Signed square root applied element-wise.
///
/// Equals `√w` for `w ≥ 0` and `−√(−w)` for `w < 0`.
pub fn signed_sqrt(w: ArrayView1<'_, f64>) -> Array1<f64> {
    w.mapv(|v| ((v.abs() + v) / 2.0).sqrt() - ((v.abs() - v) / 2.0).sqrt())
}

/// Smallest entry of `v`; `+∞` for an empty vector.
pub fn min_coeff(v: ArrayView1<'_, f64>) -> f64 {
    v.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Regularize an indefinite curvature vector in place.
///
/// When `min(W) < 0`, adds `(2/df)·dlp²` to every entry and returns `true`;
/// otherwise leaves `W` untouched and returns `false`. For a Student's t
/// likelihood the lifted entries equal the Fisher-scoring curvature, which
/// is non-negative.
pub fn regularize_curvature(w: &mut Array1<f64>, dlp: ArrayView1<'_, f64>, df: f64) -> bool {
    if min_coeff(w.view()) >= 0.0 {
        return false;
    }
    let factor = 2.0 / df;
    Zip::from(w).and(dlp).for_each(|wi, &d| *wi += factor * d * d);
    true
}
