//! Negative log marginal likelihood under the Laplace approximation.
//!
//! Purpose
//! -------
//! Combine `Ψ` at the mode with the log-determinant of the posterior factor.
//!
//! Invariants & assumptions
//! ------------------------
//! - The state is at the mode the factor was built from.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    laplace::{posterior::PosteriorFactor, state::ModeState},
};

/// `NLML = ½·alpha·(f − m) − Σ log p(y|f) + ½·ln det(I + Ks·W)`.
///
/// The first two terms are `Ψ` at the mode, which the state carries; the
/// log-determinant comes from the Cholesky diagonal or from the LU
/// determinant of `A`, depending on the branch.
///
/// # Errors
/// [`InferenceError::NonFiniteResult`] if the result is NaN or infinite.
pub fn negative_log_marginal_likelihood(
    state: &ModeState, factor: &PosteriorFactor,
) -> InferenceResult<f64> {
    let nlml = state.psi + 0.5 * factor.log_det();
    if !nlml.is_finite() {
        return Err(InferenceError::NonFiniteResult { what: "negative log marginal likelihood" });
    }
    Ok(nlml)
}
