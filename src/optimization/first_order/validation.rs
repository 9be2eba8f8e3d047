//! Consistency checks shared by the first-order path: stopping-rule
//! tolerances, gradients handed back to argmin, candidate variables written
//! into a cost function, and the best variable a solver reports.
use crate::optimization::{
    errors::{OptError, OptResult},
    first_order::types::{Grad, Variable},
};

/// Reason a tolerance is unusable, or `None` if it is finite and positive.
fn tolerance_defect(tol: f64) -> Option<&'static str> {
    if !tol.is_finite() {
        Some("Tolerance must be finite.")
    } else if tol <= 0.0 {
        Some("Tolerance must be positive.")
    } else {
        None
    }
}

/// `None` disables the gradient-norm stopping rule.
///
/// # Errors
/// [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol.and_then(|t| tolerance_defect(t).map(|reason| (t, reason))) {
        Some((tol, reason)) => Err(OptError::InvalidTolGrad { tol, reason }),
        None => Ok(()),
    }
}

/// `None` disables the cost-change stopping rule.
///
/// # Errors
/// [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol.and_then(|t| tolerance_defect(t).map(|reason| (t, reason))) {
        Some((tol, reason)) => Err(OptError::InvalidTolCost { tol, reason }),
        None => Ok(()),
    }
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Check that a candidate variable vector matches the cost function's
/// dimension before it is written into the cost function's state.
///
/// # Errors
/// [`OptError::VariableDimMismatch`] when the lengths differ.
pub fn validate_variable_len(x: &Variable, dim: usize) -> OptResult<()> {
    if x.len() != dim {
        return Err(OptError::VariableDimMismatch { expected: dim, found: x.len() });
    }
    Ok(())
}

/// Unwrap the best variable a solver reported.
///
/// # Errors
/// - [`OptError::MissingBestVariable`] if the solver reported none.
/// - [`OptError::NonFiniteVariable`] at the first non-finite element.
pub fn validate_best_variable(best: Option<Variable>) -> OptResult<Variable> {
    let best = best.ok_or(OptError::MissingBestVariable)?;
    if let Some((index, &value)) = best.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::NonFiniteVariable {
            index,
            value,
            reason: "Best variable must be finite.",
        });
    }
    Ok(best)
}

/// Validate that a scalar cost value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
