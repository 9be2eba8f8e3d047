//! Unified error handling for Laplace inference.
//!
//! `InferenceError` is the error type of the Laplace core. It wraps the
//! optimizer-layer [`OptError`] and the collaborator-layer [`GpError`] and
//! adds the failures specific to mode finding, factorization and gradient
//! evaluation. `InferenceResult<T>` standardizes the return type.
use crate::{gp::errors::GpError, optimization::errors::OptError};

/// Unified error type for Laplace inference.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Configuration ----
    /// The requested mode minimizer is not supported.
    UnsupportedMinimizer {
        name: String,
    },
    /// Newton settings are out of range.
    InvalidNewtonOption {
        option: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// Features, labels and collaborator outputs disagree in size.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    // ---- Numerics ----
    /// Determinant of `I + K·diag(W)` is not positive in the indefinite branch.
    NonPositiveDeterminant {
        det: f64,
    },
    /// A NaN or infinity appeared in a result that must be finite.
    NonFiniteResult {
        what: &'static str,
    },

    // ---- Wrapped layers ----
    Optimization(OptError),
    Model(GpError),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl From<OptError> for InferenceError {
    fn from(err: OptError) -> Self {
        InferenceError::Optimization(err)
    }
}

impl From<GpError> for InferenceError {
    fn from(err: GpError) -> Self {
        InferenceError::Model(err)
    }
}

/// Pass an inference error through an optimizer callback.
///
/// Optimizer errors travel unchanged; anything else is stored in `slot` and
/// replaced by a [`OptError::BackendError`] carrying its message.
pub(crate) fn park_error(err: InferenceError, slot: &mut Option<InferenceError>) -> OptError {
    match err {
        InferenceError::Optimization(inner) => inner,
        other => {
            let text = other.to_string();
            *slot = Some(other);
            OptError::BackendError { text }
        }
    }
}

/// Inverse of [`park_error`]: prefer the stored error over the optimizer's.
pub(crate) fn recover_error(err: OptError, slot: &mut Option<InferenceError>) -> InferenceError {
    slot.take().unwrap_or(InferenceError::Optimization(err))
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            InferenceError::UnsupportedMinimizer { name } => write!(
                f,
                "Inference Error: Unsupported minimizer '{name}' (expected 'newton', 'lbfgs' or 'lbfgs-hagerzhang')"
            ),
            InferenceError::InvalidNewtonOption { option, value, reason } => {
                write!(f, "Inference Error: Invalid Newton option {option} = {value}: {reason}")
            }
            InferenceError::DimensionMismatch { what, expected, found } => write!(
                f,
                "Inference Error: Dimension mismatch in {what}: expected {expected}, found {found}"
            ),

            // ---- Numerics ----
            InferenceError::NonPositiveDeterminant { det } => write!(
                f,
                "Inference Error: Non-positive determinant {det} of I + K diag(W) in the indefinite branch"
            ),
            InferenceError::NonFiniteResult { what } => {
                write!(f, "Inference Error: Non-finite values in {what}")
            }

            // ---- Wrapped layers ----
            InferenceError::Optimization(err) => write!(f, "Inference Error: {err}"),
            InferenceError::Model(err) => write!(f, "Inference Error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Model errors survive a round trip through an optimizer callback;
    // optimizer errors pass through untouched.
    fn parked_errors_are_recovered() {
        let mut slot = None;
        let model = InferenceError::Model(GpError::InvalidLabel {
            index: 2,
            value: 0.5,
            reason: "Labels must be -1 or +1.",
        });

        let carried = park_error(model.clone(), &mut slot);
        assert!(matches!(carried, OptError::BackendError { .. }));
        assert_eq!(recover_error(carried, &mut slot), model);

        let opt = park_error(OptError::LineSearchUnavailable.into(), &mut slot);
        assert!(slot.is_none());
        assert_eq!(
            recover_error(opt, &mut slot),
            InferenceError::Optimization(OptError::LineSearchUnavailable)
        );
    }
}
