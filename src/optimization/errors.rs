use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- MinimizerOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- Line search ----
    /// Step interval must be finite with `lower < upper`.
    InvalidStepInterval {
        lower: f64,
        upper: f64,
    },
    /// Line-search evaluation budget must be positive.
    InvalidMaxEvals {
        max_evals: usize,
    },
    /// No bounded 1-D minimizer is available to the Newton driver.
    LineSearchUnavailable,

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },
    /// Variable vector length does not match the cost function dimension.
    VariableDimMismatch {
        expected: usize,
        found: usize,
    },

    // ---- Minimizer outcome ----
    /// The best variable reported by a minimizer must be finite.
    NonFiniteVariable {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Variable hat is missing
    MissingBestVariable,

    // ---- Factorizations ----
    /// Dense factorization could not be computed (not PD, or singular).
    FactorizationFailed {
        matrix: &'static str,
        reason: &'static str,
    },
    /// Matrix is not square or does not match the right-hand side.
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    // ---- Argmin ----
    /// An `ArgminError` raised by the solver itself; `kind` names the
    /// argmin variant.
    Argmin {
        kind: &'static str,
        text: String,
    },
    /// Any other error surfaced through argmin, including errors parked by
    /// a cost function that does not speak `OptError`.
    BackendError {
        text: String,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- MinimizerOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }

            // ---- Line search ----
            OptError::InvalidStepInterval { lower, upper } => {
                write!(f, "Invalid step interval [{lower}, {upper}]: bounds must be finite and ordered")
            }
            OptError::InvalidMaxEvals { max_evals } => {
                write!(f, "Invalid line-search evaluation budget {max_evals}: must be positive")
            }
            OptError::LineSearchUnavailable => {
                write!(f, "Line search unavailable: Newton mode-finding needs a bounded 1-D minimizer")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::VariableDimMismatch { expected, found } => {
                write!(f, "Variable dimension mismatch: expected {expected}, found {found}")
            }

            // ---- Minimizer outcome ----
            OptError::NonFiniteVariable { index, value, reason } => {
                write!(f, "Non-finite variable at index {index}: {value}: {reason}")
            }
            OptError::MissingBestVariable => {
                write!(f, "Missing estimated parameters (x hat)")
            }

            // ---- Factorizations ----
            OptError::FactorizationFailed { matrix, reason } => {
                write!(f, "Factorization of {matrix} failed: {reason}")
            }
            OptError::ShapeMismatch { expected, found } => {
                write!(f, "Shape mismatch: expected {expected:?}, found {found:?}")
            }

            // ---- Argmin ----
            OptError::Argmin { kind, text } => write!(f, "Argmin {kind}: {text}"),
            OptError::BackendError { text } => write!(f, "Backend error: {text}"),
        }
    }
}

/// Recover crate errors that travelled through argmin unchanged; classify
/// argmin's own errors by kind; keep anything else as text.
impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                let kind = match &argmin_err {
                    ArgminError::InvalidParameter { .. } => "invalid parameter",
                    ArgminError::NotImplemented { .. } => "not implemented",
                    ArgminError::NotInitialized { .. } => "not initialized",
                    ArgminError::ConditionViolated { .. } => "condition violated",
                    ArgminError::CheckpointNotFound { .. } => "checkpoint not found",
                    ArgminError::PotentialBug { .. } => "potential bug",
                    ArgminError::ImpossibleError { .. } => "impossible error",
                    _ => "error",
                };
                OptError::Argmin { kind, text: argmin_err.to_string() }
            }
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Our own errors routed through argmin's `Error` must come back intact
    // rather than being flattened into `BackendError`.
    //
    // Given
    // -----
    // - An `OptError::NonFiniteCost` converted into `argmin::core::Error`.
    //
    // Expect
    // ------
    // - Converting back yields the identical variant and payload.
    fn from_argmin_error_recovers_crate_errors() {
        // Arrange
        let original = OptError::NonFiniteCost { value: f64::INFINITY };
        let wrapped: Error = original.clone().into();

        // Act
        let recovered = OptError::from(wrapped);

        // Assert
        assert_eq!(recovered, original);
    }

    #[test]
    // Purpose
    // -------
    // Argmin's own error kinds are classified rather than flattened.
    //
    // Given
    // -----
    // - An `ArgminError::InvalidParameter` wrapped into `Error`.
    //
    // Expect
    // ------
    // - `OptError::Argmin` with kind "invalid parameter" and the message
    //   text preserved.
    fn from_argmin_error_maps_argmin_kinds() {
        // Arrange
        let wrapped: Error = ArgminError::InvalidParameter { text: "bad".to_string() }.into();

        // Act
        let mapped = OptError::from(wrapped);

        // Assert
        match mapped {
            OptError::Argmin { kind, text } => {
                assert_eq!(kind, "invalid parameter");
                assert!(text.contains("bad"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
