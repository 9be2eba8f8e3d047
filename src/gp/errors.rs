//! Error handling for the GP collaborator layer (kernels, likelihoods,
//! mean functions and their hyperparameters).

/// Result alias for collaborator operations.
pub type GpResult<T> = Result<T, GpError>;

#[derive(Debug, Clone, PartialEq)]
pub enum GpError {
    // ---- Hyperparameters ----
    /// No hyperparameter with this name is registered by the component.
    UnknownHyperparameter {
        component: &'static str,
        name: String,
    },
    /// Element index past the end of a vector hyperparameter.
    HyperparameterIndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
    /// Value vector length does not match the hyperparameter length.
    HyperparameterLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// Hyperparameter values must be finite.
    InvalidHyperparameterValue {
        name: String,
        value: f64,
        reason: &'static str,
    },

    // ---- Data ----
    /// Labels and latent values (or features) have different lengths.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A label lies outside the likelihood's support.
    InvalidLabel {
        index: usize,
        value: f64,
        reason: &'static str,
    },
}

impl std::error::Error for GpError {}

impl std::fmt::Display for GpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Hyperparameters ----
            GpError::UnknownHyperparameter { component, name } => {
                write!(f, "Unknown hyperparameter '{name}' for {component}")
            }
            GpError::HyperparameterIndexOutOfRange { name, index, len } => {
                write!(f, "Index {index} out of range for hyperparameter '{name}' of length {len}")
            }
            GpError::HyperparameterLengthMismatch { name, expected, found } => {
                write!(
                    f,
                    "Hyperparameter '{name}' length mismatch: expected {expected}, found {found}"
                )
            }
            GpError::InvalidHyperparameterValue { name, value, reason } => {
                write!(f, "Invalid value {value} for hyperparameter '{name}': {reason}")
            }

            // ---- Data ----
            GpError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch in {what}: expected {expected}, found {found}")
            }
            GpError::InvalidLabel { index, value, reason } => {
                write!(f, "Invalid label at index {index}: {value}: {reason}")
            }
        }
    }
}
