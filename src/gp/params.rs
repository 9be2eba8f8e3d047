//! gp::params — hyperparameter naming and the shared `Parameterized` trait.
//!
//! Purpose
//! -------
//! Give every tunable quantity a stable key so the Laplace gradient engine
//! can dispatch on it without runtime type checks. A key is a
//! [`ParamGroup`] (which collaborator owns the parameter) plus the name the
//! collaborator registers it under. Vector-valued hyperparameters (ARD
//! length-scales, linear-mean weights) are addressed element-wise by index.
//!
//! Key behaviors
//! -------------
//! - [`Parameterized`] lets a collaborator list, read and overwrite its
//!   hyperparameters by name, reporting unknown names as
//!   [`GpError::UnknownHyperparameter`].
//! - [`check_index`] / [`validate_values`] centralize the index and value
//!   checks used by every implementation.
//!
//! Conventions
//! -----------
//! - Positive quantities are stored on the log scale (`log_sigma`,
//!   `log_ell`, `log_df`, …) and derivatives are taken with respect to the
//!   stored value.
use crate::gp::errors::{GpError, GpResult};
use ndarray::{Array1, ArrayView1};

/// Owner of a hyperparameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamGroup {
    Kernel,
    Likelihood,
    Mean,
    /// Parameters owned by the inference object itself (`log_scale`).
    Inference,
}

impl std::fmt::Display for ParamGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParamGroup::Kernel => "kernel",
            ParamGroup::Likelihood => "likelihood",
            ParamGroup::Mean => "mean",
            ParamGroup::Inference => "inference",
        };
        f.write_str(s)
    }
}

/// Key of one (possibly vector-valued) hyperparameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hyperparameter {
    pub group: ParamGroup,
    pub name: String,
}

impl Hyperparameter {
    pub fn new(group: ParamGroup, name: impl Into<String>) -> Self {
        Self { group, name: name.into() }
    }

    pub fn kernel(name: impl Into<String>) -> Self {
        Self::new(ParamGroup::Kernel, name)
    }

    pub fn likelihood(name: impl Into<String>) -> Self {
        Self::new(ParamGroup::Likelihood, name)
    }

    pub fn mean(name: impl Into<String>) -> Self {
        Self::new(ParamGroup::Mean, name)
    }

    /// The amplitude `log_scale` of the inference object.
    pub fn log_scale() -> Self {
        Self::new(ParamGroup::Inference, LOG_SCALE)
    }
}

impl std::fmt::Display for Hyperparameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}

/// Name of the amplitude hyperparameter owned by the inference object.
pub const LOG_SCALE: &str = "log_scale";

/// Name and length of a registered hyperparameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub len: usize,
}

/// Named access to a collaborator's hyperparameters.
pub trait Parameterized {
    /// Short component label used in error messages.
    fn component_name(&self) -> &'static str;

    /// Every registered hyperparameter, in a stable order.
    fn hyperparameters(&self) -> Vec<ParamSpec>;

    /// Current value(s) of `name`.
    fn hyperparameter(&self, name: &str) -> GpResult<Array1<f64>>;

    /// Overwrite `name` with `values`; length and finiteness are checked.
    fn set_hyperparameter(&mut self, name: &str, values: ArrayView1<'_, f64>) -> GpResult<()>;

    /// Length of `name`, or [`GpError::UnknownHyperparameter`].
    fn hyperparameter_len(&self, name: &str) -> GpResult<usize> {
        self.hyperparameters()
            .into_iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.len)
            .ok_or_else(|| self.unknown(name))
    }

    /// Build the error for an unrecognized name.
    fn unknown(&self, name: &str) -> GpError {
        GpError::UnknownHyperparameter { component: self.component_name(), name: name.to_string() }
    }
}

/// Check that `index` addresses an element of a length-`len` hyperparameter.
///
/// # Errors
/// [`GpError::HyperparameterIndexOutOfRange`].
pub fn check_index(name: &str, index: usize, len: usize) -> GpResult<()> {
    if index >= len {
        return Err(GpError::HyperparameterIndexOutOfRange { name: name.to_string(), index, len });
    }
    Ok(())
}

/// Check a replacement value vector for length and finiteness.
///
/// # Errors
/// - [`GpError::HyperparameterLengthMismatch`] on a length mismatch.
/// - [`GpError::InvalidHyperparameterValue`] on a non-finite entry.
pub fn validate_values(name: &str, values: ArrayView1<'_, f64>, expected: usize) -> GpResult<()> {
    if values.len() != expected {
        return Err(GpError::HyperparameterLengthMismatch {
            name: name.to_string(),
            expected,
            found: values.len(),
        });
    }
    if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
        return Err(GpError::InvalidHyperparameterValue {
            name: name.to_string(),
            value,
            reason: "Hyperparameter values must be finite.",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Keys render as `group.name` and the helpers reject bad indices and
    // malformed values.
    fn keys_display_and_helpers_validate() {
        assert_eq!(Hyperparameter::kernel("log_ell").to_string(), "kernel.log_ell");
        assert_eq!(Hyperparameter::log_scale().to_string(), "inference.log_scale");

        assert!(check_index("w", 1, 2).is_ok());
        assert!(matches!(
            check_index("w", 2, 2),
            Err(GpError::HyperparameterIndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            validate_values("w", array![1.0].view(), 2),
            Err(GpError::HyperparameterLengthMismatch { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            validate_values("w", array![f64::NAN].view(), 1),
            Err(GpError::InvalidHyperparameterValue { .. })
        ));
    }
}
