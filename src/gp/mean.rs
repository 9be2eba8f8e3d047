//! gp::mean — prior mean functions.
use crate::gp::{
    errors::{GpError, GpResult},
    params::{ParamSpec, Parameterized, check_index, validate_values},
};
use ndarray::{Array1, ArrayView1, ArrayView2, array};

/// Prior mean consumed by the Laplace core.
pub trait MeanFunctionProvider: Parameterized + std::fmt::Debug {
    /// `m(x_i)` for every row of `features`.
    fn mean_vector(&self, features: ArrayView2<'_, f64>) -> GpResult<Array1<f64>>;

    /// `∂m/∂θ` for element `index` of hyperparameter `name`.
    fn parameter_derivative(
        &self, features: ArrayView2<'_, f64>, name: &str, index: usize,
    ) -> GpResult<Array1<f64>>;
}

/// `m(x) = 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZeroMean;

impl Parameterized for ZeroMean {
    fn component_name(&self) -> &'static str {
        "ZeroMean"
    }

    fn hyperparameters(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    fn hyperparameter(&self, name: &str) -> GpResult<Array1<f64>> {
        Err(self.unknown(name))
    }

    fn set_hyperparameter(&mut self, name: &str, _values: ArrayView1<'_, f64>) -> GpResult<()> {
        Err(self.unknown(name))
    }
}

impl MeanFunctionProvider for ZeroMean {
    fn mean_vector(&self, features: ArrayView2<'_, f64>) -> GpResult<Array1<f64>> {
        Ok(Array1::zeros(features.nrows()))
    }

    fn parameter_derivative(
        &self, _features: ArrayView2<'_, f64>, name: &str, _index: usize,
    ) -> GpResult<Array1<f64>> {
        Err(self.unknown(name))
    }
}

/// `m(x) = bias`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantMean {
    bias: f64,
}

impl ConstantMean {
    pub const BIAS: &'static str = "bias";

    pub fn new(bias: f64) -> Self {
        Self { bias }
    }
}

impl Parameterized for ConstantMean {
    fn component_name(&self) -> &'static str {
        "ConstantMean"
    }

    fn hyperparameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec { name: Self::BIAS, len: 1 }]
    }

    fn hyperparameter(&self, name: &str) -> GpResult<Array1<f64>> {
        match name {
            Self::BIAS => Ok(array![self.bias]),
            _ => Err(self.unknown(name)),
        }
    }

    fn set_hyperparameter(&mut self, name: &str, values: ArrayView1<'_, f64>) -> GpResult<()> {
        match name {
            Self::BIAS => {
                validate_values(name, values, 1)?;
                self.bias = values[0];
                Ok(())
            }
            _ => Err(self.unknown(name)),
        }
    }
}

impl MeanFunctionProvider for ConstantMean {
    fn mean_vector(&self, features: ArrayView2<'_, f64>) -> GpResult<Array1<f64>> {
        Ok(Array1::from_elem(features.nrows(), self.bias))
    }

    fn parameter_derivative(
        &self, features: ArrayView2<'_, f64>, name: &str, index: usize,
    ) -> GpResult<Array1<f64>> {
        check_index(name, index, self.hyperparameter_len(name)?)?;
        Ok(Array1::ones(features.nrows()))
    }
}

/// `m(x) = wᵀx + bias`; hyperparameters `weights` (length `d`) and `bias`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearMean {
    weights: Array1<f64>,
    bias: f64,
}

impl LinearMean {
    pub const WEIGHTS: &'static str = "weights";
    pub const BIAS: &'static str = "bias";

    pub fn new(weights: Array1<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    fn check_features(&self, features: ArrayView2<'_, f64>) -> GpResult<()> {
        if features.ncols() != self.weights.len() {
            return Err(GpError::DimensionMismatch {
                what: "feature columns vs linear-mean weights",
                expected: self.weights.len(),
                found: features.ncols(),
            });
        }
        Ok(())
    }
}

impl Parameterized for LinearMean {
    fn component_name(&self) -> &'static str {
        "LinearMean"
    }

    fn hyperparameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec { name: Self::WEIGHTS, len: self.weights.len() },
            ParamSpec { name: Self::BIAS, len: 1 },
        ]
    }

    fn hyperparameter(&self, name: &str) -> GpResult<Array1<f64>> {
        match name {
            Self::WEIGHTS => Ok(self.weights.clone()),
            Self::BIAS => Ok(array![self.bias]),
            _ => Err(self.unknown(name)),
        }
    }

    fn set_hyperparameter(&mut self, name: &str, values: ArrayView1<'_, f64>) -> GpResult<()> {
        match name {
            Self::WEIGHTS => {
                validate_values(name, values, self.weights.len())?;
                self.weights.assign(&values);
            }
            Self::BIAS => {
                validate_values(name, values, 1)?;
                self.bias = values[0];
            }
            _ => return Err(self.unknown(name)),
        }
        Ok(())
    }
}

impl MeanFunctionProvider for LinearMean {
    fn mean_vector(&self, features: ArrayView2<'_, f64>) -> GpResult<Array1<f64>> {
        self.check_features(features)?;
        Ok(features.dot(&self.weights) + self.bias)
    }

    fn parameter_derivative(
        &self, features: ArrayView2<'_, f64>, name: &str, index: usize,
    ) -> GpResult<Array1<f64>> {
        check_index(name, index, self.hyperparameter_len(name)?)?;
        self.check_features(features)?;
        match name {
            Self::WEIGHTS => Ok(features.column(index).to_owned()),
            _ => Ok(Array1::ones(features.nrows())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Mean vectors and derivatives match the closed forms.
    //
    // Given
    // -----
    // - X = [[1, 2], [−1, 0.5], [0, 3]], w = (0.5, −1), bias 2.
    //
    // Expect
    // ------
    // - m = Xw + 2, ∂m/∂w₁ = X[:, 1], ∂m/∂bias = 1.
    fn linear_mean_values_and_derivatives() {
        let x = array![[1.0, 2.0], [-1.0, 0.5], [0.0, 3.0]];
        let mean = LinearMean::new(array![0.5, -1.0], 2.0);

        assert_eq!(mean.mean_vector(x.view()).unwrap(), array![0.5, 1.0, -1.0]);
        assert_eq!(mean.parameter_derivative(x.view(), "weights", 1).unwrap(), array![2.0, 0.5, 3.0]);
        assert_eq!(mean.parameter_derivative(x.view(), "bias", 0).unwrap(), array![1.0, 1.0, 1.0]);
    }

    #[test]
    // Purpose
    // -------
    // Constant and zero means behave as documented and reject unknown
    // names and bad indices.
    fn constant_and_zero_means() {
        let x = array![[1.0], [2.0]];
        let mut c = ConstantMean::new(0.3);
        c.set_hyperparameter("bias", array![-1.0].view()).unwrap();

        assert_eq!(c.mean_vector(x.view()).unwrap(), array![-1.0, -1.0]);
        assert!(matches!(
            c.parameter_derivative(x.view(), "bias", 1),
            Err(GpError::HyperparameterIndexOutOfRange { .. })
        ));
        assert_eq!(ZeroMean.mean_vector(x.view()).unwrap(), array![0.0, 0.0]);
        assert!(matches!(
            ZeroMean.parameter_derivative(x.view(), "bias", 0),
            Err(GpError::UnknownHyperparameter { .. })
        ));
    }
}
