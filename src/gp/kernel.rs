//! gp::kernel — covariance functions and their hyperparameter gradients.
//!
//! Purpose
//! -------
//! Define [`KernelProvider`], the interface through which the Laplace core
//! obtains the training covariance `K` and `∂K/∂θ`, and provide the
//! squared-exponential kernel with automatic relevance determination.
//!
//! Conventions
//! -----------
//! - Features are an `n × d` matrix, one row per training point.
//! - The overall amplitude used by the Laplace core is
//!   `exp(2·log_sf) · exp(2·log_scale)`; the kernel owns `log_sf`, the
//!   inference object owns `log_scale`.
use crate::gp::{
    errors::{GpError, GpResult},
    params::{ParamSpec, Parameterized, check_index, validate_values},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, array};

/// Covariance function consumed by the Laplace core.
pub trait KernelProvider: Parameterized + std::fmt::Debug {
    /// Training covariance `K(X, X)`, symmetric `n × n`.
    fn covariance_matrix(&self, features: ArrayView2<'_, f64>) -> GpResult<Array2<f64>>;

    /// `∂K/∂θ` for element `index` of hyperparameter `name`.
    fn parameter_gradient(
        &self, features: ArrayView2<'_, f64>, name: &str, index: usize,
    ) -> GpResult<Array2<f64>>;
}

/// Squared-exponential (RBF) kernel with per-dimension length-scales:
///
/// ```text
/// k(x, x') = sf² · exp(−½ Σ_d (x_d − x'_d)² / ℓ_d²)
/// ```
///
/// Hyperparameters: `log_ell` (length `d`, or length 1 for an isotropic
/// kernel) and `log_sf`.
#[derive(Debug, Clone, PartialEq)]
pub struct SquaredExponentialKernel {
    log_ell: Array1<f64>,
    log_sf: f64,
}

impl SquaredExponentialKernel {
    pub const LOG_ELL: &'static str = "log_ell";
    pub const LOG_SF: &'static str = "log_sf";

    /// Build from natural-scale length-scales and signal standard deviation.
    ///
    /// # Errors
    /// [`GpError::InvalidHyperparameterValue`] for a non-positive or
    /// non-finite input, or an empty length-scale vector.
    pub fn new(lengthscales: ArrayView1<'_, f64>, sf: f64) -> GpResult<Self> {
        if lengthscales.is_empty() {
            return Err(GpError::HyperparameterLengthMismatch {
                name: Self::LOG_ELL.to_string(),
                expected: 1,
                found: 0,
            });
        }
        let check = |name: &'static str, v: f64| -> GpResult<f64> {
            if v.is_finite() && v > 0.0 {
                Ok(v.ln())
            } else {
                Err(GpError::InvalidHyperparameterValue {
                    name: name.to_string(),
                    value: v,
                    reason: "Value must be finite and positive.",
                })
            }
        };
        let log_ell =
            lengthscales.iter().map(|&l| check(Self::LOG_ELL, l)).collect::<GpResult<_>>()?;
        Ok(Self { log_ell, log_sf: check(Self::LOG_SF, sf)? })
    }

    /// Isotropic kernel with one shared length-scale.
    pub fn isotropic(lengthscale: f64, sf: f64) -> GpResult<Self> {
        Self::new(array![lengthscale].view(), sf)
    }

    /// Length-scale applied to feature dimension `d`.
    fn ell(&self, d: usize) -> f64 {
        let i = if self.log_ell.len() == 1 { 0 } else { d };
        self.log_ell[i].exp()
    }

    fn check_features(&self, features: ArrayView2<'_, f64>) -> GpResult<()> {
        let d = features.ncols();
        if self.log_ell.len() != 1 && self.log_ell.len() != d {
            return Err(GpError::DimensionMismatch {
                what: "feature columns vs ARD length-scales",
                expected: self.log_ell.len(),
                found: d,
            });
        }
        Ok(())
    }

    /// Symmetric `n × n` matrix whose `(i, j)` entry is `op(i, j)`.
    fn symmetric_fill<F>(n: usize, op: F) -> Array2<f64>
    where
        F: Fn(usize, usize) -> f64,
    {
        let mut out = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let v = op(i, j);
                out[[i, j]] = v;
                out[[j, i]] = v;
            }
        }
        out
    }

    /// Scaled squared distance `Σ_d (Δ_d / ℓ_d)²` between rows `i` and `j`.
    fn scaled_sq_dist(&self, features: ArrayView2<'_, f64>, i: usize, j: usize) -> f64 {
        let (a, b) = (features.row(i), features.row(j));
        (0..features.ncols()).map(|d| ((a[d] - b[d]) / self.ell(d)).powi(2)).sum()
    }
}

impl Parameterized for SquaredExponentialKernel {
    fn component_name(&self) -> &'static str {
        "SquaredExponentialKernel"
    }

    fn hyperparameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec { name: Self::LOG_ELL, len: self.log_ell.len() },
            ParamSpec { name: Self::LOG_SF, len: 1 },
        ]
    }

    fn hyperparameter(&self, name: &str) -> GpResult<Array1<f64>> {
        match name {
            Self::LOG_ELL => Ok(self.log_ell.clone()),
            Self::LOG_SF => Ok(array![self.log_sf]),
            _ => Err(self.unknown(name)),
        }
    }

    fn set_hyperparameter(&mut self, name: &str, values: ArrayView1<'_, f64>) -> GpResult<()> {
        match name {
            Self::LOG_ELL => {
                validate_values(name, values, self.log_ell.len())?;
                self.log_ell.assign(&values);
            }
            Self::LOG_SF => {
                validate_values(name, values, 1)?;
                self.log_sf = values[0];
            }
            _ => return Err(self.unknown(name)),
        }
        Ok(())
    }
}

impl KernelProvider for SquaredExponentialKernel {
    fn covariance_matrix(&self, features: ArrayView2<'_, f64>) -> GpResult<Array2<f64>> {
        self.check_features(features)?;
        let sf2 = (2.0 * self.log_sf).exp();
        Ok(Self::symmetric_fill(features.nrows(), |i, j| {
            sf2 * (-0.5 * self.scaled_sq_dist(features, i, j)).exp()
        }))
    }

    fn parameter_gradient(
        &self, features: ArrayView2<'_, f64>, name: &str, index: usize,
    ) -> GpResult<Array2<f64>> {
        let len = self.hyperparameter_len(name)?;
        check_index(name, index, len)?;
        let k = self.covariance_matrix(features)?;
        match name {
            Self::LOG_SF => Ok(k * 2.0),
            _ => {
                // log_ell: isotropic sums every dimension, ARD picks one.
                let dims: Vec<usize> =
                    if len == 1 { (0..features.ncols()).collect() } else { vec![index] };
                Ok(Self::symmetric_fill(features.nrows(), |i, j| {
                    let s: f64 = dims
                        .iter()
                        .map(|&d| ((features[[i, d]] - features[[j, d]]) / self.ell(d)).powi(2))
                        .sum();
                    k[[i, j]] * s
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn features() -> Array2<f64> {
        array![[0.0, 1.0], [0.5, -0.3], [1.7, 0.2], [-0.4, 0.9]]
    }

    #[test]
    // Purpose
    // -------
    // The covariance is symmetric with sf² on the diagonal and matches the
    // closed form off the diagonal.
    fn covariance_matches_closed_form() {
        let kern = SquaredExponentialKernel::new(array![0.7, 1.3].view(), 1.5).unwrap();
        let x = features();

        let k = kern.covariance_matrix(x.view()).unwrap();

        assert_relative_eq!(k[[2, 2]], 2.25, epsilon = 1e-14);
        let r2 = (0.5f64 / 0.7).powi(2) + (1.3f64 / 1.3).powi(2);
        assert_relative_eq!(k[[0, 1]], 2.25 * (-0.5 * r2).exp(), epsilon = 1e-14);
        assert_eq!(k, k.t());
    }

    #[test]
    // Purpose
    // -------
    // Analytic ∂K/∂θ matches central differences for every element of every
    // hyperparameter, ARD and isotropic.
    //
    // Given
    // -----
    // - Four 2-D points; an ARD kernel and an isotropic kernel.
    //
    // Expect
    // ------
    // - Entry-wise agreement to 1e-6.
    fn parameter_gradient_matches_finite_differences() {
        let x = features();
        let h = 1e-6;
        for kern in [
            SquaredExponentialKernel::new(array![0.7, 1.3].view(), 1.5).unwrap(),
            SquaredExponentialKernel::isotropic(0.9, 0.8).unwrap(),
        ] {
            for spec in kern.hyperparameters() {
                for index in 0..spec.len {
                    let analytic = kern.parameter_gradient(x.view(), spec.name, index).unwrap();
                    let base = kern.hyperparameter(spec.name).unwrap();
                    let eval = |delta: f64| {
                        let mut shifted = kern.clone();
                        let mut v = base.clone();
                        v[index] += delta;
                        shifted.set_hyperparameter(spec.name, v.view()).unwrap();
                        shifted.covariance_matrix(x.view()).unwrap()
                    };
                    let fd = (eval(h) - eval(-h)) / (2.0 * h);
                    for (a, b) in analytic.iter().zip(fd.iter()) {
                        assert_relative_eq!(a, b, epsilon = 1e-6);
                    }
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Misuse is reported as typed errors: unknown names, out-of-range
    // indices and feature/length-scale mismatches.
    fn misuse_is_rejected() {
        let kern = SquaredExponentialKernel::new(array![1.0, 1.0, 1.0].view(), 1.0).unwrap();
        let x = features();

        assert!(matches!(
            kern.covariance_matrix(x.view()),
            Err(GpError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            kern.parameter_gradient(x.view(), "log_sigma", 0),
            Err(GpError::UnknownHyperparameter { .. })
        ));
        assert!(matches!(
            kern.parameter_gradient(x.view(), "log_sf", 1),
            Err(GpError::HyperparameterIndexOutOfRange { .. })
        ));
    }
}
