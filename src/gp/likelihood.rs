//! gp::likelihood — observation models `p(y | f)` and their derivatives.
//!
//! Purpose
//! -------
//! Define [`LikelihoodModel`], the interface the Laplace core uses to obtain
//! per-point log-probabilities and their derivatives with respect to the
//! latent values `f` and to the likelihood's own hyperparameters, and ship
//! three implementations:
//!
//! - [`GaussianLikelihood`]: log-concave, closed-form reference case.
//! - [`StudentsTLikelihood`]: heavy-tailed and **not** log-concave, so the
//!   curvature `W = −∂²lp/∂f²` can be negative (indefinite branch).
//! - [`LogitLikelihood`]: binary classification with labels in `{−1, +1}`.
//!
//! Conventions
//! -----------
//! - All methods are element-wise over `(y, f)` and return one value per
//!   training point.
//! - Hyperparameter derivatives follow the Laplace gradient engine's needs:
//!   `first_derivative` = ∂lp/∂θ, `second_derivative` = ∂(∂lp/∂f)/∂θ,
//!   `third_derivative` = ∂(∂²lp/∂f²)/∂θ.
//! - Positive parameters are stored on the log scale and differentiated
//!   with respect to that stored value.
use crate::{
    gp::{
        errors::{GpError, GpResult},
        params::{ParamSpec, Parameterized, validate_values},
    },
    optimization::numerical_stability::{safe_logistic, safe_softplus},
};
use ndarray::{Array1, ArrayView1, Zip, array};
use statrs::function::gamma::{digamma, ln_gamma};
use std::f64::consts::PI;

/// Order of a derivative with respect to the latent values `f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeOrder {
    First,
    Second,
    Third,
}

/// Observation model consumed by the Laplace core.
pub trait LikelihoodModel: Parameterized + std::fmt::Debug {
    /// `log p(y_i | f_i)` for every point.
    fn log_probability(&self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>)
    -> GpResult<Array1<f64>>;

    /// `∂ᵏ log p(y_i | f_i) / ∂f_iᵏ` for `k ∈ {1, 2, 3}`.
    fn log_probability_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, order: DerivativeOrder,
    ) -> GpResult<Array1<f64>>;

    /// `∂ log p / ∂θ` for the hyperparameter `name`.
    fn first_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>>;

    /// `∂(∂ log p / ∂f) / ∂θ`.
    fn second_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>>;

    /// `∂(∂² log p / ∂f²) / ∂θ`.
    fn third_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>>;

    /// Degrees of freedom of a heavy-tailed model; scales the curvature
    /// regularization applied when `W` is indefinite.
    fn degrees_of_freedom(&self) -> Option<f64> {
        None
    }

    /// Check that every label lies in the model's support.
    fn validate_labels(&self, _y: ArrayView1<'_, f64>) -> GpResult<()> {
        Ok(())
    }
}

fn check_lengths(y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>) -> GpResult<()> {
    if y.len() != f.len() {
        return Err(GpError::DimensionMismatch {
            what: "labels vs latent values",
            expected: y.len(),
            found: f.len(),
        });
    }
    Ok(())
}

fn elementwise<F>(y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, op: F) -> GpResult<Array1<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    check_lengths(y, f)?;
    Ok(Zip::from(&y).and(&f).map_collect(|&yi, &fi| op(yi, fi)))
}

fn scalar_param(name: &str, values: ArrayView1<'_, f64>) -> GpResult<f64> {
    validate_values(name, values, 1)?;
    Ok(values[0])
}

fn positive_log(name: &'static str, value: f64) -> GpResult<f64> {
    if !(value.is_finite() && value > 0.0) {
        return Err(GpError::InvalidHyperparameterValue {
            name: name.to_string(),
            value,
            reason: "Value must be finite and positive.",
        });
    }
    Ok(value.ln())
}

// ---- Gaussian ----

/// Gaussian noise, `y = f + ε`, `ε ~ N(0, σ²)`; hyperparameter `log_sigma`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianLikelihood {
    log_sigma: f64,
}

impl GaussianLikelihood {
    pub const LOG_SIGMA: &'static str = "log_sigma";

    /// # Errors
    /// [`GpError::InvalidHyperparameterValue`] unless `sigma` is finite and positive.
    pub fn new(sigma: f64) -> GpResult<Self> {
        Ok(Self { log_sigma: positive_log(Self::LOG_SIGMA, sigma)? })
    }

    pub fn sigma(&self) -> f64 {
        self.log_sigma.exp()
    }
}

impl Parameterized for GaussianLikelihood {
    fn component_name(&self) -> &'static str {
        "GaussianLikelihood"
    }

    fn hyperparameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec { name: Self::LOG_SIGMA, len: 1 }]
    }

    fn hyperparameter(&self, name: &str) -> GpResult<Array1<f64>> {
        match name {
            Self::LOG_SIGMA => Ok(array![self.log_sigma]),
            _ => Err(self.unknown(name)),
        }
    }

    fn set_hyperparameter(&mut self, name: &str, values: ArrayView1<'_, f64>) -> GpResult<()> {
        match name {
            Self::LOG_SIGMA => {
                self.log_sigma = scalar_param(name, values)?;
                Ok(())
            }
            _ => Err(self.unknown(name)),
        }
    }
}

impl LikelihoodModel for GaussianLikelihood {
    fn log_probability(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>,
    ) -> GpResult<Array1<f64>> {
        let s2 = (2.0 * self.log_sigma).exp();
        let norm = -0.5 * (2.0 * PI).ln() - self.log_sigma;
        elementwise(y, f, |yi, fi| norm - (yi - fi).powi(2) / (2.0 * s2))
    }

    fn log_probability_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, order: DerivativeOrder,
    ) -> GpResult<Array1<f64>> {
        let s2 = (2.0 * self.log_sigma).exp();
        match order {
            DerivativeOrder::First => elementwise(y, f, |yi, fi| (yi - fi) / s2),
            DerivativeOrder::Second => elementwise(y, f, |_, _| -1.0 / s2),
            DerivativeOrder::Third => elementwise(y, f, |_, _| 0.0),
        }
    }

    fn first_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>> {
        self.hyperparameter_len(name)?;
        let s2 = (2.0 * self.log_sigma).exp();
        elementwise(y, f, |yi, fi| (yi - fi).powi(2) / s2 - 1.0)
    }

    fn second_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>> {
        self.hyperparameter_len(name)?;
        let s2 = (2.0 * self.log_sigma).exp();
        elementwise(y, f, |yi, fi| -2.0 * (yi - fi) / s2)
    }

    fn third_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>> {
        self.hyperparameter_len(name)?;
        let s2 = (2.0 * self.log_sigma).exp();
        elementwise(y, f, |_, _| 2.0 / s2)
    }
}

// ---- Student's t ----

/// Student's t noise with scale `σ` and `ν` degrees of freedom;
/// hyperparameters `log_sigma` and `log_df`.
///
/// With `r = y − f`, `s² = σ²` and `a = ν s² + r²`:
///
/// ```text
/// log p = lnΓ((ν+1)/2) − lnΓ(ν/2) − ½ ln(ν π s²) − (ν+1)/2 · ln(a / (ν s²))
/// ∂/∂f   = (ν+1) r / a
/// ∂²/∂f² = (ν+1)(r² − ν s²) / a²
/// ∂³/∂f³ = 2(ν+1) r (r² − 3ν s²) / a³
/// ```
///
/// `∂²/∂f²` is positive for `|r| > σ√ν`, which makes the model non
/// log-concave.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentsTLikelihood {
    log_sigma: f64,
    log_df: f64,
}

impl StudentsTLikelihood {
    pub const LOG_SIGMA: &'static str = "log_sigma";
    pub const LOG_DF: &'static str = "log_df";

    /// # Errors
    /// [`GpError::InvalidHyperparameterValue`] unless both values are
    /// finite and positive.
    pub fn new(sigma: f64, df: f64) -> GpResult<Self> {
        Ok(Self {
            log_sigma: positive_log(Self::LOG_SIGMA, sigma)?,
            log_df: positive_log(Self::LOG_DF, df)?,
        })
    }

    pub fn sigma(&self) -> f64 {
        self.log_sigma.exp()
    }

    pub fn df(&self) -> f64 {
        self.log_df.exp()
    }

    fn nu_s2(&self) -> (f64, f64) {
        (self.log_df.exp(), (2.0 * self.log_sigma).exp())
    }
}

impl Parameterized for StudentsTLikelihood {
    fn component_name(&self) -> &'static str {
        "StudentsTLikelihood"
    }

    fn hyperparameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec { name: Self::LOG_SIGMA, len: 1 }, ParamSpec { name: Self::LOG_DF, len: 1 }]
    }

    fn hyperparameter(&self, name: &str) -> GpResult<Array1<f64>> {
        match name {
            Self::LOG_SIGMA => Ok(array![self.log_sigma]),
            Self::LOG_DF => Ok(array![self.log_df]),
            _ => Err(self.unknown(name)),
        }
    }

    fn set_hyperparameter(&mut self, name: &str, values: ArrayView1<'_, f64>) -> GpResult<()> {
        match name {
            Self::LOG_SIGMA => self.log_sigma = scalar_param(name, values)?,
            Self::LOG_DF => self.log_df = scalar_param(name, values)?,
            _ => return Err(self.unknown(name)),
        }
        Ok(())
    }
}

impl LikelihoodModel for StudentsTLikelihood {
    fn log_probability(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>,
    ) -> GpResult<Array1<f64>> {
        let (nu, s2) = self.nu_s2();
        let norm = ln_gamma((nu + 1.0) / 2.0) - ln_gamma(nu / 2.0) - 0.5 * (nu * PI * s2).ln();
        elementwise(y, f, |yi, fi| {
            let r = yi - fi;
            norm - (nu + 1.0) / 2.0 * (r * r / (nu * s2)).ln_1p()
        })
    }

    fn log_probability_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, order: DerivativeOrder,
    ) -> GpResult<Array1<f64>> {
        let (nu, s2) = self.nu_s2();
        let vs = nu * s2;
        match order {
            DerivativeOrder::First => elementwise(y, f, |yi, fi| {
                let r = yi - fi;
                (nu + 1.0) * r / (vs + r * r)
            }),
            DerivativeOrder::Second => elementwise(y, f, |yi, fi| {
                let r2 = (yi - fi).powi(2);
                (nu + 1.0) * (r2 - vs) / (vs + r2).powi(2)
            }),
            DerivativeOrder::Third => elementwise(y, f, |yi, fi| {
                let r = yi - fi;
                let r2 = r * r;
                2.0 * (nu + 1.0) * r * (r2 - 3.0 * vs) / (vs + r2).powi(3)
            }),
        }
    }

    fn first_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>> {
        let (nu, s2) = self.nu_s2();
        let vs = nu * s2;
        match name {
            Self::LOG_SIGMA => elementwise(y, f, |yi, fi| {
                let r2 = (yi - fi).powi(2);
                (nu + 1.0) * r2 / (vs + r2) - 1.0
            }),
            Self::LOG_DF => {
                let base = 0.5 * digamma((nu + 1.0) / 2.0) - 0.5 * digamma(nu / 2.0) - 0.5 / nu;
                elementwise(y, f, |yi, fi| {
                    let r2 = (yi - fi).powi(2);
                    let a = vs + r2;
                    let d_nu = base - 0.5 * (r2 / vs).ln_1p() + (nu + 1.0) * r2 / (2.0 * nu * a);
                    nu * d_nu
                })
            }
            _ => Err(self.unknown(name)),
        }
    }

    fn second_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>> {
        let (nu, s2) = self.nu_s2();
        let vs = nu * s2;
        match name {
            Self::LOG_SIGMA => elementwise(y, f, |yi, fi| {
                let r = yi - fi;
                let a = vs + r * r;
                -2.0 * (nu + 1.0) * vs * r / (a * a)
            }),
            Self::LOG_DF => elementwise(y, f, |yi, fi| {
                let r = yi - fi;
                let a = vs + r * r;
                nu * r * (r * r - s2) / (a * a)
            }),
            _ => Err(self.unknown(name)),
        }
    }

    fn third_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>> {
        let (nu, s2) = self.nu_s2();
        let vs = nu * s2;
        match name {
            Self::LOG_SIGMA => elementwise(y, f, |yi, fi| {
                let r2 = (yi - fi).powi(2);
                let a = vs + r2;
                -2.0 * (nu + 1.0) * vs * (3.0 * r2 - vs) / a.powi(3)
            }),
            Self::LOG_DF => elementwise(y, f, |yi, fi| {
                let r2 = (yi - fi).powi(2);
                let a = vs + r2;
                let num = (r2 - (2.0 * nu + 1.0) * s2) * a - 2.0 * s2 * (nu + 1.0) * (r2 - vs);
                nu * num / a.powi(3)
            }),
            _ => Err(self.unknown(name)),
        }
    }

    fn degrees_of_freedom(&self) -> Option<f64> {
        Some(self.df())
    }
}

// ---- Logit ----

/// Logistic link for binary labels `y ∈ {−1, +1}`:
/// `log p(y | f) = −softplus(−y f)`. No hyperparameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogitLikelihood;

impl LogitLikelihood {
    pub fn new() -> Self {
        Self
    }
}

impl Parameterized for LogitLikelihood {
    fn component_name(&self) -> &'static str {
        "LogitLikelihood"
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

impl LikelihoodModel for LogitLikelihood {
    fn log_probability(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>,
    ) -> GpResult<Array1<f64>> {
        elementwise(y, f, |yi, fi| -safe_softplus(-yi * fi))
    }

    fn log_probability_derivative(
        &self, y: ArrayView1<'_, f64>, f: ArrayView1<'_, f64>, order: DerivativeOrder,
    ) -> GpResult<Array1<f64>> {
        match order {
            DerivativeOrder::First => {
                elementwise(y, f, |yi, fi| (yi + 1.0) / 2.0 - safe_logistic(fi))
            }
            DerivativeOrder::Second => elementwise(y, f, |_, fi| {
                let p = safe_logistic(fi);
                -p * (1.0 - p)
            }),
            DerivativeOrder::Third => elementwise(y, f, |_, fi| {
                let p = safe_logistic(fi);
                -p * (1.0 - p) * (1.0 - 2.0 * p)
            }),
        }
    }

    fn first_derivative(
        &self, _y: ArrayView1<'_, f64>, _f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>> {
        Err(self.unknown(name))
    }

    fn second_derivative(
        &self, _y: ArrayView1<'_, f64>, _f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>> {
        Err(self.unknown(name))
    }

    fn third_derivative(
        &self, _y: ArrayView1<'_, f64>, _f: ArrayView1<'_, f64>, name: &str,
    ) -> GpResult<Array1<f64>> {
        Err(self.unknown(name))
    }

    fn validate_labels(&self, y: ArrayView1<'_, f64>) -> GpResult<()> {
        match y.iter().position(|&v| v != 1.0 && v != -1.0) {
            Some(index) => Err(GpError::InvalidLabel {
                index,
                value: y[index],
                reason: "Logit labels must be -1 or +1.",
            }),
            None => Ok(()),
        }
    }
}
