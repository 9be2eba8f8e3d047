//! `SingleLaplaceInference`: the public face of the Laplace core.
//!
//! Purpose
//! -------
//! Own the training data, the three model collaborators and the amplitude
//! `log_scale`, and expose the quantities an outer hyperparameter optimizer
//! needs: the negative log marginal likelihood, its gradient for every
//! registered hyperparameter, and the Gaussian posterior at the mode.
//!
//! Key behaviors
//! -------------
//! - Setters only record what changed ([`DirtyFlags`]); the next accessor
//!   refreshes the covariance and mean, re-runs mode finding from a warm
//!   start and refactors the posterior.
//! - Gradient auxiliaries are computed on the first gradient request after
//!   a refresh and shared by all later requests.
//! - Mode finding is delegated to the injected [`ModeMinimizer`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `features.nrows() == labels.len()` at all times; setters that would
//!   break this are rejected.
//! - Cached results are never served while any dirty flag is set.
//! - Hyperparameter names are checked before any computation, so an unknown
//!   name never triggers a mode search.
//!
//! Conventions
//! -----------
//! - `Ks = K·exp(2·log_scale)`; `log_scale` is addressed as
//!   `Hyperparameter::log_scale()` in the `inference` group.
//! - Accessors take `&mut self` because they may refresh cached state.
use crate::{
    gp::{
        errors::GpError,
        kernel::KernelProvider,
        likelihood::LikelihoodModel,
        mean::MeanFunctionProvider,
        params::{Hyperparameter, LOG_SCALE, ParamGroup},
    },
    inference::{
        errors::{InferenceError, InferenceResult},
        laplace::{
            gradient::GradientAux,
            marginal::negative_log_marginal_likelihood,
            minimizer::{ModeMinimizer, ModeOutcome},
            posterior::PosteriorFactor,
            state::{DirtyFlags, ModeProblem, ModeState},
        },
    },
};
use ndarray::{Array1, Array2, ArrayView1, array};

const COMPONENT: &str = "SingleLaplaceInference";

/// Everything derived from one converged mode.
#[derive(Debug, Clone)]
struct Posterior {
    factor: PosteriorFactor,
    outcome: ModeOutcome,
    aux: Option<GradientAux>,
}

/// Laplace approximation for a single latent GP.
#[derive(Debug)]
pub struct SingleLaplaceInference {
    features: Array2<f64>,
    labels: Array1<f64>,
    kernel: Box<dyn KernelProvider>,
    mean: Box<dyn MeanFunctionProvider>,
    likelihood: Box<dyn LikelihoodModel>,
    log_scale: f64,
    minimizer: ModeMinimizer,

    ks: Array2<f64>,
    mean_f: Array1<f64>,
    state: ModeState,
    posterior: Option<Posterior>,
    dirty: DirtyFlags,
}

impl SingleLaplaceInference {
    /// Build an inference object; nothing is computed until first use.
    ///
    /// # Errors
    /// - [`InferenceError::DimensionMismatch`] if the feature rows and the
    ///   labels disagree.
    /// - [`GpError::InvalidLabel`] if the likelihood rejects a label.
    pub fn new(
        features: Array2<f64>, labels: Array1<f64>, kernel: Box<dyn KernelProvider>,
        mean: Box<dyn MeanFunctionProvider>, likelihood: Box<dyn LikelihoodModel>,
    ) -> InferenceResult<Self> {
        check_rows(&features, &labels)?;
        likelihood.validate_labels(labels.view())?;
        Ok(Self {
            features,
            labels,
            kernel,
            mean,
            likelihood,
            log_scale: 0.0,
            minimizer: ModeMinimizer::default(),
            ks: Array2::zeros((0, 0)),
            mean_f: Array1::zeros(0),
            state: ModeState::default(),
            posterior: None,
            dirty: DirtyFlags::all(),
        })
    }

    // ---- Data and collaborators ----

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    pub fn kernel(&self) -> &dyn KernelProvider {
        self.kernel.as_ref()
    }

    pub fn mean_function(&self) -> &dyn MeanFunctionProvider {
        self.mean.as_ref()
    }

    pub fn likelihood(&self) -> &dyn LikelihoodModel {
        self.likelihood.as_ref()
    }

    pub fn log_scale(&self) -> f64 {
        self.log_scale
    }

    /// Replace the features; the row count must match the labels.
    pub fn set_features(&mut self, features: Array2<f64>) -> InferenceResult<()> {
        check_rows(&features, &self.labels)?;
        self.features = features;
        self.dirty.data = true;
        Ok(())
    }

    /// Replace the labels; the length must match the feature rows.
    pub fn set_labels(&mut self, labels: Array1<f64>) -> InferenceResult<()> {
        check_rows(&self.features, &labels)?;
        self.likelihood.validate_labels(labels.view())?;
        self.labels = labels;
        self.dirty.data = true;
        Ok(())
    }

    /// Replace features and labels together, for a change of size.
    pub fn set_data(&mut self, features: Array2<f64>, labels: Array1<f64>) -> InferenceResult<()> {
        check_rows(&features, &labels)?;
        self.likelihood.validate_labels(labels.view())?;
        self.features = features;
        self.labels = labels;
        self.dirty.data = true;
        Ok(())
    }

    pub fn set_kernel(&mut self, kernel: Box<dyn KernelProvider>) {
        self.kernel = kernel;
        self.dirty.kernel = true;
    }

    pub fn set_mean_function(&mut self, mean: Box<dyn MeanFunctionProvider>) {
        self.mean = mean;
        self.dirty.mean = true;
    }

    /// Replace the likelihood; the current labels must lie in its support.
    pub fn set_likelihood(&mut self, likelihood: Box<dyn LikelihoodModel>) -> InferenceResult<()> {
        likelihood.validate_labels(self.labels.view())?;
        self.likelihood = likelihood;
        self.dirty.likelihood = true;
        Ok(())
    }

    pub fn set_log_scale(&mut self, log_scale: f64) -> InferenceResult<()> {
        if !log_scale.is_finite() {
            return Err(GpError::InvalidHyperparameterValue {
                name: LOG_SCALE.to_string(),
                value: log_scale,
                reason: "Value must be finite.",
            }
            .into());
        }
        self.log_scale = log_scale;
        self.dirty.kernel = true;
        Ok(())
    }

    /// Swap the mode-finding strategy. The next accessor re-runs mode
    /// finding with it, warm-started from the current `alpha`.
    pub fn set_minimizer(&mut self, minimizer: ModeMinimizer) {
        self.minimizer = minimizer;
        self.posterior = None;
    }

    /// Select the strategy by name (`"newton"`, `"lbfgs"`,
    /// `"lbfgs-hagerzhang"`).
    ///
    /// # Errors
    /// [`InferenceError::UnsupportedMinimizer`] for any other name.
    pub fn set_minimizer_by_name(&mut self, name: &str) -> InferenceResult<()> {
        self.set_minimizer(name.parse()?);
        Ok(())
    }

    pub fn minimizer(&self) -> &ModeMinimizer {
        &self.minimizer
    }

    // ---- Hyperparameters ----

    /// Every registered hyperparameter: `log_scale`, then the kernel,
    /// likelihood and mean parameters in their declaration order.
    pub fn hyperparameters(&self) -> Vec<Hyperparameter> {
        let mut params = vec![Hyperparameter::log_scale()];
        params.extend(self.kernel.hyperparameters().into_iter().map(|s| Hyperparameter::kernel(s.name)));
        params.extend(
            self.likelihood.hyperparameters().into_iter().map(|s| Hyperparameter::likelihood(s.name)),
        );
        params.extend(self.mean.hyperparameters().into_iter().map(|s| Hyperparameter::mean(s.name)));
        params
    }

    /// Number of elements of `param`.
    ///
    /// # Errors
    /// [`GpError::UnknownHyperparameter`] for a name the addressed
    /// component does not register.
    pub fn hyperparameter_len(&self, param: &Hyperparameter) -> InferenceResult<usize> {
        let len = match param.group {
            ParamGroup::Kernel => self.kernel.hyperparameter_len(&param.name)?,
            ParamGroup::Likelihood => self.likelihood.hyperparameter_len(&param.name)?,
            ParamGroup::Mean => self.mean.hyperparameter_len(&param.name)?,
            ParamGroup::Inference if param.name == LOG_SCALE => 1,
            ParamGroup::Inference => return Err(unknown_inference_parameter(param).into()),
        };
        Ok(len)
    }

    pub fn hyperparameter(&self, param: &Hyperparameter) -> InferenceResult<Array1<f64>> {
        let values = match param.group {
            ParamGroup::Kernel => self.kernel.hyperparameter(&param.name)?,
            ParamGroup::Likelihood => self.likelihood.hyperparameter(&param.name)?,
            ParamGroup::Mean => self.mean.hyperparameter(&param.name)?,
            ParamGroup::Inference if param.name == LOG_SCALE => array![self.log_scale],
            ParamGroup::Inference => return Err(unknown_inference_parameter(param).into()),
        };
        Ok(values)
    }

    /// Set `param` and mark its group stale.
    pub fn set_hyperparameter(
        &mut self, param: &Hyperparameter, values: ArrayView1<'_, f64>,
    ) -> InferenceResult<()> {
        match param.group {
            ParamGroup::Kernel => {
                self.kernel.set_hyperparameter(&param.name, values)?;
                self.dirty.kernel = true;
            }
            ParamGroup::Likelihood => {
                self.likelihood.set_hyperparameter(&param.name, values)?;
                self.dirty.likelihood = true;
            }
            ParamGroup::Mean => {
                self.mean.set_hyperparameter(&param.name, values)?;
                self.dirty.mean = true;
            }
            ParamGroup::Inference if param.name == LOG_SCALE => {
                if values.len() != 1 {
                    return Err(GpError::HyperparameterLengthMismatch {
                        name: LOG_SCALE.to_string(),
                        expected: 1,
                        found: values.len(),
                    }
                    .into());
                }
                self.set_log_scale(values[0])?;
            }
            ParamGroup::Inference => return Err(unknown_inference_parameter(param).into()),
        }
        Ok(())
    }

    // ---- Update cycle ----

    /// Recompute everything now: covariance and mean, mode, factorization.
    /// Gradient auxiliaries are dropped and rebuilt on demand.
    pub fn update(&mut self) -> InferenceResult<()> {
        self.posterior = None;
        let posterior = self.recompute()?;
        self.posterior = Some(posterior);
        Ok(())
    }

    fn recompute(&mut self) -> InferenceResult<Posterior> {
        let n = self.labels.len();
        let k = self.kernel.covariance_matrix(self.features.view())?;
        if k.dim() != (n, n) {
            return Err(InferenceError::DimensionMismatch {
                what: "kernel matrix vs labels",
                expected: n,
                found: k.nrows(),
            });
        }
        let mean_f = self.mean.mean_vector(self.features.view())?;
        if mean_f.len() != n {
            return Err(InferenceError::DimensionMismatch {
                what: "mean vector vs labels",
                expected: n,
                found: mean_f.len(),
            });
        }
        self.ks = k * (2.0 * self.log_scale).exp();
        self.mean_f = mean_f;

        let problem = ModeProblem {
            ks: self.ks.view(),
            mean: self.mean_f.view(),
            labels: self.labels.view(),
            likelihood: self.likelihood.as_ref(),
        };
        problem.initialize(&mut self.state)?;
        let outcome = self.minimizer.find_mode(&problem, &mut self.state)?;
        problem.refresh(&mut self.state)?;
        let factor =
            PosteriorFactor::build(self.ks.view(), self.state.w.view(), self.state.sw.view())?;

        log::debug!(
            "Laplace update: n = {n}, psi = {:.10e}, iterations = {}, indefinite = {}",
            outcome.psi,
            outcome.iterations,
            factor.is_indefinite()
        );
        self.dirty.clear();
        Ok(Posterior { factor, outcome, aux: None })
    }

    /// Run `op` against an up-to-date posterior, refreshing first if any
    /// input changed.
    fn with_posterior<T>(
        &mut self, op: impl FnOnce(&Self, &mut Posterior) -> InferenceResult<T>,
    ) -> InferenceResult<T> {
        if self.dirty.any() {
            self.posterior = None;
        }
        let mut posterior = match self.posterior.take() {
            Some(posterior) => posterior,
            None => self.recompute()?,
        };
        let out = op(self, &mut posterior);
        self.posterior = Some(posterior);
        out
    }

    fn problem(&self) -> ModeProblem<'_> {
        ModeProblem {
            ks: self.ks.view(),
            mean: self.mean_f.view(),
            labels: self.labels.view(),
            likelihood: self.likelihood.as_ref(),
        }
    }

    fn gradient_aux<'p>(&self, posterior: &'p mut Posterior) -> InferenceResult<&'p GradientAux> {
        let aux = match posterior.aux.take() {
            Some(aux) => aux,
            None => GradientAux::compute(&self.problem(), &self.state, &posterior.factor)?,
        };
        Ok(posterior.aux.insert(aux))
    }

    // ---- Results ----

    /// Negative log marginal likelihood under the Laplace approximation.
    pub fn negative_log_marginal_likelihood(&mut self) -> InferenceResult<f64> {
        self.with_posterior(|this, posterior| {
            negative_log_marginal_likelihood(&this.state, &posterior.factor)
        })
    }

    /// `∂NLML/∂θ` for every element of `param`.
    ///
    /// Likelihood hyperparameters are scalar; the result has one entry.
    ///
    /// # Errors
    /// - [`GpError::UnknownHyperparameter`] before any computation for an
    ///   unregistered name.
    /// - [`InferenceError::NonFiniteResult`] if a derivative is NaN or ∞.
    pub fn gradient(&mut self, param: &Hyperparameter) -> InferenceResult<Array1<f64>> {
        let len = self.hyperparameter_len(param)?;
        self.with_posterior(|this, posterior| {
            let aux = this.gradient_aux(posterior)?;
            let problem = this.problem();
            let state = &this.state;
            let features = this.features.view();
            let scale2 = (2.0 * this.log_scale).exp();

            let values: Array1<f64> = match param.group {
                ParamGroup::Inference => {
                    let dks = &this.ks * 2.0;
                    array![aux.covariance_gradient(&problem, state, dks.view())]
                }
                ParamGroup::Kernel => (0..len)
                    .map(|index| -> InferenceResult<f64> {
                        let dk = this.kernel.parameter_gradient(features, &param.name, index)?;
                        let dks = dk * scale2;
                        Ok(aux.covariance_gradient(&problem, state, dks.view()))
                    })
                    .collect::<InferenceResult<Array1<f64>>>()?,
                ParamGroup::Likelihood => {
                    array![aux.likelihood_gradient(&problem, state, &param.name)?]
                }
                ParamGroup::Mean => (0..len)
                    .map(|index| -> InferenceResult<f64> {
                        let dm = this.mean.parameter_derivative(features, &param.name, index)?;
                        Ok(aux.mean_gradient(&problem, state, dm.view()))
                    })
                    .collect::<InferenceResult<Array1<f64>>>()?,
            };
            if values.iter().any(|v| !v.is_finite()) {
                return Err(InferenceError::NonFiniteResult { what: "hyperparameter gradient" });
            }
            Ok(values)
        })
    }

    /// Gradients for every registered hyperparameter, in the order of
    /// [`hyperparameters`](Self::hyperparameters).
    pub fn gradient_all(&mut self) -> InferenceResult<Vec<(Hyperparameter, Array1<f64>)>> {
        self.hyperparameters()
            .into_iter()
            .map(|param| {
                let grad = self.gradient(&param)?;
                Ok((param, grad))
            })
            .collect()
    }

    /// Posterior mean of the latent values relative to the prior mean,
    /// `f̂ − m`.
    pub fn posterior_mean(&mut self) -> InferenceResult<Array1<f64>> {
        self.with_posterior(|this, _| Ok(&this.state.f - &this.mean_f))
    }

    /// Posterior covariance of the latent values at the training inputs.
    pub fn posterior_covariance(&mut self) -> InferenceResult<Array2<f64>> {
        self.with_posterior(|this, posterior| {
            posterior.factor.covariance(this.ks.view(), this.state.sw.view())
        })
    }

    /// `sW`, the signed square root of the curvature at the mode.
    pub fn diagonal_vector(&mut self) -> InferenceResult<Array1<f64>> {
        self.with_posterior(|this, _| Ok(this.state.sw.clone()))
    }

    pub fn alpha(&mut self) -> InferenceResult<Array1<f64>> {
        self.with_posterior(|this, _| Ok(this.state.alpha.clone()))
    }

    /// Latent values at the mode, `f̂ = Ks·alpha + m`.
    pub fn function_values(&mut self) -> InferenceResult<Array1<f64>> {
        self.with_posterior(|this, _| Ok(this.state.f.clone()))
    }

    /// `Ψ` at the mode.
    pub fn psi(&mut self) -> InferenceResult<f64> {
        self.with_posterior(|this, _| Ok(this.state.psi))
    }

    pub fn posterior_factor(&mut self) -> InferenceResult<PosteriorFactor> {
        self.with_posterior(|_, posterior| Ok(posterior.factor.clone()))
    }

    pub fn mode_outcome(&mut self) -> InferenceResult<ModeOutcome> {
        self.with_posterior(|_, posterior| Ok(posterior.outcome.clone()))
    }

    /// `Ψ` at the current `alpha`, recomputed from scratch.
    pub fn psi_wrt_alpha(&mut self) -> InferenceResult<f64> {
        self.with_posterior(|this, _| {
            let mut scratch = this.state.clone();
            this.problem().refresh(&mut scratch)
        })
    }

    /// `∂Ψ/∂alpha = Ks·(alpha − dlp)` at the current `alpha`.
    pub fn gradient_wrt_alpha(&mut self) -> InferenceResult<Array1<f64>> {
        self.with_posterior(|this, _| Ok(this.problem().gradient_wrt_alpha(&this.state)))
    }
}

fn check_rows(features: &Array2<f64>, labels: &Array1<f64>) -> InferenceResult<()> {
    if features.nrows() != labels.len() {
        return Err(InferenceError::DimensionMismatch {
            what: "feature rows vs labels",
            expected: labels.len(),
            found: features.nrows(),
        });
    }
    Ok(())
}

fn unknown_inference_parameter(param: &Hyperparameter) -> GpError {
    GpError::UnknownHyperparameter { component: COMPONENT, name: param.name.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::{
        kernel::SquaredExponentialKernel,
        likelihood::{GaussianLikelihood, LogitLikelihood},
        mean::{ConstantMean, ZeroMean},
    };
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    /// Three points far enough apart that the SE kernel is the identity.
    fn identity_problem() -> SingleLaplaceInference {
        SingleLaplaceInference::new(
            array![[0.0], [100.0], [200.0]],
            array![1.0, -1.0, 0.5],
            Box::new(SquaredExponentialKernel::isotropic(1.0, 1.0).unwrap()),
            Box::new(ZeroMean),
            Box::new(GaussianLikelihood::new(1.0).unwrap()),
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The degenerate Gaussian case has a closed form: K = I and unit noise
    // give alpha = y/2 and the exact Gaussian marginal likelihood.
    //
    // Given
    // -----
    // - n = 3, K = I, σ² = 1, m = 0, y = (1, −1, 0.5).
    //
    // Expect
    // ------
    // - Newton converges within 5 iterations.
    // - alpha ≈ y/2, posterior mean ≈ y/2.
    // - NLML = ½ yᵀ(2I)⁻¹y + (3/2) ln 2 + (3/2) ln 2π.
    fn identity_kernel_gaussian_matches_closed_form() {
        let mut gp = identity_problem();
        let y = array![1.0, -1.0, 0.5];

        let nlml = gp.negative_log_marginal_likelihood().unwrap();

        let outcome = gp.mode_outcome().unwrap();
        assert!(outcome.converged);
        assert!(outcome.iterations <= 5);
        let alpha = gp.alpha().unwrap();
        let mean = gp.posterior_mean().unwrap();
        for i in 0..3 {
            assert_relative_eq!(alpha[i], y[i] / 2.0, epsilon = 1e-5);
            assert_relative_eq!(mean[i], y[i] / 2.0, epsilon = 1e-5);
        }
        let expected = 0.25 * y.dot(&y) + 1.5 * 2f64.ln() + 1.5 * (2.0 * PI).ln();
        assert_relative_eq!(nlml, expected, epsilon = 1e-9);
        assert!(!gp.posterior_factor().unwrap().is_indefinite());
        let sigma = gp.posterior_covariance().unwrap();
        assert_relative_eq!(sigma[[0, 0]], 0.5, epsilon = 1e-12);
        assert_relative_eq!(sigma[[0, 1]], 0.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Setters mark state stale and the next accessor reflects the change;
    // reading twice without a change does not re-run mode finding.
    fn setters_invalidate_cached_results() {
        let mut gp = identity_problem();
        let before = gp.negative_log_marginal_likelihood().unwrap();
        assert_eq!(gp.negative_log_marginal_likelihood().unwrap(), before);

        gp.set_hyperparameter(&Hyperparameter::log_scale(), array![0.5].view()).unwrap();
        let scaled = gp.negative_log_marginal_likelihood().unwrap();
        assert!((scaled - before).abs() > 1e-3);

        gp.set_labels(array![0.0, 0.0, 0.0]).unwrap();
        let alpha = gp.alpha().unwrap();
        assert!(alpha.iter().all(|a| a.abs() < 1e-8));

        gp.set_mean_function(Box::new(ConstantMean::new(1.0)));
        let f = gp.function_values().unwrap();
        assert!(f.iter().all(|&v| v > 0.0 && v < 1.0));

        let nlml_far = gp.negative_log_marginal_likelihood().unwrap();
        gp.set_features(array![[0.0], [0.1], [0.2]]).unwrap();
        assert!((gp.negative_log_marginal_likelihood().unwrap() - nlml_far).abs() > 1e-3);

        let var_before = gp.posterior_covariance().unwrap()[[0, 0]];
        gp.set_kernel(Box::new(SquaredExponentialKernel::isotropic(1.0, 2.0).unwrap()));
        let var_after = gp.posterior_covariance().unwrap()[[0, 0]];
        assert!(var_after > var_before + 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // Unknown names and unsupported strategies are rejected before any
    // computation; size mismatches are rejected by the setters.
    fn misuse_is_rejected() {
        let mut gp = identity_problem();

        assert!(matches!(
            gp.gradient(&Hyperparameter::kernel("log_period")),
            Err(InferenceError::Model(GpError::UnknownHyperparameter { .. }))
        ));
        assert!(matches!(
            gp.gradient(&Hyperparameter::new(ParamGroup::Inference, "log_amplitude")),
            Err(InferenceError::Model(GpError::UnknownHyperparameter {
                component: "SingleLaplaceInference",
                ..
            }))
        ));
        assert!(matches!(
            gp.set_minimizer_by_name("nelder-mead"),
            Err(InferenceError::UnsupportedMinimizer { .. })
        ));
        assert!(matches!(
            gp.set_labels(array![1.0, 2.0]),
            Err(InferenceError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            gp.set_likelihood(Box::new(LogitLikelihood::new())),
            Err(InferenceError::Model(GpError::InvalidLabel { .. }))
        ));
    }

    #[test]
    // Purpose
    // -------
    // The registered hyperparameters cover all four groups in order, and
    // the gradient list has one entry per element.
    fn hyperparameters_are_enumerated() {
        let mut gp = SingleLaplaceInference::new(
            array![[0.0, 1.0], [0.5, 0.2], [1.0, -0.4]],
            array![1.0, -1.0, 1.0],
            Box::new(SquaredExponentialKernel::new(array![1.0, 2.0].view(), 1.0).unwrap()),
            Box::new(ConstantMean::new(0.1)),
            Box::new(LogitLikelihood::new()),
        )
        .unwrap();

        let params: Vec<String> = gp.hyperparameters().iter().map(|p| p.to_string()).collect();
        let grads = gp.gradient_all().unwrap();

        assert_eq!(
            params,
            vec!["inference.log_scale", "kernel.log_ell", "kernel.log_sf", "mean.bias"]
        );
        let lens: Vec<usize> = grads.iter().map(|(_, g)| g.len()).collect();
        assert_eq!(lens, vec![1, 2, 1, 1]);
    }

    #[test]
    // Purpose
    // -------
    // At the mode the gradient of Ψ with respect to alpha vanishes, and
    // Ψ recomputed from alpha equals the cached value.
    fn alpha_objective_is_stationary_at_mode() {
        let mut gp = SingleLaplaceInference::new(
            array![[0.0], [0.7], [1.5], [2.0]],
            array![1.0, 1.0, -1.0, -1.0],
            Box::new(SquaredExponentialKernel::isotropic(1.0, 1.2).unwrap()),
            Box::new(ZeroMean),
            Box::new(LogitLikelihood::new()),
        )
        .unwrap();

        let grad = gp.gradient_wrt_alpha().unwrap();
        let psi = gp.psi().unwrap();

        assert!(grad.iter().all(|g| g.abs() < 1e-4));
        assert_relative_eq!(gp.psi_wrt_alpha().unwrap(), psi, epsilon = 1e-12);
    }
}
