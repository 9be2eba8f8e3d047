//! Mode state, the objective it is evaluated against, and staleness flags.
//!
//! Purpose
//! -------
//! Hold the dual variables `alpha` with everything derived from them, and
//! evaluate `Ψ` against the fixed inputs of one inference call.
//!
//! Key behaviors
//! -------------
//! - [`ModeProblem`] borrows the scaled covariance, prior mean, labels and
//!   likelihood; [`ModeProblem::evaluate`] writes every derived quantity
//!   back into the [`ModeState`].
//! - [`ModeProblem::initialize`] warm-starts from the previous `alpha` and
//!   falls back to `alpha = 0` when that is no better.
//! - [`DirtyFlags`] record which inputs changed since the last update.
//!
//! Invariants & assumptions
//! ------------------------
//! - The state always describes the last `alpha` evaluated.
use crate::{
    gp::likelihood::{DerivativeOrder, LikelihoodModel},
    inference::errors::{InferenceError, InferenceResult},
    optimization::numerical_stability::signed_sqrt,
};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Dual variables and the quantities derived from them.
///
/// Invariant after any evaluation through [`ModeProblem`]:
/// `f = Ks·alpha + m`, `dlp = ∂ log p(y|f)/∂f`, `w = −∂² log p(y|f)/∂f²`,
/// `sw = signed_sqrt(w)` and `psi = ½·alpha·(f − m) − Σ log p(y|f)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeState {
    pub alpha: Array1<f64>,
    pub f: Array1<f64>,
    pub dlp: Array1<f64>,
    pub w: Array1<f64>,
    pub sw: Array1<f64>,
    pub psi: f64,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            alpha: Array1::zeros(0),
            f: Array1::zeros(0),
            dlp: Array1::zeros(0),
            w: Array1::zeros(0),
            sw: Array1::zeros(0),
            psi: f64::INFINITY,
        }
    }
}

/// Which inputs changed since the last successful update.
///
/// `data` covers features and labels; `kernel` covers the kernel
/// hyperparameters and the amplitude `log_scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyFlags {
    pub data: bool,
    pub kernel: bool,
    pub likelihood: bool,
    pub mean: bool,
}

impl DirtyFlags {
    pub fn all() -> Self {
        Self { data: true, kernel: true, likelihood: true, mean: true }
    }

    pub fn any(&self) -> bool {
        self.data || self.kernel || self.likelihood || self.mean
    }

    pub fn clear(&mut self) {
        *self = Self { data: false, kernel: false, likelihood: false, mean: false };
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Fixed inputs of one mode search, borrowed for its duration.
#[derive(Debug, Clone, Copy)]
pub struct ModeProblem<'a> {
    /// Scaled prior covariance `Ks = K·exp(2·log_scale)`.
    pub ks: ArrayView2<'a, f64>,
    /// Prior mean vector `m`.
    pub mean: ArrayView1<'a, f64>,
    pub labels: ArrayView1<'a, f64>,
    pub likelihood: &'a dyn LikelihoodModel,
}

impl<'a> ModeProblem<'a> {
    /// Number of training points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `Ψ_def = −Σ log p(y | m)`, the objective at `alpha = 0`.
    pub fn default_psi(&self) -> InferenceResult<f64> {
        Ok(-self.likelihood.log_probability(self.labels, self.mean)?.sum())
    }

    /// Replace `alpha` and refresh the state; returns the new `Ψ`.
    pub fn evaluate(&self, state: &mut ModeState, alpha: Array1<f64>) -> InferenceResult<f64> {
        state.alpha = alpha;
        self.refresh(state)
    }

    /// Recompute every derived quantity from `state.alpha`; returns `Ψ`.
    ///
    /// # Errors
    /// - [`InferenceError::DimensionMismatch`] if `alpha` does not have one
    ///   entry per label.
    /// - Likelihood failures, wrapped as [`InferenceError::Model`].
    pub fn refresh(&self, state: &mut ModeState) -> InferenceResult<f64> {
        if state.alpha.len() != self.len() {
            return Err(InferenceError::DimensionMismatch {
                what: "dual variables vs labels",
                expected: self.len(),
                found: state.alpha.len(),
            });
        }
        let f = self.ks.dot(&state.alpha) + self.mean;
        let log_p = self.likelihood.log_probability(self.labels, f.view())?.sum();
        let psi = state.alpha.dot(&(&f - &self.mean)) / 2.0 - log_p;
        let dlp =
            self.likelihood.log_probability_derivative(self.labels, f.view(), DerivativeOrder::First)?;
        let w = -self.likelihood.log_probability_derivative(
            self.labels,
            f.view(),
            DerivativeOrder::Second,
        )?;

        state.sw = signed_sqrt(w.view());
        state.w = w;
        state.dlp = dlp;
        state.f = f;
        state.psi = psi;
        Ok(psi)
    }

    /// Reset `alpha` to zero so that `f = m` and `Ψ = Ψ_def`.
    pub fn reset(&self, state: &mut ModeState) -> InferenceResult<f64> {
        self.evaluate(state, Array1::zeros(self.len()))
    }

    /// Prepare the starting point of a mode search.
    ///
    /// A stale `alpha` (wrong length) is reset to zero. Otherwise the
    /// previous `alpha` is kept as a warm start unless the zero start has a
    /// smaller objective.
    pub fn initialize(&self, state: &mut ModeState) -> InferenceResult<f64> {
        if state.alpha.len() != self.len() {
            return self.reset(state);
        }
        let psi = self.refresh(state)?;
        let psi_def = self.default_psi()?;
        if psi_def < psi || !psi.is_finite() {
            log::debug!("Laplace warm start rejected: psi {psi} vs default {psi_def}");
            return self.reset(state);
        }
        Ok(psi)
    }

    /// `∂Ψ/∂alpha = Ks·(alpha − dlp)` at the state's current point.
    pub fn gradient_wrt_alpha(&self, state: &ModeState) -> Array1<f64> {
        self.ks.dot(&(&state.alpha - &state.dlp))
    }
}
