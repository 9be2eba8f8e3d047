//! Gradients of the negative log marginal likelihood.
//!
//! Purpose
//! -------
//! Differentiate the Laplace NLML with respect to kernel, amplitude-scale,
//! likelihood and mean hyperparameters. Each derivative has an explicit part
//! (the hyperparameter moves with the mode held fixed) and an implicit part
//! (the mode itself moves), the latter expressed through
//! `dfhat = g ⊙ d3lp` with `g = diag(Σ)/2`.
//!
//! Key behaviors
//! -------------
//! - [`GradientAux`] holds `Z`, `g` and `dfhat`, computed once per
//!   converged mode and shared by every hyperparameter.
//! - [`GradientAux::covariance_gradient`] serves kernel hyperparameters and
//!   the amplitude `log_scale` alike; callers pass `∂Ks/∂θ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The mode state is stationary (`alpha = dlp`); the implicit terms are
//!   only exact there.
//! - `Z`, `g` and `dfhat` are tied to one factorization; any change of data
//!   or hyperparameters invalidates them.
use crate::{
    gp::likelihood::DerivativeOrder,
    inference::{
        errors::InferenceResult,
        laplace::{
            posterior::{B_MATRIX, PosteriorFactor},
            state::{ModeProblem, ModeState},
        },
    },
    optimization::numerical_stability::solve_upper_transpose,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Quantities shared by every hyperparameter derivative at one mode.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientAux {
    /// `Z = (W⁻¹ + Ks)⁻¹`.
    pub z: Array2<f64>,
    /// `g = diag(Σ)/2`.
    pub g: Array1<f64>,
    /// `dfhat = g ⊙ ∂³ log p / ∂f³`.
    pub dfhat: Array1<f64>,
}

impl GradientAux {
    /// Precompute `Z`, `g` and `dfhat` from the mode and its factor.
    ///
    /// Cholesky branch: `C = L⁻ᵀ(sW⊙Ks)` and `g = (diag Ks − Σ_rows C²)/2`.
    /// Indefinite branch: `g = rowsum(A⁻¹ ⊙ Ks)/2`.
    pub fn compute(
        problem: &ModeProblem<'_>, state: &ModeState, factor: &PosteriorFactor,
    ) -> InferenceResult<Self> {
        let ks = problem.ks;
        let d3lp = problem.likelihood.log_probability_derivative(
            problem.labels,
            state.f.view(),
            DerivativeOrder::Third,
        )?;
        let z = factor.z_matrix(state.sw.view())?;
        let g = match factor {
            PosteriorFactor::Cholesky { l, .. } => {
                let sw = &state.sw;
                let sw_ks = Array2::from_shape_fn(ks.dim(), |(i, j)| sw[i] * ks[[i, j]]);
                let c = solve_upper_transpose(l.view(), sw_ks.view(), B_MATRIX)?;
                (&ks.diag() - &(&c * &c).sum_axis(Axis(0))) / 2.0
            }
            PosteriorFactor::Indefinite { a_inv, .. } => (a_inv * &ks).sum_axis(Axis(1)) / 2.0,
        };
        let dfhat = &g * &d3lp;
        Ok(Self { z, g, dfhat })
    }

    /// `dfhat · (b − Ks·(Z·b))`, the change of the NLML through the mode.
    fn implicit(&self, ks: ArrayView2<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        let moved = &b - &ks.dot(&self.z.dot(&b));
        self.dfhat.dot(&moved)
    }

    /// `∂NLML/∂θ` for a parameter of the scaled covariance, given
    /// `dks = ∂Ks/∂θ`:
    ///
    /// ```text
    /// Σ(Z ⊙ dKs)/2 − alphaᵀ·dKs·alpha/2 − dfhat·(b − Ks·Z·b),   b = dKs·dlp
    /// ```
    pub fn covariance_gradient(
        &self, problem: &ModeProblem<'_>, state: &ModeState, dks: ArrayView2<'_, f64>,
    ) -> f64 {
        let explicit =
            (&self.z * &dks).sum() / 2.0 - state.alpha.dot(&dks.dot(&state.alpha)) / 2.0;
        let b = dks.dot(&state.dlp);
        explicit - self.implicit(problem.ks, b.view())
    }

    /// `∂NLML/∂θ` for the likelihood hyperparameter `name`:
    ///
    /// ```text
    /// −g·∂(∂²log p/∂f²)/∂θ − Σ ∂log p/∂θ − dfhat·(b − Ks·Z·b),   b = Ks·∂(∂log p/∂f)/∂θ
    /// ```
    pub fn likelihood_gradient(
        &self, problem: &ModeProblem<'_>, state: &ModeState, name: &str,
    ) -> InferenceResult<f64> {
        let lik = problem.likelihood;
        let (y, f) = (problem.labels, state.f.view());
        let lp_dhyp = lik.first_derivative(y, f, name)?;
        let dlp_dhyp = lik.second_derivative(y, f, name)?;
        let d2lp_dhyp = lik.third_derivative(y, f, name)?;

        let explicit = -self.g.dot(&d2lp_dhyp) - lp_dhyp.sum();
        let b = problem.ks.dot(&dlp_dhyp);
        Ok(explicit - self.implicit(problem.ks, b.view()))
    }

    /// `∂NLML/∂θ` for a mean hyperparameter with `dm = ∂m/∂θ`:
    /// `−alpha·dm − dfhat·(dm − Ks·Z·dm)`.
    pub fn mean_gradient(
        &self, problem: &ModeProblem<'_>, state: &ModeState, dm: ArrayView1<'_, f64>,
    ) -> f64 {
        -state.alpha.dot(&dm) - self.implicit(problem.ks, dm)
    }
}
