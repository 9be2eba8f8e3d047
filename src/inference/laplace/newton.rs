//! Newton mode finder with a bounded line search on the step length.
//!
//! Purpose
//! -------
//! Minimize `Ψ(alpha)` over the dual variables to locate the posterior
//! mode `f̂ = Ks·alpha + m`.
//!
//! Key behaviors
//! -------------
//! - Each iteration forms the Newton direction from a Cholesky factor of
//!   `B = I + sW·Ks·sW`, then searches `x ∈ [0, max_step]` minimizing
//!   `Ψ(alpha_start + x·dalpha)` through the injected [`LineSearch`].
//! - Indefinite curvature (`min W < 0`) is lifted by
//!   `W ← W + (2/df)·dlp²` before factoring; `df` is the likelihood's
//!   degrees of freedom when it reports one, else `1`.
//! - Reaching `max_iter` logs a warning and keeps the best state.
//!
//! Invariants & assumptions
//! ------------------------
//! - Evaluating `Ψ` writes the whole mode state. After the search the state
//!   is re-evaluated only if the last evaluated step was not the best one.
//! - `Ψ` never increases between iterations.
use crate::{
    inference::{
        errors::{InferenceResult, park_error, recover_error},
        laplace::{
            options::NewtonOptions,
            posterior::{B_MATRIX, stabilized_b},
            state::{ModeProblem, ModeState},
        },
    },
    optimization::{
        errors::OptError,
        line_search::{BrentLineSearch, LineMinimum, LineSearch},
        numerical_stability::{cholesky_solve_vec, min_coeff, regularize_curvature, upper_cholesky},
    },
};
use ndarray::Array1;

/// Result of a Newton run.
///
/// `psi_trace` holds `Ψ` at the start and after every iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonOutcome {
    pub psi: f64,
    pub iterations: usize,
    pub converged: bool,
    pub psi_trace: Vec<f64>,
}

/// Newton driver for the Laplace mode.
///
/// The line search is injected; a driver built without one fails with
/// [`OptError::LineSearchUnavailable`] at the first step instead of
/// silently taking full steps.
#[derive(Debug)]
pub struct NewtonOptimizer {
    opts: NewtonOptions,
    line_search: Option<Box<dyn LineSearch>>,
}

impl NewtonOptimizer {
    /// Newton driver using [`BrentLineSearch`].
    pub fn new(opts: NewtonOptions) -> Self {
        Self { opts, line_search: Some(Box::new(BrentLineSearch::new())) }
    }

    pub fn with_line_search(opts: NewtonOptions, line_search: Option<Box<dyn LineSearch>>) -> Self {
        Self { opts, line_search }
    }

    pub fn options(&self) -> &NewtonOptions {
        &self.opts
    }

    /// Run Newton from the current state until `|Ψ_old − Ψ_new| ≤ tolerance`
    /// or `max_iter` iterations.
    ///
    /// Hitting the cap is not an error: a warning is logged and the best
    /// state reached is kept. `Ψ` never increases from one iteration to the
    /// next; a line minimum worse than the starting point is discarded.
    ///
    /// # Errors
    /// - [`OptError::LineSearchUnavailable`] without a line search.
    /// - Factorization failures of `B`.
    /// - Likelihood failures raised while evaluating `Ψ`.
    pub fn minimize(
        &self, problem: &ModeProblem<'_>, state: &mut ModeState,
    ) -> InferenceResult<NewtonOutcome> {
        let line_search = self.line_search.as_deref().ok_or(OptError::LineSearchUnavailable)?;
        let df = problem.likelihood.degrees_of_freedom().unwrap_or(1.0);
        let tolerance = self.opts.tolerance;

        let mut psi_new = problem.refresh(state)?;
        let mut psi_old = f64::INFINITY;
        let mut psi_trace = vec![psi_new];
        let mut iterations = 0;

        while (psi_old - psi_new).abs() > tolerance && iterations < self.opts.max_iter {
            psi_old = psi_new;
            iterations += 1;

            let dalpha = newton_direction(problem, state, df)?;
            let alpha_start = state.alpha.clone();
            let line_min = self.search_step(line_search, problem, state, &alpha_start, &dalpha)?;

            if !(line_min.value <= psi_old) {
                problem.evaluate(state, alpha_start)?;
            } else if line_min.last_step != line_min.step {
                problem.evaluate(state, &alpha_start + &(&dalpha * line_min.step))?;
            }
            psi_new = state.psi;
            psi_trace.push(psi_new);
            log::debug!(
                "Laplace Newton iteration {iterations}: psi = {psi_new:.10e}, step = {:.6}, evals = {}",
                line_min.step,
                line_min.evals
            );
        }

        let delta = (psi_old - psi_new).abs();
        let converged = delta <= tolerance;
        if !converged {
            log::warn!(
                "Laplace Newton stopped at the iteration cap {} with |dPsi| = {delta:.3e} > tolerance {tolerance:.3e}",
                self.opts.max_iter
            );
        }
        Ok(NewtonOutcome { psi: psi_new, iterations, converged, psi_trace })
    }

    /// Line search over `Ψ(alpha_start + x·dalpha)`; errors from the
    /// objective come back with their original type.
    fn search_step(
        &self, line_search: &dyn LineSearch, problem: &ModeProblem<'_>, state: &mut ModeState,
        alpha_start: &Array1<f64>, dalpha: &Array1<f64>,
    ) -> InferenceResult<LineMinimum> {
        let ls = self.opts.line_search;
        let mut failure = None;
        let result = {
            let mut objective = |step: f64| {
                problem
                    .evaluate(state, alpha_start + &(dalpha * step))
                    .map_err(|err| park_error(err, &mut failure))
            };
            line_search.minimize(&mut objective, 0.0, ls.max_step, &ls)
        };
        result.map_err(|err| recover_error(err, &mut failure))
    }
}

impl Default for NewtonOptimizer {
    fn default() -> Self {
        Self::new(NewtonOptions::default())
    }
}

/// Newton direction `dalpha = b − sW⊙B⁻¹(sW⊙(Ks·b)) − alpha` with
/// `b = W⊙(f − m) + dlp`, using the regularized curvature.
fn newton_direction(
    problem: &ModeProblem<'_>, state: &ModeState, df: f64,
) -> InferenceResult<Array1<f64>> {
    let mut w = state.w.clone();
    if regularize_curvature(&mut w, state.dlp.view(), df) {
        log::debug!("Laplace Newton: indefinite W regularized with df = {df}");
        if min_coeff(w.view()) < 0.0 {
            return Err(OptError::FactorizationFailed {
                matrix: B_MATRIX,
                reason: "curvature remains negative after regularization",
            }
            .into());
        }
    }
    let sw = w.mapv(f64::sqrt);
    let u = upper_cholesky(stabilized_b(problem.ks, sw.view()).view(), B_MATRIX)?;

    let b = &w * &(&state.f - &problem.mean) + &state.dlp;
    let rhs = &sw * &problem.ks.dot(&b);
    let solved = cholesky_solve_vec(u.view(), rhs.view(), B_MATRIX)?;
    Ok(b - &sw * &solved - &state.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gp::likelihood::{GaussianLikelihood, LogitLikelihood, StudentsTLikelihood},
        inference::errors::InferenceError,
        optimization::line_search::LineSearchOptions,
    };
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    fn dense_ks(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |(i, j)| {
            let d = i as f64 - j as f64;
            (-0.5 * d * d / 4.0).exp()
        })
    }

    #[test]
    // Purpose
    // -------
    // For a log-concave likelihood Ψ never increases across iterations and
    // the run converges well inside the default cap.
    //
    // Given
    // -----
    // - Logit likelihood, six points with alternating-block labels.
    //
    // Expect
    // ------
    // - Non-increasing trace, `converged`, and alpha ≈ dlp at the mode
    //   (stationarity of Ψ).
    fn logit_trace_is_non_increasing() {
        let ks = dense_ks(6);
        let mean = Array1::zeros(6);
        let y = array![1.0, 1.0, 1.0, -1.0, -1.0, 1.0];
        let lik = LogitLikelihood::new();
        let problem =
            ModeProblem { ks: ks.view(), mean: mean.view(), labels: y.view(), likelihood: &lik };
        let ls = LineSearchOptions::new(1e-10, 10.0, 100).unwrap();
        let newton = NewtonOptimizer::new(NewtonOptions::new(20, 1e-12, ls).unwrap());
        let mut state = ModeState::default();
        problem.initialize(&mut state).unwrap();

        let outcome = newton.minimize(&problem, &mut state).unwrap();

        assert!(outcome.converged);
        for pair in outcome.psi_trace.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        for (a, d) in state.alpha.iter().zip(state.dlp.iter()) {
            assert_abs_diff_eq!(a, d, epsilon = 1e-4);
        }
        assert_eq!(outcome.psi, state.psi);
    }

    #[test]
    // Purpose
    // -------
    // A heavy-tailed likelihood with an outlier produces negative curvature
    // at the mode; the regularized Newton loop still converges and leaves a
    // finite signed square root.
    fn student_t_outlier_is_regularized() {
        let ks = dense_ks(5);
        let mean = Array1::zeros(5);
        let y = array![0.0, 0.1, 8.0, -0.1, 0.0];
        let lik = StudentsTLikelihood::new(0.1, 1.0).unwrap();
        let problem =
            ModeProblem { ks: ks.view(), mean: mean.view(), labels: y.view(), likelihood: &lik };
        let mut state = ModeState::default();
        problem.initialize(&mut state).unwrap();

        let outcome = NewtonOptimizer::default().minimize(&problem, &mut state).unwrap();

        assert!(outcome.psi.is_finite());
        assert!(min_coeff(state.w.view()) < 0.0);
        assert!(state.sw.iter().all(|v| v.is_finite()));
        assert!(state.sw[2] < 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Without a line search the driver reports the missing component.
    fn missing_line_search_is_reported() {
        let ks = dense_ks(2);
        let mean = Array1::zeros(2);
        let y = array![0.3, -0.2];
        let lik = GaussianLikelihood::new(1.0).unwrap();
        let problem =
            ModeProblem { ks: ks.view(), mean: mean.view(), labels: y.view(), likelihood: &lik };
        let mut state = ModeState::default();
        problem.initialize(&mut state).unwrap();
        let newton = NewtonOptimizer::with_line_search(NewtonOptions::default(), None);

        let err = newton.minimize(&problem, &mut state).unwrap_err();

        assert_eq!(err, InferenceError::Optimization(OptError::LineSearchUnavailable));
    }

    #[test]
    // Purpose
    // -------
    // Reaching the iteration cap is not an error: the run returns the best
    // Ψ reached and reports that it did not converge.
    //
    // Given
    // -----
    // - Logit likelihood on three points and `max_iter = 1`.
    //
    // Expect
    // ------
    // - `Ok`, one iteration, `converged == false`, Ψ no higher than at the
    //   start and matching the state.
    fn iteration_cap_returns_best_psi_without_error() {
        let ks = dense_ks(3);
        let mean = Array1::zeros(3);
        let y = array![1.0, -1.0, 1.0];
        let lik = LogitLikelihood::new();
        let problem =
            ModeProblem { ks: ks.view(), mean: mean.view(), labels: y.view(), likelihood: &lik };
        let opts = NewtonOptions::new(1, 1e-12, LineSearchOptions::default()).unwrap();
        let newton = NewtonOptimizer::new(opts);
        let mut state = ModeState::default();
        problem.initialize(&mut state).unwrap();
        let psi_start = problem.refresh(&mut state).unwrap();

        let outcome = newton.minimize(&problem, &mut state).unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.psi <= psi_start);
        assert_eq!(outcome.psi, state.psi);
    }

    #[test]
    // Purpose
    // -------
    // Curvature that stays negative after regularization is a factorization
    // failure of `B`, not a NaN square root.
    //
    // Given
    // -----
    // - A hand-built state with `W = (1, -2)` and `dlp = 0`, so the
    //   regularization adds nothing.
    //
    // Expect
    // ------
    // - `FactorizationFailed` for the `B` matrix.
    fn negative_curvature_after_regularization_fails() {
        let ks = dense_ks(2);
        let mean = Array1::zeros(2);
        let y = array![0.0, 0.0];
        let lik = StudentsTLikelihood::new(1.0, 4.0).unwrap();
        let problem =
            ModeProblem { ks: ks.view(), mean: mean.view(), labels: y.view(), likelihood: &lik };
        let state = ModeState {
            alpha: Array1::zeros(2),
            f: Array1::zeros(2),
            dlp: Array1::zeros(2),
            w: array![1.0, -2.0],
            sw: Array1::zeros(2),
            psi: 0.0,
        };

        let err = newton_direction(&problem, &state, 4.0).unwrap_err();

        assert!(matches!(
            err,
            InferenceError::Optimization(OptError::FactorizationFailed { matrix: B_MATRIX, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Running Newton again on a converged state moves Ψ by less than the
    // tolerance.
    fn rerun_on_converged_state_is_idempotent() {
        let ks = dense_ks(4);
        let mean = array![0.1, 0.0, -0.1, 0.2];
        let y = array![1.0, -1.0, -1.0, 1.0];
        let lik = LogitLikelihood::new();
        let problem =
            ModeProblem { ks: ks.view(), mean: mean.view(), labels: y.view(), likelihood: &lik };
        let opts = NewtonOptions::new(50, 1e-9, LineSearchOptions::default()).unwrap();
        let newton = NewtonOptimizer::new(opts);
        let mut state = ModeState::default();
        problem.initialize(&mut state).unwrap();
        let first = newton.minimize(&problem, &mut state).unwrap();

        let second = newton.minimize(&problem, &mut state).unwrap();

        assert!((first.psi - second.psi).abs() < 1e-9);
        assert!(second.iterations <= 2);
    }
}
