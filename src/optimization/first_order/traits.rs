//! Contracts for first-order minimization of objectives that own their
//! variable.
//!
//! A [`FirstOrderCostFunction`] keeps the point being optimized inside
//! itself, so evaluating the cost can refresh whatever derived state the
//! objective carries (for the Laplace mode: `f`, the likelihood derivatives
//! and `Ψ`). A [`FirstOrderMinimizer`] drives such an objective through
//! [`variable`](FirstOrderCostFunction::variable) and reports an
//! [`OptimOutcome`].
//!
//! Costs are minimized as given.
use crate::optimization::{
    errors::{OptError, OptResult},
    first_order::{
        types::{Cost, FnEvalMap, Grad, Variable},
        validation::{validate_best_variable, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Stateful objective consumed by a [`FirstOrderMinimizer`].
///
/// Minimizers write a candidate through [`variable`](Self::variable) and
/// then ask for the cost or gradient at it. Either call may refresh cached
/// state; on return that state must match the variable.
pub trait FirstOrderCostFunction {
    fn cost(&mut self) -> OptResult<Cost>;

    fn gradient(&mut self) -> OptResult<Grad>;

    fn variable(&mut self) -> &mut Variable;
}

/// Strategy that drives a [`FirstOrderCostFunction`] to a minimum.
///
/// On success the objective's variable holds the best point found and its
/// cached state has been refreshed there.
pub trait FirstOrderMinimizer: std::fmt::Debug {
    fn minimize(&self, cost: &mut dyn FirstOrderCostFunction) -> OptResult<OptimOutcome>;
}

/// Line search inside L-BFGS. Parses case-insensitively from
/// `"MoreThuente"` or `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("morethuente") {
            Ok(LineSearcher::MoreThuente)
        } else if s.eq_ignore_ascii_case("hagerzhang") {
            Ok(LineSearcher::HagerZhang)
        } else {
            Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Expected 'MoreThuente' or 'HagerZhang'.",
            })
        }
    }
}

/// L-BFGS configuration.
///
/// `verbose` attaches the slog observer when the `obs_slog` feature is on;
/// `lbfgs_mem = None` uses
/// [`DEFAULT_LBFGS_MEM`](crate::optimization::first_order::types::DEFAULT_LBFGS_MEM).
///
/// The default stops on `‖∇‖ < 1e-8`, `|Δcost| < 1e-12` or 500 iterations,
/// with More–Thuente steps.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MinimizerOptions {
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] for `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MinimizerOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-8), tol_cost: Some(1e-12), max_iter: Some(500) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules: gradient norm, cost change, iteration cap. Each is
/// optional but at least one must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if every rule is `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for a
    ///   tolerance that is not finite and positive.
    /// - [`OptError::InvalidMaxIter`] for a zero cap.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of a first-order run.
///
/// `converged` is `true` for any terminating status other than
/// `NotTerminated`; `status` is argmin's status rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub best: Variable,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Normalize argmin's final state.
    ///
    /// # Errors
    /// A missing or non-finite best variable, or a non-finite best cost.
    pub fn new(
        best: Option<Variable>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let best = validate_best_variable(best)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        Ok(Self {
            best,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::TerminationReason;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively; anything else is rejected.
    fn line_searcher_parses_known_names_only() {
        assert_eq!("morethuente".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert_eq!("HAGERZHANG".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert!(matches!(
            "backtracking".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // At least one stopping rule is required and the cap must be positive.
    fn tolerances_require_a_stopping_rule() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(Some(1e-6), None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        assert!(Tolerances::new(None, None, Some(10)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Zero L-BFGS memory is a configuration error.
    fn minimizer_options_reject_zero_memory() {
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).unwrap();
        assert!(matches!(
            MinimizerOptions::new(tols, LineSearcher::MoreThuente, false, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The outcome reports convergence from the termination status and the
    // gradient norm from the last gradient.
    //
    // Given
    // -----
    // - A finite best point, a solver-exit status and gradient (3, 4).
    //
    // Expect
    // ------
    // - `converged`, `grad_norm == 5`, and a missing best point rejected.
    fn outcome_normalizes_solver_state() {
        let status = TerminationStatus::Terminated(TerminationReason::SolverConverged);

        let outcome = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            0.5,
            status.clone(),
            7,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .unwrap();
        let missing = OptimOutcome::new(None, 0.5, status, 7, FnEvalMap::new(), None);

        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 7);
        assert_eq!(outcome.grad_norm, Some(5.0));
        assert_eq!(missing, Err(OptError::MissingBestVariable));
    }
}
