//! Runs argmin's L-BFGS against a [`FirstOrderCostFunction`] and leaves the
//! objective at the best point found.
use crate::optimization::{
    errors::OptResult,
    first_order::{
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        traits::{
            FirstOrderCostFunction, FirstOrderMinimizer, LineSearcher, MinimizerOptions,
            OptimOutcome,
        },
        types::{Grad, Variable},
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run an `argmin` solver on an adapted cost function.
///
/// Wires up the problem, the solver, the initial variable `x0`, the
/// optional `max_iters` cap and (behind `obs_slog`, when `opts.verbose`)
/// a terminal slog observer, then converts the final state into an
/// [`OptimOutcome`] whose `value` is the best cost reached.
///
/// # Errors
/// - Any `argmin` runtime error, including errors raised by the wrapped
///   cost function, recovered through `From<argmin::core::Error>`.
/// - Validation errors when building the [`OptimOutcome`].
pub fn run_lbfgs<'a, S>(
    x0: Variable, opts: &MinimizerOptions, problem: ArgMinAdapter<'a>, solver: S,
) -> OptResult<OptimOutcome>
where
    S: argmin::core::Solver<
            ArgMinAdapter<'a>,
            argmin::core::IterState<Variable, Grad, (), (), (), f64>,
        > + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&x0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(x0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

/// L-BFGS implementation of [`FirstOrderMinimizer`].
///
/// Starts from the cost function's current variable. On success the best
/// point is written back and the cost is evaluated once more there, so any
/// state cached by the cost function matches the returned outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LbfgsMinimizer {
    pub opts: MinimizerOptions,
}

impl LbfgsMinimizer {
    pub fn new(opts: MinimizerOptions) -> Self {
        Self { opts }
    }
}

impl FirstOrderMinimizer for LbfgsMinimizer {
    fn minimize(&self, cost: &mut dyn FirstOrderCostFunction) -> OptResult<OptimOutcome> {
        let x0 = cost.variable().clone();
        let outcome = {
            let problem = ArgMinAdapter::new(&mut *cost);
            match self.opts.line_searcher {
                LineSearcher::MoreThuente => {
                    let solver = build_optimizer_more_thuente(&self.opts)?;
                    run_lbfgs(x0, &self.opts, problem, solver)?
                }
                LineSearcher::HagerZhang => {
                    let solver = build_optimizer_hager_zhang(&self.opts)?;
                    run_lbfgs(x0, &self.opts, problem, solver)?
                }
            }
        };
        cost.variable().assign(&outcome.best);
        cost.cost()?;
        log::debug!(
            "L-BFGS finished: {} after {} iterations, cost = {:.10e}",
            outcome.status,
            outcome.iterations,
            outcome.value
        );
        Ok(outcome)
    }
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state(x0: &Variable, problem: &ArgMinAdapter<'_>) -> OptResult<()> {
    let c0 = problem.cost(x0)?;
    let g0n = problem.gradient(x0).ok().map(|g| g.l2_norm());

    log::info!(
        "L-BFGS start: cost = {c0:.6}{}",
        g0n.map(|n| format!(", |grad| = {n:.6}")).unwrap_or_default()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::first_order::{traits::Tolerances, types::Cost};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, array};

    /// Convex quadratic `½ xᵀ A x − bᵀ x` with minimizer `A⁻¹ b` and a
    /// cached copy of the last evaluated variable.
    struct Quadratic {
        x: Variable,
        last_eval: Option<Variable>,
    }

    impl Quadratic {
        fn a() -> ndarray::Array2<f64> {
            array![[3.0, 1.0], [1.0, 2.0]]
        }

        fn b() -> Array1<f64> {
            array![1.0, -1.0]
        }
    }

    impl FirstOrderCostFunction for Quadratic {
        fn cost(&mut self) -> OptResult<Cost> {
            self.last_eval = Some(self.x.clone());
            Ok(0.5 * self.x.dot(&Self::a().dot(&self.x)) - Self::b().dot(&self.x))
        }

        fn gradient(&mut self) -> OptResult<Grad> {
            Ok(Self::a().dot(&self.x) - Self::b())
        }

        fn variable(&mut self) -> &mut Variable {
            &mut self.x
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line-search flavors drive a convex quadratic to its closed-form
    // minimizer and leave the cost function settled at that point.
    //
    // Given
    // -----
    // - A = [[3, 1], [1, 2]], b = [1, −1], minimizer x* = (0.6, −0.8).
    //
    // Expect
    // ------
    // - `best ≈ x*`, `value ≈ −½ bᵀx* = −0.7`.
    // - The cost function's variable and last evaluation equal `best`.
    fn lbfgs_minimizer_solves_quadratic_for_both_line_searches() {
        for searcher in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let tols = Tolerances::new(Some(1e-10), Some(1e-14), Some(200))
                .expect("valid tolerances");
            let opts = MinimizerOptions::new(tols, searcher, false, None).expect("valid options");
            let minimizer = LbfgsMinimizer::new(opts);
            let mut quad = Quadratic { x: array![0.0, 0.0], last_eval: None };

            // Act
            let outcome = minimizer.minimize(&mut quad).expect("L-BFGS should converge");

            // Assert
            assert_abs_diff_eq!(outcome.best[0], 0.6, epsilon = 1e-6);
            assert_abs_diff_eq!(outcome.best[1], -0.8, epsilon = 1e-6);
            assert_abs_diff_eq!(outcome.value, -0.7, epsilon = 1e-9);
            assert_eq!(quad.x, outcome.best);
            assert_eq!(quad.last_eval.as_ref(), Some(&outcome.best));
        }
    }
}
