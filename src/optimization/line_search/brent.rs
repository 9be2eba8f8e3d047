//! Brent's method on a bounded interval, driven through Argmin's `BrentOpt`.
use std::cell::{Cell, RefCell};

use crate::optimization::{
    errors::{OptError, OptResult},
    line_search::{LineMinimum, LineSearch, LineSearchOptions},
};
use argmin::{
    core::{CostFunction, Error, Executor},
    solver::brent::BrentOpt,
};

/// Brent line search (golden section with parabolic interpolation).
///
/// `BrentOpt` spends one evaluation on initialization and one per
/// iteration, so the iteration cap is `max_evals - 1`. The best point is
/// tracked on this side of the Argmin boundary from the raw evaluations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrentLineSearch;

impl BrentLineSearch {
    pub fn new() -> Self {
        Self
    }
}

impl LineSearch for BrentLineSearch {
    fn minimize(
        &self, objective: &mut dyn FnMut(f64) -> OptResult<f64>, lower: f64, upper: f64,
        opts: &LineSearchOptions,
    ) -> OptResult<LineMinimum> {
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(OptError::InvalidStepInterval { lower, upper });
        }
        if opts.max_evals == 0 {
            return Err(OptError::InvalidMaxEvals { max_evals: 0 });
        }
        let problem = TrackedObjective::new(objective);
        let solver = BrentOpt::new(lower, upper).set_tolerance(f64::EPSILON.sqrt(), opts.tolerance);
        let max_iters = (opts.max_evals - 1) as u64;
        Executor::new(&problem, solver).configure(|state| state.max_iters(max_iters)).run()?;

        match problem.best.get() {
            Some((step, value)) => Ok(LineMinimum {
                step,
                value,
                evals: problem.evals.get(),
                last_step: problem.last_step.get(),
            }),
            None => Err(OptError::MissingBestVariable),
        }
    }
}

// ---- Helper types ----

/// Wraps the caller's objective for Argmin, counting evaluations and
/// remembering the best and the most recent point.
struct TrackedObjective<'a> {
    objective: RefCell<&'a mut dyn FnMut(f64) -> OptResult<f64>>,
    evals: Cell<usize>,
    best: Cell<Option<(f64, f64)>>,
    last_step: Cell<f64>,
}

impl<'a> TrackedObjective<'a> {
    fn new(objective: &'a mut dyn FnMut(f64) -> OptResult<f64>) -> Self {
        Self {
            objective: RefCell::new(objective),
            evals: Cell::new(0),
            best: Cell::new(None),
            last_step: Cell::new(f64::NAN),
        }
    }
}

impl CostFunction for &TrackedObjective<'_> {
    type Param = f64;
    type Output = f64;

    /// Non-finite values are reported as `f64::MAX` so Brent's parabolic
    /// step stays in finite arithmetic.
    fn cost(&self, step: &Self::Param) -> Result<Self::Output, Error> {
        let raw = {
            let mut objective = self.objective.borrow_mut();
            (&mut **objective)(*step)?
        };
        let value = if raw.is_finite() { raw } else { f64::MAX };
        self.evals.set(self.evals.get() + 1);
        self.last_step.set(*step);
        match self.best.get() {
            Some((_, best)) if best <= value => {}
            _ => self.best.set(Some((*step, value))),
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    // Purpose
    // -------
    // Brent finds the interior minimizer of a smooth unimodal function to
    // within the requested tolerance.
    //
    // Given
    // -----
    // - f(x) = (x − 1.3)² + 0.5 on [0, 10], budget 50 evaluations.
    //
    // Expect
    // ------
    // - step ≈ 1.3, value ≈ 0.5, and the reported evaluation count equals
    //   the number of objective calls.
    fn brent_locates_interior_minimum() {
        // Arrange
        let opts = LineSearchOptions::new(1e-8, 10.0, 50).expect("valid options");
        let mut calls = 0usize;
        let mut f = |x: f64| -> OptResult<f64> {
            calls += 1;
            Ok((x - 1.3) * (x - 1.3) + 0.5)
        };

        // Act
        let min = BrentLineSearch::new().minimize(&mut f, 0.0, 10.0, &opts).expect("search");

        // Assert
        assert_abs_diff_eq!(min.step, 1.3, epsilon = 1e-5);
        assert_abs_diff_eq!(min.value, 0.5, epsilon = 1e-9);
        assert_eq!(min.evals, calls);
        assert!(min.evals <= 50);
    }

    #[test]
    // Purpose
    // -------
    // The evaluation budget is a hard cap.
    fn brent_respects_evaluation_budget() {
        let opts = LineSearchOptions::new(1e-12, 10.0, 4).expect("valid options");
        let mut f = |x: f64| -> OptResult<f64> { Ok((x - 7.7).powi(4)) };

        let min = BrentLineSearch::new().minimize(&mut f, 0.0, 10.0, &opts).expect("search");

        assert!(min.evals <= 4);
        assert!(min.value.is_finite());
    }

    #[test]
    // Purpose
    // -------
    // Non-finite objective values are treated as very large but never
    // reported as the minimum when a finite value exists.
    fn brent_skips_non_finite_values() {
        let opts = LineSearchOptions::new(1e-6, 10.0, 30).expect("valid options");
        let mut f =
            |x: f64| -> OptResult<f64> { if x > 5.0 { Ok(f64::NAN) } else { Ok((x - 2.0).powi(2)) } };

        let min = BrentLineSearch::new().minimize(&mut f, 0.0, 10.0, &opts).expect("search");

        assert!(min.step <= 5.0);
        assert_abs_diff_eq!(min.step, 2.0, epsilon = 1e-2);
    }

    #[test]
    // Purpose
    // -------
    // Objective errors and invalid intervals surface as errors.
    fn brent_propagates_errors() {
        let opts = LineSearchOptions::default();
        let mut failing = |_: f64| -> OptResult<f64> { Err(OptError::NonFiniteCost { value: 0.0 }) };
        assert_eq!(
            BrentLineSearch::new().minimize(&mut failing, 0.0, 1.0, &opts),
            Err(OptError::NonFiniteCost { value: 0.0 })
        );

        let mut ok = |x: f64| -> OptResult<f64> { Ok(x) };
        assert!(matches!(
            BrentLineSearch::new().minimize(&mut ok, 1.0, 1.0, &opts),
            Err(OptError::InvalidStepInterval { .. })
        ));
    }
}
