//! The mode-finding objective as a stateful first-order cost function.
//!
//! Purpose
//! -------
//! Expose `Ψ(alpha)` and its gradient `Ks·(alpha − dlp(f))` to any
//! [`FirstOrderMinimizer`].
//!
//! Key behaviors
//! -------------
//! - The minimizer writes `alpha` in place through `variable()`; the mode
//!   state is refreshed lazily on the next cost or gradient request, so a
//!   cost/gradient pair at one point costs one likelihood evaluation.
//! - Failures that are not [`OptError`]s are parked and recovered by the
//!   caller with their original type.
//!
//! Invariants & assumptions
//! ------------------------
//! - `variable()` always marks the state stale.
//!
//! [`FirstOrderMinimizer`]: crate::optimization::first_order::FirstOrderMinimizer
//! [`OptError`]: crate::optimization::errors::OptError
use crate::{
    inference::{
        errors::{InferenceError, park_error},
        laplace::state::{ModeProblem, ModeState},
    },
    optimization::{
        errors::OptResult,
        first_order::{Cost, FirstOrderCostFunction, Grad, Variable},
    },
};

/// Stateful `Ψ(alpha)` over a borrowed problem and mode state.
#[derive(Debug)]
pub struct LaplaceCostFunction<'s, 'p> {
    problem: &'s ModeProblem<'p>,
    state: &'s mut ModeState,
    fresh: bool,
    failure: Option<InferenceError>,
}

impl<'s, 'p> LaplaceCostFunction<'s, 'p> {
    pub fn new(problem: &'s ModeProblem<'p>, state: &'s mut ModeState) -> Self {
        Self { problem, state, fresh: false, failure: None }
    }

    /// Error raised by the model during the last evaluation, if any. The
    /// optimizer only sees a textual copy of it.
    pub fn take_failure(&mut self) -> Option<InferenceError> {
        self.failure.take()
    }

    fn sync(&mut self) -> OptResult<()> {
        if !self.fresh {
            self.problem.refresh(self.state).map_err(|err| park_error(err, &mut self.failure))?;
            self.fresh = true;
        }
        Ok(())
    }
}

impl FirstOrderCostFunction for LaplaceCostFunction<'_, '_> {
    /// `Ψ = ½·alpha·(f − m) − Σ log p(y|f)` with `f = Ks·alpha + m`.
    fn cost(&mut self) -> OptResult<Cost> {
        self.sync()?;
        Ok(self.state.psi)
    }

    fn gradient(&mut self) -> OptResult<Grad> {
        self.sync()?;
        Ok(self.problem.gradient_wrt_alpha(self.state))
    }

    fn variable(&mut self) -> &mut Variable {
        self.fresh = false;
        &mut self.state.alpha
    }
}
