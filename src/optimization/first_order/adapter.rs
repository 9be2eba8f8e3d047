//! Adapter that exposes a stateful [`FirstOrderCostFunction`] as an `argmin`
//! problem.
//!
//! `argmin` evaluates a problem through `&self` at an explicit parameter
//! vector, while our cost functions own their variable and update cached
//! state on every evaluation. The adapter bridges the two: every call writes
//! the candidate into the cost function's variable and then evaluates at the
//! current variable. The inner borrow lives in a `RefCell` because `argmin`
//! only hands out shared references.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    first_order::{
        traits::FirstOrderCostFunction,
        types::{Cost, Grad, Variable},
        validation::{validate_grad, validate_variable_len},
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a [`FirstOrderCostFunction`] to `argmin`'s `CostFunction` and
/// `Gradient`.
///
/// - `CostFunction::cost` writes `θ` into the variable and returns the cost.
/// - `Gradient::gradient` writes `θ` into the variable and returns the
///   validated gradient.
pub struct ArgMinAdapter<'a> {
    inner: RefCell<&'a mut dyn FirstOrderCostFunction>,
    dim: usize,
}

impl<'a> ArgMinAdapter<'a> {
    /// Wrap a cost function; its current variable length fixes the problem
    /// dimension.
    pub fn new(inner: &'a mut dyn FirstOrderCostFunction) -> Self {
        let dim = inner.variable().len();
        Self { inner: RefCell::new(inner), dim }
    }

    /// Problem dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn write_variable(&self, x: &Variable) -> Result<(), Error> {
        validate_variable_len(x, self.dim)?;
        let mut inner = self.inner.borrow_mut();
        inner.variable().assign(x);
        Ok(())
    }
}

impl std::fmt::Debug for ArgMinAdapter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgMinAdapter").field("dim", &self.dim).finish()
    }
}

impl CostFunction for ArgMinAdapter<'_> {
    type Param = Variable;
    type Output = Cost;

    /// Evaluate the cost at `θ`.
    ///
    /// # Errors
    /// - [`OptError::VariableDimMismatch`] if `θ` has the wrong length.
    /// - [`OptError::NonFiniteCost`] if the cost is `NaN` or infinite.
    /// - Any error raised by the wrapped cost function.
    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        self.write_variable(x)?;
        let value = self.inner.borrow_mut().cost()?;
        if !value.is_finite() {
            return Err((OptError::NonFiniteCost { value }).into());
        }
        Ok(value)
    }
}

impl Gradient for ArgMinAdapter<'_> {
    type Param = Variable;
    type Gradient = Grad;

    /// Evaluate the gradient at `θ`.
    ///
    /// # Errors
    /// - [`OptError::VariableDimMismatch`] if `θ` has the wrong length.
    /// - [`OptError::GradientDimMismatch`] / [`OptError::InvalidGradient`]
    ///   if the returned gradient fails validation.
    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, Error> {
        self.write_variable(x)?;
        let grad = self.inner.borrow_mut().gradient()?;
        validate_grad(&grad, self.dim)?;
        Ok(grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use ndarray::array;

    /// `c(x) = ½‖x − t‖²` with an evaluation counter.
    struct ShiftedQuadratic {
        x: Variable,
        target: Variable,
        evals: usize,
    }

    impl FirstOrderCostFunction for ShiftedQuadratic {
        fn cost(&mut self) -> OptResult<Cost> {
            self.evals += 1;
            let d = &self.x - &self.target;
            Ok(0.5 * d.dot(&d))
        }

        fn gradient(&mut self) -> OptResult<Grad> {
            Ok(&self.x - &self.target)
        }

        fn variable(&mut self) -> &mut Variable {
            &mut self.x
        }
    }

    #[test]
    // Purpose
    // -------
    // Each argmin evaluation must move the wrapped variable to the requested
    // point before evaluating.
    //
    // Given
    // -----
    // - A shifted quadratic starting at the origin with target (1, 2).
    //
    // Expect
    // ------
    // - Cost and gradient at (1, 0) match the closed forms and the wrapped
    //   variable ends at (1, 0).
    fn adapter_writes_variable_before_evaluating() {
        // Arrange
        let mut quad = ShiftedQuadratic { x: array![0.0, 0.0], target: array![1.0, 2.0], evals: 0 };

        // Act
        {
            let adapter = ArgMinAdapter::new(&mut quad);
            let c = adapter.cost(&array![1.0, 0.0]).expect("cost should evaluate");
            let g = adapter.gradient(&array![1.0, 0.0]).expect("gradient should evaluate");

            // Assert
            assert_eq!(c, 2.0);
            assert_eq!(g, array![0.0, -2.0]);
        }
        assert_eq!(quad.x, array![1.0, 0.0]);
        assert_eq!(quad.evals, 1);
    }

    #[test]
    // Purpose
    // -------
    // A candidate of the wrong length is rejected before touching state.
    fn adapter_rejects_wrong_length_candidate() {
        let mut quad = ShiftedQuadratic { x: array![0.0, 0.0], target: array![1.0, 2.0], evals: 0 };
        let adapter = ArgMinAdapter::new(&mut quad);

        let err = adapter.cost(&array![1.0]).expect_err("length mismatch must fail");

        assert_eq!(OptError::from(err), OptError::VariableDimMismatch { expected: 2, found: 1 });
    }
}
