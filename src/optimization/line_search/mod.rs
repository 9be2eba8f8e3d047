//! line_search — bounded, derivative-free 1-D minimization.
//!
//! Purpose
//! -------
//! Supply the step-length search used once per Newton iteration of the
//! Laplace mode finder. The search is expressed as a trait so the Newton
//! driver depends only on "minimize this scalar function over an interval";
//! the crate ships a Brent implementation backed by Argmin's `BrentOpt`.
//!
//! Key behaviors
//! -------------
//! - [`LineSearch::minimize`] evaluates a fallible objective on a closed
//!   interval and returns the best point found as a [`LineMinimum`].
//! - Termination is governed by [`LineSearchOptions`]: an absolute
//!   interval tolerance and a hard evaluation budget.
//! - Objective errors abort the search and are returned unchanged.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower < upper`, both finite; otherwise
//!   [`OptError::InvalidStepInterval`](crate::optimization::errors::OptError::InvalidStepInterval).
//! - Non-finite objective values are treated as "worse than anything
//!   finite" rather than as errors.
//! - The objective is evaluated sequentially; implementations never cache
//!   or reorder calls, so an objective with side effects sees every
//!   evaluation in order.

pub mod brent;

use crate::optimization::errors::{OptError, OptResult};

pub use self::brent::BrentLineSearch;

/// Bounded 1-D minimizer.
pub trait LineSearch: std::fmt::Debug {
    /// Minimize `objective` over `[lower, upper]`.
    ///
    /// # Errors
    /// - [`OptError::InvalidStepInterval`] for an empty or non-finite interval.
    /// - Any error raised by `objective`.
    fn minimize(
        &self, objective: &mut dyn FnMut(f64) -> OptResult<f64>, lower: f64, upper: f64,
        opts: &LineSearchOptions,
    ) -> OptResult<LineMinimum>;
}

/// Result of a bounded 1-D search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMinimum {
    /// Minimizing point.
    pub step: f64,
    /// Objective value at `step`.
    pub value: f64,
    /// Number of objective evaluations performed.
    pub evals: usize,
    /// Point of the most recent evaluation; callers whose objective has
    /// side effects compare it against `step` to know whether their state
    /// already reflects the minimum.
    pub last_step: f64,
}

/// Configuration of the step-length search.
///
/// - `tolerance`: absolute interval tolerance (default `1e-6`).
/// - `max_step`: upper end of the step interval `[0, max_step]` searched by
///   the Newton driver (default `10`).
/// - `max_evals`: objective evaluation budget (default `10`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchOptions {
    pub tolerance: f64,
    pub max_step: f64,
    pub max_evals: usize,
}

impl LineSearchOptions {
    /// Construct validated line-search options.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolCost`] if `tolerance` is not finite and positive.
    /// - [`OptError::InvalidStepInterval`] if `max_step` is not finite and positive.
    /// - [`OptError::InvalidMaxEvals`] if `max_evals == 0`.
    pub fn new(tolerance: f64, max_step: f64, max_evals: usize) -> OptResult<Self> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(OptError::InvalidTolCost {
                tol: tolerance,
                reason: "Line-search tolerance must be finite and positive.",
            });
        }
        if !(max_step.is_finite() && max_step > 0.0) {
            return Err(OptError::InvalidStepInterval { lower: 0.0, upper: max_step });
        }
        if max_evals == 0 {
            return Err(OptError::InvalidMaxEvals { max_evals });
        }
        Ok(Self { tolerance, max_step, max_evals })
    }
}

impl Default for LineSearchOptions {
    fn default() -> Self {
        Self { tolerance: 1e-6, max_step: 10.0, max_evals: 10 }
    }
}
