//! first_order — argmin-powered minimization of stateful cost functions.
//!
//! Purpose
//! -------
//! Provide a pluggable first-order minimizer for objectives that own their
//! variable vector and refresh cached state as they are evaluated (the
//! Laplace mode objective `Psi(alpha)` is the motivating case). Callers
//! implement [`FirstOrderCostFunction`] and hand it to any
//! [`FirstOrderMinimizer`]; the crate ships [`LbfgsMinimizer`].
//!
//! Key behaviors
//! -------------
//! - Bridge stateful objectives into Argmin via [`adapter::ArgMinAdapter`],
//!   writing each candidate into the objective's variable before
//!   evaluating.
//! - Build L-BFGS with More–Thuente or Hager–Zhang line search
//!   ([`builders`]), execute it ([`run::run_lbfgs`]) and normalize results
//!   into an [`OptimOutcome`].
//! - Leave the objective settled at the returned optimum so cached state
//!   and variable agree on exit.
//! - Provide finite-difference helpers ([`finite_diff`]) for verifying
//!   analytic gradients of fallible objectives.
//!
//! Invariants & assumptions
//! ------------------------
//! - Costs are minimized as-is; no sign convention is imposed.
//! - Options ([`Tolerances`], [`MinimizerOptions`]) are validated on
//!   construction.
//! - Errors surface as [`OptError`](crate::optimization::errors::OptError);
//!   this module never panics on bad input.
//!
//! Testing notes
//! -------------
//! - Unit tests cover adapter state handling, builder wiring, tolerance
//!   validation, quadratic solves with both line searches and the
//!   finite-difference helpers.

pub mod adapter;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::run::LbfgsMinimizer;
pub use self::traits::{
    FirstOrderCostFunction, FirstOrderMinimizer, LineSearcher, MinimizerOptions, OptimOutcome,
    Tolerances,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Variable};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::run::LbfgsMinimizer;
    pub use super::traits::{
        FirstOrderCostFunction, FirstOrderMinimizer, LineSearcher, MinimizerOptions,
        OptimOutcome, Tolerances,
    };
    pub use super::types::{Cost, Grad, Variable};
}
