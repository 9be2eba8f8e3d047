//! inference — the Laplace approximation and its error surface.
//!
//! Purpose
//! -------
//! Turn a GP model (features, labels, kernel, mean, non-Gaussian likelihood)
//! into the quantities an outer hyperparameter optimizer consumes: the
//! negative log marginal likelihood under the Laplace approximation and its
//! gradient with respect to every hyperparameter, plus the approximate
//! posterior at the training inputs.
//!
//! Key behaviors
//! -------------
//! - Define [`InferenceError`] / [`InferenceResult`], wrapping optimizer and
//!   collaborator failures and adding configuration and numerical ones
//!   (unsupported minimizer, non-positive determinant, non-finite results).
//! - [`laplace`]: mode finding, posterior factorization, NLML and gradients,
//!   orchestrated by [`SingleLaplaceInference`].
//!
//! Invariants & assumptions
//! ------------------------
//! - No result is computed from stale inputs: every accessor re-validates
//!   cached state against the dirty flags first.
//! - Failures are returned as [`InferenceError`]; nothing in this module
//!   panics on bad input or numerical breakdown.
//!
//! Conventions
//! -----------
//! - `Ks = K·exp(2·log_scale)` is the covariance the core works with.
//! - Logging goes through the `log` facade: per-iteration progress at
//!   `debug`, non-convergence at `warn`.
//!
//! Downstream usage
//! ----------------
//! - Build a [`SingleLaplaceInference`], then alternate
//!   `set_hyperparameter` with `negative_log_marginal_likelihood` and
//!   `gradient_all` inside an outer optimizer.
//! - `use laplace_gp::inference::prelude::*;` imports the main surface.

pub mod errors;
pub mod laplace;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{InferenceError, InferenceResult};
pub use self::laplace::{
    MinimizerKind, ModeMinimizer, NewtonOptimizer, NewtonOptions, PosteriorFactor,
    SingleLaplaceInference,
};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::laplace::{
        MinimizerKind, ModeMinimizer, ModeOutcome, NewtonOptimizer, NewtonOptions,
        PosteriorFactor, SingleLaplaceInference,
    };
}
