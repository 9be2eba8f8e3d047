//! optimization — optimizer stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer used by the Laplace core: an
//! Argmin-backed first-order minimizer for stateful objectives, a bounded
//! 1-D line search for Newton steps, numerically stable transforms and
//! dense factorizations, all reporting failures through one error enum.
//!
//! Key behaviors
//! -------------
//! - [`first_order`]: L-BFGS (More–Thuente or Hager–Zhang) over any
//!   `FirstOrderCostFunction`, with validated options and outcomes.
//! - [`line_search`]: the `LineSearch` trait and a Brent implementation.
//! - [`numerical_stability`]: safe softplus/logistic, curvature helpers,
//!   Cholesky / triangular / LU routines over `ndarray`.
//! - [`errors`]: `OptError` / `OptResult<T>`, including recovery of our own
//!   errors after a round trip through `argmin::core::Error`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Costs are minimized as given; callers decide sign conventions.
//! - Invalid configuration and numerical breakdown are reported as
//!   `OptError` values, not panics.
//!
//! Conventions
//! -----------
//! - Vectors and matrices are `ndarray` containers over `f64`.
//! - This layer does not log; progress output is limited to the optional
//!   `obs_slog` observer.
//!
//! Testing notes
//! -------------
//! - Each submodule carries its own unit tests; the Laplace integration
//!   tests exercise the stack end to end.

pub mod errors;
pub mod first_order;
pub mod line_search;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::first_order::prelude::*;
    pub use super::line_search::{BrentLineSearch, LineMinimum, LineSearch, LineSearchOptions};
    pub use super::numerical_stability::prelude::*;
}
