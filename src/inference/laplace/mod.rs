//! laplace — single-latent Laplace approximation.
//!
//! Purpose
//! -------
//! Find the mode of the posterior over latent function values, factor the
//! Gaussian approximation around it, and expose the negative log marginal
//! likelihood and its hyperparameter gradients.
//!
//! Key behaviors
//! -------------
//! - [`NewtonOptimizer`]: Newton iterations on the dual variables `alpha`
//!   with a bounded Brent search on the step length and curvature
//!   regularization for non log-concave likelihoods.
//! - [`LaplaceCostFunction`]: the same objective as a stateful first-order
//!   cost function, so L-BFGS can replace Newton ([`ModeMinimizer`]).
//! - [`PosteriorFactor`]: Cholesky of `I + sW·Ks·sW` when `W ≥ 0`, pivoted
//!   LU of `I + Ks·diag(W)` otherwise.
//! - [`GradientAux`]: the `Z`, `g`, `dfhat` precompute shared by the kernel,
//!   amplitude, likelihood and mean derivatives.
//! - [`SingleLaplaceInference`]: owner of data, collaborators and cached
//!   state, recomputing lazily behind dirty flags.
//!
//! Invariants & assumptions
//! ------------------------
//! - `f = Ks·alpha + m` after every evaluation of `Ψ`.
//! - Exactly one posterior branch is valid at a time, chosen by the sign of
//!   `min(W)` at the mode.
//! - Mode finding is not reentrant; one inference object runs one search at
//!   a time (enforced by `&mut self`).
//!
//! Testing notes
//! -------------
//! - Unit tests per submodule check closed forms (identity kernel with
//!   Gaussian noise), branch agreement against dense inverses, monotone Ψ
//!   traces and error paths.
//! - The integration suite checks every hyperparameter gradient against
//!   central finite differences in both posterior branches.

pub mod cost;
pub mod gradient;
pub mod marginal;
pub mod method;
pub mod minimizer;
pub mod newton;
pub mod options;
pub mod posterior;
pub mod state;

pub use self::cost::LaplaceCostFunction;
pub use self::gradient::GradientAux;
pub use self::marginal::negative_log_marginal_likelihood;
pub use self::method::SingleLaplaceInference;
pub use self::minimizer::{MinimizerKind, ModeMinimizer, ModeOutcome};
pub use self::newton::{NewtonOptimizer, NewtonOutcome};
pub use self::options::NewtonOptions;
pub use self::posterior::PosteriorFactor;
pub use self::state::{DirtyFlags, ModeProblem, ModeState};
