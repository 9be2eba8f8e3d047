//! gp — collaborators of the Laplace core: likelihoods, kernels, means.
//!
//! Purpose
//! -------
//! The Laplace approximation needs three pieces of model structure it does
//! not own: the observation likelihood, the prior covariance and the prior
//! mean. This module fixes their interfaces ([`LikelihoodModel`],
//! [`KernelProvider`], [`MeanFunctionProvider`]) and the shared
//! hyperparameter naming scheme ([`Parameterized`], [`Hyperparameter`]),
//! and ships reference implementations so the core is usable end to end.
//!
//! Key behaviors
//! -------------
//! - Likelihoods: Gaussian, Student's t (non log-concave, reports its
//!   degrees of freedom) and logit, each with derivatives in `f` up to
//!   third order and cross-derivatives in their hyperparameters.
//! - Kernel: squared exponential with ARD or isotropic length-scales.
//! - Means: zero, constant, linear.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every hyperparameter is addressed by name; unknown names are rejected
//!   as [`GpError::UnknownHyperparameter`] before anything is computed.
//! - Positive quantities are stored and differentiated on the log scale.
//!
//! Testing notes
//! -------------
//! - Each implementation checks its analytic derivatives against central
//!   finite differences.

pub mod errors;
pub mod kernel;
pub mod likelihood;
pub mod mean;
pub mod params;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{GpError, GpResult};
pub use self::kernel::{KernelProvider, SquaredExponentialKernel};
pub use self::likelihood::{
    DerivativeOrder, GaussianLikelihood, LikelihoodModel, LogitLikelihood, StudentsTLikelihood,
};
pub use self::mean::{ConstantMean, LinearMean, MeanFunctionProvider, ZeroMean};
pub use self::params::{Hyperparameter, LOG_SCALE, ParamGroup, ParamSpec, Parameterized};

pub mod prelude {
    pub use super::errors::{GpError, GpResult};
    pub use super::kernel::{KernelProvider, SquaredExponentialKernel};
    pub use super::likelihood::{
        GaussianLikelihood, LikelihoodModel, LogitLikelihood, StudentsTLikelihood,
    };
    pub use super::mean::{ConstantMean, LinearMean, MeanFunctionProvider, ZeroMean};
    pub use super::params::{Hyperparameter, ParamGroup, Parameterized};
}
