//! laplace_gp — Laplace approximation for Gaussian process models with
//! non-Gaussian likelihoods.
//!
//! Purpose
//! -------
//! Compute the Laplace approximation to the posterior over latent function
//! values of a GP: find the posterior mode, build the Gaussian approximation
//! around it, and expose the negative log marginal likelihood (NLML) with
//! its gradient for every hyperparameter, ready for an outer optimizer.
//!
//! Key behaviors
//! -------------
//! - [`gp`]: collaborator interfaces (likelihood, kernel, mean) and
//!   reference implementations (Gaussian, Student's t and logit
//!   likelihoods; squared-exponential kernel; zero, constant and linear
//!   means).
//! - [`inference`]: the Laplace core (Newton mode finding with a Brent line
//!   search, Cholesky or LU posterior factorization, NLML and gradients)
//!   behind [`inference::SingleLaplaceInference`].
//! - [`optimization`]: the numerical substrate (Argmin-backed L-BFGS for
//!   stateful objectives, bounded line search, stable transforms and dense
//!   factorizations).
//!
//! Invariants & assumptions
//! ------------------------
//! - Library code reports failures through typed error enums
//!   (`GpError`, `OptError`, `InferenceError`) and never installs a logger.
//! - All numerics are `f64` over `ndarray` containers; dense factorizations
//!   go through `nalgebra`.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use laplace_gp::gp::prelude::*;
//! use laplace_gp::inference::prelude::*;
//! use ndarray::array;
//!
//! let mut gp = SingleLaplaceInference::new(
//!     array![[0.0], [0.5], [1.0]],
//!     array![1.0, -1.0, 1.0],
//!     Box::new(SquaredExponentialKernel::isotropic(1.0, 1.0)?),
//!     Box::new(ZeroMean),
//!     Box::new(LogitLikelihood::new()),
//! )?;
//! let nlml = gp.negative_log_marginal_likelihood()?;
//! let grads = gp.gradient_all()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; `tests/` holds the end-to-end
//!   scenarios, including finite-difference checks of every gradient.

pub mod gp;
pub mod inference;
pub mod optimization;
