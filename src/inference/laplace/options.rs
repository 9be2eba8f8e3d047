//! Configuration of the Newton mode finder.
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::line_search::LineSearchOptions,
};

/// Default Newton iteration cap.
pub const DEFAULT_NEWTON_MAX_ITER: usize = 20;
/// Default bound on `|ΔΨ|` between successive Newton iterations.
pub const DEFAULT_NEWTON_TOLERANCE: f64 = 1e-6;

/// Settings of the Newton mode finder.
///
/// - `max_iter`: iteration cap; reaching it is reported with a warning,
///   not an error.
/// - `tolerance`: the loop stops once `|Ψ_old − Ψ_new| ≤ tolerance`.
/// - `line_search`: interval, tolerance and evaluation budget of the
///   per-iteration step-length search.
///
/// Default: `max_iter = 20`, `tolerance = 1e-6`,
/// `line_search = LineSearchOptions::default()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOptions {
    pub max_iter: usize,
    pub tolerance: f64,
    pub line_search: LineSearchOptions,
}

impl NewtonOptions {
    /// Construct validated Newton options.
    ///
    /// # Errors
    /// [`InferenceError::InvalidNewtonOption`] when `max_iter == 0` or
    /// `tolerance` is not finite and non-negative.
    pub fn new(
        max_iter: usize, tolerance: f64, line_search: LineSearchOptions,
    ) -> InferenceResult<Self> {
        if max_iter == 0 {
            return Err(InferenceError::InvalidNewtonOption {
                option: "max_iter",
                value: 0.0,
                reason: "Iteration cap must be greater than zero.",
            });
        }
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(InferenceError::InvalidNewtonOption {
                option: "tolerance",
                value: tolerance,
                reason: "Tolerance must be finite and non-negative.",
            });
        }
        Ok(Self { max_iter, tolerance, line_search })
    }
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_NEWTON_MAX_ITER,
            tolerance: DEFAULT_NEWTON_TOLERANCE,
            line_search: LineSearchOptions::default(),
        }
    }
}
