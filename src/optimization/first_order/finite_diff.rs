//! first_order::finite_diff — finite-difference derivatives of fallible
//! scalar objectives.
//!
//! Purpose
//! -------
//! Give callers holding an objective that returns `OptResult<f64>` (and
//! that may mutate internal caches while evaluating) a way to obtain
//! numerical derivatives without touching the `finitediff` API directly.
//! The typical consumer is a test comparing an analytic gradient against
//! numerical differences of the same objective.
//!
//! Key behaviors
//! -------------
//! - [`central_diff_gradient`]: full central-difference gradient through
//!   `finitediff`, with the first error raised inside the objective
//!   captured and returned.
//! - [`central_diff_scalar`]: two-point central difference with an
//!   explicit step, for objectives that are only accurate to a known
//!   tolerance (an inner iterative solve), where the default `finitediff`
//!   step would be swamped by solver noise.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are evaluated sequentially; `FnMut` state is threaded
//!   through a `RefCell` because `finitediff` requires `Fn`.
//! - Returned gradients satisfy [`validate_grad`].
use crate::optimization::{
    errors::{OptError, OptResult},
    first_order::{
        types::{Grad, Variable},
        validation::{validate_grad, validate_value},
    },
};
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Central-difference gradient of a fallible objective at `x`.
///
/// The `finitediff` closure must return `f64`, so an objective error is
/// stored on first occurrence and the closure returns `NaN`; after the
/// sweep the stored error is returned.
///
/// # Errors
/// - The first error raised by `func`.
/// - [`OptError::GradientDimMismatch`] / [`OptError::InvalidGradient`] if
///   the resulting gradient fails validation.
pub fn central_diff_gradient<F>(x: &Variable, func: F) -> OptResult<Grad>
where
    F: FnMut(&Variable) -> OptResult<f64>,
{
    let func = RefCell::new(func);
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let wrapped = |x: &Variable| -> f64 {
        let mut f = func.borrow_mut();
        match (*f)(x) {
            Ok(v) => v,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let fd_grad = x.central_diff(&wrapped);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, x.len())?;
    Ok(fd_grad)
}

/// Two-point central difference `(f(x + h) − f(x − h)) / 2h`.
///
/// # Errors
/// - [`OptError::InvalidStepInterval`] when `h` is not finite and positive.
/// - Any error raised by `func`.
/// - [`OptError::NonFiniteCost`] if either evaluation is not finite.
pub fn central_diff_scalar<F>(x: f64, h: f64, mut func: F) -> OptResult<f64>
where
    F: FnMut(f64) -> OptResult<f64>,
{
    if !(h.is_finite() && h > 0.0) {
        return Err(OptError::InvalidStepInterval { lower: x - h, upper: x + h });
    }
    let plus = func(x + h)?;
    validate_value(plus)?;
    let minus = func(x - h)?;
    validate_value(minus)?;
    Ok((plus - minus) / (2.0 * h))
}
