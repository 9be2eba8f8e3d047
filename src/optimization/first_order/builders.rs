//! first_order::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Hide Argmin's generic wiring behind two small builders that apply the
//! crate-level [`MinimizerOptions`] (tolerances, memory size). The initial
//! variable and the iteration cap are runtime concerns applied by
//! [`run_lbfgs`](crate::optimization::first_order::run::run_lbfgs).
//!
//! Invariants & assumptions
//! ------------------------
//! - Solvers operate on the canonical `(Variable, Grad, Cost)` triple.
//! - The L-BFGS memory is `opts.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`].
//! - Tolerances rejected by Argmin surface as [`OptError`] through the
//!   crate's `From<argmin::core::Error>` conversion.
//!
//! [`OptError`]: crate::optimization::errors::OptError
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    first_order::{
        traits::MinimizerOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Variable,
        },
    },
};

/// Construct L-BFGS with the Hager–Zhang line search.
///
/// # Errors
/// Propagates Argmin's rejection of any configured tolerance.
pub fn build_optimizer_hager_zhang(opts: &MinimizerOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(HagerZhangLS::new(), mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct L-BFGS with the More–Thuente line search.
///
/// # Errors
/// Propagates Argmin's rejection of any configured tolerance.
pub fn build_optimizer_more_thuente(opts: &MinimizerOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(MoreThuenteLS::new(), mem);
    configure_lbfgs(lbfgs, opts)
}

/// Apply the optional gradient and cost-change tolerances to an L-BFGS
/// solver, whatever its line search. Absent tolerances keep Argmin's
/// defaults.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Variable, Grad, Cost>, opts: &MinimizerOptions,
) -> OptResult<LBFGS<L, Variable, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
