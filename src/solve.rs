//! Wrappers that normalize the calling convention of the numerical
//! methods the course relies on.
//!
//! Three families share one convention:
//!
//! - **Fixed-step ODE integration**: [`run_euler`] and [`run_ralston`]
//!   advance an initial [`State`] over a fixed time grid and return a
//!   [`TimeFrame`] of trajectories plus a [`Details`] record. The
//!   `*_until` variants watch a set of event functions and stop at the
//!   first zero crossing.
//! - **Adaptive ODE integration**: [`run_solve_ivp`] wraps a
//!   Dormand–Prince 5(4) stepper, stripping units before stepping and
//!   re-applying them to the results.
//! - **Scalar searches**: [`root_bisect`] and
//!   [`minimize_golden`]/[`maximize_golden`] bracket a root or extremum
//!   and report convergence as data.
//!
//! Failure semantics follow two rules. Non-convergence is never an
//! error: callers branch on [`RootResult::converged`],
//! [`GoldenResult::converged`], or [`Details::success`] mid-script.
//! Dimensional mistakes inside a user slope or error function, by
//! contrast, are real errors, and they propagate through these wrappers
//! unchanged so the message points at the offending expression.

mod golden;
mod ivp;
mod ode;
mod root;

pub use golden::{GoldenResult, maximize_golden, minimize_golden};
pub use ivp::{IvpOptions, run_solve_ivp, run_solve_ivp_until};
pub use ode::{run_euler, run_euler_until, run_ralston, run_ralston_until};
pub use root::{RootResult, root_bisect, root_scalar};

use thiserror::Error;

use crate::container::{LabelError, State, System};
use crate::interp::InterpError;
use crate::units::{DimensionError, Units, Value};

/// An event function: integration stops when its value crosses zero.
pub type EventFn<'a> = &'a dyn Fn(&State, Value, &System) -> Result<Value, SolveError>;

/// The shared unit tag of a search bracket; mixed dimensions are the
/// caller's mistake and surface as an error.
fn bracket_units(bracket: &[Value; 2]) -> Result<Units, SolveError> {
    let (lhs, rhs) = (bracket[0].units(), bracket[1].units());
    if !lhs.same_dimension(&rhs) {
        return Err(DimensionError::Incompatible { op: "bracket", lhs, rhs }.into());
    }
    Ok(lhs)
}

/// What happened during an integration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Details {
    /// Whether the run reached the end of the interval or a requested
    /// event; `false` means the step budget ran out.
    pub success: bool,

    /// Human-readable account of how the run ended.
    pub message: String,

    /// Number of accepted steps.
    pub num_steps: usize,

    /// The event that terminated the run, if any.
    pub event: Option<EventRecord>,
}

/// Which event function fired, and when.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Index into the caller's event slice.
    pub index: usize,

    /// Interpolated crossing time.
    pub time: Value,
}

/// Errors raised by the solver wrappers.
///
/// Dimensional failures from user functions pass through transparently;
/// everything else describes a malformed call.
#[derive(Debug, Error)]
pub enum SolveError {
    /// A dimensional-consistency failure, propagated unchanged.
    #[error(transparent)]
    Dimension(#[from] DimensionError),

    /// A missing state variable or parameter, propagated unchanged.
    #[error(transparent)]
    Label(#[from] LabelError),

    /// An interpolation failure inside a slope function.
    #[error(transparent)]
    Interp(#[from] InterpError),

    /// The slope function returned the wrong number of derivatives.
    #[error("slope function returned {got} derivatives for {expected} state variables")]
    SlopeArity {
        /// Number of state variables.
        expected: usize,
        /// Number of derivatives returned.
        got: usize,
    },

    /// The step size is zero, negative, or not finite.
    #[error("time step must be positive and finite")]
    BadStep,

    /// The time span contains no steps.
    #[error("time span from {t0} to {t_end} contains no steps")]
    EmptySpan {
        /// Start of the span.
        t0: Value,
        /// End of the span.
        t_end: Value,
    },
}
