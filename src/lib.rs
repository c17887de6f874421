//! # ModSim
//!
//! Building blocks for scripting small physical simulations: labeled
//! containers that keep model state readable, a lightweight runtime unit
//! system that catches dimensional mistakes as errors, and wrappers that
//! give ODE integration, root finding, and scalar optimization one
//! consistent calling convention.
//!
//! ## Crate layout
//!
//! - [`units`]: Runtime dimensional analysis — [`units::Value`] pairs a
//!   magnitude with a unit tag and refuses incompatible arithmetic.
//! - [`container`]: Labeled series and frames — [`container::State`],
//!   [`container::TimeSeries`], [`container::TimeFrame`], and friends —
//!   plus the [`container::System`] bundle the solvers consume.
//! - [`vector`]: Fixed-size 2D/3D vectors with units and the geometric
//!   helpers built on them.
//! - [`numerics`]: Grid builders and series difference helpers.
//! - [`interp`]: Linear interpolation and numerical gradients over
//!   labeled series.
//! - [`solve`]: Fixed-step and adaptive ODE integration, bisection, and
//!   golden-section search, all reporting non-convergence as data
//!   rather than errors.
//! - [`random`]: Bernoulli draws and seeded generators for reproducible
//!   stochastic models.
//!
//! ## Conventions
//!
//! Every solver takes a [`container::System`] holding the initial state,
//! the time span, and named parameters, and hands user callbacks the
//! state, the current time, and the system. Dimensional mistakes inside
//! a callback propagate out unchanged so the error message points at the
//! offending expression.

pub mod container;
pub mod interp;
pub mod numerics;
pub mod random;
pub mod solve;
pub mod units;
pub mod vector;
