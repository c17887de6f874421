//! Semantic labeled containers.
//!
//! Simulation loops accumulate results into labeled sequences and tables
//! whose subtype documents what the label axis means:
//!
//! - [`TimeSeries`]: values indexed by time.
//! - [`SweepSeries`]: values indexed by a swept parameter.
//! - [`State`]: a named bundle of state variables.
//! - [`TimeFrame`] / [`SweepFrame`]: tables of the above, one labeled row
//!   per time point or parameter value, with a fixed set of named columns.
//!
//! The subtypes share one structure ([`Series<K>`] and [`Frame<K>`] over a
//! kind marker), so cloning preserves the subtype and a frame's columns
//! come back as the right series kind. Labels may be numbers, text, or
//! unit-bearing quantities; a quantity label and an equal bare number
//! resolve to the same entry, because simulation code constructs both for
//! what should be the same row.
//!
//! Looking up an absent label is a distinct [`LabelError::Missing`] — never
//! a silent default — so a mistyped variable name surfaces immediately.

mod frame;
mod label;
mod series;
mod system;

pub use frame::{Frame, FrameKind, SweepFrame, SweepFrameKind, TimeFrame, TimeFrameKind};
pub use label::Label;
pub use series::{
    Series, SeriesKind, SeriesUnits, State, SweepAxis, SweepSeries, TimeAxis, TimeSeries, VarAxis,
    magnitudes,
};
pub use system::System;

use thiserror::Error;

/// Errors raised by label and column lookup on containers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabelError {
    /// No entry with a matching label exists.
    #[error("no entry labeled `{label}`")]
    Missing {
        /// The label that was looked up.
        label: Label,
    },

    /// The frame does not declare a column with this name.
    #[error("no column named `{name}`")]
    MissingColumn {
        /// The column name that was looked up.
        name: String,
    },

    /// The container has no entries.
    #[error("the container is empty")]
    Empty,

    /// A row supplied more values than the frame declares columns.
    #[error("row has {got} values but the frame declares {expected} columns")]
    RowArity {
        /// Number of declared columns.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },
}
