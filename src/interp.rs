//! Interpolation and numerical differentiation of labeled series.
//!
//! [`interpolate`] builds a linear interpolant over a series, validating
//! up front that the labels increase strictly and the values are NaN-free;
//! [`gradient`] differentiates a series numerically with centered
//! differences on the interior (uneven spacing supported) and one-sided
//! differences at the ends.
//!
//! Both respect units: a series of meters over second-valued labels
//! differentiates to meters per second, and an interpolant built over
//! bare labels strips the units from a unit-bearing query time, which is
//! what slope functions need when an adaptive solver hands them bare
//! numeric time.

use thiserror::Error;

use crate::container::{Series, SeriesKind};
use crate::numerics::{has_nan, is_strictly_increasing};
use crate::units::{DIMENSIONLESS, DimensionError, Units, Value};

/// Errors raised while building or querying an interpolant or gradient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpError {
    /// The series has fewer than two entries.
    #[error("series needs at least two entries, got {len}")]
    TooShort {
        /// Number of entries present.
        len: usize,
    },

    /// The series labels do not increase strictly.
    #[error("series labels must be strictly increasing")]
    NotIncreasing,

    /// The series contains NaN labels or values.
    #[error("series contains NaN entries")]
    HasNan,

    /// A label is text and has no numeric position.
    #[error("series labels must be numeric")]
    TextLabel,

    /// Labels or values mix different unit tags.
    #[error("series entries mix different units")]
    MixedUnits,

    /// The query lies outside the labeled range.
    #[error("query {query} is outside the interpolation range [{min}, {max}]")]
    OutOfRange {
        /// The query position, in label units.
        query: f64,
        /// Smallest label.
        min: f64,
        /// Largest label.
        max: f64,
    },

    /// A dimensional-consistency failure from the units engine.
    #[error(transparent)]
    Dimension(#[from] DimensionError),
}

/// A series reduced to raw grids plus the unit tags in force.
#[derive(Debug)]
struct NumericView {
    xs: Vec<f64>,
    ys: Vec<f64>,
    label_units: Units,
    value_units: Units,
}

fn numeric_view<K: SeriesKind>(series: &Series<K>) -> Result<NumericView, InterpError> {
    if series.len() < 2 {
        return Err(InterpError::TooShort { len: series.len() });
    }

    let mut xs = Vec::with_capacity(series.len());
    let mut ys = Vec::with_capacity(series.len());
    let mut label_units = None;
    let mut value_units = None;

    for (label, value) in series.iter() {
        let position = label.value().ok_or(InterpError::TextLabel)?;
        match label_units {
            None => label_units = Some(position.units()),
            Some(u) if u == position.units() => {}
            Some(_) => return Err(InterpError::MixedUnits),
        }
        match value_units {
            None => value_units = Some(value.units()),
            Some(u) if u == value.units() => {}
            Some(_) => return Err(InterpError::MixedUnits),
        }
        xs.push(position.magnitude());
        ys.push(value.magnitude());
    }

    if has_nan(&xs) || has_nan(&ys) {
        return Err(InterpError::HasNan);
    }
    if !is_strictly_increasing(&xs) {
        return Err(InterpError::NotIncreasing);
    }

    Ok(NumericView {
        xs,
        ys,
        label_units: label_units.unwrap_or(DIMENSIONLESS),
        value_units: value_units.unwrap_or(DIMENSIONLESS),
    })
}

/// A linear interpolant over a labeled series.
///
/// Built by [`interpolate`]; query with [`at`](Self::at).
#[derive(Debug)]
pub struct Interpolator {
    view: NumericView,
}

impl Interpolator {
    /// Evaluates the interpolant.
    ///
    /// A unit-bearing query over bare labels is stripped to its
    /// magnitude; over unit-bearing labels it is converted to the label
    /// units. Results carry the series' value units.
    ///
    /// # Errors
    ///
    /// Returns [`InterpError::OutOfRange`] outside the labeled range and
    /// [`DimensionError::Incompatible`] for a query whose dimension does
    /// not match unit-bearing labels.
    pub fn at(&self, query: Value) -> Result<Value, InterpError> {
        let x = self.position_of(query)?;
        let xs = &self.view.xs;
        let (min, max) = (xs[0], xs[xs.len() - 1]);
        if x < min || x > max {
            return Err(InterpError::OutOfRange { query: x, min, max });
        }

        let i = match xs.iter().position(|&xi| xi >= x) {
            Some(0) => 1,
            Some(i) => i,
            None => xs.len() - 1,
        };
        let (x0, x1) = (xs[i - 1], xs[i]);
        let (y0, y1) = (self.view.ys[i - 1], self.view.ys[i]);
        let y = y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        Ok(Value::with_units(y, self.view.value_units))
    }

    fn position_of(&self, query: Value) -> Result<f64, InterpError> {
        if self.view.label_units.is_dimensionless() || matches!(query, Value::Plain(_)) {
            return Ok(query.magnitude());
        }
        if !query.units().same_dimension(&self.view.label_units) {
            return Err(DimensionError::Incompatible {
                op: "interpolate at",
                lhs: self.view.label_units,
                rhs: query.units(),
            }
            .into());
        }
        Ok(query.base_magnitude() / self.view.label_units.factor())
    }
}

/// Builds a linear interpolant over a series.
///
/// # Errors
///
/// Returns [`InterpError`] when the series is too short, mixes units,
/// contains NaN entries, or its labels do not increase strictly.
pub fn interpolate<K: SeriesKind>(series: &Series<K>) -> Result<Interpolator, InterpError> {
    Ok(Interpolator {
        view: numeric_view(series)?,
    })
}

/// Numerically differentiates a series with respect to its labels.
///
/// Centered differences on interior labels (correct for uneven spacing),
/// one-sided differences at the ends. The result keeps the series'
/// labels and subtype; its units are the value units over the label
/// units.
///
/// # Errors
///
/// Returns [`InterpError`] under the same conditions as [`interpolate`].
pub fn gradient<K: SeriesKind>(series: &Series<K>) -> Result<Series<K>, InterpError> {
    let view = numeric_view(series)?;
    let (xs, ys) = (&view.xs, &view.ys);
    let n = xs.len();
    let units = view.value_units / view.label_units;

    let mut grads = Vec::with_capacity(n);
    grads.push((ys[1] - ys[0]) / (xs[1] - xs[0]));
    for i in 1..n - 1 {
        let hs = xs[i] - xs[i - 1];
        let hd = xs[i + 1] - xs[i];
        grads.push(
            (hs * hs * ys[i + 1] + (hd * hd - hs * hs) * ys[i] - hd * hd * ys[i - 1])
                / (hs * hd * (hd + hs)),
        );
    }
    grads.push((ys[n - 1] - ys[n - 2]) / (xs[n - 1] - xs[n - 2]));

    Ok(Series::from_pairs(
        series
            .labels()
            .cloned()
            .zip(grads.into_iter().map(|g| Value::with_units(g, units))),
    ))
}
