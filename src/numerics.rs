//! Small numeric helpers shared by the containers and solvers.
//!
//! The grid builders are generic over any float so they serve both raw
//! `f64` grids and narrower scalar types; the difference helpers operate
//! on labeled series and keep their label structure.

use num_traits::{Float, FromPrimitive};

use crate::container::{Series, SeriesKind};
use crate::units::{DimensionError, Value};

/// `n` evenly spaced points from `start` to `stop`, inclusive.
#[must_use]
pub fn linspace<T: Float + FromPrimitive>(start: T, stop: T, n: usize) -> Vec<T> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![start];
    }
    let step = (stop - start) / T::from_usize(n - 1).unwrap();
    (0..n)
        .map(|i| start + step * T::from_usize(i).unwrap())
        .collect()
}

/// `n` evenly spaced points from `start` toward `stop`, excluding `stop`.
#[must_use]
pub fn linspace_exclusive<T: Float + FromPrimitive>(start: T, stop: T, n: usize) -> Vec<T> {
    if n == 0 {
        return Vec::new();
    }
    let step = (stop - start) / T::from_usize(n).unwrap();
    (0..n)
        .map(|i| start + step * T::from_usize(i).unwrap())
        .collect()
}

/// Points from `start` to `stop` spaced by `step`, excluding the endpoint.
#[must_use]
pub fn linrange<T: Float + FromPrimitive>(start: T, stop: T, step: T) -> Vec<T> {
    steps_between(start, stop, step)
        .map(|n| grid(start, step, n))
        .unwrap_or_default()
}

/// Points from `start` to `stop` spaced by `step`, including the endpoint.
#[must_use]
pub fn linrange_inclusive<T: Float + FromPrimitive>(start: T, stop: T, step: T) -> Vec<T> {
    steps_between(start, stop, step)
        .map(|n| grid(start, step, n + 1))
        .unwrap_or_default()
}

fn steps_between<T: Float + FromPrimitive>(start: T, stop: T, step: T) -> Option<usize> {
    if step <= T::zero() || stop <= start {
        return None;
    }
    // Round so a span that is a near-exact multiple of the step lands on
    // the intended count despite floating-point representation.
    ((stop - start) / step).round().to_usize()
}

fn grid<T: Float + FromPrimitive>(start: T, step: T, n: usize) -> Vec<T> {
    (0..n)
        .map(|i| start + step * T::from_usize(i).unwrap())
        .collect()
}

/// Whether any element is NaN.
#[must_use]
pub fn has_nan<T: Float>(values: &[T]) -> bool {
    values.iter().any(|v| v.is_nan())
}

/// Whether the elements increase strictly.
#[must_use]
pub fn is_strictly_increasing<T: PartialOrd>(values: &[T]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

/// Differences between consecutive values: entry `i` holds
/// `v[i+1] - v[i]`, and the final entry is the missing marker so the
/// result keeps the input's length and labels.
///
/// # Errors
///
/// Returns [`DimensionError::Incompatible`] when neighboring values do
/// not share a dimension.
pub fn abs_diff<K: SeriesKind>(series: &Series<K>) -> Result<Series<K>, DimensionError> {
    diff_with(series, |next, current| next.try_sub(current))
}

/// Relative differences between consecutive values: entry `i` holds
/// `(v[i+1] - v[i]) / v[i]`, and the final entry is the missing marker.
///
/// # Errors
///
/// Returns [`DimensionError::Incompatible`] when neighboring values do
/// not share a dimension.
pub fn rel_diff<K: SeriesKind>(series: &Series<K>) -> Result<Series<K>, DimensionError> {
    diff_with(series, |next, current| {
        Ok(next.try_sub(current)? / current)
    })
}

fn diff_with<K: SeriesKind>(
    series: &Series<K>,
    f: impl Fn(Value, Value) -> Result<Value, DimensionError>,
) -> Result<Series<K>, DimensionError> {
    let values: Vec<Value> = series.values().collect();
    let mut out = Series::new();
    for (i, label) in series.labels().enumerate() {
        let value = match values.get(i + 1) {
            Some(next) => f(*next, values[i])?,
            None => Value::NAN,
        };
        out.set(label.clone(), value);
    }
    Ok(out)
}
