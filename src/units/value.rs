use std::cmp::Ordering;
use std::fmt;
use std::ops::{Div, Mul, Neg};

use super::quantity::Quantity;
use super::tag::{DIMENSIONLESS, DimensionError, Units};

/// A value that may or may not carry units.
///
/// Every scalar the crate handles is one of these two shapes. A bare
/// number is dimensionless; arithmetic treats the two variants uniformly,
/// and a product or quotient whose units cancel completely collapses back
/// to [`Plain`](Self::Plain).
#[derive(Debug, Clone, Copy)]
pub enum Value {
    /// A bare, dimensionless number.
    Plain(f64),
    /// A number tagged with units.
    Quantity(Quantity),
}

impl Value {
    /// The missing-value marker used by frames and difference helpers.
    pub const NAN: Value = Value::Plain(f64::NAN);

    /// Builds a value, collapsing a dimensionless tag to [`Plain`](Self::Plain).
    #[must_use]
    pub fn with_units(magnitude: f64, units: Units) -> Self {
        if units.is_dimensionless() {
            Value::Plain(magnitude)
        } else {
            Value::Quantity(Quantity::new(magnitude, units))
        }
    }

    /// The bare numeric value, in the value's own units.
    ///
    /// Idempotent: re-wrapping the result as a [`Value`] and taking the
    /// magnitude again changes nothing.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        match self {
            Value::Plain(x) => *x,
            Value::Quantity(q) => q.magnitude,
        }
    }

    /// The numeric value converted to coherent base units.
    #[must_use]
    pub fn base_magnitude(&self) -> f64 {
        match self {
            Value::Plain(x) => *x,
            Value::Quantity(q) => q.base_magnitude(),
        }
    }

    /// The unit tag in force, [`DIMENSIONLESS`] for a bare number.
    #[must_use]
    pub fn units(&self) -> Units {
        match self {
            Value::Plain(_) => DIMENSIONLESS,
            Value::Quantity(q) => q.units,
        }
    }

    /// Coerces a bare number into the given units; a quantity is returned
    /// unchanged, never double-wrapped.
    #[must_use]
    pub fn require_units(self, units: Units) -> Value {
        match self {
            Value::Plain(x) => Value::with_units(x, units),
            Value::Quantity(_) => self,
        }
    }

    /// Whether the numeric part is NaN.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.magnitude().is_nan()
    }

    /// Adds two values of the same dimension, converting between scales.
    ///
    /// The result keeps the left operand's units when it has any.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::Incompatible`] when the dimensions differ.
    pub fn try_add(self, rhs: Value) -> Result<Value, DimensionError> {
        self.combine(rhs, "add", 1.0)
    }

    /// Subtracts a value of the same dimension.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::Incompatible`] when the dimensions differ.
    pub fn try_sub(self, rhs: Value) -> Result<Value, DimensionError> {
        self.combine(rhs, "subtract", -1.0)
    }

    fn combine(self, rhs: Value, op: &'static str, sign: f64) -> Result<Value, DimensionError> {
        let (lu, ru) = (self.units(), rhs.units());
        if !lu.same_dimension(&ru) {
            return Err(DimensionError::Incompatible {
                op,
                lhs: lu,
                rhs: ru,
            });
        }
        // Express the right operand in the left operand's units.
        let magnitude = self.magnitude() + sign * rhs.base_magnitude() / lu.factor();
        Ok(Value::with_units(magnitude, lu))
    }

    /// Raises the value to an integer power.
    #[must_use]
    pub fn powi(self, n: i32) -> Value {
        Value::with_units(self.magnitude().powi(n), self.units().powi(n))
    }

    /// Takes the square root, halving the dimension exponents.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::FractionalRoot`] if any exponent is odd.
    pub fn sqrt(self) -> Result<Value, DimensionError> {
        Ok(Value::with_units(
            self.magnitude().sqrt(),
            self.units().sqrt()?,
        ))
    }

    /// The absolute value, units unchanged.
    #[must_use]
    pub fn abs(self) -> Value {
        Value::with_units(self.magnitude().abs(), self.units())
    }

    /// Four-quadrant arctangent of `self / other`, in bare radians.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::Incompatible`] when the dimensions differ.
    pub fn atan2(self, other: Value) -> Result<Value, DimensionError> {
        if !self.units().same_dimension(&other.units()) {
            return Err(DimensionError::Incompatible {
                op: "take the arctangent of",
                lhs: self.units(),
                rhs: other.units(),
            });
        }
        Ok(Value::Plain(
            self.base_magnitude().atan2(other.base_magnitude()),
        ))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Plain(x)
    }
}

impl From<Quantity> for Value {
    fn from(q: Quantity) -> Self {
        Value::with_units(q.magnitude, q.units)
    }
}

/// Equal when the dimensions match and the base magnitudes agree, so
/// `2.0 * DEGREE` equals its radian equivalent and a dimensionless
/// quantity equals the bare number.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.units().same_dimension(&other.units())
            && self.base_magnitude() == other.base_magnitude()
    }
}

/// Ordered within one dimension; values of different dimension are
/// incomparable.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.units().same_dimension(&other.units()) {
            return None;
        }
        self.base_magnitude().partial_cmp(&other.base_magnitude())
    }
}

impl Mul for Value {
    type Output = Value;

    fn mul(self, rhs: Value) -> Value {
        Value::with_units(
            self.magnitude() * rhs.magnitude(),
            self.units() * rhs.units(),
        )
    }
}

impl Div for Value {
    type Output = Value;

    fn div(self, rhs: Value) -> Value {
        Value::with_units(
            self.magnitude() / rhs.magnitude(),
            self.units() / rhs.units(),
        )
    }
}

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        Value::with_units(-self.magnitude(), self.units())
    }
}

impl Mul<f64> for Value {
    type Output = Value;

    fn mul(self, rhs: f64) -> Value {
        Value::with_units(self.magnitude() * rhs, self.units())
    }
}

impl Mul<Value> for f64 {
    type Output = Value;

    fn mul(self, rhs: Value) -> Value {
        rhs * self
    }
}

impl Div<f64> for Value {
    type Output = Value;

    fn div(self, rhs: f64) -> Value {
        Value::with_units(self.magnitude() / rhs, self.units())
    }
}

impl Mul<Units> for Value {
    type Output = Value;

    fn mul(self, rhs: Units) -> Value {
        Value::with_units(self.magnitude(), self.units() * rhs)
    }
}

impl Div<Units> for Value {
    type Output = Value;

    fn div(self, rhs: Units) -> Value {
        Value::with_units(self.magnitude(), self.units() / rhs)
    }
}

impl Mul<Units> for f64 {
    type Output = Value;

    fn mul(self, rhs: Units) -> Value {
        Value::with_units(self, rhs)
    }
}

impl Div<Units> for f64 {
    type Output = Value;

    fn div(self, rhs: Units) -> Value {
        Value::with_units(self, DIMENSIONLESS / rhs)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Plain(x) => write!(f, "{x}"),
            Value::Quantity(q) => write!(f, "{q}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{METER, SECOND};

    use approx::assert_relative_eq;

    #[test]
    fn magnitude_is_idempotent() {
        for value in [Value::Plain(5.0), 5.0 * METER, 5.0 * (METER / SECOND)] {
            let once = value.magnitude();
            let twice = Value::from(once).magnitude();
            assert_eq!(once, twice);
            assert_eq!(once, 5.0);
        }
    }

    #[test]
    fn addition_requires_matching_dimension() {
        let d = 3.0 * METER;
        let t = 4.0 * SECOND;
        let err = d.try_add(t).unwrap_err();
        assert!(matches!(err, DimensionError::Incompatible { .. }));
        assert_eq!(err.to_string(), "cannot add `m` and `s`");

        let sum = d.try_add(1.0 * METER).unwrap();
        assert_relative_eq!(sum.magnitude(), 4.0);
        assert_eq!(sum.units(), METER);
    }

    #[test]
    fn plain_numbers_are_dimensionless() {
        let x = Value::Plain(2.0);
        assert!(x.try_add(3.0 * METER).is_err());
        assert_relative_eq!(x.try_add(Value::Plain(3.0)).unwrap().magnitude(), 5.0);
    }

    #[test]
    fn products_compose_and_cancel() {
        let d = 6.0 * METER;
        let t = 2.0 * SECOND;
        let speed = d / t;
        assert_eq!(speed.units(), METER / SECOND);

        // Units that cancel collapse back to a bare number.
        let ratio = d / (3.0 * METER);
        assert_eq!(ratio, Value::Plain(2.0));
        assert!(matches!(ratio, Value::Plain(_)));
    }

    #[test]
    fn require_units_never_double_wraps() {
        let wrapped = Value::Plain(2.0).require_units(METER);
        assert_eq!(wrapped.units(), METER);
        let again = wrapped.require_units(SECOND);
        assert_eq!(again.units(), METER);
        assert_eq!(again.magnitude(), 2.0);
    }

    #[test]
    fn ordering_is_per_dimension() {
        assert!(1.0 * METER < 2.0 * METER);
        assert_eq!((1.0 * METER).partial_cmp(&(1.0 * SECOND)), None);
    }

    #[test]
    fn powers_and_roots() {
        let area = (3.0 * METER).powi(2);
        assert_relative_eq!(area.magnitude(), 9.0);
        assert_eq!(area.units(), METER * METER);

        let side = area.sqrt().unwrap();
        assert_relative_eq!(side.magnitude(), 3.0);
        assert_eq!(side.units(), METER);
        assert!((3.0 * METER).sqrt().is_err());
    }
}
