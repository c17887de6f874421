use std::fmt;
use std::ops::{Div, Mul};

use thiserror::Error;

/// Symbols for the base dimensions, in storage order.
const SYMBOLS: [&str; 8] = ["m", "kg", "s", "A", "K", "mol", "cd", "rad"];

/// A runtime unit tag.
///
/// A `Units` value records an integer exponent for each SI base dimension
/// (plus plane angle) and a conversion factor to coherent base units, so
/// `DEGREE` and `RADIAN` share a dimension but differ in factor. Tags
/// compose through `*`, `/`, and [`powi`](Self::powi); two tags are equal
/// when both exponents and factor agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    dims: [i8; 8],
    factor: f64,
}

/// The unit tag of a bare number.
pub const DIMENSIONLESS: Units = Units {
    dims: [0; 8],
    factor: 1.0,
};

pub const METER: Units = Units::base(0);
pub const KILOGRAM: Units = Units::base(1);
pub const SECOND: Units = Units::base(2);
pub const AMPERE: Units = Units::base(3);
pub const KELVIN: Units = Units::base(4);
pub const MOLE: Units = Units::base(5);
pub const CANDELA: Units = Units::base(6);
pub const RADIAN: Units = Units::base(7);

/// Plane angle measured in degrees; converts to radians by factor.
pub const DEGREE: Units = Units {
    dims: RADIAN.dims,
    factor: std::f64::consts::PI / 180.0,
};

/// Force: kg m / s^2.
pub const NEWTON: Units = Units {
    dims: [1, 1, -2, 0, 0, 0, 0, 0],
    factor: 1.0,
};

impl Units {
    const fn base(index: usize) -> Self {
        let mut dims = [0i8; 8];
        dims[index] = 1;
        Self { dims, factor: 1.0 }
    }

    /// Whether this tag carries no dimension and no scale.
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.dims == [0; 8] && self.factor == 1.0
    }

    /// Whether two tags share the same dimension, ignoring scale.
    #[must_use]
    pub fn same_dimension(&self, other: &Self) -> bool {
        self.dims == other.dims
    }

    /// Conversion factor from this tag to coherent base units.
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Raises the tag to an integer power.
    #[must_use]
    pub fn powi(&self, n: i32) -> Self {
        let mut dims = [0i8; 8];
        for (d, &e) in dims.iter_mut().zip(&self.dims) {
            *d = e * n as i8;
        }
        Self {
            dims,
            factor: self.factor.powi(n),
        }
    }

    /// The multiplicative inverse of the tag.
    #[must_use]
    pub fn recip(&self) -> Self {
        self.powi(-1)
    }

    /// Halves every exponent, for square roots of quantities.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::FractionalRoot`] if any exponent is odd.
    pub fn sqrt(&self) -> Result<Self, DimensionError> {
        if self.dims.iter().any(|&e| e % 2 != 0) {
            return Err(DimensionError::FractionalRoot { units: *self });
        }
        let mut dims = [0i8; 8];
        for (d, &e) in dims.iter_mut().zip(&self.dims) {
            *d = e / 2;
        }
        Ok(Self {
            dims,
            factor: self.factor.sqrt(),
        })
    }
}

impl Mul for Units {
    type Output = Units;

    fn mul(self, rhs: Units) -> Units {
        let mut dims = [0i8; 8];
        for (i, d) in dims.iter_mut().enumerate() {
            *d = self.dims[i] + rhs.dims[i];
        }
        Units {
            dims,
            factor: self.factor * rhs.factor,
        }
    }
}

impl Div for Units {
    type Output = Units;

    fn div(self, rhs: Units) -> Units {
        self * rhs.recip()
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dims == [0; 8] && self.factor == 1.0 {
            return write!(f, "1");
        }
        let mut first = true;
        if self.factor != 1.0 {
            write!(f, "{}", self.factor)?;
            first = false;
        }
        for (symbol, &exponent) in SYMBOLS.iter().zip(&self.dims) {
            if exponent == 0 {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            if exponent == 1 {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{exponent}")?;
            }
        }
        if first {
            write!(f, "1")?;
        }
        Ok(())
    }
}

/// An error raised when quantities of incompatible dimension are combined.
///
/// Wrapper layers propagate this unchanged so the failure points at the
/// offending arithmetic expression.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DimensionError {
    /// Two operands do not share a dimension.
    #[error("cannot {op} `{lhs}` and `{rhs}`")]
    Incompatible {
        /// The operation that failed.
        op: &'static str,
        /// Unit tag of the left operand.
        lhs: Units,
        /// Unit tag of the right operand.
        rhs: Units,
    },

    /// A root would produce fractional dimension exponents.
    #[error("square root of `{units}` has fractional dimensions")]
    FractionalRoot {
        /// Unit tag of the radicand.
        units: Units,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_and_display() {
        let speed = METER / SECOND;
        assert!(speed.same_dimension(&(METER / SECOND)));
        assert_eq!(speed.to_string(), "m s^-1");

        let accel = speed / SECOND;
        assert_eq!(accel.to_string(), "m s^-2");
        assert_eq!(NEWTON, KILOGRAM * accel);
    }

    #[test]
    fn degree_shares_dimension_with_radian() {
        assert!(DEGREE.same_dimension(&RADIAN));
        assert_ne!(DEGREE, RADIAN);
        assert!((DEGREE.factor() - std::f64::consts::PI / 180.0).abs() < 1e-15);
    }

    #[test]
    fn dimensionless_cancellation() {
        let ratio = METER / METER;
        assert!(ratio.is_dimensionless());
        assert_eq!(ratio.to_string(), "1");
    }

    #[test]
    fn sqrt_requires_even_exponents() {
        let area = METER * METER;
        assert_eq!(area.sqrt().unwrap(), METER);
        assert!(matches!(
            METER.sqrt(),
            Err(DimensionError::FractionalRoot { .. })
        ));
    }
}
