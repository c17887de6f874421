use std::fmt;

use super::tag::{DimensionError, Units};

/// A numeric magnitude paired with a unit tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    /// The numeric value, expressed in [`units`](Self::units).
    pub magnitude: f64,

    /// The unit tag in force.
    pub units: Units,
}

impl Quantity {
    /// Creates a quantity from a magnitude and a unit tag.
    #[must_use]
    pub fn new(magnitude: f64, units: Units) -> Self {
        Self { magnitude, units }
    }

    /// The magnitude converted to coherent base units.
    #[must_use]
    pub fn base_magnitude(&self) -> f64 {
        self.magnitude * self.units.factor()
    }

    /// Re-expresses the quantity in another tag of the same dimension.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::Incompatible`] if the dimensions differ.
    pub fn in_units(&self, target: Units) -> Result<Quantity, DimensionError> {
        if !self.units.same_dimension(&target) {
            return Err(DimensionError::Incompatible {
                op: "convert between",
                lhs: self.units,
                rhs: target,
            });
        }
        Ok(Quantity {
            magnitude: self.base_magnitude() / target.factor(),
            units: target,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.units)
    }
}
