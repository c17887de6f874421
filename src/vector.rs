//! Coordinate-free 2-D/3-D vector helpers, usable with or without units.
//!
//! A [`Vector`] is two or three components sharing one unit tag. Every
//! helper accepts plain vectors (built from arrays) or unit-bearing ones,
//! and produces the dimensionally correct combination: the dot product of
//! a length vector and a velocity vector is a length-times-velocity
//! quantity, the 2-D cross product is a scalar of the product unit, and
//! [`vector_hat`] always returns a dimensionless direction.
//!
//! ```
//! use modsim::units::METER;
//! use modsim::vector::{Vector, vector_mag};
//!
//! let v = Vector::new(3.0, 4.0) * METER;
//! assert_eq!(vector_mag(&v), 5.0 * METER);
//! ```
//!
//! The zero vector has no direction; [`vector_hat`] returns a zero vector
//! for it rather than dividing by zero, which resting-state examples rely
//! on.

use std::ops::{Div, Mul};

use thiserror::Error;

use crate::units::{DIMENSIONLESS, DimensionError, RADIAN, Units, Value};

/// A 2- or 3-component vector with one unit tag across components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    coords: [f64; 3],
    components: usize,
    units: Units,
}

impl Vector {
    /// Creates a dimensionless 2-D vector.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            coords: [x, y, 0.0],
            components: 2,
            units: DIMENSIONLESS,
        }
    }

    /// Creates a dimensionless 3-D vector.
    #[must_use]
    pub fn new3(x: f64, y: f64, z: f64) -> Self {
        Self {
            coords: [x, y, z],
            components: 3,
            units: DIMENSIONLESS,
        }
    }

    /// Number of components (2 or 3).
    #[must_use]
    pub fn components(&self) -> usize {
        self.components
    }

    /// The unit tag shared by all components.
    #[must_use]
    pub fn units(&self) -> Units {
        self.units
    }

    /// The `x` component.
    #[must_use]
    pub fn x(&self) -> Value {
        Value::with_units(self.coords[0], self.units)
    }

    /// The `y` component.
    #[must_use]
    pub fn y(&self) -> Value {
        Value::with_units(self.coords[1], self.units)
    }

    /// The `z` component.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::PlanarOnly`] on a 2-D vector.
    pub fn z(&self) -> Result<Value, VectorError> {
        if self.components < 3 {
            return Err(VectorError::PlanarOnly { op: "z" });
        }
        Ok(Value::with_units(self.coords[2], self.units))
    }

    fn raw(&self) -> &[f64] {
        &self.coords[..self.components]
    }

    fn rebuild(&self, coords: [f64; 3], units: Units) -> Vector {
        Vector {
            coords,
            components: self.components,
            units,
        }
    }

    /// Scales the vector by a maybe-unit scalar, composing units.
    #[must_use]
    pub fn scale(&self, factor: Value) -> Vector {
        let m = factor.magnitude();
        self.rebuild(
            [self.coords[0] * m, self.coords[1] * m, self.coords[2] * m],
            self.units * factor.units(),
        )
    }
}

impl From<[f64; 2]> for Vector {
    fn from([x, y]: [f64; 2]) -> Self {
        Vector::new(x, y)
    }
}

impl From<[f64; 3]> for Vector {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Vector::new3(x, y, z)
    }
}

impl Mul<Units> for Vector {
    type Output = Vector;

    fn mul(self, rhs: Units) -> Vector {
        self.rebuild(self.coords, self.units * rhs)
    }
}

impl Div<Units> for Vector {
    type Output = Vector;

    fn div(self, rhs: Units) -> Vector {
        self.rebuild(self.coords, self.units / rhs)
    }
}

/// Errors raised by the vector helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VectorError {
    /// The operation is defined for 2-D vectors only.
    #[error("operation `{op}` is defined for 2-D vectors only")]
    PlanarOnly {
        /// Name of the operation.
        op: &'static str,
    },

    /// The operands have different component counts.
    #[error("vectors have {lhs} and {rhs} components")]
    MixedArity {
        /// Component count of the left operand.
        lhs: usize,
        /// Component count of the right operand.
        rhs: usize,
    },

    /// An angle argument carries non-angular units.
    #[error("angle has units `{units}`")]
    NotAnAngle {
        /// The offending unit tag.
        units: Units,
    },

    /// A dimensional-consistency failure from the units engine.
    #[error(transparent)]
    Dimension(#[from] DimensionError),
}

/// The magnitude of a vector, in the vector's units.
#[must_use]
pub fn vector_mag(v: &Vector) -> Value {
    let sum: f64 = v.raw().iter().map(|c| c * c).sum();
    Value::with_units(sum.sqrt(), v.units())
}

/// The squared magnitude, in the vector's units squared.
#[must_use]
pub fn vector_mag2(v: &Vector) -> Value {
    let sum: f64 = v.raw().iter().map(|c| c * c).sum();
    Value::with_units(sum, v.units().powi(2))
}

/// The angle of a 2-D vector from the positive `x` axis, in bare radians.
///
/// # Errors
///
/// Returns [`VectorError::PlanarOnly`] on a 3-D vector.
pub fn vector_angle(v: &Vector) -> Result<Value, VectorError> {
    if v.components() != 2 {
        return Err(VectorError::PlanarOnly { op: "angle" });
    }
    Ok(Value::Plain(v.coords[1].atan2(v.coords[0])))
}

/// The unit vector in the direction of `v`, always dimensionless.
///
/// A zero-magnitude vector has no direction and maps to the zero vector.
#[must_use]
pub fn vector_hat(v: &Vector) -> Vector {
    let mag = vector_mag(v).magnitude();
    let coords = if mag == 0.0 {
        [0.0; 3]
    } else {
        [
            v.coords[0] / mag,
            v.coords[1] / mag,
            v.coords[2] / mag,
        ]
    };
    Vector {
        coords,
        components: v.components(),
        units: DIMENSIONLESS,
    }
}

/// Rotates a 2-D vector a quarter turn counterclockwise: `(x, y) -> (-y, x)`.
///
/// # Errors
///
/// Returns [`VectorError::PlanarOnly`] on a 3-D vector.
pub fn vector_perp(v: &Vector) -> Result<Vector, VectorError> {
    if v.components() != 2 {
        return Err(VectorError::PlanarOnly { op: "perp" });
    }
    Ok(v.rebuild([-v.coords[1], v.coords[0], 0.0], v.units()))
}

fn check_arity(v: &Vector, w: &Vector) -> Result<(), VectorError> {
    if v.components() != w.components() {
        return Err(VectorError::MixedArity {
            lhs: v.components(),
            rhs: w.components(),
        });
    }
    Ok(())
}

/// The dot product, with units composed multiplicatively.
///
/// # Errors
///
/// Returns [`VectorError::MixedArity`] when component counts differ.
pub fn vector_dot(v: &Vector, w: &Vector) -> Result<Value, VectorError> {
    check_arity(v, w)?;
    let sum: f64 = v.raw().iter().zip(w.raw()).map(|(a, b)| a * b).sum();
    Ok(Value::with_units(sum, v.units() * w.units()))
}

/// The cross product of two 2-D or two 3-D vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossProduct {
    /// The signed scalar cross product of a 2-D pair.
    Scalar(Value),
    /// The vector cross product of a 3-D pair.
    Vector(Vector),
}

impl CrossProduct {
    /// The scalar form, if the operands were 2-D.
    #[must_use]
    pub fn scalar(self) -> Option<Value> {
        match self {
            CrossProduct::Scalar(v) => Some(v),
            CrossProduct::Vector(_) => None,
        }
    }

    /// The vector form, if the operands were 3-D.
    #[must_use]
    pub fn vector(self) -> Option<Vector> {
        match self {
            CrossProduct::Scalar(_) => None,
            CrossProduct::Vector(v) => Some(v),
        }
    }
}

/// The cross product: a scalar of the product unit for a 2-D pair, a
/// vector for a 3-D pair. Anticommutative in both forms.
///
/// # Errors
///
/// Returns [`VectorError::MixedArity`] when component counts differ.
pub fn vector_cross(v: &Vector, w: &Vector) -> Result<CrossProduct, VectorError> {
    check_arity(v, w)?;
    let units = v.units() * w.units();
    let [vx, vy, vz] = v.coords;
    let [wx, wy, wz] = w.coords;
    if v.components() == 2 {
        return Ok(CrossProduct::Scalar(Value::with_units(
            vx * wy - vy * wx,
            units,
        )));
    }
    Ok(CrossProduct::Vector(Vector {
        coords: [vy * wz - vz * wy, vz * wx - vx * wz, vx * wy - vy * wx],
        components: 3,
        units,
    }))
}

/// The signed length of the projection of `v` onto `w`.
///
/// Not symmetric: projecting `v` onto `w` and `w` onto `v` differ both in
/// magnitude and in units when the operands carry different units.
///
/// # Errors
///
/// Returns [`VectorError::MixedArity`] when component counts differ.
pub fn scalar_proj(v: &Vector, w: &Vector) -> Result<Value, VectorError> {
    Ok(vector_dot(v, w)? / vector_mag(w))
}

/// The projection of `v` onto `w`: the scalar projection composed with
/// the unit vector of the target.
///
/// # Errors
///
/// Returns [`VectorError::MixedArity`] when component counts differ.
pub fn vector_proj(v: &Vector, w: &Vector) -> Result<Vector, VectorError> {
    Ok(vector_hat(w).scale(scalar_proj(v, w)?))
}

/// The distance between two points, in the left operand's units.
///
/// # Errors
///
/// Returns [`VectorError::MixedArity`] when component counts differ and
/// [`DimensionError::Incompatible`] when the units do not share a
/// dimension.
pub fn vector_dist(v: &Vector, w: &Vector) -> Result<Value, VectorError> {
    check_arity(v, w)?;
    if !v.units().same_dimension(&w.units()) {
        return Err(DimensionError::Incompatible {
            op: "subtract",
            lhs: v.units(),
            rhs: w.units(),
        }
        .into());
    }
    // Express w in v's units, then measure the difference.
    let scale = w.units().factor() / v.units().factor();
    let sum: f64 = v
        .raw()
        .iter()
        .zip(w.raw())
        .map(|(a, b)| {
            let d = a - b * scale;
            d * d
        })
        .sum();
    Ok(Value::with_units(sum.sqrt(), v.units()))
}

/// The signed angle from `w` to `v`, for 2-D vectors, in bare radians.
///
/// # Errors
///
/// Returns [`VectorError::PlanarOnly`] on 3-D input.
pub fn vector_diff_angle(v: &Vector, w: &Vector) -> Result<Value, VectorError> {
    let a = vector_angle(v)?;
    let b = vector_angle(w)?;
    Ok(Value::Plain(a.magnitude() - b.magnitude()))
}

fn angle_in_radians(theta: Value) -> Result<f64, VectorError> {
    let units = theta.units();
    if !(units.is_dimensionless() || units.same_dimension(&RADIAN)) {
        return Err(VectorError::NotAnAngle { units });
    }
    Ok(theta.base_magnitude())
}

/// Converts Cartesian coordinates to polar `(theta, r)`.
///
/// The angle is in bare radians; the radius carries the units of `x`.
///
/// # Errors
///
/// Returns [`DimensionError::Incompatible`] when `x` and `y` do not share
/// a dimension.
pub fn cart2pol(x: Value, y: Value) -> Result<(Value, Value), VectorError> {
    let theta = y.atan2(x)?;
    let r = (x * x).try_add(y * y)?.sqrt()?;
    Ok((theta, r))
}

/// Converts Cartesian coordinates to cylindrical `(theta, rho, z)`.
///
/// # Errors
///
/// Returns [`DimensionError::Incompatible`] when `x` and `y` do not share
/// a dimension.
pub fn cart2pol3(x: Value, y: Value, z: Value) -> Result<(Value, Value, Value), VectorError> {
    let (theta, rho) = cart2pol(x, y)?;
    Ok((theta, rho, z))
}

/// Converts polar coordinates to Cartesian `(x, y)`.
///
/// The angle may be bare (radians) or carry any angular unit.
///
/// # Errors
///
/// Returns [`VectorError::NotAnAngle`] for a non-angular `theta`.
pub fn pol2cart(theta: Value, r: Value) -> Result<(Value, Value), VectorError> {
    let angle = angle_in_radians(theta)?;
    Ok((r * angle.cos(), r * angle.sin()))
}

/// Converts cylindrical coordinates to Cartesian `(x, y, z)`.
///
/// # Errors
///
/// Returns [`VectorError::NotAnAngle`] for a non-angular `theta`.
pub fn pol2cart3(theta: Value, r: Value, z: Value) -> Result<(Value, Value, Value), VectorError> {
    let (x, y) = pol2cart(theta, r)?;
    Ok((x, y, z))
}
