//! Runtime units and maybe-unit values.
//!
//! Course code mixes bare numbers and physical quantities freely: a state
//! variable might be `2.0` in one notebook and `2.0 * METER` in the next,
//! and both must flow through the same containers and solvers. This module
//! provides that uniformity:
//!
//! - [`Units`]: a runtime unit tag (base-dimension exponents plus a
//!   conversion factor to coherent SI units).
//! - [`Quantity`]: a magnitude paired with a [`Units`] tag.
//! - [`Value`]: the sum of both worlds, `Plain(f64)` or
//!   `Quantity(Quantity)`, with arithmetic that checks dimensions at
//!   runtime.
//!
//! Addition and subtraction are fallible ([`Value::try_add`],
//! [`Value::try_sub`]) because they require matching dimensions; products
//! and quotients always compose and are plain operators. A
//! [`DimensionError`] carries the two offending unit tags so the failure
//! reads like the arithmetic expression that produced it, and wrapper
//! layers are expected to pass it through untouched.
//!
//! ```
//! use modsim::units::{METER, SECOND, Value};
//!
//! let d = 6.0 * METER;
//! let t = 2.0 * SECOND;
//! let v = d / t;
//! assert_eq!(v.magnitude(), 3.0);
//! assert_eq!(v.units(), METER / SECOND);
//!
//! // Mismatched dimensions surface immediately.
//! assert!(d.try_add(t).is_err());
//! ```

mod quantity;
mod tag;
mod value;

pub use quantity::Quantity;
pub use tag::{
    AMPERE, CANDELA, DEGREE, DIMENSIONLESS, DimensionError, KELVIN, KILOGRAM, METER, MOLE, NEWTON,
    RADIAN, SECOND, Units,
};
pub use value::Value;
