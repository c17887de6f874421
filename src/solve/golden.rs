use super::{SolveError, bracket_units};
use crate::container::System;
use crate::units::Value;

/// Outcome of a golden-section search.
#[derive(Debug, Clone, PartialEq)]
pub struct GoldenResult {
    /// Location of the extremum, in the bracket's units.
    pub x: Value,

    /// Value of the objective at [`x`](Self::x).
    pub fun: Value,

    /// Whether the bracket shrank below the requested tolerance.
    pub converged: bool,

    /// Number of shrinking iterations performed.
    pub iterations: usize,

    /// Human-readable account of how the search ended.
    pub message: String,
}

const INVPHI: f64 = 0.618_033_988_749_894_8;
const INVPHI2: f64 = 0.381_966_011_250_105_2;
const MAX_ITERATIONS: usize = 200;

/// Finds a minimum of `f` inside a bracket by golden-section search.
///
/// The bracket endpoints must share a dimension; they set the units of
/// every probe and of the reported location. The search shrinks the
/// bracket by the golden ratio each iteration and stops once its width
/// falls below `rtol * max(|a|, |b|, 1)`; running out of iterations
/// first is not an error, it comes back with `converged` false.
///
/// # Errors
///
/// Returns [`DimensionError::Incompatible`] for a mixed-dimension
/// bracket and propagates any error raised by `f` unchanged.
///
/// [`DimensionError::Incompatible`]: crate::units::DimensionError::Incompatible
pub fn minimize_golden<F>(
    f: F,
    bracket: [Value; 2],
    system: &System,
    rtol: f64,
) -> Result<GoldenResult, SolveError>
where
    F: Fn(Value, &System) -> Result<Value, SolveError>,
{
    let units = bracket_units(&bracket)?;
    let to_value = |x: f64| Value::with_units(x, units);

    let mut a = bracket[0].magnitude();
    let mut b = bracket[1].base_magnitude() / units.factor();
    if b < a {
        std::mem::swap(&mut a, &mut b);
    }

    let mut c = a + INVPHI2 * (b - a);
    let mut d = a + INVPHI * (b - a);
    let mut fc = f(to_value(c), system)?;
    let mut fd = f(to_value(d), system)?;

    for iteration in 1..=MAX_ITERATIONS {
        if fc.base_magnitude() < fd.base_magnitude() {
            b = d;
            d = c;
            fd = fc;
            c = a + INVPHI2 * (b - a);
            fc = f(to_value(c), system)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INVPHI * (b - a);
            fd = f(to_value(d), system)?;
        }

        let threshold = rtol * a.abs().max(b.abs()).max(1.0);
        if (b - a).abs() <= threshold {
            let (x, fun) = if fc.base_magnitude() < fd.base_magnitude() {
                (c, fc)
            } else {
                (d, fd)
            };
            return Ok(GoldenResult {
                x: to_value(x),
                fun,
                converged: true,
                iterations: iteration,
                message: "converged".to_owned(),
            });
        }
    }

    let (x, fun) = if fc.base_magnitude() < fd.base_magnitude() {
        (c, fc)
    } else {
        (d, fd)
    };
    Ok(GoldenResult {
        x: to_value(x),
        fun,
        converged: false,
        iterations: MAX_ITERATIONS,
        message: "golden-section search did not converge within the iteration budget".to_owned(),
    })
}

/// Finds a maximum of `f` by minimizing its negation; the reported
/// objective value is negated back.
///
/// # Errors
///
/// Propagates any error raised by `f` unchanged.
pub fn maximize_golden<F>(
    f: F,
    bracket: [Value; 2],
    system: &System,
    rtol: f64,
) -> Result<GoldenResult, SolveError>
where
    F: Fn(Value, &System) -> Result<Value, SolveError>,
{
    let negated = |x: Value, system: &System| -> Result<Value, SolveError> { Ok(-f(x, system)?) };
    let mut result = minimize_golden(negated, bracket, system, rtol)?;
    result.fun = -result.fun;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::State;
    use crate::units::{METER, SECOND};

    use approx::assert_abs_diff_eq;

    fn empty_system() -> System {
        System::new(State::new(), 0.0, 1.0)
    }

    fn parabola(x: Value, _system: &System) -> Result<Value, SolveError> {
        let x = x.magnitude();
        Ok(Value::Plain((x - 2.0) * (x - 2.0)))
    }

    #[test]
    fn finds_the_minimum_of_a_parabola() {
        let system = empty_system();
        let result = minimize_golden(
            parabola,
            [Value::Plain(0.0), Value::Plain(5.0)],
            &system,
            1e-7,
        )
        .unwrap();
        assert!(result.converged);
        assert_abs_diff_eq!(result.x.magnitude(), 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(result.fun.magnitude(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn maximize_negates_and_restores_the_objective() {
        let system = empty_system();
        let f = |x: Value, system: &System| -> Result<Value, SolveError> {
            // 3 - (x - 2)^2 peaks at (2, 3).
            Value::Plain(3.0)
                .try_sub(parabola(x, system)?)
                .map_err(Into::into)
        };
        let result =
            maximize_golden(f, [Value::Plain(0.0), Value::Plain(5.0)], &system, 1e-7).unwrap();
        assert!(result.converged);
        assert_abs_diff_eq!(result.x.magnitude(), 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(result.fun.magnitude(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn probes_and_the_location_carry_the_bracket_units() {
        let system = empty_system();
        let f = |x: Value, _system: &System| -> Result<Value, SolveError> {
            assert_eq!(x.units(), SECOND);
            let x = x.magnitude();
            Ok(Value::Plain((x - 1.0) * (x - 1.0)))
        };
        let result = minimize_golden(f, [0.0 * SECOND, 3.0 * SECOND], &system, 1e-7).unwrap();
        assert!(result.converged);
        assert_eq!(result.x.units(), SECOND);
        assert_abs_diff_eq!(result.x.magnitude(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn mixed_dimension_brackets_are_an_error() {
        let system = empty_system();
        let err = minimize_golden(parabola, [0.0 * SECOND, 3.0 * METER], &system, 1e-7)
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot bracket `s` and `m`");
    }

    #[test]
    fn a_coarse_tolerance_converges_in_few_iterations() {
        let system = empty_system();
        let result = minimize_golden(
            parabola,
            [Value::Plain(0.0), Value::Plain(5.0)],
            &system,
            1e-1,
        )
        .unwrap();
        assert!(result.converged);
        assert!(result.iterations < 10);
        assert_abs_diff_eq!(result.x.magnitude(), 2.0, epsilon = 0.5);
    }
}
