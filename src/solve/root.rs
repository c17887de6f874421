use super::{SolveError, bracket_units};
use crate::container::System;
use crate::units::Value;

/// Outcome of a bracketed root search.
#[derive(Debug, Clone, PartialEq)]
pub struct RootResult {
    /// The located root, in the bracket's units; `None` when the search
    /// did not converge.
    pub root: Option<Value>,

    /// Whether a root was found.
    pub converged: bool,

    /// Number of bisection iterations performed.
    pub iterations: usize,

    /// Human-readable account of how the search ended.
    pub message: String,
}

const MAX_ITERATIONS: usize = 100;

/// Finds a zero of `f` inside a bracket by bisection.
///
/// The bracket endpoints must share a dimension; they set the units of
/// every probe and of the returned root. A bracket whose endpoints
/// evaluate to the same sign is not an error: the result comes back with
/// `converged` false so a script can widen the bracket and retry.
///
/// # Errors
///
/// Returns [`DimensionError::Incompatible`] for a mixed-dimension
/// bracket and propagates any error raised by `f` unchanged.
///
/// [`DimensionError::Incompatible`]: crate::units::DimensionError::Incompatible
pub fn root_bisect<F>(f: F, bracket: [Value; 2], system: &System) -> Result<RootResult, SolveError>
where
    F: Fn(Value, &System) -> Result<Value, SolveError>,
{
    let units = bracket_units(&bracket)?;
    let to_value = |x: f64| Value::with_units(x, units);

    let mut a = bracket[0].magnitude();
    let mut b = bracket[1].base_magnitude() / units.factor();
    let mut fa = f(to_value(a), system)?.base_magnitude();
    let fb = f(to_value(b), system)?.base_magnitude();

    if fa == 0.0 {
        return Ok(converged_at(to_value(a), 0));
    }
    if fb == 0.0 {
        return Ok(converged_at(to_value(b), 0));
    }
    if fa * fb > 0.0 {
        return Ok(RootResult {
            root: None,
            converged: false,
            iterations: 0,
            message: "the bracket does not contain a sign change".to_owned(),
        });
    }

    for iteration in 1..=MAX_ITERATIONS {
        let mid = 0.5 * (a + b);
        let fm = f(to_value(mid), system)?.base_magnitude();

        let tolerance = 1e-12 * (1.0 + mid.abs());
        if fm == 0.0 || (b - a).abs() <= tolerance {
            return Ok(converged_at(to_value(mid), iteration));
        }

        if fa * fm < 0.0 {
            b = mid;
        } else {
            a = mid;
            fa = fm;
        }
    }

    Ok(RootResult {
        root: None,
        converged: false,
        iterations: MAX_ITERATIONS,
        message: "bisection did not converge within the iteration budget".to_owned(),
    })
}

/// Finds a zero of `f` inside a bracket.
///
/// The general entry point for scalar root finding; currently backed by
/// [`root_bisect`], with the same bracket and convergence semantics.
///
/// # Errors
///
/// As [`root_bisect`].
pub fn root_scalar<F>(f: F, bracket: [Value; 2], system: &System) -> Result<RootResult, SolveError>
where
    F: Fn(Value, &System) -> Result<Value, SolveError>,
{
    root_bisect(f, bracket, system)
}

fn converged_at(root: Value, iterations: usize) -> RootResult {
    RootResult {
        root: Some(root),
        converged: true,
        iterations,
        message: "converged".to_owned(),
    }
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

    fn cubic(x: Value, _system: &System) -> Result<Value, SolveError> {
        let x = x.magnitude();
        Ok(Value::Plain((x - 1.0) * (x - 2.0) * (x - 3.0)))
    }

    #[test]
    fn bisection_finds_the_bracketed_root() {
        let system = empty_system();
        let result = root_bisect(cubic, [Value::Plain(0.0), Value::Plain(1.9)], &system).unwrap();
        assert!(result.converged);
        let root = result.root.expect("converged searches carry a root");
        assert_abs_diff_eq!(root.magnitude(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn a_bracket_without_a_sign_change_is_reported_not_raised() {
        let system = empty_system();
        let result = root_bisect(cubic, [Value::Plain(0.0), Value::Plain(0.5)], &system).unwrap();
        assert!(!result.converged);
        assert_eq!(result.root, None);
        assert_eq!(result.message, "the bracket does not contain a sign change");
    }

    #[test]
    fn probes_and_the_root_carry_the_bracket_units() {
        let system = empty_system();
        let f = |x: Value, _system: &System| -> Result<Value, SolveError> {
            assert_eq!(x.units(), METER);
            x.try_sub(2.5 * METER).map_err(Into::into)
        };
        let result = root_bisect(f, [0.0 * METER, 4.0 * METER], &system).unwrap();
        assert!(result.converged);
        let root = result.root.expect("converged searches carry a root");
        assert_eq!(root.units(), METER);
        assert_abs_diff_eq!(root.magnitude(), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn root_scalar_shares_the_bisection_contract() {
        let system = empty_system();
        let result = root_scalar(cubic, [Value::Plain(0.0), Value::Plain(1.9)], &system).unwrap();
        assert!(result.converged);
        assert_abs_diff_eq!(result.root.unwrap().magnitude(), 1.0, epsilon = 1e-9);

        let result = root_scalar(cubic, [Value::Plain(0.0), Value::Plain(0.5)], &system).unwrap();
        assert!(!result.converged);
    }

    #[test]
    fn mixed_dimension_brackets_are_an_error() {
        let system = empty_system();
        let f = |x: Value, _system: &System| -> Result<Value, SolveError> {
            x.try_sub(2.5 * METER).map_err(Into::into)
        };
        let err = root_bisect(f, [0.0 * METER, 4.0 * SECOND], &system).unwrap_err();
        assert_eq!(err.to_string(), "cannot bracket `m` and `s`");
    }

    #[test]
    fn exact_zeros_at_the_endpoints_short_circuit() {
        let system = empty_system();
        let result = root_bisect(cubic, [Value::Plain(1.0), Value::Plain(1.5)], &system).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_abs_diff_eq!(result.root.unwrap().magnitude(), 1.0);
    }
}
