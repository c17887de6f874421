use super::{Details, EventFn, EventRecord, SolveError};
use crate::container::{Label, State, System, TimeFrame};
use crate::units::Value;

/// The explicit fixed-step methods on offer.
#[derive(Debug, Clone, Copy)]
enum Method {
    Euler,
    Ralston,
}

/// Integrates with the forward Euler method on a fixed time grid.
///
/// The grid runs from `system.t0` to `system.t_end` in steps of
/// `system.dt` (a hundredth of the span when unset); a span that is not
/// an exact multiple of the step ends with one shorter step so the grid
/// lands on `t_end`. The returned frame holds one row per grid point,
/// keyed by the (possibly unit-bearing) time label, with one column per
/// state variable.
///
/// # Errors
///
/// Returns [`SolveError`] for a malformed span or step, and propagates
/// any error from the slope function unchanged.
pub fn run_euler<F>(system: &System, slope: F) -> Result<(TimeFrame, Details), SolveError>
where
    F: Fn(&State, Value, &System) -> Result<Vec<Value>, SolveError>,
{
    run_fixed(system, &slope, &[], Method::Euler)
}

/// [`run_euler`] with event functions: the run stops at the first zero
/// crossing, at the interpolated crossing time rather than the next grid
/// point.
///
/// # Errors
///
/// As [`run_euler`], also propagating errors from event functions.
pub fn run_euler_until<F>(
    system: &System,
    slope: F,
    events: &[EventFn],
) -> Result<(TimeFrame, Details), SolveError>
where
    F: Fn(&State, Value, &System) -> Result<Vec<Value>, SolveError>,
{
    run_fixed(system, &slope, events, Method::Euler)
}

/// Integrates with Ralston's two-stage second-order method.
///
/// Each step samples the slope at the start and at two-thirds of the
/// step, blending with weights 1/4 and 3/4. Same grid and return
/// conventions as [`run_euler`].
///
/// # Errors
///
/// As [`run_euler`].
pub fn run_ralston<F>(system: &System, slope: F) -> Result<(TimeFrame, Details), SolveError>
where
    F: Fn(&State, Value, &System) -> Result<Vec<Value>, SolveError>,
{
    run_fixed(system, &slope, &[], Method::Ralston)
}

/// [`run_ralston`] with event functions; see [`run_euler_until`].
///
/// # Errors
///
/// As [`run_euler`], also propagating errors from event functions.
pub fn run_ralston_until<F>(
    system: &System,
    slope: F,
    events: &[EventFn],
) -> Result<(TimeFrame, Details), SolveError>
where
    F: Fn(&State, Value, &System) -> Result<Vec<Value>, SolveError>,
{
    run_fixed(system, &slope, events, Method::Ralston)
}

fn run_fixed<F>(
    system: &System,
    slope: &F,
    events: &[EventFn],
    method: Method,
) -> Result<(TimeFrame, Details), SolveError>
where
    F: Fn(&State, Value, &System) -> Result<Vec<Value>, SolveError>,
{
    let span = system.t_end.try_sub(system.t0)?;
    let span_base = span.base_magnitude();
    if span_base.is_nan() || span_base <= 0.0 {
        return Err(SolveError::EmptySpan {
            t0: system.t0,
            t_end: system.t_end,
        });
    }
    let dt = match system.dt {
        Some(dt) => dt,
        None => span / 100.0,
    };
    let dt_base = dt.base_magnitude();
    if !dt_base.is_finite() || dt_base <= 0.0 {
        return Err(SolveError::BadStep);
    }
    // Whole steps of dt, plus a shorter final step when the span is not
    // an exact multiple, so the grid always ends on t_end.
    let ratio = span_base / dt_base;
    let steps = if (ratio - ratio.round()).abs() < 1e-9 {
        ratio.round()
    } else {
        ratio.ceil()
    }
    .max(1.0) as usize;

    let columns: Vec<String> = system.init.labels().map(ToString::to_string).collect();
    let mut frame = TimeFrame::with_columns(columns);

    let mut state = system.init.clone();
    let mut t = system.t0;
    frame.insert_row(Label::from(t), state.values())?;
    let mut event_prev = eval_events(events, &state, t, system)?;

    for k in 1..=steps {
        // Rebuild the grid point from t0 each step so error does not
        // accumulate across many additions; the last point is t_end
        // itself, which may close a shorter final step.
        let t_next = if k == steps {
            system.t_end
        } else {
            system.t0.try_add(dt * k as f64)?
        };
        let h = t_next.try_sub(t)?;

        let next_state = match method {
            Method::Euler => {
                let k1 = eval_slope(slope, &state, t, system)?;
                advance(&state, &k1, h, 1.0)?
            }
            Method::Ralston => {
                let k1 = eval_slope(slope, &state, t, system)?;
                let probe = advance(&state, &k1, h, 2.0 / 3.0)?;
                let t_probe = t.try_add(h * (2.0 / 3.0))?;
                let k2 = eval_slope(slope, &probe, t_probe, system)?;
                let blended = blend(&k1, &k2, 0.25, 0.75)?;
                advance(&state, &blended, h, 1.0)?
            }
        };

        let event_next = eval_events(events, &next_state, t_next, system)?;
        if let Some((index, fraction)) = first_crossing(&event_prev, &event_next) {
            let t_star = lerp_value(t, t_next, fraction)?;
            let terminal = lerp_state(&state, &next_state, fraction)?;
            frame.insert_row(Label::from(t_star), terminal.values())?;
            let details = Details {
                success: true,
                message: format!("event {index} crossed zero"),
                num_steps: k,
                event: Some(EventRecord {
                    index,
                    time: t_star,
                }),
            };
            return Ok((frame, details));
        }

        event_prev = event_next;
        state = next_state;
        t = t_next;
        frame.insert_row(Label::from(t), state.values())?;
    }

    let details = Details {
        success: true,
        message: "the solver reached the end of the integration interval".to_owned(),
        num_steps: steps,
        event: None,
    };
    Ok((frame, details))
}

fn eval_slope<F>(
    slope: &F,
    state: &State,
    t: Value,
    system: &System,
) -> Result<Vec<Value>, SolveError>
where
    F: Fn(&State, Value, &System) -> Result<Vec<Value>, SolveError>,
{
    let derivs = slope(state, t, system)?;
    if derivs.len() != state.len() {
        return Err(SolveError::SlopeArity {
            expected: state.len(),
            got: derivs.len(),
        });
    }
    Ok(derivs)
}

/// One explicit update: `y + scale * dt * dy/dt` per variable.
fn advance(state: &State, derivs: &[Value], dt: Value, scale: f64) -> Result<State, SolveError> {
    let mut next = State::new();
    for ((label, value), deriv) in state.iter().zip(derivs) {
        next.set(label.clone(), value.try_add(*deriv * dt * scale)?);
    }
    Ok(next)
}

fn blend(k1: &[Value], k2: &[Value], w1: f64, w2: f64) -> Result<Vec<Value>, SolveError> {
    k1.iter()
        .zip(k2)
        .map(|(a, b)| (*a * w1).try_add(*b * w2).map_err(SolveError::from))
        .collect()
}

pub(super) fn eval_events(
    events: &[EventFn],
    state: &State,
    t: Value,
    system: &System,
) -> Result<Vec<f64>, SolveError> {
    events
        .iter()
        .map(|event| Ok(event(state, t, system)?.base_magnitude()))
        .collect()
}

/// Finds the first event whose sign changed between two evaluations and
/// the linear fraction of the step at which it crossed.
pub(super) fn first_crossing(prev: &[f64], next: &[f64]) -> Option<(usize, f64)> {
    for (index, (&p, &n)) in prev.iter().zip(next).enumerate() {
        let crossed = p * n < 0.0 || (n == 0.0 && p != 0.0);
        if crossed {
            return Some((index, p / (p - n)));
        }
    }
    None
}

pub(super) fn lerp_value(a: Value, b: Value, fraction: f64) -> Result<Value, SolveError> {
    Ok(a.try_add(b.try_sub(a)? * fraction)?)
}

pub(super) fn lerp_state(a: &State, b: &State, fraction: f64) -> Result<State, SolveError> {
    let mut out = State::new();
    for ((label, va), (_, vb)) in a.iter().zip(b.iter()) {
        out.set(label.clone(), lerp_value(va, vb, fraction)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{METER, SECOND};

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn exponential_system() -> System {
        let mut init = State::new();
        init.set("y", 2.0);
        System::new(init, 0.0, 1.0).with_dt(0.1)
    }

    fn exponential_slope(state: &State, _t: Value, _system: &System) -> Result<Vec<Value>, SolveError> {
        Ok(vec![state.get("y")?])
    }

    #[test]
    fn euler_matches_the_hand_computed_product() {
        let system = exponential_system();
        let (results, details) = run_euler(&system, exponential_slope).unwrap();

        assert!(details.success);
        assert_eq!(details.num_steps, 10);
        // Each Euler step multiplies by (1 + dt).
        let y_end = results.col("y").unwrap().last_value().unwrap();
        assert_relative_eq!(y_end.magnitude(), 2.0 * 1.1_f64.powi(10), epsilon = 1e-12);
        assert_eq!(results.len(), 11);
    }

    #[test]
    fn ralston_lands_near_the_analytic_solution() {
        let system = exponential_system();
        let (results, details) = run_ralston(&system, exponential_slope).unwrap();

        assert!(details.success);
        let y_end = results.col("y").unwrap().last_value().unwrap();
        // dy/dt = y from y(0) = 2 reaches 2e at t = 1; a second-order
        // method with dt = 0.1 is within standard truncation error.
        assert_abs_diff_eq!(y_end.magnitude(), 2.0 * std::f64::consts::E, epsilon = 1e-2);
        // Each Ralston step multiplies by exactly 1 + h + h^2/2.
        assert_relative_eq!(
            y_end.magnitude(),
            2.0 * 1.105_f64.powi(10),
            epsilon = 1e-12
        );
    }

    #[test]
    fn unit_bearing_states_integrate_with_unit_bearing_time_labels() {
        let mut init = State::new();
        init.set("y", 2.0 * METER);
        let system = System::new(init, 1.0 * SECOND, 3.0 * SECOND).with_dt(0.5 * SECOND);

        let slope = |state: &State, t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            // dy/dt = y / s + t * m / s^2
            let y = state.get("y")?;
            Ok(vec![(y / SECOND).try_add(t * (METER / (SECOND * SECOND)))?])
        };

        let (results, details) = run_euler(&system, slope).unwrap();
        assert!(details.success);
        assert_eq!(details.num_steps, 4);

        // Rows are keyed by quantity time labels; a bare number resolves
        // to the same row.
        let y = results.col("y").unwrap();
        assert_eq!(y.get(1.5 * SECOND).unwrap().units(), METER);
        assert_eq!(y.get(1.5).unwrap(), y.get(1.5 * SECOND).unwrap());

        // Hand-rolled Euler: y += dt * (y + t), all in coherent units.
        let mut expected = 2.0;
        let mut t = 1.0;
        for _ in 0..4 {
            expected += 0.5 * (expected + t);
            t += 0.5;
        }
        let y_end = y.last_value().unwrap();
        assert_relative_eq!(y_end.magnitude(), expected, epsilon = 1e-12);
    }

    #[test]
    fn dimensional_mistakes_in_the_slope_surface_unchanged() {
        let mut init = State::new();
        init.set("y", 2.0 * METER);
        let system = System::new(init, 0.0 * SECOND, 1.0 * SECOND);

        let slope = |state: &State, t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            // Adding meters to seconds is the user's bug; it must pass
            // through with the units engine's own message.
            Ok(vec![state.get("y")?.try_add(t)?])
        };

        let err = run_euler(&system, slope).unwrap_err();
        assert_eq!(err.to_string(), "cannot add `m` and `s`");
    }

    #[test]
    fn events_terminate_at_the_interpolated_crossing() {
        let mut init = State::new();
        init.set("y", 0.0);
        let system = System::new(init, 0.0, 1.0).with_dt(0.1);

        let slope = |_state: &State, _t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            Ok(vec![Value::Plain(1.0)])
        };
        let crossing = |state: &State, _t: Value, _system: &System| -> Result<Value, SolveError> {
            state.get("y")?.try_sub(Value::Plain(0.55)).map_err(Into::into)
        };
        let events: [EventFn; 1] = [&crossing];

        let (results, details) = run_euler_until(&system, slope, &events).unwrap();
        let record = details.event.expect("event should have fired");
        assert_eq!(record.index, 0);
        assert_relative_eq!(record.time.magnitude(), 0.55, epsilon = 1e-12);

        // The terminal row sits at the crossing, not the next grid point.
        let (label, terminal) = results.last_row().unwrap();
        assert_relative_eq!(
            label.value().unwrap().magnitude(),
            0.55,
            epsilon = 1e-12
        );
        assert_relative_eq!(terminal.get("y").unwrap().magnitude(), 0.55, epsilon = 1e-12);
    }

    #[test]
    fn slope_arity_is_checked() {
        let system = exponential_system();
        let slope = |_state: &State, _t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            Ok(vec![Value::Plain(1.0), Value::Plain(2.0)])
        };
        assert!(matches!(
            run_euler(&system, slope),
            Err(SolveError::SlopeArity {
                expected: 1,
                got: 2
            })
        ));
    }

    #[test]
    fn non_multiple_spans_land_exactly_on_the_end() {
        // dy/dt = 1, so the trajectory is the grid itself.
        let slope = |_state: &State, _t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            Ok(vec![Value::Plain(1.0)])
        };

        let mut init = State::new();
        init.set("y", 0.0);
        let system = System::new(init.clone(), 0.0, 1.0).with_dt(0.3);
        let (results, details) = run_euler(&system, slope).unwrap();
        // Three whole steps of 0.3 and a final step of 0.1.
        assert_eq!(details.num_steps, 4);
        assert_eq!(results.len(), 5);
        let (label, terminal) = results.last_row().unwrap();
        assert_relative_eq!(label.value().unwrap().magnitude(), 1.0);
        assert_relative_eq!(terminal.get("y").unwrap().magnitude(), 1.0, epsilon = 1e-12);

        // round(1.0 / 0.4) would overshoot t_end; the grid must not.
        let system = System::new(init, 0.0, 1.0).with_dt(0.4);
        let (results, details) = run_euler(&system, slope).unwrap();
        assert_eq!(details.num_steps, 3);
        let (label, _) = results.last_row().unwrap();
        assert_relative_eq!(label.value().unwrap().magnitude(), 1.0);
    }

    #[test]
    fn empty_spans_are_rejected() {
        let mut init = State::new();
        init.set("y", 1.0);

        // A degenerate span with no explicit dt must not be mistaken for
        // a bad step size.
        let system = System::new(init.clone(), 1.0, 1.0);
        assert!(matches!(
            run_euler(&system, exponential_slope),
            Err(SolveError::EmptySpan { .. })
        ));

        let reversed = System::new(init, 1.0, 0.0).with_dt(0.1);
        assert!(matches!(
            run_euler(&reversed, exponential_slope),
            Err(SolveError::EmptySpan { .. })
        ));
    }
}
