use super::ode::{eval_events, first_crossing, lerp_state, lerp_value};
use super::{Details, EventFn, EventRecord, SolveError};
use crate::container::{Label, State, System, TimeFrame};
use crate::units::{Units, Value};

/// Tolerances and limits for the adaptive solver.
#[derive(Debug, Clone, Copy)]
pub struct IvpOptions {
    /// Relative tolerance on each state variable.
    pub rtol: f64,

    /// Absolute tolerance on each state variable.
    pub atol: f64,

    /// Budget of accepted steps before the run reports failure.
    pub max_steps: usize,

    /// Initial step size; a hundredth of the span when unset.
    pub first_step: Option<f64>,
}

impl Default for IvpOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            max_steps: 10_000,
            first_step: None,
        }
    }
}

/// Integrates with an adaptive Dormand–Prince 5(4) stepper.
///
/// Units round-trip through the unit-unaware stepping core: state and
/// time are stripped to bare magnitudes before stepping — the slope
/// function sees a bare-numeric time, so it may interpolate external
/// inputs keyed by bare labels — and each variable's initial units are
/// re-applied to its trajectory column, with the time units re-applied
/// to the row labels.
///
/// # Errors
///
/// Returns [`SolveError`] for a malformed span and propagates errors
/// from the slope function unchanged. Running out of steps is reported
/// through [`Details::success`], not an error.
pub fn run_solve_ivp<F>(system: &System, slope: F) -> Result<(TimeFrame, Details), SolveError>
where
    F: Fn(&State, Value, &System) -> Result<Vec<Value>, SolveError>,
{
    run_solve_ivp_until(system, slope, &[], &IvpOptions::default())
}

/// [`run_solve_ivp`] with event functions and explicit options.
///
/// # Errors
///
/// As [`run_solve_ivp`], also propagating errors from event functions.
pub fn run_solve_ivp_until<F>(
    system: &System,
    slope: F,
    events: &[EventFn],
    options: &IvpOptions,
) -> Result<(TimeFrame, Details), SolveError>
where
    F: Fn(&State, Value, &System) -> Result<Vec<Value>, SolveError>,
{
    let span = system.t_end.try_sub(system.t0)?;
    let span_mag = span.base_magnitude() / system.t0.units().factor();
    if span_mag.is_nan() || span_mag <= 0.0 {
        return Err(SolveError::EmptySpan {
            t0: system.t0,
            t_end: system.t_end,
        });
    }

    let labels: Vec<Label> = system.init.labels().cloned().collect();
    let columns: Vec<String> = labels.iter().map(ToString::to_string).collect();
    let var_units: Vec<Units> = system.init.values().map(|v| v.units()).collect();
    let time_units = system.t0.units();

    let mut t = system.t0.magnitude();
    let t_end = t + span_mag;
    let mut y: Vec<f64> = system.init.values().map(|v| v.magnitude()).collect();

    // The slope function sees bare magnitudes and bare time.
    let eval = |t: f64, y: &[f64]| -> Result<Vec<f64>, SolveError> {
        let state = bare_state(&labels, y);
        let derivs = slope(&state, Value::Plain(t), system)?;
        if derivs.len() != y.len() {
            return Err(SolveError::SlopeArity {
                expected: y.len(),
                got: derivs.len(),
            });
        }
        Ok(derivs.iter().map(Value::magnitude).collect())
    };

    let mut frame = TimeFrame::with_columns(columns);
    let rewrap = |t: f64, y: &[f64]| -> (Value, State) {
        let time = Value::with_units(t, time_units);
        let mut state = State::new();
        for ((label, units), value) in labels.iter().zip(&var_units).zip(y) {
            state.set(label.clone(), Value::with_units(*value, *units));
        }
        (time, state)
    };

    let (time, state) = rewrap(t, &y);
    frame.insert_row(Label::from(time), state.values())?;
    let mut event_prev = eval_events(events, &state, time, system)?;
    let mut prev = (time, state);

    let mut h = options.first_step.unwrap_or(span_mag / 100.0);
    let mut accepted = 0usize;
    let mut attempts = 0usize;

    while t < t_end - 1e-12 * span_mag {
        if attempts >= options.max_steps {
            let details = Details {
                success: false,
                message: "step budget exhausted before the end of the integration interval"
                    .to_owned(),
                num_steps: accepted,
                event: None,
            };
            return Ok((frame, details));
        }
        attempts += 1;
        h = h.min(t_end - t);

        let (y_new, error_norm) = dormand_prince_step(&eval, t, &y, h, options)?;

        if error_norm <= 1.0 {
            let t_new = t + h;
            let (time, state) = rewrap(t_new, &y_new);

            let event_next = eval_events(events, &state, time, system)?;
            if let Some((index, fraction)) = first_crossing(&event_prev, &event_next) {
                let t_star = lerp_value(prev.0, time, fraction)?;
                let terminal = lerp_state(&prev.1, &state, fraction)?;
                frame.insert_row(Label::from(t_star), terminal.values())?;
                let details = Details {
                    success: true,
                    message: format!("event {index} crossed zero"),
                    num_steps: accepted + 1,
                    event: Some(EventRecord {
                        index,
                        time: t_star,
                    }),
                };
                return Ok((frame, details));
            }

            frame.insert_row(Label::from(time), state.values())?;
            event_prev = event_next;
            prev = (time, state);
            t = t_new;
            y = y_new;
            accepted += 1;
        }

        h *= step_factor(error_norm);
    }

    let details = Details {
        success: true,
        message: "the solver reached the end of the integration interval".to_owned(),
        num_steps: accepted,
        event: None,
    };
    Ok((frame, details))
}

fn bare_state(labels: &[Label], y: &[f64]) -> State {
    let mut state = State::new();
    for (label, value) in labels.iter().zip(y) {
        state.set(label.clone(), Value::Plain(*value));
    }
    state
}

/// Growth/shrink factor from the scaled error norm, clamped to [0.2, 5].
fn step_factor(error_norm: f64) -> f64 {
    if error_norm == 0.0 {
        return 5.0;
    }
    (0.9 * error_norm.powf(-0.2)).clamp(0.2, 5.0)
}

/// One Dormand–Prince 5(4) step: returns the fifth-order update and the
/// scaled norm of the embedded error estimate.
fn dormand_prince_step(
    eval: &impl Fn(f64, &[f64]) -> Result<Vec<f64>, SolveError>,
    t: f64,
    y: &[f64],
    h: f64,
    options: &IvpOptions,
) -> Result<(Vec<f64>, f64), SolveError> {
    const C: [f64; 6] = [1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
    const A: [&[f64]; 6] = [
        &[1.0 / 5.0],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
        &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
        &[
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
        ],
        &[
            35.0 / 384.0,
            0.0,
            500.0 / 1113.0,
            125.0 / 192.0,
            -2187.0 / 6784.0,
            11.0 / 84.0,
        ],
    ];
    // Difference between the fifth- and fourth-order weights.
    const E: [f64; 7] = [
        35.0 / 384.0 - 5179.0 / 57600.0,
        0.0,
        500.0 / 1113.0 - 7571.0 / 16695.0,
        125.0 / 192.0 - 393.0 / 640.0,
        -2187.0 / 6784.0 + 92097.0 / 339200.0,
        11.0 / 84.0 - 187.0 / 2100.0,
        -1.0 / 40.0,
    ];

    let dim = y.len();
    let mut k: Vec<Vec<f64>> = Vec::with_capacity(7);
    k.push(eval(t, y)?);
    for (stage, weights) in A.iter().enumerate() {
        let mut probe = y.to_vec();
        for (j, &a) in weights.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for i in 0..dim {
                probe[i] += h * a * k[j][i];
            }
        }
        k.push(eval(t + C[stage] * h, &probe)?);
    }

    // The last stage already evaluates the fifth-order update.
    let y_new = {
        let mut out = y.to_vec();
        for (j, &a) in A[5].iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for i in 0..dim {
                out[i] += h * a * k[j][i];
            }
        }
        out
    };

    let mut error_norm = 0.0_f64;
    for i in 0..dim {
        let mut err = 0.0;
        for (j, &e) in E.iter().enumerate() {
            err += e * k[j][i];
        }
        err *= h;
        let scale = options.atol + options.rtol * y[i].abs().max(y_new[i].abs());
        error_norm = error_norm.max((err / scale).abs());
    }

    Ok((y_new, error_norm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::interpolate;
    use crate::container::TimeSeries;
    use crate::units::{METER, SECOND};

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn matches_the_analytic_exponential() {
        let mut init = State::new();
        init.set("y", 2.0);
        let system = System::new(init, 0.0, 1.0);

        let slope = |state: &State, _t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            Ok(vec![state.get("y")?])
        };

        let (results, details) = run_solve_ivp(&system, slope).unwrap();
        assert!(details.success);
        let y_end = results.col("y").unwrap().last_value().unwrap();
        assert_relative_eq!(y_end.magnitude(), 2.0 * std::f64::consts::E, epsilon = 1e-5);
    }

    #[test]
    fn strips_units_for_the_slope_and_reapplies_them_to_results() {
        let mut init = State::new();
        init.set("y", 2.0 * METER);
        let system = System::new(init, 1.0 * SECOND, 3.0 * SECOND);

        // The slope sees bare numbers even though the system has units.
        let slope = |state: &State, t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            let y = state.get("y")?;
            assert!(matches!(y, Value::Plain(_)));
            assert!(matches!(t, Value::Plain(_)));
            Ok(vec![y.try_add(t)?])
        };

        let (results, details) = run_solve_ivp(&system, slope).unwrap();
        assert!(details.success);

        // dy/dt = y + t from y(1) = 2: y(t) = 4 e^(t-1) - t - 1.
        let y = results.col("y").unwrap();
        let y_end = y.last_value().unwrap();
        let analytic = 4.0 * std::f64::consts::E.powi(2) - 4.0;
        assert_relative_eq!(y_end.magnitude(), analytic, epsilon = 1e-4);

        // Initial units come back on the column and the row labels.
        assert_eq!(y_end.units(), METER);
        assert_eq!(y.get(1.0 * SECOND).unwrap(), 2.0 * METER);
    }

    #[test]
    fn slope_functions_may_interpolate_external_inputs_by_bare_time() {
        let measured = TimeSeries::from_pairs([(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]) * METER;
        let forcing = interpolate(&measured).unwrap();

        let mut init = State::new();
        init.set("y", 0.0);
        let system = System::new(init, 0.0, 2.0);

        let slope = move |_state: &State, t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            // t arrives bare; the interpolant accepts it against the
            // measured series directly.
            let level = forcing.at(t)?;
            Ok(vec![Value::Plain(level.magnitude())])
        };

        let (results, details) = run_solve_ivp(&system, slope).unwrap();
        assert!(details.success);
        // dy/dt = t + 1 from 0: y(2) = 4.
        let y_end = results.col("y").unwrap().last_value().unwrap();
        assert_relative_eq!(y_end.magnitude(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn events_stop_the_adaptive_run_early() {
        let mut init = State::new();
        init.set("y", 0.0);
        let system = System::new(init, 0.0, 10.0);

        let slope = |_state: &State, _t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            Ok(vec![Value::Plain(1.0)])
        };
        let crossing = |state: &State, _t: Value, _system: &System| -> Result<Value, SolveError> {
            state.get("y")?.try_sub(Value::Plain(2.5)).map_err(Into::into)
        };
        let events: [EventFn; 1] = [&crossing];

        let (results, details) =
            run_solve_ivp_until(&system, slope, &events, &IvpOptions::default()).unwrap();
        let record = details.event.expect("event should have fired");
        assert_eq!(record.index, 0);
        assert_abs_diff_eq!(record.time.magnitude(), 2.5, epsilon = 1e-9);

        let (label, _) = results.last_row().unwrap();
        assert_abs_diff_eq!(label.value().unwrap().magnitude(), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn exhausting_the_step_budget_is_reported_not_raised() {
        let mut init = State::new();
        init.set("y", 2.0);
        let system = System::new(init, 0.0, 1.0);

        let slope = |state: &State, _t: Value, _system: &System| -> Result<Vec<Value>, SolveError> {
            Ok(vec![state.get("y")?])
        };

        let options = IvpOptions {
            max_steps: 3,
            ..IvpOptions::default()
        };
        let (_, details) = run_solve_ivp_until(&system, slope, &[], &options).unwrap();
        assert!(!details.success);
        assert!(details.message.contains("step budget"));
    }
}
