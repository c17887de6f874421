use super::LabelError;
use super::series::State;
use crate::units::Value;

/// The bundle a simulation threads through its slope and error functions:
/// initial state, time span, optional step size, and named parameters.
///
/// Parameters share the containers' failure semantics: a mistyped name
/// inside a slope function is a [`LabelError::Missing`], not a default.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    /// Initial values of the state variables.
    pub init: State,

    /// Start of the time span.
    pub t0: Value,

    /// End of the time span.
    pub t_end: Value,

    /// Fixed step size; solvers that need one default to a hundredth of
    /// the span when absent.
    pub dt: Option<Value>,

    params: State,
}

impl System {
    /// Creates a system from an initial state and a time span.
    pub fn new(init: State, t0: impl Into<Value>, t_end: impl Into<Value>) -> Self {
        Self {
            init,
            t0: t0.into(),
            t_end: t_end.into(),
            dt: None,
            params: State::new(),
        }
    }

    /// Sets the fixed step size.
    #[must_use]
    pub fn with_dt(mut self, dt: impl Into<Value>) -> Self {
        self.dt = Some(dt.into());
        self
    }

    /// Adds a named parameter.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.set(name, value);
        self
    }

    /// Looks up a named parameter.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Missing`] for an undeclared name.
    pub fn param(&self, name: &str) -> Result<Value, LabelError> {
        self.params.get(name)
    }

    /// The full parameter bundle.
    #[must_use]
    pub fn params(&self) -> &State {
        &self.params
    }
}
