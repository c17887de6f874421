use std::fmt;

use crate::units::{Quantity, Value};

/// A container label: a number, a text key, or a unit-bearing quantity.
///
/// Labels deliberately do not implement `Eq`/`Hash`: a bare `2.0` matches
/// a `2.0 meter` label (numeric value, ignoring the wrapper), while two
/// quantity labels must also agree on units, so matching is a predicate
/// rather than an equivalence relation. Containers keep insertion order
/// and look labels up with [`matches`](Self::matches).
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    /// A numeric label.
    Number(f64),
    /// A text label, used for state-variable and column names.
    Text(String),
    /// A unit-bearing numeric label.
    Quantity(Quantity),
}

impl Label {
    /// Whether two labels address the same entry.
    #[must_use]
    pub fn matches(&self, other: &Label) -> bool {
        match (self, other) {
            (Label::Text(a), Label::Text(b)) => a == b,
            (Label::Text(_), _) | (_, Label::Text(_)) => false,
            (Label::Number(a), Label::Number(b)) => a == b,
            (Label::Number(a), Label::Quantity(q)) | (Label::Quantity(q), Label::Number(a)) => {
                *a == q.magnitude
            }
            (Label::Quantity(p), Label::Quantity(q)) => {
                p.units == q.units && p.magnitude == q.magnitude
            }
        }
    }

    /// The numeric view of the label, if it has one.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        match self {
            Label::Number(x) => Some(Value::Plain(*x)),
            Label::Quantity(q) => Some(Value::from(*q)),
            Label::Text(_) => None,
        }
    }
}

impl From<f64> for Label {
    fn from(x: f64) -> Self {
        Label::Number(x)
    }
}

impl From<i32> for Label {
    fn from(x: i32) -> Self {
        Label::Number(f64::from(x))
    }
}

impl From<i64> for Label {
    fn from(x: i64) -> Self {
        Label::Number(x as f64)
    }
}

impl From<usize> for Label {
    fn from(x: usize) -> Self {
        Label::Number(x as f64)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_owned())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Text(s)
    }
}

impl From<Quantity> for Label {
    fn from(q: Quantity) -> Self {
        Label::Quantity(q)
    }
}

impl From<Value> for Label {
    fn from(v: Value) -> Self {
        match v {
            Value::Plain(x) => Label::Number(x),
            Value::Quantity(q) => Label::Quantity(q),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Number(x) => write!(f, "{x}"),
            Label::Text(s) => write!(f, "{s}"),
            Label::Quantity(q) => write!(f, "{q}"),
        }
    }
}
