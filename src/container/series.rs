use std::fmt;
use std::marker::PhantomData;
use std::ops::Mul;

use super::LabelError;
use super::label::Label;
use crate::units::{Units, Value};

/// Marks what a series' label axis means.
///
/// The marker changes display and the subtype of containers derived from
/// the series; the structure is identical across kinds.
pub trait SeriesKind {
    /// Human-readable name of the label axis.
    const AXIS: &'static str;
}

/// Label axis is time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeAxis {}

/// Label axis is a swept parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepAxis {}

/// Labels are state-variable names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarAxis {}

impl SeriesKind for TimeAxis {
    const AXIS: &'static str = "time";
}

impl SeriesKind for SweepAxis {
    const AXIS: &'static str = "parameter";
}

impl SeriesKind for VarAxis {
    const AXIS: &'static str = "variable";
}

/// Values indexed by time.
pub type TimeSeries = Series<TimeAxis>;

/// Values indexed by a swept parameter.
pub type SweepSeries = Series<SweepAxis>;

/// A named bundle of state variables.
pub type State = Series<VarAxis>;

/// An ordered mapping from unique labels to maybe-unit values.
///
/// Insertion order is preserved. Lookup uses [`Label::matches`], so a
/// quantity key and an equal bare number address the same entry. Cloning
/// preserves the concrete subtype, because the subtype is the type
/// parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<K: SeriesKind> {
    entries: Vec<(Label, Value)>,
    _kind: PhantomData<K>,
}

impl<K: SeriesKind> Default for Series<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SeriesKind> Series<K> {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Creates a series from values, labeling them `0, 1, 2, ...`.
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let entries = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Label::from(i), v.into()))
            .collect();
        Self {
            entries,
            _kind: PhantomData,
        }
    }

    /// Creates a series from explicit (label, value) pairs.
    ///
    /// Later pairs replace earlier ones with a matching label.
    pub fn from_pairs<I, L, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<Label>,
        V: Into<Value>,
    {
        let mut series = Self::new();
        for (label, value) in pairs {
            series.set(label, value);
        }
        series
    }

    /// Inserts a value, replacing any entry with a matching label.
    pub fn set(&mut self, label: impl Into<Label>, value: impl Into<Value>) {
        let label = label.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(l, _)| l.matches(&label)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    /// Looks up the value at a label.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Missing`] if no entry matches, so a mistyped
    /// variable name fails loudly instead of yielding a default.
    pub fn get(&self, label: impl Into<Label>) -> Result<Value, LabelError> {
        let label = label.into();
        self.entries
            .iter()
            .find(|(l, _)| l.matches(&label))
            .map(|(_, v)| *v)
            .ok_or(LabelError::Missing { label })
    }

    /// Mutable access to the value at a label.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Missing`] if no entry matches.
    pub fn get_mut(&mut self, label: impl Into<Label>) -> Result<&mut Value, LabelError> {
        let label = label.into();
        self.entries
            .iter_mut()
            .find(|(l, _)| l.matches(&label))
            .map(|(_, v)| v)
            .ok_or(LabelError::Missing { label })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the series has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(label, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, Value)> {
        self.entries.iter().map(|(l, v)| (l, *v))
    }

    /// Iterates over labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|(l, _)| l)
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = Value> {
        self.entries.iter().map(|(_, v)| *v)
    }

    /// The first value.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Empty`] on an empty series.
    pub fn first_value(&self) -> Result<Value, LabelError> {
        self.entries
            .first()
            .map(|(_, v)| *v)
            .ok_or(LabelError::Empty)
    }

    /// The last value.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Empty`] on an empty series.
    pub fn last_value(&self) -> Result<Value, LabelError> {
        self.entries
            .last()
            .map(|(_, v)| *v)
            .ok_or(LabelError::Empty)
    }

    /// Maps every value, keeping labels and subtype.
    #[must_use]
    pub fn map(&self, f: impl Fn(Value) -> Value) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(l, v)| (l.clone(), f(*v)))
                .collect(),
            _kind: PhantomData,
        }
    }

    /// The unit tags in force across the series.
    #[must_use]
    pub fn units(&self) -> SeriesUnits {
        let mut tags = self.values().map(|v| v.units());
        match tags.next() {
            None => SeriesUnits::Uniform(crate::units::DIMENSIONLESS),
            Some(first) => {
                if tags.all(|u| u == first) {
                    SeriesUnits::Uniform(first)
                } else {
                    SeriesUnits::Mixed(self.values().map(|v| v.units()).collect())
                }
            }
        }
    }
}

/// The unit tags of a series, as reported by [`Series::units`].
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesUnits {
    /// Every element carries the same tag (dimensionless if empty or bare).
    Uniform(Units),
    /// Elements carry their own tags, reported elementwise.
    Mixed(Vec<Units>),
}

/// Strips units from every element, preserving labels and subtype.
///
/// For a series uniformly scaled by one unit this is the elementwise
/// division by that unit.
#[must_use]
pub fn magnitudes<K: SeriesKind>(series: &Series<K>) -> Series<K> {
    series.map(|v| Value::Plain(v.magnitude()))
}

/// Scales every element by a unit tag, e.g. `series * METER`.
impl<K: SeriesKind> Mul<Units> for Series<K> {
    type Output = Series<K>;

    fn mul(self, rhs: Units) -> Series<K> {
        self.map(|v| v * rhs)
    }
}

impl<K: SeriesKind> fmt::Display for Series<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12}  value", K::AXIS)?;
        for (label, value) in self.iter() {
            writeln!(f, "{:>12}  {}", label.to_string(), value)?;
        }
        Ok(())
    }
}
