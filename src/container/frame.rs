use std::fmt;
use std::marker::PhantomData;

use super::LabelError;
use super::label::Label;
use super::series::{Series, SeriesKind, SweepAxis, TimeAxis, VarAxis};
use crate::units::Value;

/// Ties a frame subtype to the series subtypes of its two axes.
pub trait FrameKind {
    /// Kind of series an extracted column yields.
    type Column: SeriesKind;
    /// Kind of series an extracted row yields.
    type Row: SeriesKind;
}

/// Rows are time points; columns extract as [`TimeSeries`], rows as
/// [`State`].
///
/// [`TimeSeries`]: super::TimeSeries
/// [`State`]: super::State
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeFrameKind {}

/// Rows are swept parameter values; both axes extract as [`SweepSeries`].
///
/// [`SweepSeries`]: super::SweepSeries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepFrameKind {}

impl FrameKind for TimeFrameKind {
    type Column = TimeAxis;
    type Row = VarAxis;
}

impl FrameKind for SweepFrameKind {
    type Column = SweepAxis;
    type Row = SweepAxis;
}

/// A table of state trajectories over time.
pub type TimeFrame = Frame<TimeFrameKind>;

/// A table of sweep results over parameter values.
pub type SweepFrame = Frame<SweepFrameKind>;

/// An ordered mapping from row labels to rows over a fixed column set.
///
/// Every row holds a value for every declared column; short rows are
/// padded with the explicit missing marker [`Value::NAN`]. Row and column
/// addressing commute: `frame.row(r)?.get(c)` equals
/// `frame.col(c)?.get(r)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<K: FrameKind> {
    columns: Vec<String>,
    rows: Vec<(Label, Vec<Value>)>,
    _kind: PhantomData<K>,
}

impl<K: FrameKind> Frame<K> {
    /// Creates an empty frame with the given column names.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// The declared column names, in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Iterates over row labels in insertion order.
    pub fn row_labels(&self) -> impl Iterator<Item = &Label> {
        self.rows.iter().map(|(l, _)| l)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Inserts a row, replacing any row with a matching label.
    ///
    /// Rows shorter than the column set are padded with [`Value::NAN`].
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::RowArity`] if more values than columns are
    /// supplied.
    pub fn insert_row<I, V>(&mut self, label: impl Into<Label>, values: I) -> Result<(), LabelError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut row: Vec<Value> = values.into_iter().map(Into::into).collect();
        if row.len() > self.columns.len() {
            return Err(LabelError::RowArity {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        row.resize(self.columns.len(), Value::NAN);

        let label = label.into();
        match self.rows.iter_mut().find(|(l, _)| l.matches(&label)) {
            Some(entry) => entry.1 = row,
            None => self.rows.push((label, row)),
        }
        Ok(())
    }

    /// Extracts a row as a series labeled by column name.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Missing`] if no row matches the label.
    pub fn row(&self, label: impl Into<Label>) -> Result<Series<K::Row>, LabelError> {
        let label = label.into();
        let (_, values) = self
            .rows
            .iter()
            .find(|(l, _)| l.matches(&label))
            .ok_or(LabelError::Missing { label })?;
        Ok(Series::from_pairs(
            self.columns.iter().cloned().zip(values.iter().copied()),
        ))
    }

    /// Extracts a column as a series labeled by row label.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::MissingColumn`] for an undeclared name.
    pub fn col(&self, name: &str) -> Result<Series<K::Column>, LabelError> {
        let index = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| LabelError::MissingColumn {
                name: name.to_owned(),
            })?;
        Ok(Series::from_pairs(
            self.rows
                .iter()
                .map(|(label, values)| (label.clone(), values[index])),
        ))
    }

    /// The last row and its label.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Empty`] on an empty frame.
    pub fn last_row(&self) -> Result<(Label, Series<K::Row>), LabelError> {
        let (label, _) = self.rows.last().ok_or(LabelError::Empty)?;
        Ok((label.clone(), self.row(label.clone())?))
    }
}

impl<K: FrameKind> fmt::Display for Frame<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>12}", "")?;
        for column in &self.columns {
            write!(f, "  {column:>12}")?;
        }
        writeln!(f)?;
        for (label, values) in &self.rows {
            write!(f, "{:>12}", label.to_string())?;
            for value in values {
                write!(f, "  {:>12}", value.to_string())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{State, SweepSeries, TimeSeries};

    #[test]
    fn row_and_column_addressing_commute() {
        let mut frame = TimeFrame::with_columns(["a", "t", "dt"]);
        frame.insert_row(1000, [1.0, 2.0, f64::NAN]).unwrap();
        frame.insert_row("label", [4.0, 5.0, 6.0]).unwrap();

        for row_label in ["label"] {
            for column in ["a", "t", "dt"] {
                let by_row = frame.row(row_label).unwrap().get(column).unwrap();
                let by_col = frame.col(column).unwrap().get(row_label).unwrap();
                assert_eq!(by_row, by_col);
            }
        }

        let row = frame.row(1000).unwrap();
        assert_eq!(row.get("a").unwrap(), Value::Plain(1.0));
        assert_eq!(row.get("t").unwrap(), Value::Plain(2.0));
        assert!(row.get("dt").unwrap().is_nan());
    }

    #[test]
    fn columns_extract_with_the_frame_subtype() {
        let mut frame = TimeFrame::with_columns(["a", "t"]);
        frame.insert_row(0, [1.0, 2.0]).unwrap();
        let _column: TimeSeries = frame.col("a").unwrap();
        let _row: State = frame.row(0).unwrap();
        assert_eq!(frame.clone(), frame);

        let mut sweep = SweepFrame::with_columns(["a", "t"]);
        sweep.insert_row(0.5, [1.0, 2.0]).unwrap();
        let _column: SweepSeries = sweep.col("a").unwrap();
        let _row: SweepSeries = sweep.row(0.5).unwrap();
    }

    #[test]
    fn short_rows_are_padded_with_the_missing_marker() {
        let mut frame = SweepFrame::with_columns(["a", "b", "c"]);
        frame.insert_row(0, [1.0]).unwrap();
        assert!(frame.row(0).unwrap().get("b").unwrap().is_nan());
        assert!(frame.row(0).unwrap().get("c").unwrap().is_nan());
    }

    #[test]
    fn over_long_rows_are_rejected() {
        let mut frame = TimeFrame::with_columns(["a"]);
        let err = frame.insert_row(0, [1.0, 2.0]).unwrap_err();
        assert_eq!(err, LabelError::RowArity {
            expected: 1,
            got: 2,
        });
    }

    #[test]
    fn undeclared_columns_fail_distinctly() {
        let frame = TimeFrame::with_columns(["a"]);
        let err = frame.col("b").unwrap_err();
        assert_eq!(err.to_string(), "no column named `b`");
    }
}
