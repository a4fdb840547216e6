//! Tabular Data
//!
//! Records and a small column oriented data frame, the shapes in which
//! training data and prediction requests reach the predictor.
use crate::errors::IntervalError;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Numeric content, `NaN` for a missing cell, `None` for text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Missing => Some(f64::NAN),
            Value::Text(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Value::Number(v) => v.is_nan(),
            Value::Missing => true,
            Value::Text(_) => false,
        }
    }

    /// Category key of the cell, numbers are keyed by their display form.
    pub fn key(&self) -> Option<String> {
        match self {
            Value::Number(v) if !v.is_nan() => Some(v.to_string()),
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Missing => write!(f, "null"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

/// A single row, keyed by column name.
pub type Record = HashMap<String, Value>;

/// Named columns of equal length, in a fixed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
    n_rows: usize,
}

impl DataFrame {
    /// Build a frame from `(name, values)` pairs, keeping their order.
    pub fn from_columns<S, V>(columns: Vec<(S, Vec<V>)>) -> Result<Self, IntervalError>
    where
        S: Into<String>,
        V: Into<Value>,
    {
        let mut df = DataFrame::default();
        for (name, values) in columns {
            df.push_column(name, values.into_iter().map(Into::into).collect())?;
        }
        Ok(df)
    }

    /// Build a frame from records. Columns are the union of the record keys
    /// in sorted order, absent keys become missing cells.
    pub fn from_records(records: &[Record]) -> Self {
        let mut names: Vec<String> = records
            .iter()
            .flat_map(|r| r.keys())
            .collect::<HashSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        names.sort();
        let columns = names
            .iter()
            .map(|name| {
                records
                    .iter()
                    .map(|r| r.get(name).cloned().unwrap_or(Value::Missing))
                    .collect()
            })
            .collect();
        DataFrame {
            names,
            columns,
            n_rows: records.len(),
        }
    }

    /// Append a column, its length must match the existing columns.
    pub fn push_column<S: Into<String>>(&mut self, name: S, values: Vec<Value>) -> Result<(), IntervalError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(IntervalError::Data(format!("duplicate column {}", name)));
        }
        if !self.columns.is_empty() && values.len() != self.n_rows {
            return Err(IntervalError::Data(format!(
                "column {} has {} rows, expected {}",
                name,
                values.len(),
                self.n_rows
            )));
        }
        self.n_rows = values.len();
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// A column as floats, missing cells become `NaN`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, IntervalError> {
        let column = self
            .column(name)
            .ok_or_else(|| IntervalError::MissingColumn(name.to_string()))?;
        column
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| IntervalError::Data(format!("column {} holds the non numeric value {}", name, v)))
            })
            .collect()
    }

    pub fn row(&self, i: usize) -> Option<Record> {
        if i >= self.n_rows {
            return None;
        }
        Some(
            self.names
                .iter()
                .zip(&self.columns)
                .map(|(n, c)| (n.clone(), c[i].clone()))
                .collect(),
        )
    }

    pub fn records(&self) -> Vec<Record> {
        (0..self.n_rows).filter_map(|i| self.row(i)).collect()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> DataFrame {
        self.slice(0, n)
    }

    /// Rows `start..end`, clamped to the frame.
    pub fn slice(&self, start: usize, end: usize) -> DataFrame {
        let end = end.min(self.n_rows);
        let start = start.min(end);
        DataFrame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[start..end].to_vec()).collect(),
            n_rows: end - start,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols())
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "shape: ({}, {})", self.n_rows, self.n_cols())?;
        writeln!(f, "{}", self.names.join("\t"))?;
        for i in 0..self.n_rows {
            let row: Vec<String> = self.columns.iter().map(|c| c[i].to_string()).collect();
            writeln!(f, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}
