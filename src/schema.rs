//! Feature Schema
//!
//! Column roles and the mapping from a data frame to the numeric feature
//! matrix consumed by the boosters. The schema is fit once on the training
//! frame and reused for every prediction request.
use crate::constants::MIN_TRAINING_ROWS;
use crate::errors::IntervalError;
use crate::frame::{DataFrame, Record, Value};
use crate::utils::items_to_strings;
use hashbrown::HashMap;
use log::warn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role of a described column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    /// The value to predict.
    Output,
    /// Ordinal encoded against the categories seen in training.
    Categorical,
    /// Not used as a feature.
    Ignore,
}

impl FromStr for ColumnRole {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "output" => Ok(ColumnRole::Output),
            "categorical" => Ok(ColumnRole::Categorical),
            "ignore" => Ok(ColumnRole::Ignore),
            _ => Err(IntervalError::ParseString(
                s.to_string(),
                "ColumnRole".to_string(),
                items_to_strings(&["output", "categorical", "ignore"]),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureKind {
    Numeric,
    /// Sorted training categories, a value is encoded as its position.
    Categorical { categories: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureColumn {
    fn encode(&self, value: &Value) -> Result<f64, IntervalError> {
        match &self.kind {
            FeatureKind::Numeric => value.as_f64().ok_or_else(|| {
                IntervalError::Data(format!(
                    "feature {} was numeric in training but holds {}",
                    self.name, value
                ))
            }),
            FeatureKind::Categorical { categories } => Ok(value
                .key()
                .and_then(|k| categories.binary_search(&k).ok())
                .map_or(f64::NAN, |i| i as f64)),
        }
    }
}

/// Output column and ordered feature columns learned from a training frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub output_column: String,
    pub features: Vec<FeatureColumn>,
}

impl FeatureSchema {
    /// Learn the schema of a training frame.
    ///
    /// * `df` - Training data, output column included.
    /// * `roles` - Role of every described column, exactly one must be the output.
    pub fn fit(df: &DataFrame, roles: &HashMap<String, ColumnRole>) -> Result<Self, IntervalError> {
        let mut outputs: Vec<&String> = roles
            .iter()
            .filter(|(_, r)| **r == ColumnRole::Output)
            .map(|(n, _)| n)
            .collect();
        if outputs.len() != 1 {
            outputs.sort();
            return Err(IntervalError::Configuration(format!(
                "exactly one output column must be described, found [{}]",
                outputs.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
            )));
        }
        let output_column = outputs[0].clone();
        if df.column(&output_column).is_none() {
            return Err(IntervalError::MissingColumn(output_column));
        }
        for name in roles.keys() {
            if df.column(name).is_none() {
                warn!("Described column {} is not present in the training data.", name);
            }
        }

        let mut features = Vec::new();
        for name in df.column_names() {
            let role = roles.get(name).copied();
            if name == &output_column || role == Some(ColumnRole::Ignore) {
                continue;
            }
            let column = df.column(name).unwrap_or_default();
            let has_text = column.iter().any(|v| matches!(v, Value::Text(_)));
            let kind = if role == Some(ColumnRole::Categorical) || has_text {
                let mut categories: Vec<String> = column.iter().filter_map(Value::key).collect();
                categories.sort();
                categories.dedup();
                FeatureKind::Categorical { categories }
            } else {
                FeatureKind::Numeric
            };
            features.push(FeatureColumn {
                name: name.clone(),
                kind,
            });
        }
        if features.is_empty() {
            return Err(IntervalError::Data("the training data has no feature columns".to_string()));
        }
        Ok(FeatureSchema {
            output_column,
            features,
        })
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    /// Every record must carry every feature key, an explicit missing value
    /// counts as present.
    pub fn check_records(&self, records: &[Record]) -> Result<(), IntervalError> {
        for feature in &self.features {
            if records.iter().any(|r| !r.contains_key(&feature.name)) {
                return Err(IntervalError::MissingColumn(feature.name.clone()));
            }
        }
        Ok(())
    }

    /// Encode the feature columns of a frame, column major. Columns not in the
    /// schema, the output included, are ignored.
    pub fn transform(&self, df: &DataFrame) -> Result<Vec<f64>, IntervalError> {
        let mut data = Vec::with_capacity(df.n_rows() * self.n_features());
        for feature in &self.features {
            let column = df
                .column(&feature.name)
                .ok_or_else(|| IntervalError::MissingColumn(feature.name.clone()))?;
            for value in column {
                data.push(feature.encode(value)?);
            }
        }
        Ok(data)
    }

    /// The output column as training targets.
    pub fn output_values(&self, df: &DataFrame) -> Result<Vec<f64>, IntervalError> {
        let column = df
            .column(&self.output_column)
            .ok_or_else(|| IntervalError::MissingColumn(self.output_column.clone()))?;
        if column.len() < MIN_TRAINING_ROWS {
            return Err(IntervalError::Data(format!(
                "output column {} has {} rows, at least {} are required",
                self.output_column,
                column.len(),
                MIN_TRAINING_ROWS
            )));
        }
        column
            .iter()
            .map(|v| match v {
                Value::Number(x) if x.is_finite() => Ok(*x),
                _ => Err(IntervalError::Data(format!(
                    "output column {} must hold finite numbers, found {}",
                    self.output_column, v
                ))),
            })
            .collect()
    }
}
