use crate::constants::PREDICTION_KEY;
use crate::errors::IntervalError;
use crate::frame::{DataFrame, Value};
use crate::intervals::levels::interval_label;
use crate::intervals::query::{IntervalResult, IntervalResults};
use crate::utils::items_to_strings;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoding of interval results handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnShape {
    /// One row per record, columns `prediction` then `interval_<level>`.
    DataFrame,
    /// `[prediction, bound_1, ..., bound_k]` per record.
    List,
    /// `prediction` and `interval_<level>` keys, single record only.
    Dict,
    /// One dict per record, batch only.
    Records,
}

impl ReturnShape {
    const NAMES: [&'static str; 4] = ["df", "list", "dict", "records"];
}

impl FromStr for ReturnShape {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "df" => Ok(ReturnShape::DataFrame),
            "list" => Ok(ReturnShape::List),
            "dict" => Ok(ReturnShape::Dict),
            "records" => Ok(ReturnShape::Records),
            _ => Err(IntervalError::ParseString(
                s.to_string(),
                "return_type".to_string(),
                items_to_strings(&ReturnShape::NAMES),
            )),
        }
    }
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ReturnShape::DataFrame => "df",
            ReturnShape::List => "list",
            ReturnShape::Dict => "dict",
            ReturnShape::Records => "records",
        };
        write!(f, "{}", name)
    }
}

/// Interval results in the shape the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalOutput {
    Frame(DataFrame),
    /// A batch in list shape.
    List(Vec<Vec<f64>>),
    /// A single record in list shape.
    Row(Vec<f64>),
    Dict(HashMap<String, f64>),
    Records(Vec<HashMap<String, f64>>),
}

impl IntervalOutput {
    pub fn as_frame(&self) -> Option<&DataFrame> {
        match self {
            IntervalOutput::Frame(df) => Some(df),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Vec<f64>]> {
        match self {
            IntervalOutput::List(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_row(&self) -> Option<&[f64]> {
        match self {
            IntervalOutput::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&HashMap<String, f64>> {
        match self {
            IntervalOutput::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[HashMap<String, f64>]> {
        match self {
            IntervalOutput::Records(r) => Some(r),
            _ => None,
        }
    }

    /// Number of records represented.
    pub fn len(&self) -> usize {
        match self {
            IntervalOutput::Frame(df) => df.n_rows(),
            IntervalOutput::List(rows) => rows.len(),
            IntervalOutput::Records(r) => r.len(),
            IntervalOutput::Row(_) | IntervalOutput::Dict(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn to_dict(result: &IntervalResult) -> HashMap<String, f64> {
    std::iter::once((PREDICTION_KEY.to_string(), result.prediction))
        .chain(result.bounds.iter().map(|b| (interval_label(b.level), b.value)))
        .collect()
}

fn to_frame(results: &[IntervalResult], levels: &[f64]) -> Result<DataFrame, IntervalError> {
    let mut df = DataFrame::default();
    df.push_column(
        PREDICTION_KEY,
        results.iter().map(|r| Value::Number(r.prediction)).collect(),
    )?;
    for (i, level) in levels.iter().enumerate() {
        df.push_column(
            interval_label(*level),
            results
                .iter()
                .map(|r| r.bounds.get(i).map_or(Value::Missing, |b| Value::Number(b.value)))
                .collect(),
        )?;
    }
    Ok(df)
}

/// Encode interval results. Without an explicit shape a single record
/// becomes a dict and a batch a data frame.
///
/// * `results` - Results of one query, batch rows in input order.
/// * `levels` - Registered quantile levels, used to name frame columns.
/// * `shape` - Requested encoding.
pub fn format_results(
    results: IntervalResults,
    levels: &[f64],
    shape: Option<ReturnShape>,
) -> Result<IntervalOutput, IntervalError> {
    match results {
        IntervalResults::Single(result) => match shape.unwrap_or(ReturnShape::Dict) {
            ReturnShape::Dict => Ok(IntervalOutput::Dict(to_dict(&result))),
            ReturnShape::List => Ok(IntervalOutput::Row(result.values())),
            ReturnShape::DataFrame => Ok(IntervalOutput::Frame(to_frame(&[result], levels)?)),
            ReturnShape::Records => Err(IntervalError::Configuration(
                "return_type records is only defined for batch requests".to_string(),
            )),
        },
        IntervalResults::Batch(results) => match shape.unwrap_or(ReturnShape::DataFrame) {
            ReturnShape::DataFrame => Ok(IntervalOutput::Frame(to_frame(&results, levels)?)),
            ReturnShape::List => Ok(IntervalOutput::List(results.iter().map(IntervalResult::values).collect())),
            ReturnShape::Records => Ok(IntervalOutput::Records(results.iter().map(to_dict).collect())),
            ReturnShape::Dict => Err(IntervalError::Configuration(
                "return_type dict is only defined for single record requests".to_string(),
            )),
        },
    }
}
