use crate::booster::Regressor;
use crate::data::Matrix;
use crate::errors::IntervalError;
use crate::frame::{DataFrame, Record};
use crate::intervals::format::{format_results, IntervalOutput, ReturnShape};
use crate::intervals::model_set::IntervalModelSet;
use crate::schema::FeatureSchema;
use log::debug;
use serde::{Deserialize, Serialize};

/// A prediction request, either one record or a batch of rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Single(Record),
    Records(Vec<Record>),
    Batch(DataFrame),
}

impl Request {
    pub fn is_single(&self) -> bool {
        matches!(self, Request::Single(_))
    }

    pub fn n_rows(&self) -> usize {
        match self {
            Request::Single(_) => 1,
            Request::Records(records) => records.len(),
            Request::Batch(df) => df.n_rows(),
        }
    }

    /// Every request as a frame, a single record becomes one row. Records
    /// lacking a feature key of `schema` fail the whole request.
    pub fn into_frame(self, schema: &FeatureSchema) -> Result<DataFrame, IntervalError> {
        match self {
            Request::Single(record) => {
                let records = [record];
                schema.check_records(&records)?;
                Ok(DataFrame::from_records(&records))
            }
            Request::Records(records) => {
                schema.check_records(&records)?;
                Ok(DataFrame::from_records(&records))
            }
            Request::Batch(df) => Ok(df),
        }
    }
}

impl From<Record> for Request {
    fn from(record: Record) -> Self {
        Request::Single(record)
    }
}

impl From<&Record> for Request {
    fn from(record: &Record) -> Self {
        Request::Single(record.clone())
    }
}

impl From<Vec<Record>> for Request {
    fn from(records: Vec<Record>) -> Self {
        Request::Records(records)
    }
}

impl From<&[Record]> for Request {
    fn from(records: &[Record]) -> Self {
        Request::Records(records.to_vec())
    }
}

impl From<DataFrame> for Request {
    fn from(df: DataFrame) -> Self {
        Request::Batch(df)
    }
}

impl From<&DataFrame> for Request {
    fn from(df: &DataFrame) -> Self {
        Request::Batch(df.clone())
    }
}

/// The bound estimated at one quantile level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileBound {
    pub level: f64,
    pub value: f64,
}

/// Point prediction and bounds of one record, bounds in registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalResult {
    pub prediction: f64,
    pub bounds: Vec<QuantileBound>,
}

impl IntervalResult {
    /// The bound estimated at `level`.
    pub fn bound(&self, level: f64) -> Option<f64> {
        self.bounds.iter().find(|b| b.level == level).map(|b| b.value)
    }

    /// `[prediction, bound_1, ..., bound_k]`.
    pub fn values(&self) -> Vec<f64> {
        std::iter::once(self.prediction)
            .chain(self.bounds.iter().map(|b| b.value))
            .collect()
    }
}

/// Results of one query, keeping the shape of the request.
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalResults {
    Single(IntervalResult),
    Batch(Vec<IntervalResult>),
}

/// What to do with bounds that cross, a lower level receiving a higher
/// value than a higher level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossingPolicy {
    /// Report every estimator's value unchanged.
    #[default]
    PassThrough,
    /// Reassign the values in ascending order to the levels in ascending order.
    Sort,
}

impl CrossingPolicy {
    pub fn apply(&self, bounds: &mut [QuantileBound]) {
        if let CrossingPolicy::Sort = self {
            let mut values: Vec<f64> = bounds.iter().map(|b| b.value).collect();
            values.sort_by(f64::total_cmp);
            let mut order: Vec<usize> = (0..bounds.len()).collect();
            order.sort_by(|a, b| bounds[*a].level.total_cmp(&bounds[*b].level));
            for (i, v) in order.into_iter().zip(values) {
                bounds[i].value = v;
            }
        }
    }
}

/// Serves interval queries against a point estimate model and a fitted
/// interval model set.
pub struct IntervalQueryEngine<'a> {
    base: &'a dyn Regressor,
    schema: &'a FeatureSchema,
    model_set: &'a IntervalModelSet,
    crossing_policy: CrossingPolicy,
    parallel: bool,
}

impl<'a> IntervalQueryEngine<'a> {
    /// Fails with `NotTrained` when no interval model set is available.
    pub fn new(
        base: &'a dyn Regressor,
        schema: &'a FeatureSchema,
        model_set: Option<&'a IntervalModelSet>,
    ) -> Result<Self, IntervalError> {
        let model_set = model_set.ok_or(IntervalError::NotTrained)?;
        Ok(IntervalQueryEngine {
            base,
            schema,
            model_set,
            crossing_policy: CrossingPolicy::default(),
            parallel: true,
        })
    }

    pub fn with_crossing_policy(mut self, crossing_policy: CrossingPolicy) -> Self {
        self.crossing_policy = crossing_policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Point prediction and bounds for every row of the request, in input order.
    pub fn compute(&self, request: Request) -> Result<IntervalResults, IntervalError> {
        let single = request.is_single();
        if !single && request.n_rows() == 0 {
            return Ok(IntervalResults::Batch(Vec::new()));
        }
        let df = request.into_frame(self.schema)?;
        let rows = df.n_rows();
        let data = self.schema.transform(&df)?;
        let matrix = Matrix::new(&data, rows, self.schema.n_features());

        let predictions = self.base.predict(&matrix, self.parallel);
        let bounds = self.model_set.predict(&matrix, self.parallel);
        let levels = self.model_set.levels().as_slice();
        debug!("Computed {} bounds for {} rows.", levels.len(), rows);

        let mut results: Vec<IntervalResult> = predictions
            .into_iter()
            .enumerate()
            .map(|(row, prediction)| {
                let mut row_bounds: Vec<QuantileBound> = levels
                    .iter()
                    .zip(&bounds)
                    .map(|(level, values)| QuantileBound {
                        level: *level,
                        value: values[row],
                    })
                    .collect();
                self.crossing_policy.apply(&mut row_bounds);
                IntervalResult {
                    prediction,
                    bounds: row_bounds,
                }
            })
            .collect();

        if single {
            results
                .pop()
                .map(IntervalResults::Single)
                .ok_or_else(|| IntervalError::Data("the request produced no rows".to_string()))
        } else {
            Ok(IntervalResults::Batch(results))
        }
    }

    /// Compute the intervals of a request and encode them in `shape`.
    pub fn predict(&self, request: Request, shape: Option<ReturnShape>) -> Result<IntervalOutput, IntervalError> {
        let results = self.compute(request)?;
        format_results(results, self.model_set.levels().as_slice(), shape)
    }
}
