//! Predictor
//!
//! Entry point of the crate. A predictor learns a feature schema from
//! described columns, fits the point estimate booster and, on request,
//! the interval model set, then serves point and interval predictions.
use crate::booster::config::{BoosterConfig, JsonIO};
use crate::booster::GradientBooster;
use crate::config::PredictorConfig;
use crate::constants::DEFAULT_QUANTILES;
use crate::data::Matrix;
use crate::errors::IntervalError;
use crate::frame::DataFrame;
use crate::intervals::{IntervalModelSet, IntervalOutput, IntervalQueryEngine, QuantileLevels, Request, ReturnShape};
use crate::metric::{interval_coverage, quantile_coverage, root_mean_squared_error};
use crate::objective::Objective;
use crate::schema::{ColumnRole, FeatureSchema};
use hashbrown::HashMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Whether, and at which levels, prediction intervals are trained.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PredictIntervals {
    #[default]
    Off,
    /// Use `TrainOptions::prediction_intervals`, or the default pair when unset.
    On,
    /// Explicit quantile levels.
    Levels(Vec<f64>),
}

impl From<bool> for PredictIntervals {
    fn from(on: bool) -> Self {
        if on {
            PredictIntervals::On
        } else {
            PredictIntervals::Off
        }
    }
}

impl From<Vec<f64>> for PredictIntervals {
    fn from(levels: Vec<f64>) -> Self {
        PredictIntervals::Levels(levels)
    }
}

impl From<&[f64]> for PredictIntervals {
    fn from(levels: &[f64]) -> Self {
        PredictIntervals::Levels(levels.to_vec())
    }
}

/// Options of a single [`Predictor::train`] call.
#[derive(Debug, Clone, Default)]
pub struct TrainOptions {
    pub predict_intervals: PredictIntervals,
    /// Levels used when `predict_intervals` is `On`.
    pub prediction_intervals: Option<Vec<f64>>,
    /// Instance weights, one per training row.
    pub sample_weight: Option<Vec<f64>>,
}

impl TrainOptions {
    pub fn with_intervals<T: Into<PredictIntervals>>(mut self, predict_intervals: T) -> Self {
        self.predict_intervals = predict_intervals.into();
        self
    }

    pub fn with_prediction_intervals(mut self, levels: Vec<f64>) -> Self {
        self.prediction_intervals = Some(levels);
        self
    }

    pub fn with_sample_weight(mut self, sample_weight: Vec<f64>) -> Self {
        self.sample_weight = Some(sample_weight);
        self
    }

    fn resolve_levels(&self) -> Result<Option<QuantileLevels>, IntervalError> {
        match &self.predict_intervals {
            PredictIntervals::Off => {
                if self.prediction_intervals.is_some() {
                    warn!("prediction_intervals is ignored since predict_intervals is off.");
                }
                Ok(None)
            }
            PredictIntervals::On => {
                let levels = self
                    .prediction_intervals
                    .clone()
                    .unwrap_or_else(|| DEFAULT_QUANTILES.to_vec());
                QuantileLevels::new(levels).map(Some)
            }
            PredictIntervals::Levels(levels) => QuantileLevels::new(levels.clone()).map(Some),
        }
    }
}

/// A regressor with optional prediction intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predictor {
    column_descriptions: HashMap<String, ColumnRole>,
    #[serde(default)]
    cfg: PredictorConfig,
    schema: Option<FeatureSchema>,
    base: Option<GradientBooster>,
    intervals: Option<IntervalModelSet>,
}

impl JsonIO for Predictor {}

impl Predictor {
    /// * `column_descriptions` - Role of the described columns, exactly one
    ///   must be the output. Undescribed columns are features.
    pub fn new(column_descriptions: HashMap<String, ColumnRole>) -> Self {
        Predictor {
            column_descriptions,
            cfg: PredictorConfig::default(),
            schema: None,
            base: None,
            intervals: None,
        }
    }

    /// Build a predictor from `(column, role)` string pairs such as
    /// `("MEDV", "output")`.
    pub fn from_descriptions(descriptions: &[(&str, &str)]) -> Result<Self, IntervalError> {
        let column_descriptions = descriptions
            .iter()
            .map(|(name, role)| Ok((name.to_string(), role.parse::<ColumnRole>()?)))
            .collect::<Result<HashMap<_, _>, IntervalError>>()?;
        Ok(Predictor::new(column_descriptions))
    }

    pub fn with_config(mut self, cfg: PredictorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.cfg
    }

    pub fn column_descriptions(&self) -> &HashMap<String, ColumnRole> {
        &self.column_descriptions
    }

    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.schema.as_ref()
    }

    pub fn base_model(&self) -> Option<&GradientBooster> {
        self.base.as_ref()
    }

    pub fn interval_model_set(&self) -> Option<&IntervalModelSet> {
        self.intervals.as_ref()
    }

    /// Levels the interval model set was trained at, in registration order.
    pub fn interval_levels(&self) -> Option<&[f64]> {
        self.intervals.as_ref().map(|s| s.levels().as_slice())
    }

    pub fn is_trained(&self) -> bool {
        self.base.is_some()
    }

    pub fn has_intervals(&self) -> bool {
        self.intervals.is_some()
    }

    /// Train the point estimate model and, if requested, the quantile
    /// estimators on the same features. On failure the predictor keeps
    /// its previous state.
    ///
    /// * `df` - Training data, output column included.
    /// * `options` - Interval levels and sample weights.
    pub fn train(&mut self, df: &DataFrame, options: TrainOptions) -> Result<(), IntervalError> {
        let levels = options.resolve_levels()?;
        let schema = FeatureSchema::fit(df, &self.column_descriptions)?;
        let y = schema.output_values(df)?;
        let sample_weight = options.sample_weight.as_deref();
        if let Some(w) = sample_weight {
            if w.len() != y.len() {
                return Err(IntervalError::Data(format!(
                    "{} sample weights were provided for {} rows",
                    w.len(),
                    y.len()
                )));
            }
        }
        let data = schema.transform(df)?;
        let matrix = Matrix::new(&data, df.n_rows(), schema.n_features());

        let base_cfg = BoosterConfig {
            objective: Objective::SquaredLoss,
            ..self.cfg.base.clone()
        };
        let mut base = GradientBooster::new(base_cfg);
        base.fit(&matrix, &y, sample_weight)?;
        let w = sample_weight.map_or_else(|| vec![1.0; y.len()], |w| w.to_vec());
        info!(
            "Trained the point estimate model on {} rows and {} features, training rmse: {:.4}",
            y.len(),
            schema.n_features(),
            root_mean_squared_error(&y, &base.predict(&matrix, self.cfg.parallel), &w)
        );

        let intervals = match levels {
            Some(levels) => {
                let set = IntervalModelSet::fit(self.cfg.quantile_template(), levels, &matrix, &y, sample_weight)?;
                self.log_coverage(&set, &matrix, &y);
                Some(set)
            }
            None => None,
        };

        self.schema = Some(schema);
        self.base = Some(base);
        self.intervals = intervals;
        Ok(())
    }

    fn log_coverage(&self, set: &IntervalModelSet, matrix: &Matrix<f64>, y: &[f64]) {
        let bounds = set.predict(matrix, self.cfg.parallel);
        let levels = set.levels().as_slice();
        for (level, bound) in levels.iter().zip(&bounds) {
            info!(
                "Quantile {} is at or above {:.3} of the training rows.",
                level,
                quantile_coverage(y, bound)
            );
        }
        let lowest = (0..levels.len()).min_by(|a, b| levels[*a].total_cmp(&levels[*b]));
        let highest = (0..levels.len()).max_by(|a, b| levels[*a].total_cmp(&levels[*b]));
        if let (Some(lo), Some(hi)) = (lowest, highest) {
            if lo != hi {
                let coverage = interval_coverage(y, &bounds[lo], &bounds[hi]);
                info!(
                    "Interval [{}, {}] holds {:.3} of the training rows, {:.3} below and {:.3} above.",
                    levels[lo],
                    levels[hi],
                    coverage.inside(),
                    coverage.below,
                    coverage.above
                );
            }
        }
    }

    fn fitted(&self, operation: &str) -> Result<(&FeatureSchema, &GradientBooster), IntervalError> {
        match (&self.schema, &self.base) {
            (Some(schema), Some(base)) => Ok((schema, base)),
            _ => Err(IntervalError::Untrained(operation.to_string())),
        }
    }

    /// Point predictions, one per request row.
    pub fn predict<R: Into<Request>>(&self, request: R) -> Result<Vec<f64>, IntervalError> {
        let (schema, base) = self.fitted("predict")?;
        let request = request.into();
        if !request.is_single() && request.n_rows() == 0 {
            return Ok(Vec::new());
        }
        let df = request.into_frame(schema)?;
        let data = schema.transform(&df)?;
        let matrix = Matrix::new(&data, df.n_rows(), schema.n_features());
        Ok(base.predict(&matrix, self.cfg.parallel))
    }

    /// Prediction intervals of a single record or a batch.
    ///
    /// * `request` - A record, records or a data frame with the training features.
    /// * `return_type` - One of `df`, `list`, `dict`, `records`. Without it a
    ///   single record yields a dict and a batch a data frame.
    pub fn predict_intervals<R: Into<Request>>(
        &self,
        request: R,
        return_type: Option<&str>,
    ) -> Result<IntervalOutput, IntervalError> {
        let shape = return_type.map(str::parse::<ReturnShape>).transpose()?;
        self.predict_intervals_as(request, shape)
    }

    /// [`Predictor::predict_intervals`] with an already parsed shape.
    pub fn predict_intervals_as<R: Into<Request>>(
        &self,
        request: R,
        shape: Option<ReturnShape>,
    ) -> Result<IntervalOutput, IntervalError> {
        let intervals = self.intervals.as_ref().ok_or(IntervalError::NotTrained)?;
        let (schema, base) = self.fitted("predict_intervals")?;
        IntervalQueryEngine::new(base, schema, Some(intervals))?
            .with_crossing_policy(self.cfg.crossing_policy)
            .with_parallel(self.cfg.parallel)
            .predict(request.into(), shape)
    }
}
