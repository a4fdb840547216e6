use crate::booster::config::BoosterConfig;
use crate::booster::Regressor;
use crate::constants::MIN_TRAINING_ROWS;
use crate::data::Matrix;
use crate::errors::IntervalError;
use crate::intervals::estimator::QuantileEstimator;
use crate::intervals::levels::QuantileLevels;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One fitted quantile estimator per registered level. Built once by
/// [`IntervalModelSet::fit`] and read only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "IntervalModelSetData")]
pub struct IntervalModelSet {
    levels: QuantileLevels,
    estimators: Vec<QuantileEstimator>,
}

#[derive(Deserialize)]
struct IntervalModelSetData {
    levels: QuantileLevels,
    estimators: Vec<QuantileEstimator>,
}

impl TryFrom<IntervalModelSetData> for IntervalModelSet {
    type Error = IntervalError;

    fn try_from(data: IntervalModelSetData) -> Result<Self, Self::Error> {
        let matches = data.levels.len() == data.estimators.len()
            && data
                .levels
                .iter()
                .zip(&data.estimators)
                .all(|(l, e)| *l == e.quantile());
        if !matches {
            return Err(IntervalError::Configuration(
                "the stored quantile estimators do not match the stored levels".to_string(),
            ));
        }
        Ok(IntervalModelSet {
            levels: data.levels,
            estimators: data.estimators,
        })
    }
}

impl IntervalModelSet {
    /// Fit one quantile estimator per level on the same features and targets.
    /// The fits are independent and run in parallel, the estimators are
    /// stored in registration order. If any fit fails the whole set fails.
    ///
    /// * `template` - Booster configuration shared by every estimator.
    /// * `levels` - Quantile levels to estimate.
    /// * `data` - Column major feature matrix.
    /// * `y` - Target values.
    /// * `sample_weight` - Optional instance weights.
    pub fn fit(
        template: &BoosterConfig,
        levels: QuantileLevels,
        data: &Matrix<f64>,
        y: &[f64],
        sample_weight: Option<&[f64]>,
    ) -> Result<Self, IntervalError> {
        if y.len() < MIN_TRAINING_ROWS {
            return Err(IntervalError::Data(format!(
                "{} rows are not enough to estimate quantiles, at least {} are required",
                y.len(),
                MIN_TRAINING_ROWS
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(IntervalError::Data("target values must be finite numbers".to_string()));
        }

        let start = Instant::now();
        let estimators = levels
            .as_slice()
            .par_iter()
            .map(|q| QuantileEstimator::fit(template, *q, data, y, sample_weight))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            "Fitted {} quantile estimators in {:.3}s.",
            estimators.len(),
            start.elapsed().as_secs_f32()
        );

        Ok(IntervalModelSet { levels, estimators })
    }

    pub fn levels(&self) -> &QuantileLevels {
        &self.levels
    }

    /// The estimator fitted for `level`, if it was registered.
    pub fn get(&self, level: f64) -> Option<&QuantileEstimator> {
        self.estimators.iter().find(|e| e.quantile() == level)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuantileEstimator> {
        self.estimators.iter()
    }

    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }

    /// Bounds of every row, one vector per level in registration order.
    pub fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<Vec<f64>> {
        self.estimators.iter().map(|e| e.predict(data, parallel)).collect()
    }
}
