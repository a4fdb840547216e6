use crate::booster::config::BoosterConfig;
use crate::booster::{GradientBooster, Regressor};
use crate::data::Matrix;
use crate::errors::IntervalError;
use crate::objective::Objective;
use serde::{Deserialize, Serialize};

/// A booster trained with the pinball loss at a single quantile level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantileEstimator {
    quantile: f64,
    booster: GradientBooster,
}

impl QuantileEstimator {
    /// Fit a new estimator from a booster configuration template. The
    /// template's objective is replaced by the quantile loss at `quantile`.
    pub fn fit(
        template: &BoosterConfig,
        quantile: f64,
        data: &Matrix<f64>,
        y: &[f64],
        sample_weight: Option<&[f64]>,
    ) -> Result<Self, IntervalError> {
        let cfg = BoosterConfig {
            objective: Objective::QuantileLoss { quantile },
            ..template.clone()
        };
        let mut booster = GradientBooster::new(cfg);
        booster.fit(data, y, sample_weight)?;
        Ok(QuantileEstimator { quantile, booster })
    }

    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    pub fn booster(&self) -> &GradientBooster {
        &self.booster
    }
}

impl Regressor for QuantileEstimator {
    fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<f64> {
        self.booster.predict(data, parallel)
    }
}
