//! Predictor Configuration
use crate::booster::config::{BoosterConfig, JsonIO};
use crate::intervals::CrossingPolicy;
use serde::{Deserialize, Serialize};

fn default_parallel() -> bool {
    true
}

/// Configuration of a [`crate::Predictor`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Configuration of the point estimate booster. Its objective is always
    /// the squared loss.
    #[serde(default)]
    pub base: BoosterConfig,
    /// Template of the quantile estimators, the base configuration is used
    /// when unset. The objective is replaced per level.
    ///
    /// Pinball gradients only carry the sign of the residual, so a split
    /// gains little until the bound already sits inside the data. Small
    /// datasets with coarse features can end with bounds that barely move
    /// with the features; more iterations or a higher learning rate here
    /// help more than deeper trees.
    #[serde(default)]
    pub quantile: Option<BoosterConfig>,
    /// Handling of crossed bounds at query time.
    #[serde(default)]
    pub crossing_policy: CrossingPolicy,
    /// Predict rows in parallel.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        PredictorConfig {
            base: BoosterConfig::default(),
            quantile: None,
            crossing_policy: CrossingPolicy::default(),
            parallel: default_parallel(),
        }
    }
}

impl PredictorConfig {
    /// Booster configuration the quantile estimators are fitted from.
    pub fn quantile_template(&self) -> &BoosterConfig {
        self.quantile.as_ref().unwrap_or(&self.base)
    }
}

impl JsonIO for PredictorConfig {}
