//! Booster Configuration
//!
//! Defines the configuration of the gradient booster used both as the
//! point estimate model and as the quantile estimators, plus the JSON
//! IO helpers shared by every persisted type of the crate.
use crate::constants::{
    DEFAULT_ITERATIONS, DEFAULT_L2, DEFAULT_LEARNING_RATE, DEFAULT_MAX_BIN, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LEAVES,
    DEFAULT_MIN_LEAF_SIZE,
};
use crate::errors::IntervalError;
use crate::objective::Objective;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

fn default_objective() -> Objective {
    Objective::SquaredLoss
}
fn default_learning_rate() -> f32 {
    DEFAULT_LEARNING_RATE
}
fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_max_leaves() -> usize {
    DEFAULT_MAX_LEAVES
}
fn default_min_leaf_size() -> usize {
    DEFAULT_MIN_LEAF_SIZE
}
fn default_l2() -> f32 {
    DEFAULT_L2
}
fn default_max_bin() -> u16 {
    DEFAULT_MAX_BIN
}
fn default_subsample() -> f32 {
    1.0
}
fn default_missing() -> f64 {
    f64::NAN
}
fn default_log_iterations() -> usize {
    0
}

pub(crate) fn parse_missing<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(d).map(|x: Option<_>| x.unwrap_or(f64::NAN))
}

/// Configuration for the `GradientBooster`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoosterConfig {
    /// Learning objective.
    #[serde(default = "default_objective")]
    pub objective: Objective,
    /// Step size, each leaf weight is multiplied by this number.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Number of boosting rounds.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Maximum depth of each tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of leaves of each tree.
    #[serde(default = "default_max_leaves")]
    pub max_leaves: usize,
    /// Minimum number of training rows in a leaf.
    #[serde(default = "default_min_leaf_size")]
    pub min_leaf_size: usize,
    /// L2 regularization of the leaf weights.
    #[serde(default = "default_l2")]
    pub l2: f32,
    /// Maximum number of bins for discretization.
    #[serde(default = "default_max_bin")]
    pub max_bin: u16,
    /// Fraction of rows sampled for every tree.
    #[serde(default = "default_subsample")]
    pub subsample: f32,
    /// Representation of missing values.
    #[serde(default = "default_missing", deserialize_with = "parse_missing")]
    pub missing: f64,
    /// Number of threads for parallel tasks, the global pool is used when unset.
    #[serde(default)]
    pub num_threads: Option<usize>,
    /// Logging frequency (every N iterations).
    #[serde(default = "default_log_iterations")]
    pub log_iterations: usize,
    /// Seed for random number generation.
    #[serde(default)]
    pub seed: u64,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        BoosterConfig {
            objective: default_objective(),
            learning_rate: DEFAULT_LEARNING_RATE,
            iterations: DEFAULT_ITERATIONS,
            max_depth: DEFAULT_MAX_DEPTH,
            max_leaves: DEFAULT_MAX_LEAVES,
            min_leaf_size: DEFAULT_MIN_LEAF_SIZE,
            l2: DEFAULT_L2,
            max_bin: DEFAULT_MAX_BIN,
            subsample: 1.0,
            missing: f64::NAN,
            num_threads: None,
            log_iterations: 0,
            seed: 0,
        }
    }
}

/// JSON persistence.
pub trait JsonIO: Serialize + DeserializeOwned + Sized {
    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), IntervalError> {
        fs::write(path, self.json_dump()?).map_err(|e| IntervalError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json string.
    fn json_dump(&self) -> Result<String, IntervalError> {
        serde_json::to_string(self).map_err(|e| IntervalError::UnableToWrite(e.to_string()))
    }

    /// Load from a json string.
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, IntervalError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| IntervalError::UnableToRead(e.to_string()))
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load<P: AsRef<Path>>(path: P) -> Result<Self, IntervalError> {
        let json_str = fs::read_to_string(path).map_err(|e| IntervalError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl JsonIO for BoosterConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_booster_config_default() {
        let config = BoosterConfig::default();
        assert_eq!(config.max_bin, 256);
        assert_eq!(config.objective, Objective::SquaredLoss);
        assert!(config.missing.is_nan());
    }

    #[test]
    fn test_booster_io_json() {
        let config = BoosterConfig {
            objective: Objective::QuantileLoss { quantile: 0.95 },
            iterations: 7,
            ..Default::default()
        };
        let json = config.json_dump().unwrap();
        let config2 = BoosterConfig::from_json(&json).unwrap();
        assert_eq!(config2.objective, Objective::QuantileLoss { quantile: 0.95 });
        assert_eq!(config2.iterations, 7);
        assert!(config2.missing.is_nan());
    }

    #[test]
    fn test_booster_io_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("booster.json");
        let config = BoosterConfig::default();
        config.save(&file_path).unwrap();
        let config2 = BoosterConfig::load(&file_path).unwrap();
        assert_eq!(config.max_bin, config2.max_bin);
        assert_eq!(config.learning_rate, config2.learning_rate);
    }

    #[test]
    fn test_parse_missing() {
        let json = r#"{"max_bin": 64, "missing": null}"#;
        let config: BoosterConfig = serde_json::from_str(json).unwrap();
        assert!(config.missing.is_nan());
        assert_eq!(config.max_bin, 64);
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);

        let json2 = r#"{"missing": -999.0}"#;
        let config2: BoosterConfig = serde_json::from_str(json2).unwrap();
        assert_eq!(config2.missing, -999.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = BoosterConfig::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, IntervalError::UnableToRead(_)));
    }
}
