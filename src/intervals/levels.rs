use crate::constants::{DEFAULT_QUANTILES, INTERVAL_PREFIX};
use crate::errors::IntervalError;
use serde::{Deserialize, Serialize};

/// Output label of the bound estimated at `level`, e.g. `interval_0.05`.
pub fn interval_label(level: f64) -> String {
    format!("{}{}", INTERVAL_PREFIX, level)
}

/// Validated quantile levels, in the order they were registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct QuantileLevels(Vec<f64>);

impl QuantileLevels {
    /// Every level must be finite, strictly between 0 and 1 and unique.
    pub fn new(levels: Vec<f64>) -> Result<Self, IntervalError> {
        if levels.is_empty() {
            return Err(IntervalError::Configuration(
                "at least one quantile level is required".to_string(),
            ));
        }
        for (i, level) in levels.iter().enumerate() {
            if !(level.is_finite() && *level > 0.0 && *level < 1.0) {
                return Err(IntervalError::Configuration(format!(
                    "quantile levels must be strictly between 0 and 1, got {}",
                    level
                )));
            }
            if levels[..i].contains(level) {
                return Err(IntervalError::Configuration(format!("duplicate quantile level {}", level)));
            }
        }
        Ok(QuantileLevels(levels))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|l| interval_label(*l)).collect()
    }
}

impl Default for QuantileLevels {
    fn default() -> Self {
        QuantileLevels(DEFAULT_QUANTILES.to_vec())
    }
}

impl TryFrom<Vec<f64>> for QuantileLevels {
    type Error = IntervalError;

    fn try_from(levels: Vec<f64>) -> Result<Self, Self::Error> {
        QuantileLevels::new(levels)
    }
}

impl From<QuantileLevels> for Vec<f64> {
    fn from(levels: QuantileLevels) -> Self {
        levels.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(interval_label(0.05), "interval_0.05");
        assert_eq!(interval_label(0.95), "interval_0.95");
        assert_eq!(interval_label(0.2), "interval_0.2");
        assert_eq!(
            QuantileLevels::default().labels(),
            vec!["interval_0.05".to_string(), "interval_0.95".to_string()]
        );
    }

    #[test]
    fn test_levels_keep_registration_order() {
        let levels = QuantileLevels::new(vec![0.9, 0.1, 0.5]).unwrap();
        assert_eq!(levels.as_slice(), &[0.9, 0.1, 0.5]);
        assert_eq!(QuantileLevels::new(vec![0.2]).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_levels() {
        for levels in [vec![], vec![0.0], vec![1.0], vec![-0.1, 0.5], vec![f64::NAN], vec![0.5, 0.5]] {
            let err = QuantileLevels::new(levels).unwrap_err();
            assert!(matches!(err, IntervalError::Configuration(_)));
        }
    }

    #[test]
    fn test_levels_serde() {
        let levels = QuantileLevels::new(vec![0.4, 0.6]).unwrap();
        let json = serde_json::to_string(&levels).unwrap();
        assert_eq!(json, "[0.4,0.6]");
        assert_eq!(serde_json::from_str::<QuantileLevels>(&json).unwrap(), levels);
        assert!(serde_json::from_str::<QuantileLevels>("[1.5]").is_err());
    }
}
