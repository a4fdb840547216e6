//! Gradient Booster
//!
//! Histogram based gradient boosted regression trees. A booster trained
//! with `Objective::SquaredLoss` is the point estimate model, one trained
//! with `Objective::QuantileLoss` estimates a single conditional quantile.
pub mod config;
pub mod predict;

mod setters;

use crate::binning::bin_matrix;
use crate::data::Matrix;
use crate::errors::IntervalError;
use crate::objective::Objective;
use crate::tree::{Tree, TreeParams};
use crate::utils::{validate_float_parameter, validate_positive_float_parameter};
use config::{parse_missing, BoosterConfig, JsonIO};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub use predict::Regressor;

/// Gradient Booster object
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct GradientBooster {
    /// Training parameters.
    pub cfg: BoosterConfig,
    /// The initial prediction value of the model. Calculated from y and sample_weight if nan.
    #[serde(deserialize_with = "parse_missing")]
    pub base_score: f64,
    /// The fitted trees.
    pub trees: Vec<Tree>,
}

impl Default for GradientBooster {
    fn default() -> Self {
        GradientBooster::new(BoosterConfig::default())
    }
}

impl JsonIO for GradientBooster {}

impl GradientBooster {
    pub fn new(cfg: BoosterConfig) -> Self {
        GradientBooster {
            cfg,
            base_score: f64::NAN,
            trees: Vec::new(),
        }
    }

    pub fn validate_parameters(&self) -> Result<(), IntervalError> {
        self.cfg.objective.validate()?;
        validate_positive_float_parameter(f64::from(self.cfg.learning_rate), "learning_rate")?;
        validate_float_parameter(f64::from(self.cfg.subsample), f64::MIN_POSITIVE, 1.0, "subsample")?;
        validate_float_parameter(f64::from(self.cfg.l2), 0.0, f64::INFINITY, "l2")?;
        if self.cfg.max_bin < 2 {
            return Err(IntervalError::InvalidParameter(
                "max_bin".to_string(),
                "a value of at least 2".to_string(),
                self.cfg.max_bin.to_string(),
            ));
        }
        if self.cfg.max_leaves < 2 {
            return Err(IntervalError::InvalidParameter(
                "max_leaves".to_string(),
                "a value of at least 2".to_string(),
                self.cfg.max_leaves.to_string(),
            ));
        }
        if self.cfg.num_threads == Some(0) {
            return Err(IntervalError::InvalidParameter(
                "num_threads".to_string(),
                "a positive number of threads".to_string(),
                "0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.trees = Vec::new();
        self.base_score = f64::NAN;
    }

    pub fn is_fitted(&self) -> bool {
        !self.base_score.is_nan()
    }

    /// Fit the gradient booster on a provided dataset.
    ///
    /// * `data` - Column major feature matrix.
    /// * `y` - Target values, one per row of `data`.
    /// * `sample_weight` - Instance weights to use when training the model.
    pub fn fit(&mut self, data: &Matrix<f64>, y: &[f64], sample_weight: Option<&[f64]>) -> Result<(), IntervalError> {
        self.validate_parameters()?;
        if y.len() != data.rows {
            return Err(IntervalError::Data(format!(
                "the data has {} rows but {} target values were provided",
                data.rows,
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(IntervalError::Data("cannot fit a booster on an empty dataset".to_string()));
        }
        if let Some(w) = sample_weight {
            if w.len() != y.len() {
                return Err(IntervalError::Data(format!(
                    "{} sample weights were provided for {} rows",
                    w.len(),
                    y.len()
                )));
            }
            if let Some(v) = w.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(IntervalError::Data(format!(
                    "sample weights must be finite and non negative, found {}",
                    v
                )));
            }
            if w.iter().sum::<f64>() <= 0.0 {
                return Err(IntervalError::Data("sample weights must not all be zero".to_string()));
            }
        }
        if let Some(v) = y.iter().find(|v| !v.is_finite()) {
            return Err(IntervalError::Data(format!("target values must be finite, found {}", v)));
        }

        match self.cfg.num_threads {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| IntervalError::Configuration(e.to_string()))?;
                pool.install(|| self.fit_trees(data, y, sample_weight))
            }
            None => self.fit_trees(data, y, sample_weight),
        }
    }

    fn fit_trees(&mut self, data: &Matrix<f64>, y: &[f64], sample_weight: Option<&[f64]>) -> Result<(), IntervalError> {
        let start = Instant::now();
        self.reset();

        let objective = self.cfg.objective;
        self.base_score = objective.calc_init(y, sample_weight);
        let mut yhat = vec![self.base_score; y.len()];

        let binned_data = bin_matrix(data, sample_weight, self.cfg.max_bin, self.cfg.missing)?;
        let bdata = Matrix::new(&binned_data.binned_data, data.rows, data.cols);
        let n_bins: Vec<usize> = (0..data.cols).map(|c| binned_data.n_bins(c)).collect();

        let params = TreeParams {
            max_depth: self.cfg.max_depth,
            max_leaves: self.cfg.max_leaves,
            min_leaf_size: self.cfg.min_leaf_size.max(1),
            l2: f64::from(self.cfg.l2),
            eta: f64::from(self.cfg.learning_rate),
        };
        let n_sample = ((data.rows as f32) * self.cfg.subsample).ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.cfg.seed);

        for i in 0..self.cfg.iterations {
            let (grad, hess) = objective.calc_grad_hess(y, &yhat, sample_weight);

            let index = if n_sample < data.rows {
                let mut idx = rand::seq::index::sample(&mut rng, data.rows, n_sample).into_vec();
                idx.sort_unstable();
                idx
            } else {
                data.index.to_owned()
            };

            let mut tree = Tree::new();
            tree.fit(
                &bdata,
                &binned_data.cuts,
                &n_bins,
                index,
                &grad,
                hess.as_deref(),
                &params,
                |rows: &[usize]| leaf_refit(&objective, rows, y, &yhat, sample_weight),
            );

            let preds = tree.predict(data, true, &self.cfg.missing);
            yhat.iter_mut().zip(preds).for_each(|(p, t)| *p += t);

            if self.cfg.log_iterations > 0 && i % self.cfg.log_iterations == 0 {
                let metric = objective.default_metric();
                let w = sample_weight.map_or_else(|| vec![1.0; y.len()], |w| w.to_vec());
                info!(
                    "round {:0?}, tree.nodes: {:1?}, tree.depth: {:2?}, {:3?}: {:4?}",
                    i,
                    tree.nodes.len(),
                    tree.depth,
                    metric,
                    metric.calculate_metric(y, &yhat, &w),
                );
            }

            self.trees.push(tree);
        }

        debug!(
            "Finished training a booster with {} trees in {:.3}s, mean training loss: {:.5}",
            self.trees.len(),
            start.elapsed().as_secs_f32(),
            mean_loss(&objective, y, &yhat, sample_weight)
        );

        Ok(())
    }
}

/// Weighted mean of the objective's loss over the training rows.
fn mean_loss(objective: &Objective, y: &[f64], yhat: &[f64], sample_weight: Option<&[f64]>) -> f64 {
    let total: f64 = objective
        .calc_loss(y, yhat, sample_weight)
        .iter()
        .map(|l| f64::from(*l))
        .sum();
    let w_sum = sample_weight.map_or(y.len() as f64, |w| w.iter().sum());
    total / w_sum
}

/// Leaf value of the quantile objective: the quantile of the residuals of the
/// rows in the leaf.
fn leaf_refit(
    objective: &Objective,
    rows: &[usize],
    y: &[f64],
    yhat: &[f64],
    sample_weight: Option<&[f64]>,
) -> Option<f64> {
    if let Objective::SquaredLoss = objective {
        return None;
    }
    let residuals: Vec<f64> = rows.iter().map(|r| y[*r] - yhat[*r]).collect();
    match sample_weight {
        Some(w) => {
            let weights: Vec<f64> = rows.iter().map(|r| w[*r]).collect();
            objective.leaf_refit(&residuals, Some(&weights))
        }
        None => objective.leaf_refit(&residuals, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{quantile_coverage, root_mean_squared_error};
    use rand::Rng;
    use tempfile::tempdir;

    /// y = 3 x0 - 2 x1 + noise, noise scale grows with x0.
    pub(crate) fn synthetic(rows: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let x0: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.0..10.0)).collect();
        let x1: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.0..5.0)).collect();
        let y: Vec<f64> = x0
            .iter()
            .zip(&x1)
            .map(|(a, b)| {
                let noise: f64 = rng.gen_range(-1.0f64..1.0) * (0.5 + 0.3 * a);
                3.0 * a - 2.0 * b + noise
            })
            .collect();
        let data = x0.into_iter().chain(x1).collect();
        (data, y)
    }

    #[test]
    fn test_booster_fit() {
        let (data, y) = synthetic(1000, 0);
        let matrix = Matrix::new(&data, y.len(), 2);
        let mut booster = GradientBooster::default().set_iterations(50);
        booster.fit(&matrix, &y, None).unwrap();
        assert_eq!(booster.trees.len(), 50);
        let preds = booster.predict(&matrix, true);
        let rmse = root_mean_squared_error(&y, &preds, &vec![1.0; y.len()]);
        let base = root_mean_squared_error(&y, &vec![booster.base_score; y.len()], &vec![1.0; y.len()]);
        println!("rmse: {}, base: {}", rmse, base);
        assert!(rmse < 0.5 * base);
        assert_eq!(preds, booster.predict(&matrix, false));
    }

    #[test]
    fn test_booster_quantile_fit() {
        let (data, y) = synthetic(2000, 1);
        let matrix = Matrix::new(&data, y.len(), 2);
        for quantile in [0.1, 0.5, 0.9] {
            let mut booster = GradientBooster::default()
                .set_objective(Objective::QuantileLoss { quantile })
                .set_iterations(60);
            booster.fit(&matrix, &y, None).unwrap();
            let preds = booster.predict(&matrix, true);
            let coverage = quantile_coverage(&y, &preds);
            println!("quantile: {}, coverage: {}", quantile, coverage);
            assert!((coverage - quantile).abs() < 0.05);
        }
    }

    #[test]
    fn test_booster_reduces_training_loss() {
        let (data, y) = synthetic(1000, 3);
        let matrix = Matrix::new(&data, y.len(), 2);
        let w: Vec<f64> = (0..y.len()).map(|i| 1.0 + (i % 3) as f64).collect();
        for objective in [Objective::SquaredLoss, Objective::QuantileLoss { quantile: 0.8 }] {
            let mut booster = GradientBooster::default().set_objective(objective).set_iterations(40);
            booster.fit(&matrix, &y, Some(w.as_slice())).unwrap();
            let initial = mean_loss(&objective, &y, &vec![booster.base_score; y.len()], Some(w.as_slice()));
            let trained = mean_loss(&objective, &y, &booster.predict(&matrix, true), Some(w.as_slice()));
            println!("{:?}: {} -> {}", objective, initial, trained);
            assert!(trained < 0.7 * initial);
        }
    }

    #[test]
    fn test_booster_subsample_is_seeded() {
        let (data, y) = synthetic(500, 2);
        let matrix = Matrix::new(&data, y.len(), 2);
        let mut b1 = GradientBooster::default().set_subsample(0.5).set_seed(7).set_iterations(10);
        let mut b2 = GradientBooster::default().set_subsample(0.5).set_seed(7).set_iterations(10);
        b1.fit(&matrix, &y, None).unwrap();
        b2.fit(&matrix, &y, None).unwrap();
        assert_eq!(b1.predict(&matrix, false), b2.predict(&matrix, false));
    }

    #[test]
    fn test_booster_num_threads() {
        let (data, y) = synthetic(500, 3);
        let matrix = Matrix::new(&data, y.len(), 2);
        let mut b1 = GradientBooster::default().set_num_threads(Some(1)).set_iterations(10);
        let mut b2 = GradientBooster::default().set_num_threads(Some(2)).set_iterations(10);
        b1.fit(&matrix, &y, None).unwrap();
        b2.fit(&matrix, &y, None).unwrap();
        assert_eq!(b1.trees.len(), b2.trees.len());
        assert_eq!(b1.predict(&matrix, true), b2.predict(&matrix, true));
    }

    #[test]
    fn test_booster_rejects_bad_input() {
        let data = vec![1.0, 2.0, 3.0];
        let matrix = Matrix::new(&data, 3, 1);
        let mut booster = GradientBooster::default();
        assert!(matches!(
            booster.fit(&matrix, &[1.0, 2.0], None),
            Err(IntervalError::Data(_))
        ));
        assert!(matches!(
            booster.fit(&matrix, &[1.0, f64::NAN, 2.0], None),
            Err(IntervalError::Data(_))
        ));
        for w in [[0.0, 0.0, 0.0], [1.0, -1.0, 1.0], [1.0, f64::NAN, 1.0]] {
            assert!(matches!(
                booster.fit(&matrix, &[1.0, 2.0, 3.0], Some(&w[..])),
                Err(IntervalError::Data(_))
            ));
        }
        assert!(booster.fit(&matrix, &[1.0, 2.0, 3.0], Some(&[0.0, 1.0, 2.0])).is_ok());
        let mut booster = GradientBooster::default().set_objective(Objective::QuantileLoss { quantile: 1.5 });
        assert!(matches!(
            booster.fit(&matrix, &[1.0, 2.0, 3.0], None),
            Err(IntervalError::Configuration(_))
        ));
        let mut booster = GradientBooster::default().set_learning_rate(0.0);
        assert!(matches!(
            booster.fit(&matrix, &[1.0, 2.0, 3.0], None),
            Err(IntervalError::InvalidParameter(..))
        ));
    }

    #[test]
    fn test_booster_save() {
        let (data, y) = synthetic(300, 4);
        let matrix = Matrix::new(&data, y.len(), 2);
        let mut booster = GradientBooster::default()
            .set_objective(Objective::QuantileLoss { quantile: 0.8 })
            .set_iterations(20);
        booster.fit(&matrix, &y, None).unwrap();
        let preds = booster.predict(&matrix, true);

        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        booster.save(&path).unwrap();
        let booster2 = GradientBooster::load(&path).unwrap();
        assert_eq!(booster2.predict(&matrix, true), preds);
        assert_eq!(booster2.cfg.objective, Objective::QuantileLoss { quantile: 0.8 });

        let unfitted = GradientBooster::from_json(&GradientBooster::default().json_dump().unwrap()).unwrap();
        assert!(!unfitted.is_fitted());
    }
}
