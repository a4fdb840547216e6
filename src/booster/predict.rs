//! Prediction Methods
//!
//! Point predictions of a fitted booster, plus the `Regressor` seam used by
//! the interval query engine to consume any point estimate model.
use crate::booster::GradientBooster;
use crate::data::Matrix;

/// A fitted model producing one point estimate per row.
pub trait Regressor: Send + Sync {
    /// Predict every row of a column major matrix.
    fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<f64>;
}

impl GradientBooster {
    /// Generate predictions for the given data.
    ///
    /// * `data` - The feature matrix.
    /// * `parallel` - If `true`, trees are evaluated over the rows in parallel using Rayon.
    pub fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<f64> {
        let mut init_preds = vec![self.base_score; data.rows];
        self.trees.iter().for_each(|tree| {
            for (p_, val) in init_preds.iter_mut().zip(tree.predict(data, parallel, &self.cfg.missing)) {
                *p_ += val;
            }
        });
        init_preds
    }

    /// Predict a single row given as a slice of raw feature values.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.base_score
            + self
                .trees
                .iter()
                .map(|t| t.predict_row_from_row_slice(row, &self.cfg.missing))
                .sum::<f64>()
    }
}

impl Regressor for GradientBooster {
    fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<f64> {
        GradientBooster::predict(self, data, parallel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_predict_row_matches_matrix() {
        let x: Vec<f64> = (0..60).map(|i| (i % 30) as f64).collect();
        let y: Vec<f64> = (0..30).map(|i| if i < 15 { 1.0 } else { 5.0 }).collect();
        let data = Matrix::new(&x, 30, 2);
        let mut booster = GradientBooster::default().set_iterations(10).set_min_leaf_size(2);
        booster.fit(&data, &y, None).unwrap();
        let preds = booster.predict(&data, false);
        for (i, p) in preds.iter().enumerate() {
            assert_relative_eq!(booster.predict_row(&data.get_row(i)), *p, epsilon = 1e-12);
        }
        let boxed: Box<dyn Regressor> = Box::new(booster);
        assert_eq!(boxed.predict(&data, true), preds);
    }

    #[test]
    fn test_unfitted_predict_is_nan() {
        let booster = GradientBooster::default();
        let data = Matrix::new(&[1.0, 2.0], 2, 1);
        assert!(booster.predict(&data, false).iter().all(|p| p.is_nan()));
    }
}
