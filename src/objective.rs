use crate::errors::IntervalError;
use crate::metric::Metric;
use crate::utils::weighted_quantile;
use serde::{Deserialize, Serialize};

/// Loss minimized by the booster.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub enum Objective {
    /// Squared error, estimates the conditional mean.
    SquaredLoss,
    /// Pinball loss at `quantile`, estimates the conditional quantile.
    QuantileLoss { quantile: f64 },
}

impl Objective {
    pub fn validate(&self) -> Result<(), IntervalError> {
        match self {
            Objective::SquaredLoss => Ok(()),
            Objective::QuantileLoss { quantile } => {
                if *quantile > 0.0 && *quantile < 1.0 {
                    Ok(())
                } else {
                    Err(IntervalError::Configuration(format!(
                        "quantile must be strictly between 0 and 1, got {}",
                        quantile
                    )))
                }
            }
        }
    }

    pub fn calc_loss(&self, y: &[f64], yhat: &[f64], sample_weight: Option<&[f64]>) -> Vec<f32> {
        match self {
            Objective::SquaredLoss => SquaredLoss.calc_loss(y, yhat, sample_weight),
            Objective::QuantileLoss { quantile } => QuantileLoss::new(*quantile).calc_loss(y, yhat, sample_weight),
        }
    }

    pub fn calc_grad_hess(
        &self,
        y: &[f64],
        yhat: &[f64],
        sample_weight: Option<&[f64]>,
    ) -> (Vec<f32>, Option<Vec<f32>>) {
        match self {
            Objective::SquaredLoss => SquaredLoss.calc_grad_hess(y, yhat, sample_weight),
            Objective::QuantileLoss { quantile } => {
                QuantileLoss::new(*quantile).calc_grad_hess(y, yhat, sample_weight)
            }
        }
    }

    pub fn calc_init(&self, y: &[f64], sample_weight: Option<&[f64]>) -> f64 {
        match self {
            Objective::SquaredLoss => SquaredLoss.calc_init(y, sample_weight),
            Objective::QuantileLoss { quantile } => QuantileLoss::new(*quantile).calc_init(y, sample_weight),
        }
    }

    /// Optimal raw leaf output for the given residuals, or `None` if the
    /// gradient based leaf weight should be kept.
    pub fn leaf_refit(&self, residuals: &[f64], sample_weight: Option<&[f64]>) -> Option<f64> {
        match self {
            Objective::SquaredLoss => SquaredLoss.leaf_refit(residuals, sample_weight),
            Objective::QuantileLoss { quantile } => QuantileLoss::new(*quantile).leaf_refit(residuals, sample_weight),
        }
    }

    pub fn default_metric(&self) -> Metric {
        match self {
            Objective::SquaredLoss => SquaredLoss::default_metric(),
            Objective::QuantileLoss { quantile } => Metric::QuantileLoss { quantile: *quantile },
        }
    }
}

pub trait ObjectiveFunction {
    fn calc_loss(&self, y: &[f64], yhat: &[f64], sample_weight: Option<&[f64]>) -> Vec<f32>;
    fn calc_grad_hess(&self, y: &[f64], yhat: &[f64], sample_weight: Option<&[f64]>) -> (Vec<f32>, Option<Vec<f32>>);
    fn calc_init(&self, y: &[f64], sample_weight: Option<&[f64]>) -> f64;
    fn leaf_refit(&self, _residuals: &[f64], _sample_weight: Option<&[f64]>) -> Option<f64> {
        None
    }
    fn default_metric() -> Metric;
}

#[derive(Default)]
pub struct SquaredLoss;

impl ObjectiveFunction for SquaredLoss {
    #[inline]
    fn calc_loss(&self, y: &[f64], yhat: &[f64], sample_weight: Option<&[f64]>) -> Vec<f32> {
        match sample_weight {
            Some(sample_weight) => y
                .iter()
                .zip(yhat)
                .zip(sample_weight)
                .map(|((y_, yhat_), w_)| {
                    let s = *y_ - *yhat_;
                    (s * s * *w_) as f32
                })
                .collect(),
            None => y
                .iter()
                .zip(yhat)
                .map(|(y_, yhat_)| {
                    let s = *y_ - *yhat_;
                    (s * s) as f32
                })
                .collect(),
        }
    }

    fn calc_init(&self, y: &[f64], sample_weight: Option<&[f64]>) -> f64 {
        match sample_weight {
            Some(sample_weight) => {
                let mut ytot: f64 = 0.;
                let mut ntot: f64 = 0.;
                for (y_, w_) in y.iter().zip(sample_weight) {
                    ytot += w_ * y_;
                    ntot += w_;
                }
                ytot / ntot
            }
            None => y.iter().sum::<f64>() / y.len() as f64,
        }
    }

    #[inline]
    fn calc_grad_hess(&self, y: &[f64], yhat: &[f64], sample_weight: Option<&[f64]>) -> (Vec<f32>, Option<Vec<f32>>) {
        match sample_weight {
            Some(sample_weight) => {
                let (g, h) = y
                    .iter()
                    .zip(yhat)
                    .zip(sample_weight)
                    .map(|((y_, yhat_), w_)| (((yhat_ - *y_) * *w_) as f32, *w_ as f32))
                    .unzip();
                (g, Some(h))
            }
            None => (
                y.iter().zip(yhat).map(|(y_, yhat_)| (yhat_ - *y_) as f32).collect(),
                None,
            ),
        }
    }

    fn default_metric() -> Metric {
        Metric::RootMeanSquaredError
    }
}

pub struct QuantileLoss {
    pub quantile: f64,
}

impl QuantileLoss {
    pub fn new(quantile: f64) -> Self {
        QuantileLoss { quantile }
    }
}

impl ObjectiveFunction for QuantileLoss {
    #[inline]
    fn calc_loss(&self, y: &[f64], yhat: &[f64], sample_weight: Option<&[f64]>) -> Vec<f32> {
        let alpha = self.quantile;
        let pinball = |y_: f64, yhat_: f64| {
            let s = y_ - yhat_;
            if s >= 0.0 {
                alpha * s
            } else {
                (alpha - 1.0) * s
            }
        };
        match sample_weight {
            Some(sample_weight) => y
                .iter()
                .zip(yhat)
                .zip(sample_weight)
                .map(|((y_, yhat_), w_)| (pinball(*y_, *yhat_) * *w_) as f32)
                .collect(),
            None => y
                .iter()
                .zip(yhat)
                .map(|(y_, yhat_)| pinball(*y_, *yhat_) as f32)
                .collect(),
        }
    }

    fn calc_init(&self, y: &[f64], sample_weight: Option<&[f64]>) -> f64 {
        weighted_quantile(y, sample_weight, self.quantile)
    }

    #[inline]
    fn calc_grad_hess(&self, y: &[f64], yhat: &[f64], sample_weight: Option<&[f64]>) -> (Vec<f32>, Option<Vec<f32>>) {
        let alpha = self.quantile as f32;
        let grad = |y_: f64, yhat_: f64| {
            if yhat_ - y_ >= 0.0 {
                1.0 - alpha
            } else {
                -alpha
            }
        };
        match sample_weight {
            Some(sample_weight) => {
                let (g, h) = y
                    .iter()
                    .zip(yhat)
                    .zip(sample_weight)
                    .map(|((y_, yhat_), w_)| {
                        let w = *w_ as f32;
                        (grad(*y_, *yhat_) * w, w)
                    })
                    .unzip();
                (g, Some(h))
            }
            None => (y.iter().zip(yhat).map(|(y_, yhat_)| grad(*y_, *yhat_)).collect(), None),
        }
    }

    fn leaf_refit(&self, residuals: &[f64], sample_weight: Option<&[f64]>) -> Option<f64> {
        if residuals.is_empty() {
            None
        } else {
            Some(weighted_quantile(residuals, sample_weight, self.quantile))
        }
    }

    fn default_metric() -> Metric {
        Metric::QuantileLoss { quantile: 0.5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse_init() {
        let y = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        assert!(SquaredLoss.calc_init(&y, None) == 0.5);

        let y = vec![-1.0, -1.0, -1.0, 1., 1., 1.];
        assert!(SquaredLoss.calc_init(&y, None) == 0.);

        let w = vec![1.0, 1.0, 1.0, 3.0, 3.0, 3.0];
        assert!(SquaredLoss.calc_init(&y, Some(&w)) == 0.5);
    }

    #[test]
    fn test_quantile_init() {
        let y = vec![1.0, 2.0, 9.0, 3.2, 4.0];
        let w = vec![0.0, 0.5, 1.0, 0.3, 0.5];
        let l1 = Objective::QuantileLoss { quantile: 0.1 }.calc_init(&y, Some(&w));
        assert!(l1 == 2.0);

        let l2 = Objective::QuantileLoss { quantile: 0.9 }.calc_init(&y, Some(&w));
        assert!(l2 == 9.0);
    }

    #[test]
    fn test_quantile_loss_asymmetry() {
        let y = vec![10.0];
        let obj = Objective::QuantileLoss { quantile: 0.9 };
        // Under predicting is penalised by the quantile, over predicting by its complement.
        let under = obj.calc_loss(&y, &[9.0], None)[0];
        let over = obj.calc_loss(&y, &[11.0], None)[0];
        assert!((under - 0.9).abs() < 1e-6);
        assert!((over - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_quantile_grad() {
        let y = vec![1.0, 2.0, 3.0];
        let yhat = vec![2.0, 2.0, 2.0];
        let (g, h) = Objective::QuantileLoss { quantile: 0.25 }.calc_grad_hess(&y, &yhat, None);
        assert!(h.is_none());
        assert_eq!(g, vec![0.75, 0.75, -0.25]);
    }

    #[test]
    fn test_squared_grad_weighted() {
        let y = vec![1.0, 2.0];
        let yhat = vec![2.0, 2.0];
        let (g, h) = Objective::SquaredLoss.calc_grad_hess(&y, &yhat, Some(&[2.0, 1.0]));
        assert_eq!(g, vec![2.0, 0.0]);
        assert_eq!(h, Some(vec![2.0, 1.0]));
    }

    #[test]
    fn test_leaf_refit() {
        let residuals = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        assert_eq!(Objective::SquaredLoss.leaf_refit(&residuals, None), None);
        assert_eq!(
            Objective::QuantileLoss { quantile: 0.5 }.leaf_refit(&residuals, None),
            Some(0.0)
        );
        assert_eq!(Objective::QuantileLoss { quantile: 0.5 }.leaf_refit(&[], None), None);
    }

    #[test]
    fn test_validate() {
        assert!(Objective::QuantileLoss { quantile: 0.5 }.validate().is_ok());
        assert!(Objective::QuantileLoss { quantile: 1.0 }.validate().is_err());
        assert!(Objective::QuantileLoss { quantile: 0.0 }.validate().is_err());
        assert!(Objective::QuantileLoss { quantile: f64::NAN }.validate().is_err());
    }
}
