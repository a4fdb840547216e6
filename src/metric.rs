use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub enum Metric {
    RootMeanSquaredError,
    QuantileLoss { quantile: f64 },
}

impl Metric {
    pub fn calculate_metric(&self, y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
        match self {
            Metric::RootMeanSquaredError => root_mean_squared_error(y, yhat, sample_weight),
            Metric::QuantileLoss { quantile } => quantile_loss(y, yhat, sample_weight, *quantile),
        }
    }
}

pub fn root_mean_squared_error(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
    let mut w_sum = 0.;
    let res = y
        .iter()
        .zip(yhat)
        .zip(sample_weight)
        .map(|((y_, yhat_), w_)| {
            w_sum += *w_;
            (y_ - yhat_).powi(2) * *w_
        })
        .sum::<f64>();
    (res / w_sum).sqrt()
}

/// Average pinball loss of `yhat` as an estimate of the `quantile` of `y`.
pub fn quantile_loss(y: &[f64], yhat: &[f64], sample_weight: &[f64], quantile: f64) -> f64 {
    let mut w_sum = 0.;
    let res = y
        .iter()
        .zip(yhat)
        .zip(sample_weight)
        .map(|((y_, yhat_), w_)| {
            w_sum += *w_;
            let s = *y_ - *yhat_;
            let l = if s >= 0.0 { quantile * s } else { (quantile - 1.0) * s };
            l * *w_
        })
        .sum::<f64>();
    res / w_sum
}

/// Fraction of observed values outside of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalCoverage {
    /// Share of values strictly below the lower bound.
    pub below: f64,
    /// Share of values strictly above the upper bound.
    pub above: f64,
}

impl IntervalCoverage {
    /// Share of values inside the interval, bounds included.
    pub fn inside(&self) -> f64 {
        1.0 - self.below - self.above
    }
}

pub fn interval_coverage(y: &[f64], lower: &[f64], upper: &[f64]) -> IntervalCoverage {
    let n = y.len() as f64;
    let (mut below, mut above) = (0usize, 0usize);
    for ((y_, l_), u_) in y.iter().zip(lower).zip(upper) {
        if y_ < l_ {
            below += 1;
        }
        if y_ > u_ {
            above += 1;
        }
    }
    IntervalCoverage {
        below: below as f64 / n,
        above: above as f64 / n,
    }
}

/// Share of observed values at or below an estimated quantile.
pub fn quantile_coverage(y: &[f64], bound: &[f64]) -> f64 {
    let hits = y.iter().zip(bound).filter(|(y_, b_)| y_ <= b_).count();
    hits as f64 / y.len() as f64
}
