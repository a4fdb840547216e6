//! Prediction Intervals
//!
//! Quantile estimators trained next to a point estimate model, the set
//! holding them once training is done, the query engine serving interval
//! requests and the formatter encoding its results.
pub mod estimator;
pub mod format;
pub mod levels;
pub mod model_set;
pub mod query;

pub use estimator::QuantileEstimator;
pub use format::{format_results, IntervalOutput, ReturnShape};
pub use levels::{interval_label, QuantileLevels};
pub use model_set::IntervalModelSet;
pub use query::{CrossingPolicy, IntervalQueryEngine, IntervalResult, IntervalResults, QuantileBound, Request};
