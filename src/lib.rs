mod histogram;
mod node;
mod splitter;

// Modules
pub mod binning;
pub mod booster;
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod frame;
pub mod intervals;
pub mod metric;
pub mod objective;
pub mod predictor;
pub mod schema;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use booster::config::{BoosterConfig, JsonIO};
pub use booster::{GradientBooster, Regressor};
pub use config::PredictorConfig;
pub use data::Matrix;
pub use errors::{ErrorKind, IntervalError};
pub use frame::{DataFrame, Record, Value};
pub use intervals::{
    CrossingPolicy, IntervalModelSet, IntervalOutput, IntervalQueryEngine, IntervalResult, QuantileEstimator,
    QuantileLevels, Request, ReturnShape,
};
pub use predictor::{PredictIntervals, Predictor, TrainOptions};
pub use schema::{ColumnRole, FeatureSchema};
