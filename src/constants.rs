/// Quantile levels used when intervals are requested without explicit levels.
pub const DEFAULT_QUANTILES: [f64; 2] = [0.05, 0.95];
/// Fewer training rows than this cannot support quantile estimation.
pub const MIN_TRAINING_ROWS: usize = 10;
/// Prefix of the column, or key, holding the bound for a quantile level.
pub const INTERVAL_PREFIX: &str = "interval_";
/// Name of the column, or key, holding the point prediction.
pub const PREDICTION_KEY: &str = "prediction";

pub const DEFAULT_MAX_BIN: u16 = 256;
pub const DEFAULT_ITERATIONS: usize = 100;
pub const DEFAULT_LEARNING_RATE: f32 = 0.1;
pub const DEFAULT_MAX_DEPTH: usize = 4;
pub const DEFAULT_MAX_LEAVES: usize = 16;
pub const DEFAULT_MIN_LEAF_SIZE: usize = 10;
pub const DEFAULT_L2: f32 = 1.0;
