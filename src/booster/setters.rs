use crate::booster::GradientBooster;
use crate::objective::Objective;

impl GradientBooster {
    // Set methods for parameters

    /// Set the objective on the booster.
    /// * `objective` - The objective type of the booster.
    pub fn set_objective(mut self, objective: Objective) -> Self {
        self.cfg.objective = objective;
        self
    }

    /// Set the learning rate on the booster.
    /// * `learning_rate` - Step size shrinking the leaf values of every tree.
    pub fn set_learning_rate(mut self, learning_rate: f32) -> Self {
        self.cfg.learning_rate = learning_rate;
        self
    }

    /// Set the number of boosting rounds on the booster.
    pub fn set_iterations(mut self, iterations: usize) -> Self {
        self.cfg.iterations = iterations;
        self
    }

    /// Set the maximum tree depth on the booster.
    pub fn set_max_depth(mut self, max_depth: usize) -> Self {
        self.cfg.max_depth = max_depth;
        self
    }

    /// Set the maximum number of leaves of each tree.
    pub fn set_max_leaves(mut self, max_leaves: usize) -> Self {
        self.cfg.max_leaves = max_leaves;
        self
    }

    /// Set the minimum number of training rows in a leaf.
    pub fn set_min_leaf_size(mut self, min_leaf_size: usize) -> Self {
        self.cfg.min_leaf_size = min_leaf_size;
        self
    }

    /// Set the L2 regularization of the leaf weights.
    pub fn set_l2(mut self, l2: f32) -> Self {
        self.cfg.l2 = l2;
        self
    }

    /// Set the number of bins on the booster.
    /// * `max_bin` - Number of bins to calculate to partition the data. Setting this to
    ///   a smaller number, will result in faster training time, while potentially sacrificing
    ///   accuracy. If there are more bins, than unique values in a column, all unique values
    ///   will be used.
    pub fn set_max_bin(mut self, max_bin: u16) -> Self {
        self.cfg.max_bin = max_bin;
        self
    }

    /// Set the fraction of rows sampled for every tree.
    pub fn set_subsample(mut self, subsample: f32) -> Self {
        self.cfg.subsample = subsample;
        self
    }

    /// Set missing value of the booster
    /// * `missing` - Float value to consider as missing.
    pub fn set_missing(mut self, missing: f64) -> Self {
        self.cfg.missing = missing;
        self
    }

    /// Set the number of threads on the booster.
    /// * `num_threads` - Set the number of threads to be used during training.
    pub fn set_num_threads(mut self, num_threads: Option<usize>) -> Self {
        self.cfg.num_threads = num_threads;
        self
    }

    /// Set the logging frequency, `0` disables per round logging.
    pub fn set_log_iterations(mut self, log_iterations: usize) -> Self {
        self.cfg.log_iterations = log_iterations;
        self
    }

    /// Set the seed on the booster.
    /// * `seed` - Integer value used to seed any randomness used in the algorithm.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.cfg.seed = seed;
        self
    }

    /// Set the base_score on the booster.
    /// * `base_score` - The base score of the booster.
    pub fn set_base_score(mut self, base_score: f64) -> Self {
        self.base_score = base_score;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_chain() {
        let booster = GradientBooster::default()
            .set_objective(Objective::QuantileLoss { quantile: 0.3 })
            .set_learning_rate(0.05)
            .set_iterations(12)
            .set_max_depth(2)
            .set_max_leaves(4)
            .set_min_leaf_size(3)
            .set_l2(0.0)
            .set_max_bin(32)
            .set_subsample(0.8)
            .set_missing(-1.0)
            .set_num_threads(Some(2))
            .set_log_iterations(5)
            .set_seed(11)
            .set_base_score(2.5);
        assert_eq!(booster.cfg.objective, Objective::QuantileLoss { quantile: 0.3 });
        assert_eq!(booster.cfg.iterations, 12);
        assert_eq!(booster.cfg.max_bin, 32);
        assert_eq!(booster.cfg.missing, -1.0);
        assert_eq!(booster.cfg.num_threads, Some(2));
        assert_eq!(booster.cfg.seed, 11);
        assert_eq!(booster.base_score, 2.5);
        assert!(booster.validate_parameters().is_ok());
    }
}
