use crate::data::JaggedMatrix;
use crate::histogram::{Bin, NodeHistogram};
use rayon::prelude::*;

/// Summed gradient statistics of a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    pub gradient_sum: f64,
    pub hessian_sum: f64,
    pub counts: usize,
}

impl NodeStats {
    pub fn from_rows(index: &[usize], grad: &[f32], hess: Option<&[f32]>) -> Self {
        let gradient_sum = index.iter().map(|i| f64::from(grad[*i])).sum();
        let hessian_sum = match hess {
            Some(hess) => index.iter().map(|i| f64::from(hess[*i])).sum(),
            None => index.len() as f64,
        };
        NodeStats {
            gradient_sum,
            hessian_sum,
            counts: index.len(),
        }
    }

    fn add_bin(&mut self, bin: &Bin) {
        self.gradient_sum += bin.g_folded;
        self.hessian_sum += bin.h_folded;
        self.counts += bin.counts;
    }

    fn plus(&self, other: &NodeStats) -> NodeStats {
        NodeStats {
            gradient_sum: self.gradient_sum + other.gradient_sum,
            hessian_sum: self.hessian_sum + other.hessian_sum,
            counts: self.counts + other.counts,
        }
    }

    fn minus(&self, other: &NodeStats) -> NodeStats {
        NodeStats {
            gradient_sum: self.gradient_sum - other.gradient_sum,
            hessian_sum: self.hessian_sum - other.hessian_sum,
            counts: self.counts - other.counts,
        }
    }

    /// Newton step leaf weight.
    #[inline]
    pub fn weight(&self, l2: f64) -> f64 {
        -self.gradient_sum / (self.hessian_sum + l2)
    }

    #[inline]
    pub fn gain(&self, l2: f64) -> f64 {
        (self.gradient_sum * self.gradient_sum) / (self.hessian_sum + l2)
    }
}

/// The best split found for a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitInfo {
    pub split_gain: f32,
    pub split_feature: usize,
    /// Rows with a non missing bin below this value go left.
    pub split_bin: u16,
    /// Raw feature value equivalent of `split_bin`.
    pub split_value: f64,
    pub missing_right: bool,
    pub left: NodeStats,
    pub right: NodeStats,
}

#[derive(Debug, Clone, Copy)]
pub struct SplitParams {
    pub l2: f64,
    pub min_leaf_size: usize,
    pub min_split_gain: f64,
}

/// Search every feature of the histogram for the split with the highest gain.
pub fn best_split(
    hist: &NodeHistogram,
    cuts: &JaggedMatrix<f64>,
    parent: &NodeStats,
    params: &SplitParams,
) -> Option<SplitInfo> {
    hist.cols
        .par_iter()
        .enumerate()
        .filter_map(|(feature, bins)| best_feature_split(feature, bins, cuts.get_col(feature), parent, params))
        .max_by(|a, b| {
            a.split_gain
                .total_cmp(&b.split_gain)
                .then_with(|| b.split_feature.cmp(&a.split_feature))
        })
}

fn best_feature_split(
    feature: usize,
    bins: &[Bin],
    cuts: &[f64],
    parent: &NodeStats,
    params: &SplitParams,
) -> Option<SplitInfo> {
    if bins.len() < 3 {
        return None;
    }
    let mut missing = NodeStats::default();
    missing.add_bin(&bins[0]);
    let non_missing = parent.minus(&missing);
    let parent_gain = parent.gain(params.l2);

    let mut best: Option<SplitInfo> = None;
    let mut left_nm = NodeStats::default();
    for split_bin in 2..bins.len() {
        left_nm.add_bin(&bins[split_bin - 1]);
        if bins[split_bin - 1].counts == 0 && split_bin > 2 {
            continue;
        }
        let right_nm = non_missing.minus(&left_nm);
        if right_nm.counts == 0 {
            break;
        }
        let candidates = if missing.counts == 0 {
            [(left_nm, right_nm, false), (left_nm, right_nm, false)]
        } else {
            [(left_nm.plus(&missing), right_nm, false), (left_nm, right_nm.plus(&missing), true)]
        };
        for (left, right, missing_right) in candidates {
            if left.counts < params.min_leaf_size || right.counts < params.min_leaf_size {
                continue;
            }
            let gain = left.gain(params.l2) + right.gain(params.l2) - parent_gain;
            if gain <= params.min_split_gain {
                continue;
            }
            if best.map_or(true, |b| gain as f32 > b.split_gain) {
                best = Some(SplitInfo {
                    split_gain: gain as f32,
                    split_feature: feature,
                    split_bin: split_bin as u16,
                    split_value: cuts[split_bin - 1],
                    missing_right,
                    left,
                    right,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Matrix;

    fn params() -> SplitParams {
        SplitParams {
            l2: 0.0,
            min_leaf_size: 1,
            min_split_gain: 0.0,
        }
    }

    #[test]
    fn test_best_split_separates_gradients() {
        // Feature 0 separates the negative from the positive gradients,
        // feature 1 is noise.
        let binned = vec![1, 1, 2, 2, 3, 3, 1, 2, 1, 2, 1, 2];
        let data = Matrix::new(&binned, 6, 2);
        let grad = vec![-1.0, -1.0, -1.0, -1.0, 1.0, 1.0];
        let index: Vec<usize> = (0..6).collect();
        let cuts = JaggedMatrix::from_vecs(&[vec![0.0, 1.0, 2.0, f64::MAX], vec![0.0, 1.0, f64::MAX]]);
        let hist = NodeHistogram::build(&data, &index, &grad, None, &[5, 4]);
        let parent = NodeStats::from_rows(&index, &grad, None);
        let split = best_split(&hist, &cuts, &parent, &params()).unwrap();
        assert_eq!(split.split_feature, 0);
        assert_eq!(split.split_bin, 3);
        assert_eq!(split.split_value, 2.0);
        assert_eq!(split.left.counts, 4);
        assert_eq!(split.right.counts, 2);
    }

    #[test]
    fn test_best_split_routes_missing() {
        // Missing rows carry positive gradients, like the high values.
        let binned = vec![0, 0, 1, 1, 2, 2];
        let data = Matrix::new(&binned, 6, 1);
        let grad = vec![1.0, 1.0, -1.0, -1.0, 1.0, 1.0];
        let index: Vec<usize> = (0..6).collect();
        let cuts = JaggedMatrix::from_vecs(&[vec![0.0, 1.0, f64::MAX]]);
        let hist = NodeHistogram::build(&data, &index, &grad, None, &[4]);
        let parent = NodeStats::from_rows(&index, &grad, None);
        let split = best_split(&hist, &cuts, &parent, &params()).unwrap();
        assert!(split.missing_right);
        assert_eq!(split.left.counts, 2);
        assert_eq!(split.right.counts, 4);
    }

    #[test]
    fn test_min_leaf_size_blocks_split() {
        let binned = vec![1, 2, 2, 2];
        let data = Matrix::new(&binned, 4, 1);
        let grad = vec![-1.0, 1.0, 1.0, 1.0];
        let index: Vec<usize> = (0..4).collect();
        let cuts = JaggedMatrix::from_vecs(&[vec![0.0, 1.0, f64::MAX]]);
        let hist = NodeHistogram::build(&data, &index, &grad, None, &[4]);
        let parent = NodeStats::from_rows(&index, &grad, None);
        let p = SplitParams {
            min_leaf_size: 2,
            ..params()
        };
        assert!(best_split(&hist, &cuts, &parent, &p).is_none());
        assert!(best_split(&hist, &cuts, &parent, &params()).is_some());
    }
}
