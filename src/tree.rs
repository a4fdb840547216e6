use crate::data::{JaggedMatrix, Matrix};
use crate::histogram::NodeHistogram;
use crate::node::{Node, SplittableNode};
use crate::splitter::{best_split, NodeStats, SplitParams};
use crate::utils::pivot_on_split;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;
use std::fmt::{self, Display};

/// Growth limits and regularization of a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub max_leaves: usize,
    pub min_leaf_size: usize,
    pub l2: f64,
    pub eta: f64,
}

impl TreeParams {
    fn split_params(&self) -> SplitParams {
        SplitParams {
            l2: self.l2,
            min_leaf_size: self.min_leaf_size,
            min_split_gain: 0.0,
        }
    }
}

/// A regression tree grown leaf-wise, always expanding the leaf with
/// the largest split gain next.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub depth: usize,
    pub n_leaves: usize,
}

impl Tree {
    pub fn new() -> Self {
        Tree::default()
    }

    /// Grow the tree on binned data.
    ///
    /// * `data` - Binned feature matrix.
    /// * `cuts` - Bin cut points, used to translate split bins back to raw values.
    /// * `n_bins` - Number of bins of every feature, missing bin included.
    /// * `index` - Rows used to grow the tree.
    /// * `grad` - Gradient of every row.
    /// * `hess` - Hessian of every row, `None` when it is constant.
    /// * `params` - Growth limits.
    /// * `leaf_output` - Given the rows of a leaf, the raw leaf value. When it
    ///   returns `None` the Newton step weight is used.
    #[allow(clippy::too_many_arguments)]
    pub fn fit<F>(
        &mut self,
        data: &Matrix<u16>,
        cuts: &JaggedMatrix<f64>,
        n_bins: &[usize],
        mut index: Vec<usize>,
        grad: &[f32],
        hess: Option<&[f32]>,
        params: &TreeParams,
        leaf_output: F,
    ) where
        F: Fn(&[usize]) -> Option<f64>,
    {
        self.nodes.clear();
        self.depth = 0;
        let split_params = params.split_params();

        let root_stats = NodeStats::from_rows(&index, grad, hess);
        self.nodes
            .push(Node::leaf(0, root_stats.weight(params.l2), root_stats.hessian_sum, 0));
        // Row range of each node inside `index`.
        let mut ranges = vec![(0, index.len())];

        let mut growable = BinaryHeap::<SplittableNode>::new();
        if params.max_depth > 0 && index.len() >= 2 * params.min_leaf_size {
            let histogram = NodeHistogram::build(data, &index, grad, hess, n_bins);
            if let Some(split) = best_split(&histogram, cuts, &root_stats, &split_params) {
                growable.push(SplittableNode {
                    num: 0,
                    depth: 0,
                    start_idx: 0,
                    stop_idx: index.len(),
                    split,
                    histogram,
                });
            }
        }

        let mut n_leaves = 1;
        while let Some(node) = growable.pop() {
            if n_leaves >= params.max_leaves {
                break;
            }
            let split = node.split;
            let n_left = pivot_on_split(
                &mut index[node.start_idx..node.stop_idx],
                data.get_col(split.split_feature),
                split.split_bin,
                split.missing_right,
            );
            let mid = node.start_idx + n_left;
            let left_num = self.nodes.len();
            let right_num = left_num + 1;
            let depth = node.depth + 1;
            self.depth = self.depth.max(depth);

            self.nodes.push(Node::leaf(
                left_num,
                split.left.weight(params.l2),
                split.left.hessian_sum,
                depth,
            ));
            self.nodes.push(Node::leaf(
                right_num,
                split.right.weight(params.l2),
                split.right.hessian_sum,
                depth,
            ));
            self.nodes[node.num].make_parent_node(&split, left_num, right_num);
            ranges.push((node.start_idx, mid));
            ranges.push((mid, node.stop_idx));
            n_leaves += 1;

            let can_split = |stats: &NodeStats| depth < params.max_depth && stats.counts >= 2 * params.min_leaf_size;
            let (split_left, split_right) = (can_split(&split.left), can_split(&split.right));
            if !split_left && !split_right {
                continue;
            }

            // Build the histogram of the smaller child, derive the larger one from the parent.
            let left_rows = &index[node.start_idx..mid];
            let right_rows = &index[mid..node.stop_idx];
            let (left_hist, right_hist) = if left_rows.len() <= right_rows.len() {
                let small = NodeHistogram::build(data, left_rows, grad, hess, n_bins);
                let large = NodeHistogram::from_difference(&node.histogram, &small);
                (small, large)
            } else {
                let small = NodeHistogram::build(data, right_rows, grad, hess, n_bins);
                let large = NodeHistogram::from_difference(&node.histogram, &small);
                (large, small)
            };

            let children = [
                (left_num, node.start_idx, mid, split.left, left_hist, split_left),
                (right_num, mid, node.stop_idx, split.right, right_hist, split_right),
            ];
            for (num, start_idx, stop_idx, stats, histogram, splittable) in children {
                if !splittable {
                    continue;
                }
                if let Some(child_split) = best_split(&histogram, cuts, &stats, &split_params) {
                    growable.push(SplittableNode {
                        num,
                        depth,
                        start_idx,
                        stop_idx,
                        split: child_split,
                        histogram,
                    });
                }
            }
        }
        self.n_leaves = n_leaves;

        for node in self.nodes.iter_mut().filter(|n| n.is_leaf) {
            let (start, stop) = ranges[node.num];
            if let Some(v) = leaf_output(&index[start..stop]) {
                node.weight_value = v;
            }
            node.weight_value *= params.eta;
        }
    }

    /// Predict a single row, given as a slice of raw feature values.
    pub fn predict_row_from_row_slice(&self, row: &[f64], missing: &f64) -> f64 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[node_idx];
            if node.is_leaf {
                return node.weight_value;
            }
            node_idx = node.get_child_idx(&row[node.split_feature], missing);
        }
    }

    fn predict_row(&self, data: &Matrix<f64>, row: usize, missing: &f64) -> f64 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[node_idx];
            if node.is_leaf {
                return node.weight_value;
            }
            node_idx = node.get_child_idx(data.get(row, node.split_feature), missing);
        }
    }

    pub fn predict(&self, data: &Matrix<f64>, parallel: bool, missing: &f64) -> Vec<f64> {
        if parallel {
            data.index
                .par_iter()
                .map(|i| self.predict_row(data, *i, missing))
                .collect()
        } else {
            data.index.iter().map(|i| self.predict_row(data, *i, missing)).collect()
        }
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut print_buffer: Vec<usize> = vec![0];
        while let Some(idx) = print_buffer.pop() {
            let node = &self.nodes[idx];
            writeln!(f, "{}{}", "      ".repeat(node.depth), node)?;
            if !node.is_leaf {
                print_buffer.push(node.right_child);
                print_buffer.push(node.left_child);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::bin_matrix;
    use approx::assert_relative_eq;

    fn step_data() -> (Vec<f64>, Vec<f64>) {
        // One informative feature with a step at 50, one constant feature.
        let x: Vec<f64> = (0..100).map(|i| i as f64).chain((0..100).map(|_| 1.0)).collect();
        let y: Vec<f64> = (0..100).map(|i| if i < 50 { -1.0 } else { 1.0 }).collect();
        (x, y)
    }

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 3,
            max_leaves: 8,
            min_leaf_size: 5,
            l2: 0.0,
            eta: 1.0,
        }
    }

    #[test]
    fn test_tree_fit() {
        let (x, y) = step_data();
        let data = Matrix::new(&x, 100, 2);
        let b = bin_matrix(&data, None, 256, f64::NAN).unwrap();
        let bdata = Matrix::new(&b.binned_data, data.rows, data.cols);
        let n_bins: Vec<usize> = (0..data.cols).map(|c| b.n_bins(c)).collect();
        let grad: Vec<f32> = y.iter().map(|y_| -(*y_ as f32)).collect();

        let mut tree = Tree::new();
        tree.fit(&bdata, &b.cuts, &n_bins, data.index.clone(), &grad, None, &params(), |_| None);
        println!("{}", tree);

        assert_eq!(tree.nodes[0].split_feature, 0);
        assert_eq!(tree.nodes[0].split_value, 50.0);
        let preds = tree.predict(&data, true, &f64::NAN);
        for (p, y_) in preds.iter().zip(&y) {
            assert_relative_eq!(*p, *y_, epsilon = 1e-6);
        }
        assert_eq!(preds, tree.predict(&data, false, &f64::NAN));
        assert_eq!(tree.predict_row_from_row_slice(&[10.0, 1.0], &f64::NAN), preds[10]);
    }

    #[test]
    fn test_tree_respects_limits() {
        let x: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..200).map(|i| (i as f64 / 10.0).sin()).collect();
        let data = Matrix::new(&x, 200, 1);
        let b = bin_matrix(&data, None, 256, f64::NAN).unwrap();
        let bdata = Matrix::new(&b.binned_data, data.rows, data.cols);
        let grad: Vec<f32> = y.iter().map(|y_| -(*y_ as f32)).collect();

        let mut tree = Tree::new();
        tree.fit(&bdata, &b.cuts, &[b.n_bins(0)], data.index.clone(), &grad, None, &params(), |_| None);
        assert!(tree.depth <= 3);
        assert!(tree.n_leaves <= 8);
        assert_eq!(tree.nodes.iter().filter(|n| n.is_leaf).count(), tree.n_leaves);
        assert_eq!(tree.nodes.len(), 2 * tree.n_leaves - 1);
    }

    #[test]
    fn test_tree_leaf_output() {
        let (x, y) = step_data();
        let data = Matrix::new(&x, 100, 2);
        let b = bin_matrix(&data, None, 256, f64::NAN).unwrap();
        let bdata = Matrix::new(&b.binned_data, data.rows, data.cols);
        let n_bins: Vec<usize> = (0..data.cols).map(|c| b.n_bins(c)).collect();
        let grad: Vec<f32> = y.iter().map(|y_| -(*y_ as f32)).collect();
        let p = TreeParams { eta: 0.5, ..params() };

        let mut tree = Tree::new();
        tree.fit(&bdata, &b.cuts, &n_bins, data.index.clone(), &grad, None, &p, |rows| {
            Some(rows.iter().map(|r| y[*r] * 4.0).sum::<f64>() / rows.len() as f64)
        });
        let preds = tree.predict(&data, false, &f64::NAN);
        assert_relative_eq!(preds[0], -2.0, epsilon = 1e-9);
        assert_relative_eq!(preds[99], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tree_missing_values() {
        let mut x: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let mut y: Vec<f64> = (0..100).map(|i| if i < 50 { 0.0 } else { 10.0 }).collect();
        for i in 0..20 {
            x[i * 5] = f64::NAN;
            y[i * 5] = 10.0;
        }
        let data = Matrix::new(&x, 100, 1);
        let b = bin_matrix(&data, None, 256, f64::NAN).unwrap();
        let bdata = Matrix::new(&b.binned_data, data.rows, data.cols);
        let grad: Vec<f32> = y.iter().map(|y_| -(*y_ as f32)).collect();
        let p = TreeParams {
            max_depth: 1,
            ..params()
        };

        let mut tree = Tree::new();
        tree.fit(&bdata, &b.cuts, &[b.n_bins(0)], data.index.clone(), &grad, None, &p, |rows| {
            Some(rows.iter().map(|r| y[*r]).sum::<f64>() / rows.len() as f64)
        });
        assert!(tree.nodes[0].missing_right);
        assert_relative_eq!(tree.predict_row_from_row_slice(&[f64::NAN], &f64::NAN), 10.0);
        assert_relative_eq!(tree.predict_row_from_row_slice(&[1.0], &f64::NAN), 0.0);
    }
}
