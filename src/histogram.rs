use crate::data::Matrix;
use rayon::prelude::*;

/// Gradient statistics of the rows falling into one bin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bin {
    pub g_folded: f64,
    pub h_folded: f64,
    pub counts: usize,
}

impl Bin {
    #[inline]
    pub fn add(&mut self, g: f64, h: f64) {
        self.g_folded += g;
        self.h_folded += h;
        self.counts += 1;
    }
}

/// Per feature bin statistics for the rows of one node.
#[derive(Debug, Clone)]
pub struct NodeHistogram {
    pub cols: Vec<Vec<Bin>>,
}

impl NodeHistogram {
    /// Build the histogram of a node from scratch.
    ///
    /// * `data` - Binned feature matrix.
    /// * `index` - Rows belonging to the node.
    /// * `grad` - Gradient of every row.
    /// * `hess` - Hessian of every row, `None` when it is constant.
    /// * `n_bins` - Number of bins of every feature, missing bin included.
    pub fn build(data: &Matrix<u16>, index: &[usize], grad: &[f32], hess: Option<&[f32]>, n_bins: &[usize]) -> Self {
        let cols = n_bins
            .par_iter()
            .enumerate()
            .map(|(col, n)| {
                let mut bins = vec![Bin::default(); *n];
                let feature = data.get_col(col);
                match hess {
                    Some(hess) => index.iter().for_each(|i| {
                        bins[usize::from(feature[*i])].add(f64::from(grad[*i]), f64::from(hess[*i]));
                    }),
                    None => index.iter().for_each(|i| {
                        bins[usize::from(feature[*i])].add(f64::from(grad[*i]), 1.0);
                    }),
                }
                bins
            })
            .collect();
        NodeHistogram { cols }
    }

    /// Histogram of a sibling node, obtained by removing a child's
    /// statistics from its parent.
    pub fn from_difference(parent: &NodeHistogram, child: &NodeHistogram) -> Self {
        let cols = parent
            .cols
            .iter()
            .zip(child.cols.iter())
            .map(|(p, c)| {
                p.iter()
                    .zip(c.iter())
                    .map(|(pb, cb)| Bin {
                        g_folded: pb.g_folded - cb.g_folded,
                        h_folded: pb.h_folded - cb.h_folded,
                        counts: pb.counts - cb.counts,
                    })
                    .collect()
            })
            .collect();
        NodeHistogram { cols }
    }
}
