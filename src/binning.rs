use crate::data::{JaggedMatrix, Matrix};
use crate::errors::IntervalError;
use crate::utils::{is_missing, map_bin, percentiles};

/// If there are fewer unique values than their are
/// percentiles, just return the unique values of the
/// vectors.
///
/// * `v` - A numeric slice to calculate percentiles for.
/// * `sample_weight` - Instance weights for each row in the data.
fn percentiles_or_value(v: &[f64], sample_weight: &[f64], pcts: &[f64]) -> Vec<f64> {
    let mut v_u = v.to_owned();
    v_u.sort_unstable_by(|a, b| a.total_cmp(b));
    v_u.dedup();
    if v_u.len() <= pcts.len() + 1 {
        v_u
    } else {
        percentiles(v, sample_weight, pcts)
    }
}

// Every feature is bucketed into bins 0 to N, bin 0 holds the missing
// values and bin k holds the values in [cuts[k - 1], cuts[k]).
// The last cut is always f64::MAX, so every non missing value
// lands in a bin.
#[derive(Debug)]
pub struct BinnedData {
    pub binned_data: Vec<u16>,
    pub cuts: JaggedMatrix<f64>,
    pub nunique: Vec<usize>,
}

impl BinnedData {
    /// Number of distinct bin values a column can take, including the missing bin.
    pub fn n_bins(&self, col: usize) -> usize {
        self.nunique[col] + 1
    }
}

/// Convert a matrix of data, into a binned matrix.
fn bin_matrix_from_cuts(data: &Matrix<f64>, cuts: &JaggedMatrix<f64>, missing: &f64) -> Result<Vec<u16>, IntervalError> {
    data.data
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let col = i / data.rows;
            map_bin(cuts.get_col(col), v, missing)
                .ok_or_else(|| IntervalError::Data(format!("Feature number {} has too many bins.", col)))
        })
        .collect()
}

/// Bin a numeric matrix.
///
/// * `data` - A numeric matrix, of data to be binned.
/// * `sample_weight` - Instance weights for each row of the data.
/// * `nbins` - The number of bins each column should be binned into.
/// * `missing` - Float value to consider as missing.
pub fn bin_matrix(
    data: &Matrix<f64>,
    sample_weight: Option<&[f64]>,
    nbins: u16,
    missing: f64,
) -> Result<BinnedData, IntervalError> {
    let nbins_ = f64::from(nbins);
    let pcts: Vec<f64> = (0..nbins).map(|i| f64::from(i) / nbins_).collect();

    let s_w = vec![1.0; data.rows];
    let weight = sample_weight.unwrap_or(&s_w);

    let mut cuts = JaggedMatrix::new();
    let mut nunique = Vec::with_capacity(data.cols);
    for i in 0..data.cols {
        let (no_miss, w): (Vec<f64>, Vec<f64>) = data
            .get_col(i)
            .iter()
            .zip(weight.iter())
            .filter(|(v, _)| !is_missing(v, &missing))
            .unzip();

        let mut col_cuts = percentiles_or_value(&no_miss, &w, &pcts);
        col_cuts.push(f64::MAX);
        col_cuts.dedup();
        nunique.push(col_cuts.len());
        cuts.push_col(col_cuts);
    }

    let binned_data = bin_matrix_from_cuts(data, &cuts, &missing)?;

    Ok(BinnedData {
        binned_data,
        cuts,
        nunique,
    })
}
