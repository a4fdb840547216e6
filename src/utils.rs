use crate::errors::IntervalError;
use std::collections::VecDeque;

/// Create a string of all available items.
pub fn items_to_strings(items: &[&str]) -> String {
    items.join(", ")
}

// Validation
pub fn validate_positive_float_parameter(value: f64, parameter: &str) -> Result<(), IntervalError> {
    if value.is_nan() || value <= 0.0 {
        Err(IntervalError::InvalidParameter(
            parameter.to_string(),
            "positive real value".to_string(),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), IntervalError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(IntervalError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Calculate if a value is missing. NaN is always treated as missing.
#[inline]
pub fn is_missing(value: &f64, missing: &f64) -> bool {
    value.is_nan() || value == missing
}

/// Naive weighted percentiles calculation.
///
/// Currently this function does not support missing values.
///
/// * `v` - A Vector of which to find percentiles for.
/// * `sample_weight` - Sample weights for the instances of the vector.
/// * `percentiles` - Percentiles to look for in the data. This should be
///     values from 0 to 1, and in sorted order.
pub fn percentiles(v: &[f64], sample_weight: &[f64], percentiles: &[f64]) -> Vec<f64> {
    let mut p = Vec::new();
    if v.is_empty() || percentiles.is_empty() {
        return p;
    }
    let mut idx: Vec<usize> = (0..v.len()).collect();
    idx.sort_unstable_by(|a, b| v[*a].total_cmp(&v[*b]));

    let mut pcts = VecDeque::from_iter(percentiles.iter());
    let mut current_pct = match pcts.pop_front() {
        Some(p_) => *p_,
        None => return p,
    };

    let mut cuml_pct = 0.0;
    let total_values: f64 = sample_weight.iter().sum();

    for i in idx.iter() {
        cuml_pct += sample_weight[*i] / total_values;
        // The same number might be a valid value for several percentiles.
        while (current_pct == 0.0) || (cuml_pct >= current_pct) {
            p.push(v[*i]);
            match pcts.pop_front() {
                Some(p_) => current_pct = *p_,
                None => return p,
            }
        }
    }
    // Floating point accumulation can leave the last percentiles unfilled.
    if let Some(i_) = idx.last() {
        while p.len() < percentiles.len() {
            p.push(v[*i_]);
        }
    }
    p
}

/// Weighted quantile of a slice, the smallest value whose cumulative
/// weight reaches `quantile` of the total weight. Returns NaN for an
/// empty slice.
pub fn weighted_quantile(values: &[f64], sample_weight: Option<&[f64]>, quantile: f64) -> f64 {
    let mut indices = (0..values.len()).collect::<Vec<_>>();
    indices.sort_unstable_by(|&a, &b| values[a].total_cmp(&values[b]));
    let w_tot: f64 = match sample_weight {
        Some(w) => w.iter().sum(),
        None => values.len() as f64,
    };
    let w_target = w_tot * quantile;
    let mut w_cum = 0.0_f64;
    for i in &indices {
        w_cum += sample_weight.map_or(1.0, |w| w[*i]);
        if w_cum >= w_target {
            return values[*i];
        }
    }
    indices.last().map_or(f64::NAN, |i| values[*i])
}

/// Return the index of the first value in a sorted
/// vector that is greater than a provided value.
/// Missing values map to bin zero.
///
/// * `x` - The sorted slice of values.
/// * `v` - The value used to calculate the first
///   value larger than it.
#[inline]
pub fn map_bin(x: &[f64], v: &f64, missing: &f64) -> Option<u16> {
    if is_missing(v, missing) {
        return Some(0);
    }
    let mut low = 0;
    let mut high = x.len();
    while low != high {
        let mid = (low + high) / 2;
        if x[mid] <= *v {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    u16::try_from(low).ok()
}

/// Partition the index values in place, so all of the rows
/// that go to the left child come first. Returns the number of
/// rows that went left.
///
/// * `idx` - The index values to sort.
/// * `feature` - The binned feature column used to route the rows.
/// * `split_bin` - Rows with a non missing bin below this value go left.
/// * `missing_right` - Should missing values go to the left, or
///    to the right of the split value.
pub fn pivot_on_split(idx: &mut [usize], feature: &[u16], split_bin: u16, missing_right: bool) -> usize {
    let goes_left = |row: usize| {
        let b = feature[row];
        if b == 0 {
            !missing_right
        } else {
            b < split_bin
        }
    };
    let mut low = 0;
    let mut high = idx.len();
    while low < high {
        if goes_left(idx[low]) {
            low += 1;
        } else {
            high -= 1;
            idx.swap(low, high);
        }
    }
    low
}
