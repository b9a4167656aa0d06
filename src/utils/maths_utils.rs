use argminmax::ArgMinMax;
use statrs::statistics::Statistics;

/// Largest value in the slice. `None` for an empty slice.
pub fn get_max(vec: &[f64]) -> Option<f64> {
    if vec.is_empty() {
        return None;
    }
    let max_index: usize = vec.argmax();
    Some(vec[max_index])
}

/// Smallest value in the slice. `None` for an empty slice.
pub fn get_min(vec: &[f64]) -> Option<f64> {
    if vec.is_empty() {
        return None;
    }
    let min_index: usize = vec.argmin();
    Some(vec[min_index])
}

/// Arithmetic mean. `None` for an empty slice.
pub fn get_mean(vec: &[f64]) -> Option<f64> {
    if vec.is_empty() {
        return None;
    }
    finite(vec.iter().mean())
}

/// Swing from `low` up to `high` as a percentage of `low`.
/// Undefined (None) when `low` is zero.
pub fn percent_range(high: f64, low: f64) -> Option<f64> {
    if low == 0.0 {
        return None;
    }
    finite((high - low) / low * 100.0)
}

/// Drops NaN and +/- infinity so they never reach a report.
#[inline]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
