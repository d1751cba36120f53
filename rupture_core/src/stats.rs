//! # Descriptive Statistics
//!
//! Mean and population standard deviation over specimen stress values.
//! Both return `None` on empty input: an empty batch has no summary,
//! not a zero summary.

/// Arithmetic mean. `None` when the slice is empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divisor N, not N−1).
///
/// A batch is treated as the entire population of interest, so the
/// population form applies. A single value has zero spread by definition:
/// N=1 yields exactly `0.0`.
pub fn pstdev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() == 1 {
        return Some(0.0);
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}
