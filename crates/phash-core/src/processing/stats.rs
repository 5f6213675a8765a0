//! Median, mean and variance helpers shared by the hash engines.

use std::cmp::Ordering;

/// Median of integer samples.
///
/// Even-length input averages the two middle values. Empty input yields 0.
pub fn median_u64(data: &[u64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    } else {
        sorted[n / 2] as f64
    }
}

/// Median of floating point samples, NaN ordered last.
pub fn median_f32(data: &[f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Greater));
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Arithmetic mean, 0 for empty input
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance `E[x²] - E[x]²` from running sums over `count`
/// samples. Zero samples give 0.
#[inline]
pub fn variance_from_sums(sum: f64, sum_sq: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    sum_sq / n - (sum / n) * (sum / n)
}

/// Population variance of `data`
pub fn variance(data: &[f64]) -> f64 {
    let (sum, sum_sq) = data
        .iter()
        .fold((0.0, 0.0), |(s, sq), &x| (s + x, sq + x * x));
    variance_from_sums(sum, sum_sq, data.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd() {
        assert_eq!(median_u64(&[5, 1, 3]), 3.0);
        assert_eq!(median_f32(&[2.5, -1.0, 0.5]), 0.5);
    }

    #[test]
    fn test_median_even_averages_middle_pair() {
        assert_eq!(median_u64(&[4, 1, 3, 2]), 2.5);
        assert_eq!(median_f32(&[1.0, 2.0, 3.0, 10.0]), 2.5);
    }

    #[test]
    fn test_median_single_and_empty() {
        assert_eq!(median_u64(&[7]), 7.0);
        assert_eq!(median_u64(&[]), 0.0);
        assert_eq!(median_f32(&[]), 0.0);
    }

    #[test]
    fn test_median_does_not_reorder_input() {
        let data = [3, 1, 2];
        let _ = median_u64(&data);
        assert_eq!(data, [3, 1, 2]);
    }

    #[test]
    fn test_variance() {
        assert_eq!(variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 4.0);
        assert_eq!(variance(&[3.0; 10]), 0.0);
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }
}
