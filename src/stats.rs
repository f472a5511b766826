//! Numeric primitives shared by the reader summaries and the processor.
//!
//! All functions take plain `f64` slices that have already been filtered to
//! successfully-coerced values; none of them see NaN.

use serde::Serialize;

/// Neumaier-compensated sum.
pub fn sum(values: &[f64]) -> f64 {
    let mut total = 0.0_f64;
    let mut compensation = 0.0_f64;
    for &v in values {
        let t = total + v;
        if total.abs() >= v.abs() {
            compensation += (total - t) + v;
        } else {
            compensation += (v - t) + total;
        }
        total = t;
    }
    total + compensation
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(sum(values) / values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator), two-pass.
///
/// `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let squared: Vec<f64> = values.iter().map(|v| (v - m) * (v - m)).collect();
    Some((sum(&squared) / (values.len() - 1) as f64).sqrt())
}

/// Sort a copy of `values` ascending.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Quantile `q` (0.0..=1.0) of a **sorted** slice using linear interpolation between
/// order statistics: `h = (n - 1) q`, `v[floor h] + (h - floor h) (v[floor h + 1] - v[floor h])`.
///
/// Returns `None` for an empty slice.
pub fn quantile(sorted_values: &[f64], q: f64) -> Option<f64> {
    let n = sorted_values.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted_values[0]);
    }
    let h = q.clamp(0.0, 1.0) * (n as f64 - 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        return Some(sorted_values[lo]);
    }
    let frac = h - lo as f64;
    Some(sorted_values[lo] + frac * (sorted_values[hi] - sorted_values[lo]))
}

/// Percentage (0..=100) of values in a **sorted** slice strictly less than `x`.
pub fn percentile_rank(sorted_values: &[f64], x: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let below = sorted_values.partition_point(|&v| v < x);
    below as f64 * 100.0 / sorted_values.len() as f64
}

/// Count/sum/mean/median/min/max/std of a non-empty set of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std: Option<f64>,
    #[serde(skip)]
    sorted: Vec<f64>,
}

impl Distribution {
    /// Describe `values`, or `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted(values);
        let median = quantile(&sorted, 0.5)?;
        Some(Self {
            count: values.len(),
            total: sum(values),
            mean: mean(values)?,
            median,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            std: sample_std(values),
            sorted,
        })
    }

    /// Quantile over the described values; see [`quantile`].
    pub fn quantile(&self, q: f64) -> f64 {
        // Non-empty by construction.
        quantile(&self.sorted, q).unwrap_or(self.median)
    }

    /// The described values in ascending order.
    pub fn sorted_values(&self) -> &[f64] {
        &self.sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let v: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!(approx(quantile(&v, 0.25).unwrap(), 3.25));
        assert!(approx(quantile(&v, 0.5).unwrap(), 5.5));
        assert!(approx(quantile(&v, 0.75).unwrap(), 7.75));
        assert!(approx(quantile(&v, 0.0).unwrap(), 1.0));
        assert!(approx(quantile(&v, 1.0).unwrap(), 10.0));
    }

    #[test]
    fn quantile_edge_cases() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[4.0], 0.9), Some(4.0));
    }

    #[test]
    fn compensated_sum_keeps_small_terms() {
        let values = [1e16, 1.0, -1e16];
        assert_eq!(sum(&values), 1.0);
        let tenths = [0.1; 10];
        assert!(approx(sum(&tenths), 1.0));
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // population std is 2.0; sample std is sqrt(32/7)
        assert!(approx(sample_std(&v).unwrap(), (32.0_f64 / 7.0).sqrt()));
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn percentile_rank_counts_strictly_smaller() {
        let v: Vec<f64> = (1..=100).map(f64::from).collect();
        assert!(approx(percentile_rank(&v, 96.0), 95.0));
        assert!(approx(percentile_rank(&v, 1.0), 0.0));
        assert!(approx(percentile_rank(&[2.0, 2.0, 2.0], 2.0), 0.0));
    }

    #[test]
    fn distribution_describes_values() {
        let d = Distribution::from_values(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(d.count, 3);
        assert!(approx(d.total, 6.0));
        assert!(approx(d.mean, 2.0));
        assert!(approx(d.median, 2.0));
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 3.0);
        assert!(approx(d.std.unwrap(), 1.0));
        assert_eq!(d.sorted_values(), &[1.0, 2.0, 3.0]);
        assert!(Distribution::from_values(&[]).is_none());
    }
}
