//! Statistics Calculator Module
//! Descriptive summaries and moving-average smoothing.

use statrs::statistics::{Data, Median, Statistics};
use std::collections::BTreeMap;

/// Descriptive statistics over a set of values.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Arithmetic mean, or `None` when there is nothing to average.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some(Statistics::mean(values.iter()))
        }
    }

    /// Compute descriptive statistics; `None` for an empty slice.
    pub fn compute_descriptive_stats(values: &[f64]) -> Option<SummaryStats> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        let median = Data::new(values.to_vec()).median();

        let std = if n > 1 {
            Statistics::std_dev(values.iter())
        } else {
            0.0
        };

        Some(SummaryStats {
            count: n,
            mean: Statistics::mean(values.iter()),
            median,
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            std,
        })
    }

    /// Flatten per-subnet values into one pool, in subnet order.
    pub fn pool(values_by_subnet: &BTreeMap<u32, Vec<f64>>) -> Vec<f64> {
        values_by_subnet.values().flatten().copied().collect()
    }

    /// Centered moving average that skips NaN.
    ///
    /// Each output is the mean of the finite inputs inside a window of
    /// `window` samples centered on that index; at least one finite sample
    /// is required, otherwise the output is NaN.
    pub fn centered_moving_average(values: &[f64], window: usize) -> Vec<f64> {
        let n = values.len();
        if window <= 1 {
            return values.to_vec();
        }

        let before = window / 2;
        let after = window - 1 - before;

        (0..n)
            .map(|i| {
                let lo = i.saturating_sub(before);
                let hi = (i + after).min(n - 1);
                let (sum, count) = values[lo..=hi]
                    .iter()
                    .filter(|v| v.is_finite())
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptive_stats_of_odd_sample() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 7.0]).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 4.0);
        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 7.0);
        assert!((stats.std - 3.0).abs() < 1e-12);
    }

    #[test]
    fn median_of_even_sample_is_midpoint() {
        let stats = StatsCalculator::compute_descriptive_stats(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_eq!(stats.median, 25.0);
    }

    #[test]
    fn median_ignores_input_order() {
        let stats = StatsCalculator::compute_descriptive_stats(&[40.0, 10.0, 30.0, 20.0]).unwrap();
        assert_eq!(stats.median, 25.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 40.0);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let stats = StatsCalculator::compute_descriptive_stats(&[2.5]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.min, stats.max);
    }

    #[test]
    fn empty_input_has_no_stats() {
        assert!(StatsCalculator::compute_descriptive_stats(&[]).is_none());
        assert!(StatsCalculator::mean(&[]).is_none());
    }

    #[test]
    fn pool_keeps_subnet_order() {
        let by_subnet = BTreeMap::from([(2, vec![3.0]), (1, vec![1.0, 2.0])]);
        assert_eq!(StatsCalculator::pool(&by_subnet), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn moving_average_shrinks_at_edges() {
        let smoothed = StatsCalculator::centered_moving_average(&[1.0, 2.0, 3.0, 10.0], 3);
        assert_eq!(smoothed, vec![1.5, 2.0, 5.0, 6.5]);
    }

    #[test]
    fn moving_average_fills_single_gaps() {
        let smoothed = StatsCalculator::centered_moving_average(&[1.0, f64::NAN, 3.0], 3);
        assert_eq!(smoothed, vec![1.0, 2.0, 3.0]);

        let smoothed =
            StatsCalculator::centered_moving_average(&[1.0, f64::NAN, f64::NAN, f64::NAN], 3);
        assert_eq!(smoothed[..2], [1.0, 1.0]);
        assert!(smoothed[2].is_nan());
        assert!(smoothed[3].is_nan());
    }
}
