//! Statistics Calculator Module
//! Summary statistics behind the single-series charts: histogram bins,
//! box-plot quartiles and violin densities.

use serde::Serialize;
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;

/// Default whisker reach, in interquartile ranges.
pub const WHISKER_IQR: f64 = 1.5;

/// Kernel extends this many bandwidths past the data range.
const KDE_CUT: f64 = 2.0;

/// One histogram bin covering `[start, end)` (the last bin is closed).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Five-number summary plus outliers for a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Kernel density curve for a violin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Density {
    pub bandwidth: f64,
    /// (value, density) pairs ordered by value.
    pub points: Vec<(f64, f64)>,
}

/// Stateless statistics helpers.
pub struct StatsCalculator;

impl StatsCalculator {
    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Equal-width histogram over `[min, max]`.
    ///
    /// A constant series is widened to `[v - 0.5, v + 0.5]`.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        let sorted = Self::sorted(values);
        let bins = bins.max(1);
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return Vec::new();
        };

        let (lo, hi) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        let width = (hi - lo) / bins as f64;

        let mut counts = vec![0usize; bins];
        for v in &sorted {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: lo + i as f64 * width,
                end: lo + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }

    /// Quartiles, whiskers at 1.5 IQR and the points beyond them.
    pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
        let sorted = Self::sorted(values);
        if sorted.is_empty() {
            return None;
        }

        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxStats {
            count: sorted.len(),
            mean: sorted.iter().mean(),
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// Scott's-rule bandwidth. Falls back to 1.0 when the spread is zero.
    pub fn scott_bandwidth(sorted_values: &[f64]) -> f64 {
        let n = sorted_values.len();
        if n < 2 {
            return 1.0;
        }
        let std = sorted_values.iter().std_dev();
        let bw = std * (n as f64).powf(-0.2);
        if bw.is_finite() && bw > 0.0 {
            bw
        } else {
            1.0
        }
    }

    /// Gaussian kernel density estimate sampled at `points` positions.
    pub fn kde(values: &[f64], points: usize) -> Option<Density> {
        let sorted = Self::sorted(values);
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return None;
        };

        let bandwidth = Self::scott_bandwidth(&sorted);
        let kernel = Normal::new(0.0, bandwidth).ok()?;

        let points = points.max(2);
        let lo = min - KDE_CUT * bandwidth;
        let hi = max + KDE_CUT * bandwidth;
        let step = (hi - lo) / (points - 1) as f64;
        let n = sorted.len() as f64;

        let curve = (0..points)
            .map(|i| {
                let x = lo + i as f64 * step;
                let density = sorted.iter().map(|&v| kernel.pdf(x - v)).sum::<f64>() / n;
                (x, density)
            })
            .collect();

        Some(Density {
            bandwidth,
            points: curve,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_matches_numpy_linear() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_eq!(StatsCalculator::percentile(&sorted, 25.0), 1.75);
        assert!(StatsCalculator::percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [1.0, 2.0, 2.0, 3.0, 10.0];
        let bins = StatsCalculator::histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].start, 1.0);
        assert!((bins[9].end - 10.0).abs() < 1e-9);
        // max lands in the closed last bin
        assert_eq!(bins[9].count, 1);
    }

    #[test]
    fn test_histogram_constant_series() {
        let bins = StatsCalculator::histogram(&[4.0, 4.0], 10);
        assert_eq!(bins[0].start, 3.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(StatsCalculator::histogram(&[], 10).is_empty());
    }

    #[test]
    fn test_box_stats_flags_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let stats = StatsCalculator::box_stats(&values).unwrap();
        assert_eq!(stats.count, 6);
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.whisker_high, 5.0);
        assert_eq!(stats.whisker_low, 1.0);
        assert!(StatsCalculator::box_stats(&[]).is_none());
    }

    #[test]
    fn test_kde_spans_cut_and_integrates_near_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 4.0];
        let density = StatsCalculator::kde(&values, 200).unwrap();
        let (first, _) = density.points[0];
        let (last, _) = density.points[199];
        assert!((first - (1.0 - 2.0 * density.bandwidth)).abs() < 1e-9);
        assert!((last - (4.0 + 2.0 * density.bandwidth)).abs() < 1e-9);

        let step = density.points[1].0 - density.points[0].0;
        let area: f64 = density.points.iter().map(|(_, d)| d * step).sum();
        assert!(area > 0.9 && area < 1.01, "area was {}", area);
    }

    #[test]
    fn test_kde_single_value_uses_unit_bandwidth() {
        let density = StatsCalculator::kde(&[5.0], 10).unwrap();
        assert_eq!(density.bandwidth, 1.0);
        assert!(StatsCalculator::kde(&[], 10).is_none());
    }
}
