//! Pairwise correlation of daily returns over overlapping dates.

use crate::types::{Strategy, TimeSeries};
use serde::{Deserialize, Serialize};

/// Pearson correlation of simple daily returns between two series,
/// restricted to the dates both have sampled.
///
/// Returns `None` when fewer than 2 common dates exist, or when fewer than 2
/// valid return pairs survive (a pair is skipped when either side's prior
/// value is non-positive). A denominator of exactly 0 — both sub-series
/// constant — yields `Some(0.0)` rather than a division failure.
pub fn pairwise_correlation(a: &TimeSeries, b: &TimeSeries) -> Option<f64> {
    // Intersect on dates; BTreeMap iteration keeps the result sorted.
    let common: Vec<(f64, f64)> = a
        .iter()
        .filter_map(|(date, va)| b.get(date).map(|vb| (va, vb)))
        .collect();
    if common.len() < 2 {
        return None;
    }

    let mut xs: Vec<f64> = Vec::with_capacity(common.len() - 1);
    let mut ys: Vec<f64> = Vec::with_capacity(common.len() - 1);
    for w in common.windows(2) {
        let (pa, pb) = w[0];
        let (ca, cb) = w[1];
        if pa > 0.0 && pb > 0.0 {
            xs.push((ca - pa) / pa);
            ys.push((cb - pb) / pb);
        }
    }
    if xs.len() < 2 {
        return None;
    }

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();
    let sum_y2: f64 = ys.iter().map(|y| y * y).sum();
    let sum_xy: f64 = xs.iter().zip(ys.iter()).map(|(x, y)| x * y).sum();

    let numerator = sum_xy - sum_x * sum_y / n;
    let denominator = ((sum_x2 - sum_x * sum_x / n) * (sum_y2 - sum_y * sum_y / n)).sqrt();

    if denominator == 0.0 {
        return Some(0.0);
    }
    Some(numerator / denominator)
}

/// Pairwise correlation matrix for a set of strategies.
///
/// The diagonal is fixed at 1 without computation; off-diagonal cells are
/// `None` when the pair lacks enough overlapping data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Strategy names, in input order.
    pub labels: Vec<String>,
    /// Row-major cells, `cells[i][j]` correlating strategy i with j.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Compute the matrix over every strategy pair.
    pub fn compute(strategies: &[&Strategy]) -> Self {
        let labels = strategies.iter().map(|s| s.name.clone()).collect();
        let cells = (0..strategies.len())
            .map(|i| {
                (0..strategies.len())
                    .map(|j| {
                        if i == j {
                            Some(1.0)
                        } else {
                            pairwise_correlation(&strategies[i].series, &strategies[j].series)
                        }
                    })
                    .collect()
            })
            .collect();
        Self { labels, cells }
    }

    /// Cell accessor; `None` for out-of-range indices or undefined pairs.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.cells.get(i).and_then(|row| row.get(j)).copied().flatten()
    }

    /// Number of strategies covered.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(start: NaiveDate, values: &[f64]) -> TimeSeries {
        TimeSeries::from_samples(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (start + chrono::Duration::days(i as i64), *v)),
        )
    }

    #[test]
    fn test_perfect_positive_correlation() {
        // Identical (varying) return sequences: +10%, +5%, +10%.
        let a = daily(d(2020, 1, 1), &[100.0, 110.0, 115.5, 127.05]);
        let b = daily(d(2020, 1, 1), &[50.0, 55.0, 57.75, 63.525]);

        let corr = pairwise_correlation(&a, &b).unwrap();
        assert_relative_eq!(corr, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let a = daily(d(2020, 1, 1), &[100.0, 110.0, 100.0, 110.0]);
        let b = daily(d(2020, 1, 1), &[100.0, 90.0, 100.0, 90.0]);

        let corr = pairwise_correlation(&a, &b).unwrap();
        assert!(corr < -0.99);
    }

    #[test]
    fn test_restricted_to_overlap() {
        // a has extra dates that b never samples; only the three common
        // dates produce return pairs.
        let a = TimeSeries::from_samples([
            (d(2020, 1, 1), 100.0),
            (d(2020, 1, 2), 500.0),
            (d(2020, 1, 3), 110.0),
            (d(2020, 1, 5), 126.5),
        ]);
        let b = TimeSeries::from_samples([
            (d(2020, 1, 1), 10.0),
            (d(2020, 1, 3), 11.0),
            (d(2020, 1, 5), 12.65),
        ]);

        let corr = pairwise_correlation(&a, &b).unwrap();
        assert_relative_eq!(corr, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_insufficient_overlap_is_none() {
        let a = daily(d(2020, 1, 1), &[100.0, 110.0, 121.0]);
        let b = daily(d(2021, 6, 1), &[100.0, 90.0, 81.0]);
        assert_eq!(pairwise_correlation(&a, &b), None);

        // One common date is not enough.
        let c = TimeSeries::from_samples([(d(2020, 1, 2), 7.0)]);
        assert_eq!(pairwise_correlation(&a, &c), None);
    }

    #[test]
    fn test_non_positive_priors_are_skipped() {
        // b's zero leaves only one valid return pair.
        let a = daily(d(2020, 1, 1), &[100.0, 110.0, 121.0]);
        let b = daily(d(2020, 1, 1), &[0.0, 10.0, 11.0]);
        assert_eq!(pairwise_correlation(&a, &b), None);
    }

    #[test]
    fn test_constant_series_is_zero() {
        let a = daily(d(2020, 1, 1), &[100.0, 100.0, 100.0, 100.0]);
        let b = daily(d(2020, 1, 1), &[50.0, 55.0, 60.0, 70.0]);

        assert_eq!(pairwise_correlation(&a, &b), Some(0.0));
    }

    #[test]
    fn test_symmetry() {
        let a = daily(d(2020, 1, 1), &[100.0, 103.0, 99.0, 104.0, 101.0]);
        let b = daily(d(2020, 1, 1), &[200.0, 198.0, 205.0, 203.0, 210.0]);

        assert_eq!(pairwise_correlation(&a, &b), pairwise_correlation(&b, &a));
    }

    #[test]
    fn test_matrix_diagonal_and_shape() {
        let a = Strategy::new("a", "Alpha", daily(d(2020, 1, 1), &[100.0, 110.0, 121.0]));
        let b = Strategy::new("b", "Beta", daily(d(2020, 1, 1), &[100.0, 90.0, 81.0]));
        let c = Strategy::new("c", "Gamma", daily(d(2021, 1, 1), &[100.0, 101.0]));

        let matrix = CorrelationMatrix::compute(&[&a, &b, &c]);
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.labels, vec!["Alpha", "Beta", "Gamma"]);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), Some(1.0));
        }
        // a and c never overlap.
        assert_eq!(matrix.get(0, 2), None);
        assert_eq!(matrix.get(0, 1), matrix.get(1, 0));
    }
}
