//! Descriptive statistics over plain value slices.
//!
//! Numeric aggregates run on a polars `Float64Chunked`. Every function here
//! tolerates empty input and returns a well-formed, empty result instead of
//! failing. Non-finite inputs are dropped before aggregating.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use polars::prelude::*;

use crate::data::model::Value;

/// Finite inputs as a polars column.
fn finite_column(values: &[f64]) -> Float64Chunked {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    Float64Chunked::from_vec("values", finite)
}

// ── Scalar summary ────────────────────────────────────────────────────

/// Summary of the non-missing values of one numeric column.
/// Aggregates are `None` when there are no values to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScalarSummary {
    /// Number of non-missing values.
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample standard deviation, needs at least two values.
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub fn summarize(values: &[f64]) -> ScalarSummary {
    let ca = finite_column(values);
    let count = ca.len();
    if count == 0 {
        return ScalarSummary::default();
    }
    ScalarSummary {
        count,
        mean: ca.mean(),
        median: ca.median(),
        std_dev: if count > 1 { ca.std(1) } else { None },
        min: ca.min(),
        max: ca.max(),
    }
}

/// Linear-interpolated quantile, `q` clamped to `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    column_quantile(&finite_column(values), q)
}

fn column_quantile(ca: &Float64Chunked, q: f64) -> Option<f64> {
    ca.quantile(q.clamp(0.0, 1.0), QuantileInterpolOptions::Linear)
        .ok()
        .flatten()
}

// ── Histogram ─────────────────────────────────────────────────────────

/// Equal-width bins: `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bins {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Bin the finite `values` into `bins` equal-width bins spanning their
/// min/max.
///
/// The last bin is closed on the right so the maximum is counted. A single
/// distinct value is centred in a span of width one.
pub fn histogram(values: &[f64], bins: usize) -> Bins {
    let bins = bins.max(1);
    let ca = finite_column(values);
    let (Some(lo), Some(hi)) = (ca.min(), ca.max()) else {
        return Bins::default();
    };
    let (lo, hi) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in ca.into_no_null_iter() {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Bins { edges, counts }
}

// ── Frequencies ───────────────────────────────────────────────────────

/// Count each distinct value, missing included, ordered by descending count
/// with ties kept in first-seen order.
pub fn frequencies<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<(Value, usize)> {
    let mut seen: HashMap<&Value, (usize, usize)> = HashMap::new();
    for (pos, value) in values.enumerate() {
        seen.entry(value).or_insert((pos, 0)).1 += 1;
    }
    let mut entries: Vec<(&Value, (usize, usize))> = seen.into_iter().collect();
    entries.sort_by(|(_, (first_a, count_a)), (_, (first_b, count_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    entries
        .into_iter()
        .map(|(value, (_, count))| (value.clone(), count))
        .collect()
}

// ── Cross tabulation ──────────────────────────────────────────────────

/// Smallest and largest count along one row or column of a cross tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extrema {
    pub min: usize,
    pub max: usize,
}

/// Co-occurrence counts of two discrete columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub row_column: String,
    pub col_column: String,
    pub row_labels: Vec<Value>,
    pub col_labels: Vec<Value>,
    /// `counts[r][c]` pairs `row_labels[r]` with `col_labels[c]`.
    pub counts: Vec<Vec<usize>>,
    pub row_extrema: Vec<Extrema>,
    pub col_extrema: Vec<Extrema>,
}

impl CrossTab {
    /// Build from `(row value, column value)` pairs; pairs with a missing
    /// side are skipped. Labels are sorted.
    pub fn from_pairs<'a>(
        row_column: &str,
        col_column: &str,
        pairs: impl Iterator<Item = (&'a Value, &'a Value)>,
    ) -> Self {
        let mut cells: BTreeMap<(&Value, &Value), usize> = BTreeMap::new();
        let mut rows: BTreeSet<&Value> = BTreeSet::new();
        let mut cols: BTreeSet<&Value> = BTreeSet::new();
        for (a, b) in pairs.filter(|(a, b)| !a.is_null() && !b.is_null()) {
            *cells.entry((a, b)).or_insert(0) += 1;
            rows.insert(a);
            cols.insert(b);
        }

        let row_labels: Vec<Value> = rows.into_iter().cloned().collect();
        let col_labels: Vec<Value> = cols.into_iter().cloned().collect();
        let counts: Vec<Vec<usize>> = row_labels
            .iter()
            .map(|r| {
                col_labels
                    .iter()
                    .map(|c| cells.get(&(r, c)).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        let row_extrema = counts.iter().filter_map(|row| extrema(row.iter().copied())).collect();
        let col_extrema = (0..col_labels.len())
            .filter_map(|c| extrema(counts.iter().map(|row| row[c])))
            .collect();

        CrossTab {
            row_column: row_column.to_string(),
            col_column: col_column.to_string(),
            row_labels,
            col_labels,
            counts,
            row_extrema,
            col_extrema,
        }
    }

    /// Count for a label pair, zero when the pair never occurs.
    #[cfg(test)]
    pub fn count(&self, row: &Value, col: &Value) -> usize {
        let r = self.row_labels.iter().position(|v| v == row);
        let c = self.col_labels.iter().position(|v| v == col);
        match (r, c) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Largest cell, used to scale heat-map colours.
    pub fn max_count(&self) -> usize {
        self.row_extrema.iter().map(|e| e.max).max().unwrap_or(0)
    }
}

fn extrema(counts: impl Iterator<Item = usize>) -> Option<Extrema> {
    counts.fold(None, |acc, n| match acc {
        None => Some(Extrema { min: n, max: n }),
        Some(e) => Some(Extrema { min: e.min.min(n), max: e.max.max(n) }),
    })
}

// ── Box plot statistics ───────────────────────────────────────────────

/// Tukey box: quartiles, whiskers at the most extreme values within
/// 1.5 IQR of the box, and the points beyond them.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let ca = finite_column(values);
        let q1 = column_quantile(&ca, 0.25)?;
        let median = column_quantile(&ca, 0.5)?;
        let q3 = column_quantile(&ca, 0.75)?;
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let mut sorted: Vec<f64> = ca.into_no_null_iter().collect();
        sorted.sort_by(f64::total_cmp);
        let lower_whisker = sorted.iter().copied().find(|v| *v >= lo_fence).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|v| *v <= hi_fence).unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxStats {
            count: sorted.len(),
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

// ── Linear fit ────────────────────────────────────────────────────────

/// Ordinary least squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a line through the finite `(x, y)` points. `None` with fewer than two
/// points or when every x is the same.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .unzip();
    if xs.len() < 2 {
        return None;
    }
    let x = Float64Chunked::from_vec("x", xs);
    let y = Float64Chunked::from_vec("y", ys);
    let (mean_x, mean_y) = (x.mean()?, y.mean()?);

    let dx = &x - mean_x;
    let dy = &y - mean_y;
    let sxx = (&dx * &dx).sum()?;
    let sxy = (&dx * &dy).sum()?;
    let syy = (&dy * &dy).sum()?;
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let r_squared = if syy == 0.0 { 1.0 } else { (sxy * sxy) / (sxx * syy) };
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn summary_of_three_values() {
        let s = summarize(&[3.0, 1.0, 2.0]);
        assert_eq!(s.count, 3);
        assert_eq!(s.mean, Some(2.0));
        assert_eq!(s.median, Some(2.0));
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(3.0));
        assert!(approx(s.std_dev.unwrap(), 1.0));
    }

    #[test]
    fn summary_of_nothing_is_empty() {
        let s = summarize(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean, None);
        assert_eq!(s.std_dev, None);
    }

    #[test]
    fn single_value_has_no_spread() {
        let s = summarize(&[4.0]);
        assert_eq!(s.median, Some(4.0));
        assert_eq!(s.std_dev, None);
    }

    #[test]
    fn quantile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&values, 0.5), Some(2.5));
        assert_eq!(quantile(&values, 0.25), Some(1.75));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn summary_ignores_non_finite_values() {
        let s = summarize(&[1.0, f64::INFINITY, 3.0, f64::NAN]);
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, Some(2.0));
        assert_eq!(s.max, Some(3.0));
        assert_eq!(summarize(&[f64::NEG_INFINITY]), ScalarSummary::default());
    }

    #[test]
    fn histogram_counts_the_maximum() {
        let b = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(b.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(b.counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn histogram_of_a_single_point() {
        let b = histogram(&[5.0, 5.0], 2);
        assert_eq!(b.edges, vec![4.5, 5.0, 5.5]);
        assert_eq!(b.counts.iter().sum::<usize>(), 2);
    }

    #[test]
    fn histogram_skips_infinite_values() {
        let b = histogram(&[1.0, 2.0, f64::INFINITY], 4);
        assert_eq!(b.edges, vec![1.0, 1.25, 1.5, 1.75, 2.0]);
        assert!(b.edges.iter().all(|e| e.is_finite()));
        assert_eq!(b.counts, vec![1, 0, 0, 1]);
        assert_eq!(histogram(&[f64::INFINITY, f64::NAN], 4), Bins::default());
    }

    #[test]
    fn histogram_of_nothing() {
        assert_eq!(histogram(&[], 40), Bins::default());
    }

    #[test]
    fn frequencies_break_ties_by_first_seen() {
        let vals = vec![
            Value::from("b"),
            Value::from("a"),
            Value::Null,
            Value::from("a"),
            Value::from("c"),
            Value::from("b"),
        ];
        let f = frequencies(vals.iter());
        assert_eq!(
            f,
            vec![
                (Value::from("b"), 2),
                (Value::from("a"), 2),
                (Value::Null, 1),
                (Value::from("c"), 1),
            ]
        );
    }

    #[test]
    fn crosstab_skips_pairs_with_missing_side() {
        let a = [Value::from("x"), Value::from("x"), Value::Null, Value::from("y")];
        let b = [Value::Integer(1), Value::Integer(2), Value::Integer(1), Value::Null];
        let t = CrossTab::from_pairs("a", "b", a.iter().zip(b.iter()));
        assert_eq!(t.total(), 2);
        assert_eq!(t.row_labels, vec![Value::from("x")]);
        assert_eq!(t.row_extrema, vec![Extrema { min: 1, max: 1 }]);
    }

    #[test]
    fn box_stats_flag_outliers() {
        let b = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(b.q1, 2.0);
        assert_eq!(b.median, 3.0);
        assert_eq!(b.q3, 4.0);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 4.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn linear_fit_recovers_a_line() {
        let fit = linear_fit(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert!(approx(fit.slope, 2.0));
        assert!(approx(fit.intercept, 1.0));
        assert!(approx(fit.r_squared, 1.0));
        assert!(approx(fit.predict(3.0), 7.0));
    }

    #[test]
    fn linear_fit_degenerate_inputs() {
        assert!(linear_fit(&[(1.0, 1.0)]).is_none());
        assert!(linear_fit(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
        assert!(linear_fit(&[(1.0, 1.0), (f64::INFINITY, 2.0)]).is_none());
    }
}
