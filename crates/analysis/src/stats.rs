//! Descriptive statistics per column.

use crate::numeric::{mean, min_max, numeric_values, quantile_sorted, sample_variance};
use cellgrid_sheet::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const NO_NUMERIC_DATA: &str = "No numeric data found in column";

/// Descriptive statistics for one column's numeric values.
///
/// `std_dev` and `variance` use the sample (n - 1) denominator and are
/// absent when the column holds a single number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: Option<f64>,
    pub std_dev: Option<f64>,
    pub variance: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

/// Statistics for a column, or the reason none could be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnStats {
    Computed(SummaryStats),
    Error { error: String },
}

impl ColumnStats {
    /// The computed block, if any
    #[must_use]
    pub fn stats(&self) -> Option<&SummaryStats> {
        match self {
            ColumnStats::Computed(stats) => Some(stats),
            ColumnStats::Error { .. } => None,
        }
    }
}

impl SummaryStats {
    /// Compute statistics over a set of values; `None` if it is empty
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (min, max) = min_max(values)?;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let variance = sample_variance(values);

        Some(SummaryStats {
            count: values.len(),
            mean: mean(values),
            median: quantile_sorted(&sorted, 0.5),
            mode: mode_sorted(&sorted),
            std_dev: variance.map(f64::sqrt),
            variance,
            min,
            max,
            range: max - min,
            q1,
            q3,
            iqr: q3 - q1,
        })
    }
}

/// Most frequent value; ties resolve to the smallest.
fn mode_sorted(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let run = sorted[i..].iter().take_while(|&&v| v == value).count();
        let better = match best {
            None => true,
            Some((_, count)) => run > count,
        };
        if better {
            best = Some((value, run));
        }
        i += run;
    }
    best.map(|(value, _)| value)
}

/// Summary statistics for each selected column.
///
/// Columns not present in the table are left out of the result. A column
/// with no numeric cells gets an error entry instead of statistics.
#[must_use]
pub fn summary_statistics(table: &Table, columns: &[usize]) -> IndexMap<usize, ColumnStats> {
    let mut results = IndexMap::new();

    for &column in columns {
        let Some(values) = numeric_values(table, column) else {
            continue;
        };

        let entry = match SummaryStats::from_values(&values) {
            Some(stats) => ColumnStats::Computed(stats),
            None => ColumnStats::Error {
                error: NO_NUMERIC_DATA.to_string(),
            },
        };
        results.insert(column, entry);
    }

    results
}
