//! Pairwise Pearson correlation.

use crate::error::{AnalysisError, Result};
use cellgrid_sheet::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Correlation between two distinct columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub column1: usize,
    pub column2: usize,
    pub correlation: f64,
}

/// Full matrix plus the defined upper-triangle pairs.
///
/// `correlation_matrix[a][b]` is `None` where the coefficient is undefined,
/// e.g. against a constant column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub columns: Vec<usize>,
    pub correlation_matrix: IndexMap<usize, IndexMap<usize, Option<f64>>>,
    pub pairs: Vec<CorrelationPair>,
}

impl CorrelationResult {
    /// Coefficient between two columns, if defined
    #[must_use]
    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        self.correlation_matrix.get(&a)?.get(&b).copied().flatten()
    }
}

/// Pearson coefficient over rows where both series have a number.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((sxy / denominator).clamp(-1.0, 1.0))
}

/// Correlation matrix across the selected columns.
///
/// Each pair of columns is compared over the rows where both hold a
/// number. Requiring at least two columns is left to the caller.
pub fn correlation(table: &Table, columns: &[usize]) -> Result<CorrelationResult> {
    let series = columns
        .iter()
        .map(|&column| {
            table
                .column(column)
                .map(|cells| cells.map(|cell| cell.as_number()).collect::<Vec<_>>())
                .ok_or(AnalysisError::ColumnOutOfRange {
                    column,
                    columns: table.col_count(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut matrix = IndexMap::new();
    for (i, &a) in columns.iter().enumerate() {
        let row: IndexMap<usize, Option<f64>> = columns
            .iter()
            .enumerate()
            .map(|(j, &b)| (b, pearson(&series[i], &series[j])))
            .collect();
        matrix.insert(a, row);
    }

    let mut pairs = Vec::new();
    for (i, &a) in columns.iter().enumerate() {
        for (j, &b) in columns.iter().enumerate().skip(i + 1) {
            if let Some(correlation) = pearson(&series[i], &series[j]) {
                pairs.push(CorrelationPair {
                    column1: a,
                    column2: b,
                    correlation,
                });
            }
        }
    }

    tracing::debug!(columns = columns.len(), pairs = pairs.len(), "Computed correlation");

    Ok(CorrelationResult {
        columns: columns.to_vec(),
        correlation_matrix: matrix,
        pairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_correlations() {
        let table = Table::from_data(vec![vec![1, 2, 10], vec![2, 4, 8], vec![3, 6, 6], vec![4, 8, 4]]);
        let result = correlation(&table, &[0, 1, 2]).unwrap();

        assert!(approx(result.get(0, 1).unwrap(), 1.0));
        assert!(approx(result.get(0, 2).unwrap(), -1.0));
        assert!(approx(result.get(2, 2).unwrap(), 1.0));
        assert_eq!(result.pairs.len(), 3);
        assert_eq!((result.pairs[0].column1, result.pairs[0].column2), (0, 1));
        assert_eq!((result.pairs[2].column1, result.pairs[2].column2), (1, 2));
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let table = Table::from_data(vec![vec![1, 5], vec![2, 5], vec![3, 5]]);
        let result = correlation(&table, &[0, 1]).unwrap();

        assert_eq!(result.get(0, 1), None);
        assert_eq!(result.get(1, 1), None);
        assert!(result.pairs.is_empty());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["correlation_matrix"]["0"]["1"].is_null());
    }

    #[test]
    fn test_pairwise_rows_only() {
        let table = Table::from_data(vec![
            vec!["1", "2"],
            vec!["2", "x"],
            vec!["3", "6"],
            vec!["oops", "100"],
            vec!["4", "8"],
        ]);
        let result = correlation(&table, &[0, 1]).unwrap();
        assert!(approx(result.pairs[0].correlation, 1.0));
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let table = Table::from_data(vec![vec![1, 2]]);
        assert_eq!(
            correlation(&table, &[0, 3]).unwrap_err(),
            AnalysisError::ColumnOutOfRange { column: 3, columns: 2 }
        );
    }
}
