//! Numeric views over table columns.

use cellgrid_sheet::Table;

/// Numeric cells of a column as `(row, value)`, skipping anything that does
/// not parse. `None` when the column does not exist.
pub(crate) fn numeric_column(table: &Table, column: usize) -> Option<Vec<(usize, f64)>> {
    let cells = table.column(column)?;
    Some(
        cells
            .enumerate()
            .filter_map(|(row, cell)| cell.as_number().map(|n| (row, n)))
            .collect(),
    )
}

/// Numeric values of a column with row positions dropped.
pub(crate) fn numeric_values(table: &Table, column: usize) -> Option<Vec<f64>> {
    numeric_column(table, column).map(|pairs| pairs.into_iter().map(|(_, n)| n).collect())
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator); `None` below two values.
pub(crate) fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Linearly interpolated quantile of an ascending, non-empty slice.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

pub(crate) fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_sheet::CellValue;

    #[test]
    fn test_numeric_column_keeps_row_positions() {
        let table = Table::from_rows(vec![
            vec![CellValue::Text("1.5".into())],
            vec![CellValue::Text("abc".into())],
            vec![CellValue::Empty],
            vec![CellValue::Number(4.0)],
        ]);
        assert_eq!(numeric_column(&table, 0), Some(vec![(0, 1.5), (3, 4.0)]));
        assert_eq!(numeric_column(&table, 1), None);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.25), 1.75);
        assert_eq!(quantile_sorted(&sorted, 0.5), 2.5);
        assert_eq!(quantile_sorted(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn test_sample_variance() {
        assert_eq!(sample_variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(2.5));
        assert_eq!(sample_variance(&[3.0]), None);
    }
}
