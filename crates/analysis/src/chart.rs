//! Label/series extraction for chart rendering.

use crate::error::{AnalysisError, Result};
use cellgrid_sheet::Table;
use serde::{Deserialize, Serialize};

/// Chart styles a front end can draw from [`ChartData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Histogram,
    Scatter,
}

/// Saved chart definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default)]
    pub title: String,
    pub x_axis_column: usize,
    #[serde(default)]
    pub y_axis_columns: Vec<usize>,
}

impl ChartConfig {
    /// Extract the data this chart plots from a table
    pub fn data(&self, table: &Table) -> Result<ChartData> {
        chart_data(table, self.x_axis_column, &self.y_axis_columns)
    }
}

/// One plotted series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Labels from the x column and one series per y column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Build chart labels and series.
///
/// Every series has one point per label, so blank or non-numeric y cells
/// are plotted as `0.0`. Y columns missing from the table are skipped.
pub fn chart_data(table: &Table, x_column: usize, y_columns: &[usize]) -> Result<ChartData> {
    let labels = table
        .column(x_column)
        .ok_or(AnalysisError::ColumnOutOfRange {
            column: x_column,
            columns: table.col_count(),
        })?
        .map(ToString::to_string)
        .collect();

    let datasets = y_columns
        .iter()
        .filter_map(|&column| {
            let data = table
                .column(column)?
                .map(|cell| cell.as_number().unwrap_or(0.0))
                .collect();
            Some(Dataset {
                label: format!("Column {column}"),
                data,
            })
        })
        .collect();

    Ok(ChartData { labels, datasets })
}
