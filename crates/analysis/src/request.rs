//! Dispatching a named analysis request to the right engine.

use crate::correlation::{correlation, CorrelationResult};
use crate::custom::{custom_analysis, CustomResult};
use crate::error::AnalysisError;
use crate::regression::{linear_regression, RegressionResult};
use crate::stats::{summary_statistics, ColumnStats};
use cellgrid_sheet::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DEFAULT_OPERATION: &str = "sum";

/// Which analysis to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    SummaryStats,
    Correlation,
    Regression,
    Custom,
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisType::SummaryStats => "summary_stats",
            AnalysisType::Correlation => "correlation",
            AnalysisType::Regression => "regression",
            AnalysisType::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Extra inputs some analyses need
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_column: Option<usize>,
    /// Custom aggregate name; `sum` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// An analysis request as received over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub selected_columns: Vec<usize>,
    #[serde(default)]
    pub parameters: AnalysisParameters,
}

impl AnalysisRequest {
    /// Create a request with no parameters
    #[must_use]
    pub fn new(analysis_type: AnalysisType, selected_columns: Vec<usize>) -> Self {
        AnalysisRequest {
            analysis_type,
            selected_columns,
            parameters: AnalysisParameters::default(),
        }
    }

    /// Regression of `y_column` on `x_column`
    #[must_use]
    pub fn regression(x_column: usize, y_column: usize) -> Self {
        let mut request = Self::new(AnalysisType::Regression, vec![x_column, y_column]);
        request.parameters.x_column = Some(x_column);
        request.parameters.y_column = Some(y_column);
        request
    }

    /// Custom aggregate over the given columns
    #[must_use]
    pub fn custom(selected_columns: Vec<usize>, operation: impl Into<String>) -> Self {
        let mut request = Self::new(AnalysisType::Custom, selected_columns);
        request.parameters.operation = Some(operation.into());
        request
    }

    /// Checks made before any engine runs: the table must hold data and a
    /// correlation needs at least two columns.
    pub fn validate(&self, table: &Table) -> Result<(), RequestError> {
        if table.is_empty() {
            return Err(RequestError::EmptyTable);
        }
        if self.analysis_type == AnalysisType::Correlation && self.selected_columns.len() < 2 {
            return Err(RequestError::TooFewColumns {
                found: self.selected_columns.len(),
            });
        }
        Ok(())
    }
}

/// Reasons a request is turned away
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Spreadsheet is empty")]
    EmptyTable,

    #[error("Correlation requires at least 2 columns (got {found})")]
    TooFewColumns { found: usize },

    #[error("Regression requires x_column and y_column")]
    MissingRegressionColumns,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Result of a dispatched analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    SummaryStats(IndexMap<usize, ColumnStats>),
    Correlation(CorrelationResult),
    Regression(RegressionResult),
    Custom(IndexMap<usize, CustomResult>),
}

impl AnalysisOutput {
    /// Kind of analysis that produced this output
    #[must_use]
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisOutput::SummaryStats(_) => AnalysisType::SummaryStats,
            AnalysisOutput::Correlation(_) => AnalysisType::Correlation,
            AnalysisOutput::Regression(_) => AnalysisType::Regression,
            AnalysisOutput::Custom(_) => AnalysisType::Custom,
        }
    }
}

/// Run the analysis a request names.
///
/// This does not call [`AnalysisRequest::validate`]; callers that accept
/// requests from outside should do so first.
pub fn run_analysis(table: &Table, request: &AnalysisRequest) -> Result<AnalysisOutput, RequestError> {
    let columns = &request.selected_columns;
    tracing::debug!(
        analysis = %request.analysis_type,
        columns = columns.len(),
        "Running analysis"
    );

    let output = match request.analysis_type {
        AnalysisType::SummaryStats => AnalysisOutput::SummaryStats(summary_statistics(table, columns)),
        AnalysisType::Correlation => AnalysisOutput::Correlation(correlation(table, columns)?),
        AnalysisType::Regression => {
            let (Some(x), Some(y)) = (request.parameters.x_column, request.parameters.y_column) else {
                return Err(RequestError::MissingRegressionColumns);
            };
            AnalysisOutput::Regression(linear_regression(table, x, y)?)
        }
        AnalysisType::Custom => {
            let operation = request
                .parameters
                .operation
                .as_deref()
                .unwrap_or(DEFAULT_OPERATION);
            AnalysisOutput::Custom(custom_analysis(table, columns, operation))
        }
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_data(vec![vec![1, 2], vec![2, 4], vec![3, 7]])
    }

    #[test]
    fn test_request_from_json() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{"analysis_type": "regression", "selected_columns": [0, 1],
                "parameters": {"x_column": 0, "y_column": 1}}"#,
        )
        .unwrap();
        assert_eq!(request, AnalysisRequest::regression(0, 1));

        let bare: AnalysisRequest =
            serde_json::from_str(r#"{"analysis_type": "summary_stats"}"#).unwrap();
        assert!(bare.selected_columns.is_empty());
    }

    #[test]
    fn test_custom_defaults_to_sum() {
        let request = AnalysisRequest::new(AnalysisType::Custom, vec![0]);
        let output = run_analysis(&table(), &request).unwrap();
        let AnalysisOutput::Custom(results) = output else {
            panic!("expected custom output");
        };
        assert_eq!(results[&0], CustomResult::Sum { sum: 6.0 });
    }

    #[test]
    fn test_regression_needs_both_columns() {
        let request = AnalysisRequest::new(AnalysisType::Regression, vec![0, 1]);
        assert_eq!(
            run_analysis(&table(), &request).unwrap_err(),
            RequestError::MissingRegressionColumns
        );
    }

    #[test]
    fn test_validation() {
        let single = AnalysisRequest::new(AnalysisType::Correlation, vec![0]);
        assert_eq!(
            single.validate(&table()).unwrap_err(),
            RequestError::TooFewColumns { found: 1 }
        );
        // The engine itself still answers
        assert!(run_analysis(&table(), &single).is_ok());

        let stats = AnalysisRequest::new(AnalysisType::SummaryStats, vec![0]);
        assert_eq!(stats.validate(&Table::new()).unwrap_err(), RequestError::EmptyTable);
        assert!(stats.validate(&table()).is_ok());
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let request = AnalysisRequest::regression(0, 5);
        let err = run_analysis(&table(), &request).unwrap_err();
        assert!(matches!(
            err,
            RequestError::Analysis(AnalysisError::ColumnOutOfRange { column: 5, .. })
        ));
    }
}
