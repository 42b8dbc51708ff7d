use thiserror::Error;

/// Rejected analysis inputs.
///
/// Per-column problems such as a column with no numbers are not errors;
/// they are reported inside the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Column index {column} out of range (table has {columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },

    #[error("Insufficient data points for regression: found {found}, need at least {required}")]
    InsufficientData { found: usize, required: usize },

    #[error("Cannot fit a regression line when every x value is identical")]
    ConstantPredictor,
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
