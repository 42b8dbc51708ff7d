//! # cellgrid analysis
//!
//! Statistics over [`Table`](cellgrid_sheet::Table) columns: descriptive
//! summaries, a correlation matrix, simple linear regression, named
//! aggregates and chart series extraction.
//!
//! Every engine reads cells through the same best-effort numeric parse;
//! cells that do not parse are left out, never counted as zero. Chart
//! series are the one exception (see [`chart_data`]).
//!
//! ```
//! use cellgrid_analysis::{linear_regression, summary_statistics};
//! use cellgrid_sheet::Table;
//!
//! let table = Table::from_data(vec![vec![1, 2], vec![2, 4], vec![3, 6], vec![4, 8]]);
//!
//! let stats = summary_statistics(&table, &[0]);
//! assert_eq!(stats[&0].stats().unwrap().mean, 2.5);
//!
//! let fit = linear_regression(&table, 0, 1).unwrap();
//! assert_eq!(fit.equation, "y = 2.0000x + 0.0000");
//! ```

mod chart;
mod correlation;
mod custom;
mod error;
mod numeric;
mod regression;
mod request;
mod stats;

pub use chart::{chart_data, ChartConfig, ChartData, ChartType, Dataset};
pub use correlation::{correlation, CorrelationPair, CorrelationResult};
pub use custom::{custom_analysis, CustomOperation, CustomResult};
pub use error::{AnalysisError, Result};
pub use regression::{linear_regression, RegressionResult, Residuals};
pub use request::{
    run_analysis, AnalysisOutput, AnalysisParameters, AnalysisRequest, AnalysisType, RequestError,
};
pub use stats::{summary_statistics, ColumnStats, SummaryStats};
