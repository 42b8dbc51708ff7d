//! Aggregate functions a range formula may call

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Functions understood by the range evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RangeFunction {
    Sum,
    Average,
    Min,
    Max,
}

impl RangeFunction {
    /// Apply the function to a non-empty slice of values.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let result = match self {
            RangeFunction::Sum => values.iter().sum(),
            RangeFunction::Average => values.iter().sum::<f64>() / values.len() as f64,
            RangeFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            RangeFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };
        Some(result)
    }
}

/// Unrecognized function name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFunction(pub String);

impl FromStr for RangeFunction {
    type Err = UnknownFunction;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().as_str() {
            "SUM" => Ok(RangeFunction::Sum),
            "AVG" | "AVERAGE" => Ok(RangeFunction::Average),
            "MIN" => Ok(RangeFunction::Min),
            "MAX" => Ok(RangeFunction::Max),
            other => Err(UnknownFunction(other.to_string())),
        }
    }
}

impl fmt::Display for RangeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RangeFunction::Sum => "SUM",
            RangeFunction::Average => "AVERAGE",
            RangeFunction::Min => "MIN",
            RangeFunction::Max => "MAX",
        };
        f.write_str(name)
    }
}
