//! Simple per-column aggregates chosen by name.

use crate::numeric::{min_max, numeric_values};
use cellgrid_sheet::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregate applied by [`custom_analysis`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomOperation {
    Sum,
    Product,
    /// Spread between the largest and smallest value
    Difference,
}

impl CustomOperation {
    fn apply(self, values: &[f64]) -> CustomResult {
        match self {
            CustomOperation::Sum => CustomResult::Sum {
                sum: values.iter().sum(),
            },
            CustomOperation::Product => CustomResult::Product {
                product: values.iter().product(),
            },
            CustomOperation::Difference => {
                let (min, max) = min_max(values).unwrap_or((0.0, 0.0));
                CustomResult::Difference {
                    difference: max - min,
                }
            }
        }
    }
}

impl FromStr for CustomOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(CustomOperation::Sum),
            "product" => Ok(CustomOperation::Product),
            "difference" => Ok(CustomOperation::Difference),
            other => Err(format!("Unknown operation: {other}")),
        }
    }
}

impl fmt::Display for CustomOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CustomOperation::Sum => "sum",
            CustomOperation::Product => "product",
            CustomOperation::Difference => "difference",
        };
        f.write_str(name)
    }
}

/// Outcome for one column, keyed by the operation's name when serialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomResult {
    Sum { sum: f64 },
    Product { product: f64 },
    Difference { difference: f64 },
    Error { error: String },
}

impl CustomResult {
    /// The computed number, if the operation succeeded
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            CustomResult::Sum { sum } => Some(*sum),
            CustomResult::Product { product } => Some(*product),
            CustomResult::Difference { difference } => Some(*difference),
            CustomResult::Error { .. } => None,
        }
    }
}

/// Apply a named aggregate to each selected column.
///
/// Missing columns and columns without numbers are left out entirely. An
/// unrecognised operation name produces an error entry per column rather
/// than failing the whole call.
#[must_use]
pub fn custom_analysis(
    table: &Table,
    columns: &[usize],
    operation: &str,
) -> IndexMap<usize, CustomResult> {
    let parsed = operation.parse::<CustomOperation>();
    let mut results = IndexMap::new();

    for &column in columns {
        let Some(values) = numeric_values(table, column) else {
            continue;
        };
        if values.is_empty() {
            continue;
        }

        let entry = match &parsed {
            Ok(op) => op.apply(&values),
            Err(message) => CustomResult::Error {
                error: message.clone(),
            },
        };
        results.insert(column, entry);
    }

    results
}
