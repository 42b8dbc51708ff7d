//! # cellgrid formulas
//!
//! Evaluates flat range formulas such as `=SUM(A1:B10)` against a
//! [`Table`] snapshot. Only `SUM`, `AVG`/`AVERAGE`, `MIN` and `MAX` over a
//! single rectangular range are understood. There are no cell-to-cell
//! references and no recalculation: each call reads the table it is given.
//!
//! Anything the evaluator cannot resolve yields `None` rather than an
//! error.
//!
//! ```
//! use cellgrid_formulas::evaluate;
//! use cellgrid_sheet::Table;
//!
//! let table = Table::from_data(vec![vec!["1"], vec!["2"], vec!["3"]]);
//! assert_eq!(evaluate("=SUM(A1:A3)", &table), Some(6.0));
//! assert_eq!(evaluate("=avg(a1:a3)", &table), Some(2.0));
//! assert_eq!(evaluate("SUM(A1:A3)", &table), None);
//! ```

use cellgrid_sheet::Table;
use serde::{Deserialize, Serialize};

pub mod functions;
pub mod refs;

pub use functions::{RangeFunction, UnknownFunction};
pub use refs::{CellAddress, RangeRef};

/// A parsed `=FUNC(START:END)` formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFormula {
    pub function: RangeFunction,
    pub range: RangeRef,
}

impl RangeFormula {
    /// Parse formula text, or `None` if it is not a supported range formula
    #[must_use]
    pub fn parse(formula: &str) -> Option<Self> {
        let body = formula.trim().strip_prefix('=')?.trim().to_uppercase();

        let open = body.find('(')?;
        let close = body[open + 1..].find(')')? + open + 1;

        let function = body[..open].parse::<RangeFunction>().ok()?;
        let range = RangeRef::parse(&body[open + 1..close])?;

        Some(RangeFormula { function, range })
    }

    /// Numeric values inside the range, row-major.
    ///
    /// Coordinates outside the table and cells that do not parse as numbers
    /// are skipped.
    #[must_use]
    pub fn collect_values(&self, table: &Table) -> Vec<f64> {
        self.range
            .cells_within(table.dimensions())
            .filter_map(|addr| table.get(addr.row, addr.col))
            .filter_map(|cell| cell.as_number())
            .collect()
    }

    /// Evaluate against a table; `None` when the range holds no numbers
    #[must_use]
    pub fn evaluate(&self, table: &Table) -> Option<f64> {
        self.function.apply(&self.collect_values(table))
    }
}

/// Parse and evaluate a formula in one step.
#[must_use]
pub fn evaluate(formula: &str, table: &Table) -> Option<f64> {
    RangeFormula::parse(formula)?.evaluate(table)
}
