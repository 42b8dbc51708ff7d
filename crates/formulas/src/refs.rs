//! Range references inside a formula's parentheses.

use cellgrid_sheet::a1_notation::{parse_a1, to_a1_notation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        CellAddress { row, col }
    }
}

/// Two endpoints of a rectangular range, kept in the order written.
///
/// Endpoints are not normalized: `B10:A1` keeps `B10` as its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeRef {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl RangeRef {
    #[must_use]
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        RangeRef { start, end }
    }

    /// Parse `<COL><ROW>:<COL><ROW>`, ignoring `$` absolute markers.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (start, end) = text.trim().split_once(':')?;
        Some(RangeRef {
            start: parse_endpoint(start)?,
            end: parse_endpoint(end)?,
        })
    }

    /// Coordinates from start to end on each axis, row-major.
    ///
    /// Iteration runs forward only: an axis whose end precedes its start
    /// is an empty span. Rows and columns are capped at `bounds` so huge
    /// ranges over small tables stay cheap.
    pub fn cells_within(&self, bounds: (usize, usize)) -> impl Iterator<Item = CellAddress> {
        let (rows, cols) = bounds;
        let row_end = self.end.row.min(rows.saturating_sub(1));
        let col_end = self.end.col.min(cols.saturating_sub(1));
        let (row_start, col_start) = (self.start.row, self.start.col);
        let in_bounds = rows > 0 && cols > 0;

        (row_start..=row_end)
            .filter(move |_| in_bounds)
            .flat_map(move |row| (col_start..=col_end).map(move |col| CellAddress::new(row, col)))
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            to_a1_notation(self.start.row, self.start.col),
            to_a1_notation(self.end.row, self.end.col)
        )
    }
}

fn parse_endpoint(text: &str) -> Option<CellAddress> {
    let cleaned: String = text.trim().chars().filter(|&c| c != '$').collect();
    parse_a1(&cleaned).map(|(row, col)| CellAddress::new(row, col))
}
