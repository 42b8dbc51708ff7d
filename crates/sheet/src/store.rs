//! Conversion between persisted sparse cells and the dense [`Table`].

use crate::cell::{CellValue, DataType};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Owner of a set of persisted cells.
///
/// Cells normally belong to a worksheet; older spreadsheets store them
/// against the spreadsheet itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ContainerId {
    Worksheet(String),
    Spreadsheet(String),
}

impl ContainerId {
    #[must_use]
    pub fn worksheet(id: impl Into<String>) -> Self {
        ContainerId::Worksheet(id.into())
    }

    #[must_use]
    pub fn spreadsheet(id: impl Into<String>) -> Self {
        ContainerId::Spreadsheet(id.into())
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerId::Worksheet(id) => write!(f, "worksheet:{id}"),
            ContainerId::Spreadsheet(id) => write!(f, "spreadsheet:{id}"),
        }
    }
}

/// A persisted cell: one record per (container, row, column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseCell {
    pub container: ContainerId,
    pub row_index: usize,
    pub column_index: usize,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub data_type: DataType,
}

impl SparseCell {
    /// Create a text cell
    #[must_use]
    pub fn new(
        container: ContainerId,
        row_index: usize,
        column_index: usize,
        value: impl Into<String>,
    ) -> Self {
        SparseCell {
            container,
            row_index,
            column_index,
            value: Some(value.into()),
            data_type: DataType::Text,
        }
    }

    /// Set the declared type
    #[must_use]
    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

/// Build a dense table from sparse cells.
///
/// The table spans (max row + 1) x (max column + 1). Gaps are blank, a
/// missing value is blank, and a repeated coordinate keeps the last value
/// seen. No cells gives the empty (0, 0) table.
#[must_use]
pub fn cells_to_table(cells: &[SparseCell]) -> Table {
    if cells.is_empty() {
        return Table::new();
    }

    let max_row = cells.iter().map(|c| c.row_index).max().unwrap_or(0);
    let max_col = cells.iter().map(|c| c.column_index).max().unwrap_or(0);

    let mut table = Table::with_dimensions(max_row + 1, max_col + 1);
    for cell in cells {
        let value = CellValue::from_stored(cell.value.as_deref(), cell.data_type);
        table.set(cell.row_index, cell.column_index, value);
    }
    table
}

/// Flatten a table into sparse cells for `container`, omitting blanks.
///
/// Row indices are reassigned from table position in a first pass so the
/// emitted records are always numbered 0..N-1 in row-major order.
#[must_use]
pub fn table_to_cells(table: &Table, container: &ContainerId) -> Vec<SparseCell> {
    let row_positions: Vec<usize> = (0..table.row_count()).collect();

    let mut cells = Vec::new();
    for (row, row_index) in table.rows().zip(row_positions) {
        for (column_index, value) in row.iter().enumerate() {
            if value.is_blank() {
                continue;
            }
            cells.push(SparseCell {
                container: container.clone(),
                row_index,
                column_index,
                value: Some(value.to_string()),
                data_type: value.data_type(),
            });
        }
    }
    cells
}
