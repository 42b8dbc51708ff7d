use crate::cell::CellValue;
use serde::Serialize;

/// A dense, rectangular grid of cells addressed by zero-based (row, column).
///
/// Tables are built fresh for each operation and handed out by shared
/// reference; nothing in the engines mutates a table once it is built.
/// Column headers, when an importer found them, travel alongside as
/// metadata and are never part of the grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    rows: Vec<Vec<CellValue>>,
    columns: usize,
    headers: Option<Vec<String>>,
}

impl Table {
    /// Create a new empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table of the given size with every cell blank
    #[must_use]
    pub fn with_dimensions(rows: usize, columns: usize) -> Self {
        Table {
            rows: vec![vec![CellValue::Empty; columns]; rows],
            columns,
            headers: None,
        }
    }

    /// Create a table from row vectors, padding short rows with blanks
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(columns, CellValue::Empty);
                row
            })
            .collect();
        Table {
            rows,
            columns,
            headers: None,
        }
    }

    /// Create a table from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        Self::from_rows(
            data.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Attach column headers; the grid widens if there are more headers than columns
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        if headers.len() > self.columns {
            self.columns = headers.len();
            for row in &mut self.rows {
                row.resize(self.columns, CellValue::Empty);
            }
        }
        self.headers = Some(headers);
        self
    }

    /// Column headers consumed at import, if any
    #[must_use]
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns
    }

    /// (rows, columns)
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.row_count(), self.col_count())
    }

    /// A table with no rows or no columns holds no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns == 0
    }

    /// Check whether a column index exists
    #[must_use]
    pub fn has_column(&self, index: usize) -> bool {
        index < self.columns
    }

    /// Get a cell, or `None` outside the table
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterate over one column top to bottom, or `None` if it does not exist
    pub fn column(&self, index: usize) -> Option<impl Iterator<Item = &CellValue>> {
        self.has_column(index)
            .then(|| self.rows.iter().map(move |row| &row[index]))
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }
}
