//! Tabular data model for cellgrid
//!
//! Provides the dense [`Table`] that every computation runs against, the
//! adapter between persisted sparse cells and that table, and the CSV/XLSX
//! import and export engines.
//!
//! # Examples
//!
//! ## From persisted cells to a table and back
//!
//! ```
//! use cellgrid_sheet::{cells_to_table, table_to_cells, ContainerId, SparseCell};
//!
//! let ws = ContainerId::worksheet("ws-1");
//! let cells = vec![
//!     SparseCell::new(ws.clone(), 0, 0, "Alice"),
//!     SparseCell::new(ws.clone(), 1, 2, "30"),
//! ];
//!
//! let table = cells_to_table(&cells);
//! assert_eq!(table.dimensions(), (2, 3));
//!
//! // Blank cells are not written back
//! assert_eq!(table_to_cells(&table, &ws).len(), 2);
//! ```
//!
//! ## Importing a CSV file
//!
//! ```
//! use cellgrid_sheet::{import_csv, CellValue};
//!
//! let table = import_csv(b"name,age\nAlice,30\nBob,25").unwrap();
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.headers().unwrap(), ["name", "age"]);
//! assert_eq!(table.get(0, 1), Some(&CellValue::Number(30.0)));
//! ```
//!
//! ## Validating an upload
//!
//! ```
//! use cellgrid_sheet::{validate_upload, FileKind, UploadPolicy};
//!
//! let kind = validate_upload("data.csv", b"a,b\n1,2", UploadPolicy::default()).unwrap();
//! assert_eq!(kind, FileKind::Csv);
//! ```

pub mod a1_notation;
mod cell;
mod csv;
mod datetime;
mod error;
mod store;
mod table;
mod upload;
mod xlsx;

/// Re-export cell value types and numeric coercion.
pub use cell::{parse_iso_datetime, try_parse_number, CellValue, DataType};
/// Re-export CSV engine.
pub use csv::{export_csv, export_csv_with_options, import_csv, import_csv_with_options, CsvOptions};
/// Re-export Excel date helpers.
pub use datetime::excel_serial_to_datetime;
/// Re-export error types.
pub use error::{ExportError, ImportError, Result};
/// Re-export the sparse cell adapter.
pub use store::{cells_to_table, table_to_cells, ContainerId, SparseCell};
/// Re-export table type.
pub use table::Table;
/// Re-export upload checks.
pub use upload::{
    import_upload, import_upload_sheet, validate_upload, FileKind, UploadPolicy,
    DEFAULT_MAX_UPLOAD_BYTES,
};
/// Re-export XLSX engine.
pub use xlsx::{
    export_excel, import_excel, import_excel_sheet, list_excel_sheets, EXPORT_SHEET_NAME,
};
