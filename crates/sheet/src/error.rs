use thiserror::Error;

/// Errors raised while turning uploaded bytes into a table.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File is empty")]
    Empty,

    #[error("File too large: {size} bytes (limit is {limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedExtension(String),

    #[error("File content does not match its extension: {0}")]
    ContentMismatch(String),

    #[error("Failed to decode file as UTF-8 text: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("Failed to import CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row} has {found} fields, header has {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("File contains no data rows")]
    NoRows,

    #[error("Failed to import Excel: {0}")]
    Workbook(String),

    #[error("Excel file contains no sheets")]
    NoSheets,

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },
}

/// Errors raised while serializing a table.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Table too large for xlsx: row {row}, col {col}")]
    IndexOverflow { row: usize, col: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;
