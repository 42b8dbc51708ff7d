use crate::cell::{try_parse_number, CellValue};
use crate::error::{ExportError, ImportError, Result};
use crate::table::Table;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV reader/writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Whether the first row contains headers (default: true)
    pub has_headers: bool,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Whether fully numeric columns become numbers when reading
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            has_headers: true,
            quote: b'"',
            infer_types: true,
        }
    }
}

impl CsvOptions {
    /// Create options for TSV (tab-separated values)
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set whether to infer types
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

/// Parse CSV bytes into a table, consuming the first row as headers
pub fn import_csv(bytes: &[u8]) -> Result<Table> {
    import_csv_with_options(bytes, &CsvOptions::default())
}

/// Parse CSV bytes into a table with custom options
pub fn import_csv_with_options(bytes: &[u8], options: &CsvOptions) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .quote(options.quote)
        .has_headers(false) // We handle headers ourselves
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let headers: Option<Vec<String>> = if options.has_headers {
        match records.next() {
            Some(record) => Some(record?.iter().map(str::to_string).collect()),
            None => return Err(ImportError::NoRows),
        }
    } else {
        None
    };
    let width = headers.as_ref().map(Vec::len);

    let mut raw: Vec<Vec<String>> = Vec::new();
    for (index, result) in records.enumerate() {
        let record = result?;
        if let Some(expected) = width {
            if record.len() > expected {
                return Err(ImportError::RaggedRow {
                    row: index + 1,
                    found: record.len(),
                    expected,
                });
            }
        }
        raw.push(record.iter().map(str::to_string).collect());
    }

    if raw.is_empty() {
        return Err(ImportError::NoRows);
    }

    let columns = width.unwrap_or_else(|| raw.iter().map(Vec::len).max().unwrap_or(0));
    let numeric = if options.infer_types {
        numeric_columns(&raw, columns)
    } else {
        vec![false; columns]
    };

    let rows = raw
        .into_iter()
        .map(|fields| {
            let mut row: Vec<CellValue> = fields
                .into_iter()
                .enumerate()
                .map(|(col, field)| convert_field(field, numeric[col]))
                .collect();
            row.resize(columns, CellValue::Empty);
            row
        })
        .collect();

    let mut table = Table::from_rows(rows);
    if let Some(headers) = headers {
        table = table.with_headers(headers);
    }

    tracing::debug!(
        rows = table.row_count(),
        columns = table.col_count(),
        "imported csv"
    );
    Ok(table)
}

/// A column is numeric when it has at least one value and every non-blank
/// field parses as a number.
fn numeric_columns(raw: &[Vec<String>], columns: usize) -> Vec<bool> {
    (0..columns)
        .map(|col| {
            let mut seen = false;
            for field in raw.iter().filter_map(|row| row.get(col)) {
                if field.is_empty() {
                    continue;
                }
                if try_parse_number(field).is_none() {
                    return false;
                }
                seen = true;
            }
            seen
        })
        .collect()
}

fn convert_field(field: String, numeric: bool) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    if numeric {
        if let Some(n) = try_parse_number(&field) {
            return CellValue::Number(n);
        }
    }
    CellValue::Text(field)
}

/// Serialize a table as CSV, one line per row, no header line
pub fn export_csv(table: &Table) -> std::result::Result<Vec<u8>, ExportError> {
    export_csv_with_options(table, &CsvOptions::default())
}

/// Serialize a table as CSV with custom options
pub fn export_csv_with_options(
    table: &Table,
    options: &CsvOptions,
) -> std::result::Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .quote(options.quote)
        .from_writer(Vec::new());

    for row in table.rows() {
        let record: Vec<String> = row.iter().map(ToString::to_string).collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
