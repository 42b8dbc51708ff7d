use crate::cell::{parse_iso_datetime, CellValue};
use crate::datetime::excel_serial_to_datetime;
use crate::error::{ExportError, ImportError, Result};
use crate::table::Table;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx, XlsxError};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook, Worksheet};
use std::io::Cursor;

/// Name of the single sheet written on export.
pub const EXPORT_SHEET_NAME: &str = "Sheet1";

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::from(s.as_str()),
        // Booleans are not numbers; keep their display form
        Data::Bool(b) => CellValue::Text(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map_or_else(|| CellValue::Number(dt.as_f64()), CellValue::Date),
        Data::DateTimeIso(s) => {
            parse_iso_datetime(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Date)
        }
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn open(bytes: &[u8]) -> Result<Xlsx<Cursor<&[u8]>>> {
    open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: XlsxError| ImportError::Workbook(e.to_string()))
}

/// "none" in any case means the caller did not pick a sheet.
fn requested_sheet(sheet_name: Option<&str>) -> Option<&str> {
    sheet_name
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("none"))
}

/// List the sheet names of a workbook in workbook order
pub fn list_excel_sheets(bytes: &[u8]) -> Result<Vec<String>> {
    let workbook = open(bytes)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Parse an xlsx workbook into a table.
///
/// Reads `sheet_name`, or the first sheet when no name (or the literal
/// "none") is given. The first row of the sheet becomes the headers.
pub fn import_excel(bytes: &[u8], sheet_name: Option<&str>) -> Result<Table> {
    import_excel_sheet(bytes, sheet_name).map(|(_, table)| table)
}

/// Like [`import_excel`], also returning the name of the sheet that was read.
pub fn import_excel_sheet(bytes: &[u8], sheet_name: Option<&str>) -> Result<(String, Table)> {
    let mut workbook = open(bytes)?;

    let sheet_names = workbook.sheet_names().to_vec();
    let Some(first) = sheet_names.first() else {
        return Err(ImportError::NoSheets);
    };

    let selected = match requested_sheet(sheet_name) {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .ok_or_else(|| ImportError::SheetNotFound {
                name: name.to_string(),
            })?,
        None => first,
    };

    let range = workbook
        .worksheet_range(selected)
        .map_err(|e: XlsxError| ImportError::Workbook(e.to_string()))?;

    // The range starts at the first populated cell; leading blank columns
    // still count toward column indices.
    let offset = range.start().map_or(0, |(_, col)| col as usize);

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| {
            std::iter::repeat(String::new())
                .take(offset)
                .chain(row.iter().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default();

    let data: Vec<Vec<CellValue>> = rows
        .map(|row| {
            std::iter::repeat(CellValue::Empty)
                .take(offset)
                .chain(row.iter().map(data_to_cell_value))
                .collect()
        })
        .collect();

    let mut table = Table::from_rows(data);
    if !headers.is_empty() {
        table = table.with_headers(headers);
    }

    tracing::debug!(
        sheet = %selected,
        rows = table.row_count(),
        columns = table.col_count(),
        "imported excel sheet"
    );
    Ok((selected.clone(), table))
}

/// Serialize a table as a single-sheet xlsx workbook.
///
/// The document creation time is pinned so identical tables give
/// identical bytes.
pub fn export_excel(table: &Table) -> std::result::Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    let properties = DocProperties::new().set_creation_datetime(&created);
    workbook.set_properties(&properties);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;
    write_to_worksheet(table, worksheet)?;

    Ok(workbook.save_to_buffer()?)
}

/// Write table data to a worksheet
fn write_to_worksheet(
    table: &Table,
    worksheet: &mut Worksheet,
) -> std::result::Result<(), ExportError> {
    for (row_idx, row) in table.rows().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (Ok(row_num), Ok(col_num)) = (u32::try_from(row_idx), u16::try_from(col_idx))
            else {
                return Err(ExportError::IndexOverflow {
                    row: row_idx,
                    col: col_idx,
                });
            };

            match cell {
                CellValue::Empty => {} // Leave empty
                CellValue::Number(n) => {
                    worksheet.write_number(row_num, col_num, *n)?;
                }
                CellValue::Date(_) | CellValue::Text(_) => {
                    worksheet.write_string(row_num, col_num, &cell.to_string())?;
                }
            }
        }
    }

    Ok(())
}
