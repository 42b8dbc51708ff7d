//! Subcommand implementations. Each returns the JSON it prints.

use anyhow::{bail, Context, Result};
use cellgrid_analysis::{
    chart_data, run_analysis, AnalysisRequest, AnalysisType, ChartData,
};
use cellgrid_sheet::{
    export_csv, export_csv_with_options, export_excel, import_upload, list_excel_sheets,
    CsvOptions, FileKind, Table, UploadPolicy,
};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Not a file path: {}", path.display()))
}

/// Read and parse a csv, tsv or xlsx file
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let table = import_upload(file_name(path)?, &bytes, sheet, UploadPolicy::default())
        .with_context(|| format!("Failed to import {}", path.display()))?;

    tracing::info!(
        file = %path.display(),
        rows = table.row_count(),
        columns = table.col_count(),
        "Loaded table"
    );
    Ok(table)
}

/// Write a table in the format the output extension names
pub fn convert(input: &Path, output: &Path, sheet: Option<&str>) -> Result<Value> {
    let table = load_table(input, sheet)?;
    let kind = FileKind::from_filename(file_name(output)?)
        .with_context(|| format!("Unsupported output format: {}", output.display()))?;

    let bytes = match kind {
        FileKind::Csv => export_csv(&table)?,
        FileKind::Tsv => export_csv_with_options(&table, &CsvOptions::tsv())?,
        FileKind::Xlsx => export_excel(&table)?,
    };
    fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(json!({
        "input": input.display().to_string(),
        "output": output.display().to_string(),
        "rows": table.row_count(),
        "columns": table.col_count(),
        "bytes": bytes.len(),
    }))
}

pub fn sheets(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let names = list_excel_sheets(&bytes).with_context(|| format!("Not a readable workbook: {}", path.display()))?;
    Ok(json!({ "sheets": names }))
}

/// Validate and run an analysis request against a loaded table
pub fn analyze(table: &Table, request: &AnalysisRequest) -> Result<Value> {
    request.validate(table)?;
    let output = run_analysis(table, request)?;
    Ok(serde_json::to_value(output)?)
}

pub fn stats(table: &Table, columns: Vec<usize>) -> Result<Value> {
    analyze(table, &AnalysisRequest::new(AnalysisType::SummaryStats, columns))
}

pub fn correlate(table: &Table, columns: Vec<usize>) -> Result<Value> {
    analyze(table, &AnalysisRequest::new(AnalysisType::Correlation, columns))
}

pub fn regress(table: &Table, x: usize, y: usize) -> Result<Value> {
    analyze(table, &AnalysisRequest::regression(x, y))
}

pub fn custom(table: &Table, columns: Vec<usize>, operation: &str) -> Result<Value> {
    analyze(table, &AnalysisRequest::custom(columns, operation))
}

pub fn eval(table: &Table, formula: &str) -> Value {
    json!({
        "formula": formula,
        "result": cellgrid_formulas::evaluate(formula, table),
    })
}

pub fn chart(table: &Table, x: usize, y: &[usize]) -> Result<ChartData> {
    if table.is_empty() {
        bail!("Spreadsheet is empty");
    }
    Ok(chart_data(table, x, y)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    fn numbers(dir: &TempDir) -> Table {
        let path = write_file(dir, "n.csv", b"x,y,label\n1,2,a\n2,4,b\n3,6,c\n4,8,d\n");
        load_table(&path, None).unwrap()
    }

    #[test]
    fn test_convert_csv_to_xlsx_and_back() {
        let dir = TempDir::new().unwrap();
        let input = write_file(&dir, "in.csv", b"h1,h2\nname,score\nann,9\n");
        let xlsx = dir.path().join("out.xlsx");

        let report = convert(&input, &xlsx, None).unwrap();
        assert_eq!(report["rows"], 2);

        let back = dir.path().join("back.csv");
        convert(&xlsx, &back, Some("Sheet1")).unwrap();
        // The first exported row becomes the workbook header on the way back
        assert_eq!(fs::read_to_string(back).unwrap(), "ann,9\n");
    }

    #[test]
    fn test_convert_rejects_unknown_output() {
        let dir = TempDir::new().unwrap();
        let input = write_file(&dir, "in.csv", b"a\n1\n");
        let err = convert(&input, &dir.path().join("out.json"), None).unwrap_err();
        assert!(err.to_string().contains("Unsupported output format"));
    }

    #[test]
    fn test_sheets() {
        let dir = TempDir::new().unwrap();
        let bytes = export_excel(&Table::from_data(vec![vec!["a"]])).unwrap();
        let path = write_file(&dir, "book.xlsx", &bytes);
        assert_eq!(sheets(&path).unwrap(), json!({"sheets": ["Sheet1"]}));
    }

    #[test]
    fn test_missing_file() {
        let err = load_table(Path::new("/definitely/not/here.csv"), None).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read file"));
    }

    #[test]
    fn test_analysis_commands() {
        let dir = TempDir::new().unwrap();
        let table = numbers(&dir);

        let summary = stats(&table, vec![0]).unwrap();
        assert_eq!(summary["0"]["mean"], 2.5);

        let fit = regress(&table, 0, 1).unwrap();
        assert_eq!(fit["equation"], "y = 2.0000x + 0.0000");

        let corr = correlate(&table, vec![0, 1]).unwrap();
        assert_eq!(corr["pairs"].as_array().unwrap().len(), 1);
        assert!(correlate(&table, vec![0]).is_err());

        let sums = custom(&table, vec![0, 1, 2], "sum").unwrap();
        assert_eq!(sums, json!({"0": {"sum": 10.0}, "1": {"sum": 20.0}}));
    }

    #[test]
    fn test_eval_and_chart() {
        let dir = TempDir::new().unwrap();
        let table = numbers(&dir);

        assert_eq!(eval(&table, "=SUM(B1:B4)")["result"], 20.0);
        assert!(eval(&table, "SUM(B1:B4)")["result"].is_null());

        let data = chart(&table, 2, &[1]).unwrap();
        assert_eq!(data.labels, vec!["a", "b", "c", "d"]);
        assert!(chart(&Table::new(), 0, &[1]).is_err());
    }
}
