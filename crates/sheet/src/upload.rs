//! Checks applied to uploaded files before any parsing happens.

use crate::csv::{import_csv_with_options, CsvOptions};
use crate::error::{ImportError, Result};
use crate::table::Table;
use crate::xlsx::import_excel_sheet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest upload accepted by default (50 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
const TEXT_SNIFF_LEN: usize = 8 * 1024;

/// Limits applied to uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        UploadPolicy {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Set the size limit
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// Formats the import engine accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Tsv,
    Xlsx,
}

impl FileKind {
    /// Detect the format from a file name's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(FileKind::Csv),
            "tsv" => Ok(FileKind::Tsv),
            "xlsx" => Ok(FileKind::Xlsx),
            _ => Err(ImportError::UnsupportedExtension(filename.to_string())),
        }
    }

    /// MIME type used when serving this format
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            FileKind::Csv => "text/csv",
            FileKind::Tsv => "text/tab-separated-values",
            FileKind::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

/// Validate an upload's size, extension and content signature.
pub fn validate_upload(filename: &str, bytes: &[u8], policy: UploadPolicy) -> Result<FileKind> {
    if bytes.is_empty() {
        return Err(ImportError::Empty);
    }
    if bytes.len() > policy.max_bytes {
        return Err(ImportError::TooLarge {
            size: bytes.len(),
            limit: policy.max_bytes,
        });
    }

    let kind = FileKind::from_filename(filename)?;
    match kind {
        FileKind::Xlsx if !bytes.starts_with(ZIP_SIGNATURE) => Err(ImportError::ContentMismatch(
            format!("{filename} is not an xlsx workbook"),
        )),
        FileKind::Csv | FileKind::Tsv
            if bytes.iter().take(TEXT_SNIFF_LEN).any(|&b| b == 0) =>
        {
            Err(ImportError::ContentMismatch(format!(
                "{filename} looks like binary data"
            )))
        }
        _ => Ok(kind),
    }
}

/// Validate an upload and parse it into a table.
///
/// `sheet_name` only applies to workbooks.
pub fn import_upload(
    filename: &str,
    bytes: &[u8],
    sheet_name: Option<&str>,
    policy: UploadPolicy,
) -> Result<Table> {
    import_upload_sheet(filename, bytes, sheet_name, policy).map(|(_, table)| table)
}

/// Like [`import_upload`], also returning the worksheet that was read.
/// The name is `None` for csv and tsv uploads.
pub fn import_upload_sheet(
    filename: &str,
    bytes: &[u8],
    sheet_name: Option<&str>,
    policy: UploadPolicy,
) -> Result<(Option<String>, Table)> {
    match validate_upload(filename, bytes, policy)? {
        FileKind::Csv => Ok((None, import_csv_with_options(bytes, &CsvOptions::default())?)),
        FileKind::Tsv => Ok((None, import_csv_with_options(bytes, &CsvOptions::tsv())?)),
        FileKind::Xlsx => {
            let (name, table) = import_excel_sheet(bytes, sheet_name)?;
            Ok((Some(name), table))
        }
    }
}
