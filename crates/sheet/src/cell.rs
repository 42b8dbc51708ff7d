use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-8601 layout used whenever a date crosses a text boundary.
pub(crate) const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Represents a cell value in a table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
}

/// Declared type stored alongside a persisted cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Text,
    Number,
    Date,
    Formula,
}

impl DataType {
    /// Wire name of the type
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Date => "date",
            DataType::Formula => "formula",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort numeric parse used by every analysis and formula path.
///
/// Surrounding whitespace is ignored. Text that is not a finite number
/// (including `nan` and `inf`) yields `None`; it is never read as zero.
#[must_use]
pub fn try_parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse an ISO-8601 date or datetime string.
#[must_use]
pub fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    NaiveDateTime::parse_from_str(trimmed, ISO_DATETIME)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl CellValue {
    /// Check if the value is blank (missing or empty text)
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Try to get the value as a number
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            CellValue::Text(s) => try_parse_number(s),
            CellValue::Empty | CellValue::Date(_) => None,
        }
    }

    /// Type a persisted cell would be declared with
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            CellValue::Number(_) => DataType::Number,
            CellValue::Date(_) => DataType::Date,
            CellValue::Empty | CellValue::Text(_) => DataType::Text,
        }
    }

    /// Rebuild a value from its persisted text and declared type.
    ///
    /// Text that does not match its declared type is kept as text.
    #[must_use]
    pub fn from_stored(value: Option<&str>, data_type: DataType) -> CellValue {
        let Some(text) = value.filter(|s| !s.is_empty()) else {
            return CellValue::Empty;
        };
        let typed = match data_type {
            DataType::Number => try_parse_number(text).map(CellValue::Number),
            DataType::Date => parse_iso_datetime(text).map(CellValue::Date),
            DataType::Text | DataType::Formula => None,
        };
        typed.unwrap_or_else(|| CellValue::Text(text.to_string()))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Date(dt) => write!(f, "{}", dt.format(ISO_DATETIME)),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Number(i as f64)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Number(f64::from(i))
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::Date(dt)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::from(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Empty,
        }
    }
}
