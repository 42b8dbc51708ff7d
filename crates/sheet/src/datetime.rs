//! Excel serial date conversion

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// Day zero of the 1900 date system as Excel counts it.
///
/// Using 1899-12-30 rather than 1900-01-01 absorbs Excel's phantom
/// 1900-02-29, so every serial from 61 (1900-03-01) onward is exact.
fn excel_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Convert an Excel serial date to a datetime, rounded to the second
#[must_use]
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let seconds = (serial * 86_400.0).round() as i64;
    excel_epoch()?.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}
