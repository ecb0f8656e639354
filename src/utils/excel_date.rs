//! Conversions between chrono values and Excel serial dates.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

fn excel_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Interpret a number as an Excel serial date (1900 date system).
///
/// Returns `None` for values outside the range Excel can represent.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }

    let days = serial.trunc() as i64;
    let secs = ((serial - serial.trunc()) * 86_400.0).round() as i64;

    excel_epoch()?.checked_add_signed(Duration::days(days) + Duration::seconds(secs))
}

/// Serial number Excel uses for the given date (midnight).
pub fn date_to_excel_serial(date: NaiveDate) -> Option<f64> {
    let epoch = excel_epoch()?.date();
    Some((date - epoch).num_days() as f64)
}
