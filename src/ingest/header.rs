//! Session column headers: dates, weekday tokens and session labels.

use super::sheet::Cell;
use crate::utils::date::{parse_weekday, weekday_name};
use crate::utils::excel_date::excel_serial_to_datetime;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<dow>[A-Za-z]+)[,\s]+)?(?P<date>\d.*?)(?:\.\d+)?$")
        .expect("header regex is valid")
});

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Session date encoded in a header cell.
///
/// `Err` carries a human-readable reason for a malformed header.
pub fn parse_session_date(cell: &Cell) -> Result<NaiveDate, String> {
    match cell {
        Cell::DateTime(dt) => Ok(dt.date()),
        Cell::Number(n) => excel_serial_to_datetime(*n)
            .map(|dt| dt.date())
            .ok_or_else(|| format!("number {n} is not a valid Excel date")),
        Cell::Text(s) => parse_text_header(s.trim()),
        Cell::Bool(b) => Err(format!("'{b}' is not a date")),
        Cell::Empty => Err("missing date header".to_string()),
    }
}

fn parse_text_header(s: &str) -> Result<NaiveDate, String> {
    let caps = HEADER_RE
        .captures(s)
        .ok_or_else(|| format!("'{s}' is not a date"))?;

    let date_part = caps.name("date").map(|m| m.as_str().trim()).unwrap_or("");
    let date = parse_date_part(date_part).ok_or_else(|| format!("'{s}' is not a date"))?;

    if let Some(token) = caps.name("dow").map(|m| m.as_str()) {
        let day = parse_weekday(token).ok_or_else(|| format!("unknown day token '{token}'"))?;

        if day != date.weekday() {
            return Err(format!(
                "day token '{token}' does not match {} ({})",
                date.format("%Y-%m-%d"),
                weekday_name(date.weekday())
            ));
        }
    }

    Ok(date)
}

fn parse_date_part(s: &str) -> Option<NaiveDate> {
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        })
}

/// Session label from the session-name row: trimmed, trailing `*` removed.
pub fn clean_label(cell: &Cell) -> String {
    cell.to_text()
        .trim()
        .trim_end_matches('*')
        .trim()
        .to_string()
}

/// Spreadsheet column letter for a zero-based index (0 → A, 26 → AA).
pub fn column_letter(mut idx: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
