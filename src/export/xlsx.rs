// src/export/xlsx.rs

use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::write_atomically;
use crate::export::notify_export_success;
use crate::models::{AttendanceRecord, SessionDefinition, SessionSummary};
use crate::utils::excel_date::date_to_excel_serial;
use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::collections::BTreeMap;
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATE_WIDTH: usize = 10;

enum CellValue {
    Text(String),
    Date(NaiveDate),
    Number(f64),
}

impl CellValue {
    fn width(&self) -> usize {
        match self {
            CellValue::Text(s) => UnicodeWidthStr::width(s.as_str()),
            CellValue::Date(_) => DATE_WIDTH,
            CellValue::Number(n) => n.to_string().len(),
        }
    }
}

/// Write the attendance report: a `Detail` sheet and a `Summary` sheet
/// (with the session category), styled with banded rows and auto widths.
pub fn write_report_xlsx(
    path: &Path,
    records: &[AttendanceRecord],
    summaries: &[SessionSummary],
    definitions: &[SessionDefinition],
) -> AppResult<()> {
    let mut workbook = Workbook::new();

    let categories: BTreeMap<(&str, NaiveDate), &str> = definitions
        .iter()
        .filter_map(|d| {
            d.category
                .as_deref()
                .map(|c| ((d.canonical_name.as_str(), d.date), c))
        })
        .collect();

    let detail_rows = records.iter().map(|r| {
        vec![
            CellValue::Text(r.name.clone()),
            CellValue::Text(r.session_name.clone()),
            CellValue::Date(r.session_date),
            CellValue::Text(r.day_str().to_string()),
            CellValue::Number(if r.attended { 1.0 } else { 0.0 }),
        ]
    });

    write_sheet(
        workbook.add_worksheet(),
        "Detail",
        &["name", "session_name", "session_date", "day_of_week", "attended"],
        detail_rows,
    )?;

    let summary_rows = summaries.iter().map(|s| {
        vec![
            CellValue::Text(s.session_name.clone()),
            CellValue::Text(
                categories
                    .get(&(s.session_name.as_str(), s.session_date))
                    .copied()
                    .unwrap_or_default()
                    .to_string(),
            ),
            CellValue::Date(s.session_date),
            CellValue::Number(s.attended_count as f64),
            CellValue::Number(s.total_count as f64),
        ]
    });

    write_sheet(
        workbook.add_worksheet(),
        "Summary",
        &["session_name", "category", "session_date", "attended_count", "total_count"],
        summary_rows,
    )?;

    let buffer = workbook.save_to_buffer().map_err(to_export_error)?;
    write_atomically(path, |out| out.write_all(&buffer))?;

    notify_export_success("XLSX report", path);
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    headers: &[&str],
    rows: impl Iterator<Item = Vec<CellValue>>,
) -> AppResult<()> {
    worksheet.set_name(name).map_err(to_export_error)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(to_export_error)?;
    }

    worksheet.set_freeze_panes(1, 0).map_err(to_export_error)?;

    let mut col_widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();

    let band1 = Color::RGB(0xEAF3FB);
    let band2 = Color::RGB(0xFFFFFF);

    for (row_index, values) in rows.enumerate() {
        let row = (row_index + 1) as u32;
        let band_color = if row_index % 2 == 0 { band1 } else { band2 };

        for (col, value) in values.iter().enumerate() {
            write_cell(worksheet, row, col as u16, value, band_color)?;

            if let Some(w) = col_widths.get_mut(col) {
                *w = (*w).max(value.width());
            }
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(to_export_error)?;
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    bg: Color,
) -> AppResult<()> {
    let fmt = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    match value {
        CellValue::Date(date) => {
            let fmt = fmt.set_num_format(DATE_FORMAT);
            match date_to_excel_serial(*date) {
                Some(serial) => worksheet.write_with_format(row, col, serial, &fmt),
                None => worksheet.write_with_format(row, col, date.to_string(), &fmt),
            }
        }
        CellValue::Number(n) => {
            let fmt = fmt.set_align(FormatAlign::Right);
            worksheet.write_with_format(row, col, *n, &fmt)
        }
        CellValue::Text(s) => worksheet.write_with_format(row, col, s.as_str(), &fmt),
    }
    .map_err(to_export_error)?;

    Ok(())
}

fn to_export_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}
