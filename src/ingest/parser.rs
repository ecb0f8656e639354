//! Wide-to-long reshaping of one export.
//!
//! Layout of a Spond attendance export:
//!
//! ```text
//! row 0 │ Name  │ (filler) │ 2024-01-05 18:00 │ 2024-01-10 07:00 │ ...
//! row 1 │       │          │ Tri Swim*        │ Run Club         │ ...
//! row 2 │ Alice │          │ 1                │                  │ ...
//! row 3 │ Bob   │          │                  │ 1                │ ...
//! ```
//!
//! A column is a session column when its row-1 cell carries a label; its
//! header must then encode the session date.

use super::header::{clean_label, column_letter, parse_session_date};
use super::sheet::{Cell, Sheet, read_sheet};
use crate::errors::FileError;
use crate::models::{RawAttendance, SessionDefinition, SourceFile};
use chrono::Datelike;
use std::path::Path;
use tracing::debug;

const HEADER_ROW: usize = 0;
const LABEL_ROW: usize = 1;
const FIRST_MEMBER_ROW: usize = 2;
const DISCLAIMER_PREFIX: &str = "*Attendance";

/// Result of reading one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    /// One definition per session column, in column order.
    pub sessions: Vec<SessionDefinition>,
    /// Every member × session cell, column-major.
    pub records: Vec<RawAttendance>,
}

impl ParsedFile {
    pub fn member_count(&self) -> usize {
        if self.sessions.is_empty() {
            0
        } else {
            self.records.len() / self.sessions.len()
        }
    }
}

/// Read and reshape one export from disk.
pub fn parse_file(source: &SourceFile) -> Result<ParsedFile, FileError> {
    let sheet = read_sheet(&source.path)?;
    let parsed = parse_sheet(&sheet, &source.path)?;

    debug!(
        file = source.file_name(),
        sessions = parsed.sessions.len(),
        records = parsed.records.len(),
        "parsed export"
    );

    Ok(parsed)
}

/// Reshape an already loaded worksheet. `path` is only used in errors.
pub fn parse_sheet(sheet: &Sheet, path: &Path) -> Result<ParsedFile, FileError> {
    let name_col = find_name_column(sheet);

    let mut columns = Vec::new();
    for col in 0..sheet.width() {
        if col == name_col {
            continue;
        }

        let label = clean_label(sheet.cell(LABEL_ROW, col));
        if label.is_empty() {
            continue;
        }

        let header = sheet.cell(HEADER_ROW, col);
        let date = parse_session_date(header).map_err(|reason| FileError::MalformedHeader {
            path: path.to_path_buf(),
            column: describe_column(col, header),
            reason,
        })?;

        columns.push((col, SessionDefinition::unresolved(label, date, date.weekday())));
    }

    if columns.is_empty() {
        return Err(FileError::NoSessionColumns {
            path: path.to_path_buf(),
        });
    }

    let members: Vec<(usize, String)> = (FIRST_MEMBER_ROW..sheet.height())
        .filter_map(|row| {
            let name = sheet.cell(row, name_col).to_text().trim().to_string();
            if name.is_empty() || name.starts_with(DISCLAIMER_PREFIX) {
                None
            } else {
                Some((row, name))
            }
        })
        .collect();

    let mut records = Vec::with_capacity(columns.len() * members.len());
    for (col, session) in &columns {
        for (row, name) in &members {
            records.push(RawAttendance {
                member: name.clone(),
                raw_label: session.raw_label.clone(),
                session_date: session.date,
                attended: is_attended(sheet.cell(*row, *col)),
            });
        }
    }

    Ok(ParsedFile {
        sessions: columns.into_iter().map(|(_, s)| s).collect(),
        records,
    })
}

/// Column headed `Name` (any case), or the first column.
fn find_name_column(sheet: &Sheet) -> usize {
    (0..sheet.width())
        .find(|&col| {
            matches!(sheet.cell(HEADER_ROW, col), Cell::Text(s) if s.trim().eq_ignore_ascii_case("name"))
        })
        .unwrap_or(0)
}

fn describe_column(col: usize, header: &Cell) -> String {
    let text = header.to_text();
    if text.trim().is_empty() {
        column_letter(col)
    } else {
        format!("{} ('{}')", column_letter(col), text.trim())
    }
}

/// Attendance marker: a non-zero number, `true`, or a tick-like text.
pub fn is_attended(cell: &Cell) -> bool {
    match cell {
        Cell::Number(n) => n.is_finite() && *n != 0.0,
        Cell::Bool(b) => *b,
        Cell::Text(s) => {
            let t = s.trim().to_lowercase();
            match t.as_str() {
                "x" | "y" | "yes" | "true" | "✓" | "✔" => true,
                _ => t.parse::<f64>().is_ok_and(|n| n.is_finite() && n != 0.0),
            }
        }
        Cell::Empty | Cell::DateTime(_) => false,
    }
}
