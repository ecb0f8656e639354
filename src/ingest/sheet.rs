//! In-memory worksheet grid, decoupled from the spreadsheet library.

use crate::errors::FileError;
use crate::utils::excel_date::excel_serial_to_datetime;
use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Cell rendered as text, the way it would show in the sheet.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .or_else(|| excel_serial_to_datetime(dt.as_f64()))
                .map(Cell::DateTime)
                .unwrap_or(Cell::Number(dt.as_f64())),
            Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .map(Cell::DateTime)
                .unwrap_or_else(|_| Cell::Text(s.clone())),
            Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// Rectangular view of the first worksheet of an export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at (row, col); out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

/// Read the first worksheet of a workbook (xlsx, xls, ods).
pub fn read_sheet(path: &Path) -> Result<Sheet, FileError> {
    let read_err = |reason: String| FileError::Read {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(read_err("file not found".to_string()));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| read_err(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| read_err("workbook has no worksheet".to_string()))?
        .map_err(|e| read_err(e.to_string()))?;

    // The range starts at the first used cell; keep absolute positions.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    rows.extend(range.rows().map(|row| {
        std::iter::repeat_n(Cell::Empty, col_offset)
            .chain(row.iter().map(Cell::from))
            .collect()
    }));

    Ok(Sheet::new(rows))
}
