//! Table rendering utilities for CLI outputs.

use unicode_width::UnicodeWidthStr;

const MAX_COLUMN_WIDTH: usize = 60;

pub struct Column {
    pub header: String,
    pub width: usize,
}

impl Column {
    pub fn new(header: impl Into<String>) -> Self {
        let header = header.into();
        Self {
            width: UnicodeWidthStr::width(header.as_str()),
            header,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; column widths grow to fit, up to a fixed maximum.
    pub fn add_row(&mut self, row: Vec<String>) {
        for (col, cell) in self.columns.iter_mut().zip(&row) {
            col.width = col
                .width
                .max(UnicodeWidthStr::width(cell.as_str()).min(MAX_COLUMN_WIDTH));
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        let header: Vec<&str> = self.columns.iter().map(|c| c.header.as_str()).collect();
        self.push_line(&mut out, &header);

        let rule: Vec<String> = self.columns.iter().map(|c| "-".repeat(c.width)).collect();
        self.push_line(&mut out, &rule.iter().map(String::as_str).collect::<Vec<_>>());

        for row in &self.rows {
            self.push_line(&mut out, &row.iter().map(String::as_str).collect::<Vec<_>>());
        }

        out
    }

    fn push_line(&self, out: &mut String, cells: &[&str]) {
        let line: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| pad(&truncate(cells.get(i).copied().unwrap_or(""), col.width), col.width))
            .collect();
        out.push_str(line.join(" ").trim_end());
        out.push('\n');
    }
}

/// Cut `s` to `width` display columns, marking the cut with `...`.
fn truncate(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 3 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    out
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(UnicodeWidthStr::width(s));
    format!("{s}{}", " ".repeat(fill))
}
