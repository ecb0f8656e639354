use crate::errors::AppResult;
use crate::export::fs_utils::write_atomically;
use crate::export::notify_export_success;
use crate::models::{AttendanceRecord, SessionSummary};
use csv::{Terminator, WriterBuilder};
use std::io::{self, Write};
use std::path::Path;

pub const DETAIL_HEADERS: [&str; 5] = [
    "name",
    "session_name",
    "session_date",
    "day_of_week",
    "attended",
];

pub const SUMMARY_HEADERS: [&str; 4] = [
    "session_name",
    "session_date",
    "attended_count",
    "total_count",
];

fn writer(out: &mut dyn Write, delimiter: u8) -> csv::Writer<&mut dyn Write> {
    WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out)
}

/// Write the long-format detail table. Records must already be in output order.
pub fn write_detail_csv(path: &Path, records: &[AttendanceRecord], delimiter: u8) -> AppResult<()> {
    write_atomically(path, |out| {
        let mut wtr = writer(out, delimiter);
        wtr.write_record(DETAIL_HEADERS)?;

        for r in records {
            wtr.write_record([
                r.name.as_str(),
                r.session_name.as_str(),
                r.date_str().as_str(),
                r.day_str(),
                r.attended_str(),
            ])?;
        }

        wtr.flush()?;
        Ok::<(), io::Error>(())
    })?;

    notify_export_success("Attendance detail", path);
    Ok(())
}

/// Write the per-session summary table.
pub fn write_summary_csv(path: &Path, summaries: &[SessionSummary], delimiter: u8) -> AppResult<()> {
    write_atomically(path, |out| {
        let mut wtr = writer(out, delimiter);
        wtr.write_record(SUMMARY_HEADERS)?;

        for s in summaries {
            wtr.write_record([
                s.session_name.clone(),
                s.session_date.format("%Y-%m-%d").to_string(),
                s.attended_count.to_string(),
                s.total_count.to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok::<(), io::Error>(())
    })?;

    notify_export_success("Session summary", path);
    Ok(())
}
