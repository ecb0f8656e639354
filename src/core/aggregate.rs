use crate::models::{AttendanceRecord, SessionSummary};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Per-session counts, sorted by (session_date, session_name).
pub fn summarize(records: &[AttendanceRecord]) -> Vec<SessionSummary> {
    let mut counts: BTreeMap<(NaiveDate, &str), (usize, usize)> = BTreeMap::new();

    for r in records {
        let entry = counts
            .entry((r.session_date, r.session_name.as_str()))
            .or_default();
        if r.attended {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    counts
        .into_iter()
        .map(|((session_date, session_name), (attended_count, total_count))| SessionSummary {
            session_name: session_name.to_string(),
            session_date,
            attended_count,
            total_count,
        })
        .collect()
}
