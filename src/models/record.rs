use super::source::SourceOrder;
use crate::utils::date::weekday_name;
use chrono::{Datelike, NaiveDate, Weekday};

/// One cell of the wide matrix, as read from an export (before mapping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttendance {
    pub member: String,
    pub raw_label: String,
    pub session_date: NaiveDate,
    pub attended: bool,
}

/// Uniqueness key of a merged record: (member, canonical session, date).
pub type RecordKey = (String, String, NaiveDate);

/// Tidy attendance row, after mapping, carrying the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub name: String,
    pub session_name: String,
    pub session_date: NaiveDate,
    pub day_of_week: Weekday,
    pub attended: bool,
    pub source: SourceOrder,
}

impl AttendanceRecord {
    pub fn new(
        name: impl Into<String>,
        session_name: impl Into<String>,
        session_date: NaiveDate,
        attended: bool,
        source: SourceOrder,
    ) -> Self {
        Self {
            name: name.into(),
            session_name: session_name.into(),
            session_date,
            day_of_week: session_date.weekday(),
            attended,
            source,
        }
    }

    pub fn key(&self) -> RecordKey {
        (
            self.name.clone(),
            self.session_name.clone(),
            self.session_date,
        )
    }

    pub fn date_str(&self) -> String {
        self.session_date.format("%Y-%m-%d").to_string()
    }

    pub fn day_str(&self) -> &'static str {
        weekday_name(self.day_of_week)
    }

    /// Fixed encoding of the attended flag in every output.
    pub fn attended_str(&self) -> &'static str {
        if self.attended { "1" } else { "0" }
    }
}
