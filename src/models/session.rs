use chrono::{NaiveDate, Weekday};

/// A session column of an export, optionally resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefinition {
    pub raw_label: String,
    pub canonical_name: String,
    pub category: Option<String>,
    pub date: NaiveDate,
    pub day_of_week: Weekday,
}

impl SessionDefinition {
    /// Definition straight from a header: canonical name not resolved yet.
    pub fn unresolved(raw_label: impl Into<String>, date: NaiveDate, day_of_week: Weekday) -> Self {
        let raw_label = raw_label.into();
        Self {
            canonical_name: raw_label.clone(),
            raw_label,
            category: None,
            date,
            day_of_week,
        }
    }
}
