use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_name: String,
    pub session_date: NaiveDate,
    pub attended_count: usize,
    pub total_count: usize,
}
