pub mod record;
pub mod session;
pub mod source;
pub mod summary;

pub use record::{AttendanceRecord, RawAttendance, RecordKey};
pub use session::SessionDefinition;
pub use source::{SourceFile, SourceOrder};
pub use summary::SessionSummary;
