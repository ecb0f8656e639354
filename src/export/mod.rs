// src/export/mod.rs

mod csv_writer;
mod fs_utils;
mod xlsx;

pub use csv_writer::{DETAIL_HEADERS, SUMMARY_HEADERS, write_detail_csv, write_summary_csv};
pub use xlsx::write_report_xlsx;

use crate::ui::messages::success;
use std::path::Path;

/// Shared completion message for written outputs.
pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} written: {}", path.display()));
}
