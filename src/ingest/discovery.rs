//! Locate attendance exports in the input directory and order them by merge
//! precedence (oldest first).

use crate::config::{Config, Precedence};
use crate::errors::{AppError, AppResult};
use crate::models::SourceFile;
use crate::utils::date::month_from_abbrev;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Prefix Excel uses for lock files of open workbooks.
const LOCK_FILE_PREFIX: &str = "~$";

/// Find every export in `dir`, sorted oldest first.
///
/// Fails when an `.xlsx` file does not match the configured naming pattern,
/// so that a misnamed export is never silently ignored.
pub fn discover_files(dir: &Path, cfg: &Config) -> AppResult<Vec<SourceFile>> {
    if !dir.is_dir() {
        return Err(AppError::InputDir(dir.to_path_buf()));
    }

    let pattern = Regex::new(&cfg.file_pattern)
        .map_err(|e| AppError::Config(format!("invalid file_pattern: {e}")))?;

    let mut files = Vec::new();
    let mut unexpected = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_workbook(&path) {
            continue;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if name.starts_with(LOCK_FILE_PREFIX) {
            continue;
        }

        if !pattern.is_match(&name) {
            unexpected.push(name);
            continue;
        }

        let rank = match cfg.precedence {
            Precedence::Filename => match parse_file_period(&name, &pattern) {
                Some(period) => i64::from(period.num_days_from_ce()),
                None => {
                    unexpected.push(name);
                    continue;
                }
            },
            Precedence::Modified => modified_rank(&path)?,
        };

        files.push(SourceFile::new(path, rank));
    }

    if !unexpected.is_empty() {
        unexpected.sort();
        return Err(AppError::UnexpectedFiles(unexpected));
    }

    files.sort_by(|a, b| a.order.cmp(&b.order));

    debug!(count = files.len(), dir = %dir.display(), "discovered exports");
    Ok(files)
}

/// First day of the month embedded in an export file name.
///
/// The pattern must capture the month abbreviation and the two-digit year.
pub fn parse_file_period(name: &str, pattern: &Regex) -> Option<NaiveDate> {
    let caps = pattern.captures(name)?;
    let month = month_from_abbrev(caps.get(1)?.as_str())?;
    let year: i32 = caps.get(2)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, 1)
}

/// Files not yet present in the processed set, keeping precedence order.
pub fn find_new_files(all: &[SourceFile], processed: &BTreeSet<String>) -> Vec<SourceFile> {
    all.iter()
        .filter(|f| !processed.contains(f.file_name()))
        .cloned()
        .collect()
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false)
}

fn modified_rank(path: &Path) -> AppResult<i64> {
    let modified = fs::metadata(path)?.modified()?;
    let secs = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok(secs)
}
