//! Incremental processing state.
//!
//! Keeps which exports have been processed and the raw records read from
//! each of them, so that a later run can rebuild the merged table without
//! re-reading old workbooks. A file is recorded only after it parsed
//! successfully; failed files are retried on the next run.

use crate::db::initialize::init_db;
use crate::db::log::{OP_FILE, OP_RESET, write_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::{RawAttendance, SourceFile, SourceOrder};
use chrono::{Local, NaiveDate};
use rusqlite::{Row, params};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One row of `processed_files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    pub file_name: String,
    pub rank: i64,
    pub record_count: usize,
    pub processed_at: String,
}

/// Raw records of one processed file, in their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBatch {
    pub source: SourceOrder,
    pub records: Vec<RawAttendance>,
}

pub struct StateTracker {
    pool: DbPool,
}

impl StateTracker {
    /// Open (or create) the state database at `path`.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    /// Identifiers of every processed file. Empty for a fresh state.
    pub fn load(&self) -> AppResult<BTreeSet<String>> {
        let mut stmt = self.pool.conn.prepare("SELECT file_name FROM processed_files")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(names.collect::<Result<BTreeSet<_>, _>>()?)
    }

    /// Record `source` as processed together with its records.
    ///
    /// Runs in a single transaction: either the file and all its records are
    /// stored, or nothing is. Recording the same file again replaces it.
    pub fn record(&mut self, source: &SourceFile, records: &[RawAttendance]) -> AppResult<()> {
        let now = Local::now().to_rfc3339();
        let name = source.file_name();

        self.pool.with_conn(|conn| {
            let tx = conn.transaction()?;

            tx.execute("DELETE FROM attendance_raw WHERE file_name = ?1", [name])?;
            tx.execute(
                "INSERT OR REPLACE INTO processed_files (file_name, source_rank, record_count, processed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, source.order.rank, records.len() as i64, now],
            )?;

            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO attendance_raw (file_name, position, member, raw_label, session_date, attended)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;

                for (position, r) in records.iter().enumerate() {
                    stmt.execute(params![
                        name,
                        position as i64,
                        r.member,
                        r.raw_label,
                        r.session_date.format("%Y-%m-%d").to_string(),
                        r.attended,
                    ])?;
                }
            }

            tx.commit()
        })?;

        write_log(
            &self.pool.conn,
            OP_FILE,
            name,
            &format!("{} records", records.len()),
        )?;

        debug!(file = name, records = records.len(), "recorded processed file");
        Ok(())
    }

    /// Forget every processed file. The run log is kept.
    pub fn reset(&mut self) -> AppResult<()> {
        self.pool.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM attendance_raw", [])?;
            tx.execute("DELETE FROM processed_files", [])?;
            tx.commit()
        })?;

        write_log(&self.pool.conn, OP_RESET, "", "Processing state cleared")?;
        Ok(())
    }

    /// Every processed file, in precedence order.
    pub fn processed_files(&self) -> AppResult<Vec<ProcessedFile>> {
        let mut stmt = self.pool.conn.prepare(
            "SELECT file_name, source_rank, record_count, processed_at
             FROM processed_files
             ORDER BY source_rank, file_name",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ProcessedFile {
                file_name: row.get(0)?,
                rank: row.get(1)?,
                record_count: row.get::<_, i64>(2)? as usize,
                processed_at: row.get(3)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Raw records of every processed file, grouped per file and sorted by
    /// precedence (oldest first).
    pub fn load_batches(&self) -> AppResult<Vec<StoredBatch>> {
        let mut stmt = self.pool.conn.prepare(
            "SELECT p.file_name, p.source_rank, a.member, a.raw_label, a.session_date, a.attended
             FROM processed_files p
             LEFT JOIN attendance_raw a ON a.file_name = p.file_name
             ORDER BY p.source_rank, p.file_name, a.position",
        )?;

        let mut batches: Vec<StoredBatch> = Vec::new();
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            let source = SourceOrder {
                rank: row.get(1)?,
                file_name: row.get(0)?,
            };

            if batches.last().is_none_or(|b| b.source != source) {
                batches.push(StoredBatch {
                    source,
                    records: Vec::new(),
                });
            }

            if let Some(record) = map_raw(row)?
                && let Some(batch) = batches.last_mut()
            {
                batch.records.push(record);
            }
        }

        Ok(batches)
    }

    pub fn conn(&self) -> &rusqlite::Connection {
        &self.pool.conn
    }
}

/// Raw record columns of a joined row; `None` for files without records.
fn map_raw(row: &Row) -> rusqlite::Result<Option<RawAttendance>> {
    let Some(member) = row.get::<_, Option<String>>(2)? else {
        return Ok(None);
    };

    let date_str: String = row.get(4)?;
    let session_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Some(RawAttendance {
        member,
        raw_label: row.get(3)?,
        session_date,
        attended: row.get(5)?,
    }))
}
