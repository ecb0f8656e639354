use crate::db::log::OP_MIGRATION;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Result, params};
use tracing::info;

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250106_0001_create_state_tables",
        description: "Created processed_files and attendance_raw tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS processed_files (
            file_name    TEXT PRIMARY KEY,
            source_rank  INTEGER NOT NULL,
            record_count INTEGER NOT NULL DEFAULT 0,
            processed_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS attendance_raw (
            file_name    TEXT NOT NULL REFERENCES processed_files(file_name) ON DELETE CASCADE,
            position     INTEGER NOT NULL,
            member       TEXT NOT NULL,
            raw_label    TEXT NOT NULL,
            session_date TEXT NOT NULL,
            attended     INTEGER NOT NULL CHECK(attended IN (0,1)),
            PRIMARY KEY (file_name, position)
        );
        "#,
    },
    Migration {
        version: "20250120_0002_add_attendance_indexes",
        description: "Added rank and label indexes",
        sql: r#"
        CREATE INDEX IF NOT EXISTS idx_processed_files_rank
            ON processed_files(source_rank, file_name);
        CREATE INDEX IF NOT EXISTS idx_attendance_raw_label
            ON attendance_raw(raw_label);
        "#,
    },
];

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = ?1 AND target = ?2
         LIMIT 1",
    )?;
    Ok(chk
        .query_row([OP_MIGRATION, version], |_| Ok(()))
        .optional()?
        .is_some())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            Local::now().to_rfc3339(),
            OP_MIGRATION,
            migration.version,
            migration.description
        ],
    )?;

    tx.commit()?;

    info!(version = migration.version, "{}", migration.description);
    Ok(())
}

/// Public entry point: run all pending migrations, oldest first.
///
/// Called by `db::initialize::init_db()`.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for migration in MIGRATIONS {
        if !migration_applied(conn, migration.version)? {
            apply(conn, migration)?;
        }
    }

    Ok(())
}
