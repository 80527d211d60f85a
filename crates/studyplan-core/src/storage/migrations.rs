//! Database schema migrations for studyplan.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: study plans.
///
/// Subjects and the weekly schedule are JSON columns: the schedule is always
/// written wholesale, never patched.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS plans (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            class_level TEXT NOT NULL,
            stream      TEXT,
            subjects    TEXT NOT NULL,
            exam_date   TEXT NOT NULL,
            daily_hours REAL NOT NULL,
            schedule    TEXT,
            is_active   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_plans_is_active ON plans(is_active);",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: logged study sessions, used for streaks.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS study_sessions (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            plan_id    TEXT NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
            subject    TEXT NOT NULL,
            minutes    INTEGER NOT NULL,
            studied_on TEXT NOT NULL,
            logged_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_study_sessions_plan ON study_sessions(plan_id);
        CREATE INDEX IF NOT EXISTS idx_study_sessions_studied_on ON study_sessions(studied_on);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}
