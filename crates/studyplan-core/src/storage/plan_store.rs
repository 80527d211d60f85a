//! SQLite persistence for study plans and logged study time.
//!
//! Provides persistent storage for:
//! - Study plans, with at most one active plan
//! - Generated schedules, written wholesale in a single update
//! - Logged study sessions, the input for streaks

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::error::{Result, StorageError};
use crate::plan::{StudyPlan, Subject};
use crate::schedule::WeeklySchedule;

const DATE_FORMAT: &str = "%Y-%m-%d";

const PLAN_COLUMNS: &str = "id, title, class_level, stream, subjects, exam_date, daily_hours,
     schedule, is_active, created_at, updated_at";

/// A block of study time the student actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySessionRecord {
    pub id: i64,
    pub plan_id: String,
    pub subject: String,
    pub minutes: u32,
    pub studied_on: NaiveDate,
    pub logged_at: DateTime<Utc>,
}

/// Columns as stored, before JSON and date decoding.
struct PlanRow {
    id: String,
    title: String,
    class_level: String,
    stream: Option<String>,
    subjects: String,
    exam_date: String,
    daily_hours: f64,
    schedule: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl PlanRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            class_level: row.get(2)?,
            stream: row.get(3)?,
            subjects: row.get(4)?,
            exam_date: row.get(5)?,
            daily_hours: row.get(6)?,
            schedule: row.get(7)?,
            is_active: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_plan(self) -> Result<StudyPlan, StorageError> {
        let id = self.id;
        let corrupt = |column: &'static str, message: String| StorageError::CorruptColumn {
            plan_id: id.clone(),
            column,
            message,
        };

        let subjects: Vec<Subject> =
            serde_json::from_str(&self.subjects).map_err(|e| corrupt("subjects", e.to_string()))?;
        let schedule: Option<WeeklySchedule> = self
            .schedule
            .as_deref()
            .map(serde_json::from_str::<WeeklySchedule>)
            .transpose()
            .map_err(|e| corrupt("schedule", e.to_string()))?;
        let exam_date = NaiveDate::parse_from_str(&self.exam_date, DATE_FORMAT)
            .map_err(|e| corrupt("exam_date", e.to_string()))?;
        let created_at = parse_timestamp(&self.created_at).map_err(|e| corrupt("created_at", e))?;
        let updated_at = parse_timestamp(&self.updated_at).map_err(|e| corrupt("updated_at", e))?;

        Ok(StudyPlan {
            id,
            title: self.title,
            class_level: self.class_level,
            stream: self.stream,
            subjects,
            exam_date,
            daily_hours: self.daily_hours,
            schedule,
            is_active: self.is_active,
            created_at,
            updated_at,
        })
    }
}

fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::QueryFailed(e.to_string()))
}

/// SQLite store for study plans.
pub struct PlanStore {
    conn: Connection,
}

impl PlanStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/studyplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studyplan.db");
        Ok(Self::open_in(&path)?)
    }

    /// Open (or create) the database file at `path`.
    pub fn open_in(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a new plan. An active plan deactivates every other plan.
    ///
    /// # Errors
    /// Returns an error if the insert fails, including on a duplicate id.
    pub fn insert(&self, plan: &StudyPlan) -> Result<(), StorageError> {
        let subjects = to_json(&plan.subjects)?;
        let schedule = plan.schedule.as_ref().map(to_json).transpose()?;

        let tx = self.conn.unchecked_transaction()?;
        if plan.is_active {
            tx.execute("UPDATE plans SET is_active = 0 WHERE is_active = 1", [])?;
        }
        tx.execute(
            "INSERT INTO plans (id, title, class_level, stream, subjects, exam_date, daily_hours,
                                schedule, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                plan.id,
                plan.title,
                plan.class_level,
                plan.stream,
                subjects,
                plan.exam_date.format(DATE_FORMAT).to_string(),
                plan.daily_hours,
                schedule,
                plan.is_active,
                plan.created_at.to_rfc3339(),
                plan.updated_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        tracing::debug!(plan_id = %plan.id, "inserted plan");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<StudyPlan, StorageError> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], PlanRow::from_row)
            .optional()?
            .ok_or_else(|| StorageError::PlanNotFound(id.to_string()))?
            .into_plan()
    }

    /// All plans, newest first.
    pub fn list(&self) -> Result<Vec<StudyPlan>, StorageError> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM plans ORDER BY created_at DESC, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], PlanRow::from_row)?;

        let mut plans = Vec::new();
        for row in rows {
            plans.push(row?.into_plan()?);
        }
        Ok(plans)
    }

    /// Delete a plan and its logged sessions.
    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM study_sessions WHERE plan_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM plans WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StorageError::PlanNotFound(id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    /// Make `id` the only active plan.
    pub fn set_active(&self, id: &str) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("UPDATE plans SET is_active = 0 WHERE is_active = 1", [])?;
        let updated = tx.execute("UPDATE plans SET is_active = 1 WHERE id = ?1", params![id])?;
        if updated == 0 {
            return Err(StorageError::PlanNotFound(id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    pub fn active_plan(&self) -> Result<Option<StudyPlan>, StorageError> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE is_active = 1 LIMIT 1");
        self.conn
            .query_row(&sql, [], PlanRow::from_row)
            .optional()?
            .map(PlanRow::into_plan)
            .transpose()
    }

    /// Replace a plan's schedule in one statement.
    pub fn save_schedule(
        &self,
        id: &str,
        schedule: &WeeklySchedule,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let json = to_json(schedule)?;
        let updated = self.conn.execute(
            "UPDATE plans SET schedule = ?1, updated_at = ?2 WHERE id = ?3",
            params![json, at.to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(StorageError::PlanNotFound(id.to_string()));
        }
        tracing::debug!(plan_id = id, "saved schedule");
        Ok(())
    }

    /// Replace a plan's schedule only if the plan is unchanged since it was
    /// read at `seen`. Concurrent writers of the same plan get `Conflict`
    /// instead of silently overwriting each other.
    pub fn save_schedule_if_unchanged(
        &self,
        id: &str,
        schedule: &WeeklySchedule,
        seen: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let json = to_json(schedule)?;
        let updated = self.conn.execute(
            "UPDATE plans SET schedule = ?1, updated_at = ?2 WHERE id = ?3 AND updated_at = ?4",
            params![json, at.to_rfc3339(), id, seen.to_rfc3339()],
        )?;
        if updated == 0 {
            self.get(id)?;
            return Err(StorageError::Conflict {
                plan_id: id.to_string(),
            });
        }
        tracing::debug!(plan_id = id, "saved schedule");
        Ok(())
    }

    /// Log completed study time. Returns the new row id.
    pub fn record_study_session(
        &self,
        plan_id: &str,
        subject: &str,
        minutes: u32,
        studied_on: NaiveDate,
        logged_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let exists: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM plans WHERE id = ?1", params![plan_id], |r| {
                r.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Err(StorageError::PlanNotFound(plan_id.to_string()));
        }

        self.conn.execute(
            "INSERT INTO study_sessions (plan_id, subject, minutes, studied_on, logged_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                plan_id,
                subject,
                minutes,
                studied_on.format(DATE_FORMAT).to_string(),
                logged_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Logged sessions for a plan, oldest first.
    pub fn study_sessions(&self, plan_id: &str) -> Result<Vec<StudySessionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, plan_id, subject, minutes, studied_on, logged_at
             FROM study_sessions
             WHERE plan_id = ?1
             ORDER BY studied_on, id",
        )?;
        let rows = stmt.query_map(params![plan_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, plan_id, subject, minutes, studied_on, logged_at) = row?;
            let corrupt = |column: &'static str, message: String| StorageError::CorruptColumn {
                plan_id: plan_id.clone(),
                column,
                message,
            };
            let studied_on = NaiveDate::parse_from_str(&studied_on, DATE_FORMAT)
                .map_err(|e| corrupt("studied_on", e.to_string()))?;
            let logged_at = parse_timestamp(&logged_at).map_err(|e| corrupt("logged_at", e))?;
            records.push(StudySessionRecord {
                id,
                plan_id,
                subject,
                minutes,
                studied_on,
                logged_at,
            });
        }
        Ok(records)
    }

    /// Distinct days with logged study, across all plans or one plan.
    pub fn activity_dates(&self, plan_id: Option<&str>) -> Result<Vec<NaiveDate>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT studied_on FROM study_sessions
             WHERE ?1 IS NULL OR plan_id = ?1
             ORDER BY studied_on",
        )?;
        let rows = stmt.query_map(params![plan_id], |row| row.get::<_, String>(0))?;

        let mut dates = Vec::new();
        for row in rows {
            let raw = row?;
            match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
                Ok(date) => dates.push(date),
                Err(e) => tracing::warn!(value = %raw, error = %e, "skipping bad studied_on"),
            }
        }
        Ok(dates)
    }
}
