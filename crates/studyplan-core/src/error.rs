//! Core error types for studyplan-core.
//!
//! Input problems (`InvalidBudget`, `InvalidPlan`) are user-facing and are
//! reported before any allocation starts. `ValidatorViolation` means the
//! allocator produced a broken schedule and is treated as a defect.

use std::path::PathBuf;
use thiserror::Error;

use crate::validator::Violation;

/// Core error type for studyplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Daily study budget below the one hour minimum
    #[error("Invalid budget: {daily_hours} daily hours is below the 1 hour minimum")]
    InvalidBudget { daily_hours: f64 },

    /// Plan failed input validation
    #[error("Invalid plan: {0}")]
    InvalidPlan(#[from] PlanError),

    /// Generated schedule broke a structural invariant
    #[error("Schedule failed validation with {} violation(s): {}", .0.len(), join_violations(.0))]
    ValidatorViolation(Vec<Violation>),

    /// Another generation for the same plan has not finished yet
    #[error("Schedule generation already in progress for plan {plan_id}")]
    GenerationInProgress { plan_id: String },

    /// Malformed values such as times of day
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reasons a study plan is rejected before generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("plan has no subjects")]
    NoSubjects,

    #[error("subject at position {index} has an empty name")]
    EmptySubjectName { index: usize },

    #[error("subject '{0}' appears more than once")]
    DuplicateSubject(String),

    #[error("proficiency for '{subject}' must be between 1 and 5, got {value}")]
    ProficiencyOutOfRange { subject: String, value: u8 },

    #[error("daily hours must be between 1 and 12, got {0}")]
    DailyHoursOutOfRange(f64),

    #[error("exam date {exam_date} must be after {today}")]
    ExamNotInFuture {
        exam_date: chrono::NaiveDate,
        today: chrono::NaiveDate,
    },

    #[error("unknown class level '{0}'")]
    UnknownClassLevel(String),

    #[error("class level '{0}' requires a stream")]
    StreamRequired(String),

    #[error("unknown stream '{0}'")]
    UnknownStream(String),
}

/// Validation errors for individual values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Not an `HH:MM` time between 00:00 and 24:00
    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to locate the data directory
    #[error("Cannot prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// No plan with this id
    #[error("Study plan not found: {0}")]
    PlanNotFound(String),

    /// The plan changed since it was read
    #[error("Study plan {plan_id} was modified by another writer")]
    Conflict { plan_id: String },

    /// A JSON column could not be decoded
    #[error("Corrupt {column} for plan {plan_id}: {message}")]
    CorruptColumn {
        plan_id: String,
        column: &'static str,
        message: String,
    },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
