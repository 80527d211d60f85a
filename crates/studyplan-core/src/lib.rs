//! # Studyplan Core Library
//!
//! This library provides the core logic for Studyplan, a weekly study
//! schedule planner. Scheduling is deterministic: the same plan and
//! configuration always produce the same week, and only topic text comes
//! from a pluggable source.
//!
//! ## Architecture
//!
//! - **Time Grid**: per-day interval bookkeeping with greedy left-packing
//! - **Subject Weighting**: proficiency to time share (`6 - proficiency`)
//! - **Session Allocator**: fills one day with study, break, revision and
//!   buffer sessions
//! - **Weekly Scheduler**: runs the allocator Monday..Sunday and threads the
//!   revision rotation between days
//! - **Schedule Validator**: structural checks before a week is returned
//! - **Storage**: SQLite plan store and TOML configuration
//!
//! ## Key Components
//!
//! - [`PlanGenerator`]: validated generation, one in-flight run per plan id
//! - [`WeeklyScheduler`]: the allocation algorithm
//! - [`PlanStore`]: plan and study-log persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod generation;
pub mod plan;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod streak;
pub mod timeline;
pub mod validator;
pub mod weighting;

pub use error::{ConfigError, CoreError, PlanError, StorageError, ValidationError};
pub use generation::{GenerationOutcome, PlanGenerator};
pub use plan::{StudyPlan, Subject};
pub use schedule::{DaySchedule, Session, SessionKind, TimeOfDay, WeeklySchedule, WeeklySummary};
pub use scheduler::{
    PlannerConfig, TopicSource, TopicSourceKind, Truncation, WeekAllocation, WeeklyScheduler,
};
pub use storage::{Config, PlanStore};
pub use streak::StreakSummary;
pub use validator::{ScheduleValidator, ValidationReport, Violation, Warning};
