//! Schedule generation service.
//!
//! Wraps the [`WeeklyScheduler`] with the rules that hold across calls:
//! at most one generation per plan id at a time, and every returned schedule
//! has passed the [`ScheduleValidator`].

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::plan::StudyPlan;
use crate::schedule::WeeklySchedule;
use crate::scheduler::{PlannerConfig, TopicSource, Truncation, WeeklyScheduler};
use crate::validator::{ScheduleValidator, Warning};

/// A validated week plus everything the caller should surface with it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub schedule: WeeklySchedule,
    /// At least one subject-day was shortened or dropped.
    pub partial: bool,
    pub truncations: Vec<Truncation>,
    pub warnings: Vec<Warning>,
    /// Topic requests answered with fallback text.
    pub topic_fallbacks: usize,
}

/// Generates schedules, one at a time per plan id.
pub struct PlanGenerator {
    scheduler: WeeklyScheduler,
    topics: Box<dyn TopicSource>,
    in_flight: Mutex<HashSet<String>>,
}

impl PlanGenerator {
    pub fn new(config: PlannerConfig, topics: Box<dyn TopicSource>) -> Self {
        Self {
            scheduler: WeeklyScheduler::with_config(config),
            topics,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        self.scheduler.config()
    }

    /// Generate a week for `plan` without modifying it.
    ///
    /// # Errors
    /// - `GenerationInProgress` if the same plan id is already generating
    /// - `InvalidPlan` / `InvalidBudget` / `Config` for bad input
    /// - `ValidatorViolation` if the result breaks a structural invariant
    pub fn generate(
        &self,
        plan: &StudyPlan,
        today: NaiveDate,
        week_index: u32,
    ) -> Result<GenerationOutcome> {
        let _guard = self.claim(&plan.id)?;

        let week = self
            .scheduler
            .generate(plan, today, week_index, self.topics.as_ref())?;

        let report = ScheduleValidator::for_plan(plan, self.scheduler.config()).validate(&week.schedule);
        if !report.is_valid() {
            for violation in &report.violations {
                tracing::error!(plan_id = %plan.id, %violation, "schedule violates invariant");
            }
            return Err(CoreError::ValidatorViolation(report.violations));
        }
        for warning in &report.warnings {
            tracing::warn!(plan_id = %plan.id, %warning, "schedule warning");
        }

        Ok(GenerationOutcome {
            partial: !week.truncations.is_empty(),
            schedule: week.schedule,
            truncations: week.truncations,
            warnings: report.warnings,
            topic_fallbacks: week.topic_fallbacks,
        })
    }

    /// Generate and write the schedule into `plan` in one step.
    ///
    /// `plan` is left untouched when generation fails.
    pub fn generate_into(
        &self,
        plan: &mut StudyPlan,
        today: NaiveDate,
        week_index: u32,
        at: DateTime<Utc>,
    ) -> Result<GenerationOutcome> {
        let outcome = self.generate(plan, today, week_index)?;
        plan.apply_schedule(outcome.schedule.clone(), at);
        Ok(outcome)
    }

    /// Plan ids currently generating.
    pub fn in_flight(&self) -> Vec<String> {
        let set = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = set.iter().cloned().collect();
        ids.sort();
        ids
    }

    fn claim(&self, plan_id: &str) -> Result<InFlightGuard<'_>> {
        let mut set = self
            .in_flight
            .lock()
            .map_err(|e| CoreError::Custom(format!("Lock failed: {}", e)))?;
        if !set.insert(plan_id.to_string()) {
            tracing::warn!(plan_id, "rejected concurrent generation");
            return Err(CoreError::GenerationInProgress {
                plan_id: plan_id.to_string(),
            });
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            plan_id: plan_id.to_string(),
        })
    }
}

/// Releases a plan id when generation ends, including on early return.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    plan_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.plan_id);
    }
}
