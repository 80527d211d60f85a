//! Weekly study scheduler.
//!
//! Drives the [`SessionAllocator`] across Monday..Sunday:
//! - Validates the plan and the day window before any allocation
//! - Orders each day weakest subject first, pulling subjects not yet studied
//!   this week to the front so every subject is reached when days allow
//! - Threads the revision round-robin pointer from one day to the next
//! - Leaves weekend days empty when weekend study is off
//! - Adds focus areas and study tips for display

pub mod allocator;
pub mod topics;

pub use allocator::{DayAllocation, DaySubject, RevisionRotation, SessionAllocator, Truncation};
pub use topics::{
    CurriculumTopics, FallbackTopics, TopicError, TopicRequest, TopicSource, TopicSourceKind,
    FALLBACK_TOPIC,
};

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError, Result};
use crate::plan::{StudyPlan, Subject};
use crate::schedule::{is_weekend, DaySchedule, TimeOfDay, WeeklySchedule, MINUTES_PER_DAY, WEEK};
use crate::weighting;

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// First minute of every study day.
    pub day_start: TimeOfDay,
    /// Study on Saturday and Sunday.
    pub weekend_study: bool,
    /// Shortest study block, a multiple of 5. Smaller weighted shares are
    /// held at this length when the day has room for every subject.
    pub min_block_minutes: u32,
    /// Longest contiguous study block.
    pub max_block_minutes: u32,
    /// Length of a break between focus blocks.
    pub break_minutes: u32,
    /// Focus length the break reservation is sized for.
    pub pomodoro_minutes: u32,
    /// Upper bound on reserved break time as a fraction of the day.
    pub max_break_fraction: f64,
    /// Shortest revision block worth scheduling.
    pub min_revision_minutes: u32,
    /// Shortest study block kept when a block is cut at day end.
    pub min_truncated_minutes: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            day_start: TimeOfDay::from_hm(8, 0).unwrap_or(TimeOfDay::MIDNIGHT),
            weekend_study: true,
            min_block_minutes: 25,
            max_block_minutes: 50,
            break_minutes: 5,
            pomodoro_minutes: 25,
            max_break_fraction: 0.20,
            min_revision_minutes: 15,
            min_truncated_minutes: 10,
        }
    }
}

impl PlannerConfig {
    /// # Errors
    /// `ConfigError::InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: format!("planner.{key}"),
            message,
        };

        if self.min_block_minutes < 5 || self.min_block_minutes % 5 != 0 {
            return Err(invalid(
                "min_block_minutes",
                "must be a positive multiple of 5".into(),
            ));
        }
        if self.max_block_minutes < self.min_block_minutes || self.max_block_minutes > 90 {
            return Err(invalid(
                "max_block_minutes",
                format!("must be between {} and 90", self.min_block_minutes),
            ));
        }
        if self.pomodoro_minutes == 0 {
            return Err(invalid("pomodoro_minutes", "must be positive".into()));
        }
        if !(self.max_break_fraction > 0.0 && self.max_break_fraction <= 0.5) {
            return Err(invalid(
                "max_break_fraction",
                "must be in (0, 0.5]".into(),
            ));
        }
        if self.min_revision_minutes < 5 {
            return Err(invalid("min_revision_minutes", "must be at least 5".into()));
        }
        if self.min_truncated_minutes == 0 {
            return Err(invalid("min_truncated_minutes", "must be positive".into()));
        }
        Ok(())
    }

    /// Weekdays that can hold study sessions.
    pub fn study_days(&self) -> usize {
        if self.weekend_study {
            7
        } else {
            5
        }
    }
}

/// Schedule plus allocation side notes, before validation.
#[derive(Debug, Clone)]
pub struct WeekAllocation {
    pub schedule: WeeklySchedule,
    pub truncations: Vec<Truncation>,
    pub topic_fallbacks: usize,
}

/// Builds a week of sessions for a study plan.
pub struct WeeklyScheduler {
    config: PlannerConfig,
}

impl WeeklyScheduler {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self {
            config: PlannerConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Generate the week for `plan` as of `today`.
    ///
    /// # Arguments
    /// * `plan` - Plan snapshot; not modified
    /// * `today` - Current date, used only for exam-date checks and tips
    /// * `week_index` - Which week of preparation this is, passed to `topics`
    /// * `topics` - Topic text source
    ///
    /// # Errors
    /// `InvalidPlan`/`InvalidBudget` for bad input, `Config` when the day
    /// window does not fit before midnight.
    pub fn generate(
        &self,
        plan: &StudyPlan,
        today: NaiveDate,
        week_index: u32,
        topics: &dyn TopicSource,
    ) -> Result<WeekAllocation> {
        plan.validate(today)?;
        self.config.validate()?;

        let budget = plan.daily_budget_minutes();
        let day_end = self.config.day_start.minutes() + budget;
        if day_end > MINUTES_PER_DAY as u32 {
            return Err(CoreError::Config(ConfigError::InvalidValue {
                key: "planner.day_start".into(),
                message: format!(
                    "a {budget} minute day starting at {} runs past midnight",
                    self.config.day_start
                ),
            }));
        }

        let order = weighting::priority_order(&plan.subjects);
        let mut rotation =
            RevisionRotation::new(order.iter().map(|&i| plan.subjects[i].clone()).collect());
        let allocator = SessionAllocator::new(&self.config, topics, week_index);

        let mut covered: HashSet<String> = HashSet::new();
        let mut days = Vec::with_capacity(WEEK.len());
        let mut truncations = Vec::new();
        let mut topic_fallbacks = 0;

        for (day_index, &day) in WEEK.iter().enumerate() {
            if is_weekend(day) && !self.config.weekend_study {
                days.push(DaySchedule::rest(day));
                continue;
            }

            let day_subjects = day_order(&plan.subjects, &order, &covered);
            let allocation =
                allocator.allocate_day(day, day_index as u32, budget, &day_subjects, &mut rotation);

            covered.extend(allocation.studied.iter().cloned());
            rotation.mark_studied(&allocation.studied);
            truncations.extend(allocation.truncations);
            topic_fallbacks += allocation.topic_fallbacks;
            days.push(allocation.schedule);
        }

        let schedule = WeeklySchedule {
            days,
            tips: self.tips(plan, today, &order),
            focus_areas: focus_areas(&plan.subjects, &order),
        };

        tracing::info!(
            plan_id = %plan.id,
            subjects = plan.subjects.len(),
            budget_minutes = budget,
            truncations = truncations.len(),
            "generated weekly schedule"
        );

        Ok(WeekAllocation {
            schedule,
            truncations,
            topic_fallbacks,
        })
    }

    fn tips(&self, plan: &StudyPlan, today: NaiveDate, order: &[usize]) -> Vec<String> {
        let mut tips = vec![
            "Spaced repetition: revisit each topic a day or two after you first study it."
                .to_string(),
            "Interleaving: switch subjects between blocks instead of cramming one for hours."
                .to_string(),
            "Active recall: close the book and write down what you remember before checking."
                .to_string(),
        ];
        if let Some(&weakest) = order.first() {
            tips.push(format!(
                "Start each day with {} while your focus is freshest.",
                plan.subjects[weakest].name
            ));
        }
        tips.push(format!(
            "Step away from your desk during the {}-minute breaks.",
            self.config.break_minutes
        ));
        let days_left = plan.days_until_exam(today);
        if days_left <= 7 {
            tips.push(format!(
                "Your exam is {days_left} day(s) away: favour past papers and light revision over new material."
            ));
        }
        tips
    }
}

impl Default for WeeklyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Day placement order: subjects not yet studied this week first, then the
/// rest, each group weakest first.
fn day_order<'a>(
    subjects: &'a [Subject],
    order: &[usize],
    covered: &HashSet<String>,
) -> Vec<DaySubject<'a>> {
    let (fresh, seen): (Vec<usize>, Vec<usize>) = order
        .iter()
        .partition(|&&i| !covered.contains(&subjects[i].name));

    fresh
        .into_iter()
        .chain(seen)
        .map(|plan_index| DaySubject {
            subject: &subjects[plan_index],
            plan_index,
        })
        .collect()
}

/// Up to two weakest subjects rated 3 or below, or the single weakest one.
fn focus_areas(subjects: &[Subject], order: &[usize]) -> Vec<String> {
    let weak: Vec<String> = order
        .iter()
        .map(|&i| &subjects[i])
        .filter(|s| s.proficiency <= 3)
        .take(2)
        .map(|s| s.name.clone())
        .collect();
    if !weak.is_empty() {
        return weak;
    }
    order
        .first()
        .map(|&i| vec![subjects[i].name.clone()])
        .unwrap_or_default()
}
