//! Structural checks on a generated week.
//!
//! Violations are hard failures and mean the allocator is broken. Warnings
//! are soft properties (coverage on short weeks, utilization) reported to the
//! caller alongside an otherwise valid schedule.

use std::collections::HashSet;

use chrono::Weekday;
use serde::Serialize;
use thiserror::Error;

use crate::plan::StudyPlan;
use crate::schedule::{weekday_name, SessionKind, WeeklySchedule, WEEK};
use crate::scheduler::PlannerConfig;

/// Average focus time below this fraction of the budget is flagged.
pub const UTILIZATION_TARGET: f64 = 0.9;

/// A broken structural invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    #[error("expected 7 days, found {found}")]
    DayCount { found: usize },

    #[error("day {index} is {}, expected {}", day_name(.found), day_name(.expected))]
    WrongDay {
        index: usize,
        #[serde(serialize_with = "serialize_weekday")]
        expected: Weekday,
        #[serde(serialize_with = "serialize_weekday")]
        found: Weekday,
    },

    #[error("{}: session {index} starts before the previous one", day_name(.day))]
    Unsorted {
        #[serde(serialize_with = "serialize_weekday")]
        day: Weekday,
        index: usize,
    },

    #[error("{}: session {index} overlaps the previous one", day_name(.day))]
    Overlap {
        #[serde(serialize_with = "serialize_weekday")]
        day: Weekday,
        index: usize,
    },

    #[error("{}: session {index} has no duration", day_name(.day))]
    EmptySession {
        #[serde(serialize_with = "serialize_weekday")]
        day: Weekday,
        index: usize,
    },

    #[error("{}: {focus_minutes} focus minutes exceed the {budget_minutes} minute budget", day_name(.day))]
    OverBudget {
        #[serde(serialize_with = "serialize_weekday")]
        day: Weekday,
        focus_minutes: u32,
        budget_minutes: u32,
    },

    #[error("{}: session {index} has a subject that does not match its kind", day_name(.day))]
    SubjectMismatch {
        #[serde(serialize_with = "serialize_weekday")]
        day: Weekday,
        index: usize,
    },

    #[error("subject '{subject}' has no study session this week")]
    MissingSubject { subject: String },
}

/// A soft property the week does not meet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// Fewer study days than subjects, so some subjects may sit the week out.
    CoverageRelaxed {
        missing: Vec<String>,
        study_days: usize,
    },
    /// Average daily focus time is below the utilization target.
    LowUtilization {
        average_minutes: f64,
        budget_minutes: u32,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::CoverageRelaxed {
                missing,
                study_days,
            } => write!(
                f,
                "only {study_days} study day(s); not scheduled this week: {}",
                missing.join(", ")
            ),
            Warning::LowUtilization {
                average_minutes,
                budget_minutes,
            } => write!(
                f,
                "average focus time {average_minutes:.0} min is below {:.0}% of the {budget_minutes} min budget",
                UTILIZATION_TARGET * 100.0
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks schedules generated for one plan.
#[derive(Debug, Clone)]
pub struct ScheduleValidator {
    subjects: Vec<String>,
    budget_minutes: u32,
    study_days: usize,
}

impl ScheduleValidator {
    pub fn for_plan(plan: &StudyPlan, config: &PlannerConfig) -> Self {
        Self {
            subjects: plan.subjects.iter().map(|s| s.name.clone()).collect(),
            budget_minutes: plan.daily_budget_minutes(),
            study_days: config.study_days(),
        }
    }

    pub fn validate(&self, schedule: &WeeklySchedule) -> ValidationReport {
        let mut report = ValidationReport::default();
        let known: HashSet<&str> = self.subjects.iter().map(String::as_str).collect();

        if schedule.days.len() != WEEK.len() {
            report.violations.push(Violation::DayCount {
                found: schedule.days.len(),
            });
        }
        for (index, (day, expected)) in schedule.days.iter().zip(WEEK).enumerate() {
            if day.day != expected {
                report.violations.push(Violation::WrongDay {
                    index,
                    expected,
                    found: day.day,
                });
            }
        }

        for day in &schedule.days {
            for (index, session) in day.sessions.iter().enumerate() {
                if session.start_time >= session.end_time {
                    report.violations.push(Violation::EmptySession {
                        day: day.day,
                        index,
                    });
                }
                let subject_ok = match (session.kind.is_focus(), session.subject_name.as_deref()) {
                    (true, Some(name)) => known.contains(name),
                    (false, None) => true,
                    _ => false,
                };
                if !subject_ok {
                    report.violations.push(Violation::SubjectMismatch {
                        day: day.day,
                        index,
                    });
                }
            }
            for (index, pair) in day.sessions.windows(2).enumerate() {
                let (prev, next) = (&pair[0], &pair[1]);
                if next.start_time < prev.start_time {
                    report.violations.push(Violation::Unsorted {
                        day: day.day,
                        index: index + 1,
                    });
                } else if next.start_time < prev.end_time {
                    report.violations.push(Violation::Overlap {
                        day: day.day,
                        index: index + 1,
                    });
                }
            }

            let focus = day.focus_minutes();
            if focus > self.budget_minutes {
                report.violations.push(Violation::OverBudget {
                    day: day.day,
                    focus_minutes: focus,
                    budget_minutes: self.budget_minutes,
                });
            }
        }

        self.check_coverage(schedule, &mut report);
        self.check_utilization(schedule, &mut report);
        report
    }

    fn check_coverage(&self, schedule: &WeeklySchedule, report: &mut ValidationReport) {
        let studied: HashSet<&str> = schedule
            .sessions()
            .filter(|(_, s)| s.kind == SessionKind::Study)
            .filter_map(|(_, s)| s.subject_name.as_deref())
            .collect();
        let missing: Vec<String> = self
            .subjects
            .iter()
            .filter(|name| !studied.contains(name.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() {
            return;
        }

        if self.study_days < self.subjects.len() {
            report.warnings.push(Warning::CoverageRelaxed {
                missing,
                study_days: self.study_days,
            });
        } else {
            report.violations.extend(
                missing
                    .into_iter()
                    .map(|subject| Violation::MissingSubject { subject }),
            );
        }
    }

    fn check_utilization(&self, schedule: &WeeklySchedule, report: &mut ValidationReport) {
        let study_days: Vec<u32> = schedule
            .days
            .iter()
            .filter(|d| !d.is_rest_day())
            .map(|d| d.focus_minutes())
            .collect();
        if study_days.is_empty() || self.budget_minutes == 0 {
            return;
        }
        let average = study_days.iter().sum::<u32>() as f64 / study_days.len() as f64;
        if average < self.budget_minutes as f64 * UTILIZATION_TARGET {
            report.warnings.push(Warning::LowUtilization {
                average_minutes: average,
                budget_minutes: self.budget_minutes,
            });
        }
    }
}

fn day_name(day: &Weekday) -> &'static str {
    weekday_name(*day)
}

fn serialize_weekday<S: serde::Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(day_name(day))
}
