//! Study plan records.
//!
//! A plan is created by the caller with no schedule, validated against the
//! current date, and then has its schedule replaced wholesale by each
//! generation. Subjects are immutable for the life of a plan version.

pub mod catalog;

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, PlanError};
use crate::schedule::WeeklySchedule;

pub const MIN_PROFICIENCY: u8 = 1;
pub const MAX_PROFICIENCY: u8 = 5;
pub const MIN_DAILY_HOURS: f64 = 1.0;
pub const MAX_DAILY_HOURS: f64 = 12.0;

/// A subject with a self-rated proficiency (1 = weakest, 5 = strongest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub color_tag: String,
    pub proficiency: u8,
}

impl Subject {
    pub fn new(name: impl Into<String>, proficiency: u8) -> Self {
        Self {
            name: name.into(),
            color_tag: String::new(),
            proficiency,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color_tag = color.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub id: String,
    pub title: String,
    pub class_level: String,
    #[serde(default)]
    pub stream: Option<String>,
    pub subjects: Vec<Subject>,
    pub exam_date: NaiveDate,
    pub daily_hours: f64,
    #[serde(default)]
    pub schedule: Option<WeeklySchedule>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudyPlan {
    /// New active plan with a fresh id and no schedule.
    pub fn new(
        class_level: impl Into<String>,
        stream: Option<String>,
        subjects: Vec<Subject>,
        exam_date: NaiveDate,
        daily_hours: f64,
    ) -> Self {
        let class_level = class_level.into();
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: catalog::plan_title(&class_level, stream.as_deref()),
            class_level,
            stream,
            subjects,
            exam_date,
            daily_hours,
            schedule: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn days_until_exam(&self, today: NaiveDate) -> i64 {
        (self.exam_date - today).num_days()
    }

    /// `daily_hours` in whole minutes.
    pub fn daily_budget_minutes(&self) -> u32 {
        (self.daily_hours * 60.0).round().max(0.0) as u32
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    /// Check the plan is fit for generation on `today`.
    ///
    /// # Errors
    /// `InvalidBudget` when fewer than one daily hour is available,
    /// `InvalidPlan` for every other malformed field.
    pub fn validate(&self, today: NaiveDate) -> Result<(), CoreError> {
        let level = catalog::class_level(&self.class_level)
            .ok_or_else(|| PlanError::UnknownClassLevel(self.class_level.clone()))?;
        match self.stream.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(stream) => {
                if catalog::stream(stream).is_none() {
                    return Err(PlanError::UnknownStream(stream.to_string()).into());
                }
            }
            None if level.needs_stream() => {
                return Err(PlanError::StreamRequired(self.class_level.clone()).into());
            }
            None => {}
        }

        if self.subjects.is_empty() {
            return Err(PlanError::NoSubjects.into());
        }
        let mut seen = HashSet::new();
        for (index, subject) in self.subjects.iter().enumerate() {
            let name = subject.name.trim();
            if name.is_empty() {
                return Err(PlanError::EmptySubjectName { index }.into());
            }
            if !seen.insert(name) {
                return Err(PlanError::DuplicateSubject(name.to_string()).into());
            }
            if !(MIN_PROFICIENCY..=MAX_PROFICIENCY).contains(&subject.proficiency) {
                return Err(PlanError::ProficiencyOutOfRange {
                    subject: name.to_string(),
                    value: subject.proficiency,
                }
                .into());
            }
        }

        if !self.daily_hours.is_finite() || self.daily_hours > MAX_DAILY_HOURS {
            return Err(PlanError::DailyHoursOutOfRange(self.daily_hours).into());
        }
        if self.daily_hours < MIN_DAILY_HOURS {
            return Err(CoreError::InvalidBudget {
                daily_hours: self.daily_hours,
            });
        }

        if self.days_until_exam(today) < 1 {
            return Err(PlanError::ExamNotInFuture {
                exam_date: self.exam_date,
                today,
            }
            .into());
        }

        Ok(())
    }

    /// Replace the schedule wholesale. Plans are never partially updated.
    pub fn apply_schedule(&mut self, schedule: WeeklySchedule, at: DateTime<Utc>) {
        self.schedule = Some(schedule);
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn plan() -> StudyPlan {
        StudyPlan::new(
            "class-10",
            None,
            vec![Subject::new("Math", 1), Subject::new("English", 5)],
            NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            4.0,
        )
    }

    fn plan_error(plan: &StudyPlan) -> PlanError {
        match plan.validate(today()) {
            Err(CoreError::InvalidPlan(e)) => e,
            other => panic!("expected InvalidPlan, got {other:?}"),
        }
    }

    #[test]
    fn valid_plan_passes() {
        let p = plan();
        assert!(p.validate(today()).is_ok());
        assert_eq!(p.title, "Class 10 Study Plan");
        assert_eq!(p.days_until_exam(today()), 43);
        assert_eq!(p.daily_budget_minutes(), 240);
    }

    #[test]
    fn exam_today_is_rejected() {
        let mut p = plan();
        p.exam_date = today();
        assert!(matches!(plan_error(&p), PlanError::ExamNotInFuture { .. }));
    }

    #[test]
    fn empty_and_duplicate_subjects_are_rejected() {
        let mut p = plan();
        p.subjects.clear();
        assert_eq!(plan_error(&p), PlanError::NoSubjects);

        let mut p = plan();
        p.subjects.push(Subject::new("Math", 3));
        assert_eq!(plan_error(&p), PlanError::DuplicateSubject("Math".into()));

        let mut p = plan();
        p.subjects[1].name = "  ".into();
        assert_eq!(plan_error(&p), PlanError::EmptySubjectName { index: 1 });
    }

    #[test]
    fn proficiency_bounds() {
        let mut p = plan();
        p.subjects[0].proficiency = 0;
        assert!(matches!(plan_error(&p), PlanError::ProficiencyOutOfRange { value: 0, .. }));
        p.subjects[0].proficiency = 6;
        assert!(matches!(plan_error(&p), PlanError::ProficiencyOutOfRange { value: 6, .. }));
    }

    #[test]
    fn daily_hours_bounds() {
        let mut p = plan();
        p.daily_hours = 0.5;
        assert!(matches!(
            p.validate(today()),
            Err(CoreError::InvalidBudget { .. })
        ));
        p.daily_hours = 12.5;
        assert_eq!(plan_error(&p), PlanError::DailyHoursOutOfRange(12.5));
        p.daily_hours = f64::NAN;
        assert!(matches!(plan_error(&p), PlanError::DailyHoursOutOfRange(_)));
        p.daily_hours = 12.0;
        assert!(p.validate(today()).is_ok());
    }

    #[test]
    fn higher_secondary_requires_known_stream() {
        let mut p = plan();
        p.class_level = "class-12".into();
        assert_eq!(plan_error(&p), PlanError::StreamRequired("class-12".into()));
        p.stream = Some("astrology".into());
        assert_eq!(plan_error(&p), PlanError::UnknownStream("astrology".into()));
        p.stream = Some("science-pcm".into());
        assert!(p.validate(today()).is_ok());
    }

    #[test]
    fn unknown_class_level() {
        let mut p = plan();
        p.class_level = "kindergarten".into();
        assert_eq!(plan_error(&p), PlanError::UnknownClassLevel("kindergarten".into()));
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let json = r#"{
            "id": "p1",
            "title": "JEE plan",
            "classLevel": "jee",
            "subjects": [{"name": "Physics", "proficiency": 2}],
            "examDate": "2027-01-15",
            "dailyHours": 6,
            "createdAt": "2026-10-01T00:00:00Z",
            "updatedAt": "2026-10-01T00:00:00Z"
        }"#;
        let p: StudyPlan = serde_json::from_str(json).unwrap();
        assert!(p.schedule.is_none());
        assert!(!p.is_active);
        assert_eq!(p.subjects[0].color_tag, "");
        assert!(p.validate(today()).is_ok());
    }
}
