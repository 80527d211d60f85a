//! Weekly totals for dashboard charts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{weekday_name, SessionKind, WeeklySchedule};

/// Study and revision minutes for one subject across the week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectMinutes {
    pub study: u32,
    pub revision: u32,
}

impl SubjectMinutes {
    pub fn total(&self) -> u32 {
        self.study + self.revision
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    /// Keyed by subject name.
    pub subjects: BTreeMap<String, SubjectMinutes>,
    /// Keyed by session kind ("study", "break", ...).
    pub kinds: BTreeMap<String, u32>,
    /// Study + revision minutes per day, Monday first.
    pub focus_by_day: Vec<(String, u32)>,
    pub study_days: usize,
}

impl WeeklySummary {
    pub fn from_schedule(schedule: &WeeklySchedule) -> Self {
        let mut summary = Self::default();

        for day in &schedule.days {
            for session in &day.sessions {
                let minutes = session.duration_minutes();
                *summary
                    .kinds
                    .entry(session.kind.as_str().to_string())
                    .or_default() += minutes;

                if let Some(subject) = &session.subject_name {
                    let entry = summary.subjects.entry(subject.clone()).or_default();
                    match session.kind {
                        SessionKind::Study => entry.study += minutes,
                        SessionKind::Revision => entry.revision += minutes,
                        SessionKind::Break | SessionKind::Buffer => {}
                    }
                }
            }

            let focus = day.focus_minutes();
            if focus > 0 {
                summary.study_days += 1;
            }
            summary
                .focus_by_day
                .push((weekday_name(day.day).to_string(), focus));
        }

        summary
    }

    /// Study minutes for one subject (revision excluded).
    pub fn study_minutes(&self, subject: &str) -> u32 {
        self.subjects.get(subject).map(|m| m.study).unwrap_or(0)
    }

    pub fn total_focus_minutes(&self) -> u32 {
        self.focus_by_day.iter().map(|(_, m)| m).sum()
    }

    /// Mean focus minutes over days that have any focus time.
    pub fn average_focus_minutes(&self) -> f64 {
        if self.study_days == 0 {
            return 0.0;
        }
        self.total_focus_minutes() as f64 / self.study_days as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{DaySchedule, Session, TimeOfDay, WEEK};

    fn block(start: &str, end: &str, subject: Option<&str>, kind: SessionKind) -> Session {
        Session {
            start_time: start.parse::<TimeOfDay>().unwrap(),
            end_time: end.parse::<TimeOfDay>().unwrap(),
            subject_name: subject.map(str::to_string),
            topic: String::new(),
            kind,
        }
    }

    #[test]
    fn totals_by_subject_kind_and_day() {
        let mut days: Vec<DaySchedule> = WEEK.iter().map(|d| DaySchedule::rest(*d)).collect();
        days[0].sessions = vec![
            block("08:00", "09:00", Some("Math"), SessionKind::Study),
            block("09:00", "09:05", None, SessionKind::Break),
            block("09:05", "09:35", Some("English"), SessionKind::Study),
        ];
        days[1].sessions = vec![
            block("08:00", "08:40", Some("Math"), SessionKind::Study),
            block("08:40", "08:45", None, SessionKind::Break),
            block("08:45", "09:05", Some("English"), SessionKind::Revision),
            block("09:05", "09:15", None, SessionKind::Buffer),
        ];
        let schedule = WeeklySchedule {
            days,
            tips: Vec::new(),
            focus_areas: Vec::new(),
        };

        let summary = schedule.summary();
        assert_eq!(summary.study_minutes("Math"), 100);
        assert_eq!(summary.subjects["English"].total(), 50);
        assert_eq!(summary.kinds["break"], 10);
        assert_eq!(summary.kinds["buffer"], 10);
        assert_eq!(summary.study_days, 2);
        assert_eq!(summary.focus_by_day[0], ("Monday".to_string(), 90));
        assert_eq!(summary.total_focus_minutes(), 150);
        assert!((summary.average_focus_minutes() - 75.0).abs() < f64::EPSILON);
    }
}
