//! Weekly schedule types.
//!
//! A [`WeeklySchedule`] is owned by its study plan and replaced wholesale on
//! every generation. Days are always Monday..Sunday; a rest day is a day with
//! no sessions, never a missing day.

mod summary;
mod time;

pub use summary::{SubjectMinutes, WeeklySummary};
pub use time::{TimeOfDay, MINUTES_PER_DAY};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Week order used everywhere in a schedule.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name ("Monday").
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Kind of a scheduled session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Study,
    Revision,
    Break,
    Buffer,
}

impl SessionKind {
    /// Study and revision count against the daily study budget.
    pub fn is_focus(self) -> bool {
        matches!(self, SessionKind::Study | SessionKind::Revision)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Study => "study",
            SessionKind::Revision => "revision",
            SessionKind::Break => "break",
            SessionKind::Buffer => "buffer",
        }
    }
}

/// One time-boxed block in a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// `None` only for breaks and buffers.
    pub subject_name: Option<String>,
    pub topic: String,
    pub kind: SessionKind,
}

impl Session {
    pub fn duration_minutes(&self) -> u32 {
        self.end_time.minutes_since(self.start_time)
    }

    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.start_time <= time && time < self.end_time
    }
}

/// Sessions for a single weekday, ordered by start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    #[serde(with = "weekday_serde")]
    pub day: Weekday,
    pub sessions: Vec<Session>,
}

impl DaySchedule {
    pub fn rest(day: Weekday) -> Self {
        Self {
            day,
            sessions: Vec::new(),
        }
    }

    pub fn is_rest_day(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Minutes spent in study and revision sessions.
    pub fn focus_minutes(&self) -> u32 {
        self.sessions
            .iter()
            .filter(|s| s.kind.is_focus())
            .map(Session::duration_minutes)
            .sum()
    }

    /// Session running at `time`, if any.
    pub fn session_at(&self, time: TimeOfDay) -> Option<&Session> {
        self.sessions.iter().find(|s| s.contains(time))
    }

    /// First session starting at or after `time`.
    pub fn next_session(&self, time: TimeOfDay) -> Option<&Session> {
        self.sessions.iter().find(|s| s.start_time >= time)
    }
}

/// A full Monday..Sunday schedule plus display hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySchedule {
    pub days: Vec<DaySchedule>,
    pub tips: Vec<String>,
    pub focus_areas: Vec<String>,
}

impl WeeklySchedule {
    pub fn day(&self, weekday: Weekday) -> Option<&DaySchedule> {
        self.days.iter().find(|d| d.day == weekday)
    }

    /// The day of the week `date` falls on.
    pub fn today(&self, date: NaiveDate) -> Option<&DaySchedule> {
        self.day(date.weekday())
    }

    pub fn sessions(&self) -> impl Iterator<Item = (Weekday, &Session)> {
        self.days
            .iter()
            .flat_map(|d| d.sessions.iter().map(move |s| (d.day, s)))
    }

    pub fn summary(&self) -> WeeklySummary {
        WeeklySummary::from_schedule(self)
    }
}

/// Serializes `chrono::Weekday` as its full English name.
pub mod weekday_serde {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{weekday_name, WEEK};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(weekday_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(deserializer)?;
        WEEK.iter()
            .copied()
            .find(|d| weekday_name(*d).eq_ignore_ascii_case(&raw))
            .or_else(|| raw.parse::<Weekday>().ok())
            .ok_or_else(|| serde::de::Error::custom(format!("unknown weekday '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn session(start: &str, end: &str, subject: Option<&str>, kind: SessionKind) -> Session {
        Session {
            start_time: t(start),
            end_time: t(end),
            subject_name: subject.map(str::to_string),
            topic: "General review".to_string(),
            kind,
        }
    }

    fn sample_day() -> DaySchedule {
        DaySchedule {
            day: Weekday::Mon,
            sessions: vec![
                session("08:00", "08:45", Some("Math"), SessionKind::Study),
                session("08:45", "08:50", None, SessionKind::Break),
                session("08:50", "09:20", Some("English"), SessionKind::Revision),
                session("09:20", "09:30", None, SessionKind::Buffer),
            ],
        }
    }

    #[test]
    fn focus_minutes_counts_study_and_revision_only() {
        assert_eq!(sample_day().focus_minutes(), 75);
    }

    #[test]
    fn session_lookup_by_time() {
        let day = sample_day();
        assert_eq!(day.session_at(t("08:47")).unwrap().kind, SessionKind::Break);
        assert_eq!(
            day.session_at(t("08:50")).unwrap().subject_name.as_deref(),
            Some("English")
        );
        assert!(day.session_at(t("09:30")).is_none());
        assert_eq!(day.next_session(t("08:46")).unwrap().start_time, t("08:50"));
    }

    #[test]
    fn serializes_with_camel_case_and_weekday_names() {
        let json = serde_json::to_value(sample_day()).unwrap();
        assert_eq!(json["day"], "Monday");
        assert_eq!(json["sessions"][0]["startTime"], "08:00");
        assert_eq!(json["sessions"][0]["subjectName"], "Math");
        assert_eq!(json["sessions"][1]["subjectName"], serde_json::Value::Null);
        assert_eq!(json["sessions"][2]["kind"], "revision");

        let back: DaySchedule = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_day());
    }

    #[test]
    fn today_resolves_by_weekday() {
        let schedule = WeeklySchedule {
            days: WEEK.iter().map(|d| DaySchedule::rest(*d)).collect(),
            tips: Vec::new(),
            focus_areas: Vec::new(),
        };
        // 2026-10-21 is a Wednesday
        let date = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        assert_eq!(schedule.today(date).unwrap().day, Weekday::Wed);
    }
}
