//! End-to-end scheduling scenarios: generate, validate, store, reload.

use chrono::{NaiveDate, Utc, Weekday};

use studyplan_core::scheduler::{FallbackTopics, FALLBACK_TOPIC};
use studyplan_core::validator::Warning;
use studyplan_core::weighting;
use studyplan_core::{
    CoreError, PlanError, PlanGenerator, PlanStore, PlannerConfig, SessionKind, StreakSummary,
    StudyPlan, Subject, TimeOfDay,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn plan(subjects: Vec<Subject>, hours: f64) -> StudyPlan {
    StudyPlan::new(
        "class-10",
        None,
        subjects,
        NaiveDate::from_ymd_opt(2027, 3, 15).unwrap(),
        hours,
    )
}

fn generator(config: PlannerConfig) -> PlanGenerator {
    PlanGenerator::new(config, Box::new(FallbackTopics))
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

#[test]
fn weak_math_gets_the_morning() {
    let subjects = vec![Subject::new("Math", 1), Subject::new("English", 5)];
    let shares = weighting::shares(&subjects);
    assert_eq!(shares[0].weight, 5);
    assert_eq!(shares[1].weight, 1);
    assert!((shares[0].share - 0.833).abs() < 0.001);

    let outcome = generator(PlannerConfig::default())
        .generate(&plan(subjects, 4.0), today(), 0)
        .unwrap();
    assert!(!outcome.partial);

    let monday = &outcome.schedule.days[0];
    assert_eq!(monday.day, Weekday::Mon);
    assert_eq!(monday.sessions[0].subject_name.as_deref(), Some("Math"));
    assert_eq!(monday.sessions[0].start_time, t("08:00"));

    let math: u32 = monday
        .sessions
        .iter()
        .filter(|s| s.kind == SessionKind::Study && s.subject_name.as_deref() == Some("Math"))
        .map(|s| s.duration_minutes())
        .sum();
    let english: u32 = monday
        .sessions
        .iter()
        .filter(|s| s.kind == SessionKind::Study && s.subject_name.as_deref() == Some("English"))
        .map(|s| s.duration_minutes())
        .sum();
    assert_eq!(math, 165);
    assert_eq!(english, 30);
    let breaks = monday
        .sessions
        .iter()
        .filter(|s| s.kind == SessionKind::Break)
        .count();
    assert_eq!(breaks, 4);

    // Average focus is just under 90% of four hours.
    assert!(outcome
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::LowUtilization { budget_minutes: 240, .. })));
    assert_eq!(outcome.schedule.focus_areas, vec!["Math"]);
}

#[test]
fn one_hour_for_three_subjects_is_partial() {
    let subjects = vec![
        Subject::new("Physics", 2),
        Subject::new("Chemistry", 3),
        Subject::new("Biology", 4),
    ];
    let outcome = generator(PlannerConfig::default())
        .generate(&plan(subjects, 1.0), today(), 0)
        .unwrap();

    assert!(outcome.partial);
    assert!(!outcome.truncations.is_empty());
    let summary = outcome.schedule.summary();
    for subject in ["Physics", "Chemistry", "Biology"] {
        assert!(summary.study_minutes(subject) > 0, "{subject} missing");
    }
    for day in &outcome.schedule.days {
        assert_eq!(day.sessions.last().unwrap().end_time, t("09:00"));
    }
}

#[test]
fn exam_today_is_rejected() {
    let mut p = plan(vec![Subject::new("Math", 2)], 2.0);
    p.exam_date = today();
    let err = generator(PlannerConfig::default())
        .generate(&p, today(), 0)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidPlan(PlanError::ExamNotInFuture { .. })
    ));
}

#[test]
fn empty_subject_list_is_rejected() {
    let err = generator(PlannerConfig::default())
        .generate(&plan(vec![], 2.0), today(), 0)
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidPlan(PlanError::NoSubjects)));

    let err = generator(PlannerConfig::default())
        .generate(&plan(vec![Subject::new("Math", 2)], 13.0), today(), 0)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidPlan(PlanError::DailyHoursOutOfRange(_))
    ));
}

#[test]
fn weekend_off_gives_empty_weekend_days() {
    let config = PlannerConfig {
        weekend_study: false,
        ..PlannerConfig::default()
    };
    let outcome = generator(config)
        .generate(&plan(vec![Subject::new("Math", 2), Subject::new("Art", 4)], 3.0), today(), 0)
        .unwrap();

    let days = &outcome.schedule.days;
    assert_eq!(days.len(), 7);
    assert_eq!(days[5].day, Weekday::Sat);
    assert_eq!(days[6].day, Weekday::Sun);
    assert!(days[5].sessions.is_empty());
    assert!(days[6].sessions.is_empty());

    let json = serde_json::to_value(&outcome.schedule).unwrap();
    assert_eq!(json["days"][5]["day"], "Saturday");
    assert_eq!(json["days"][5]["sessions"], serde_json::json!([]));
}

#[test]
fn six_subjects_on_five_days_relax_coverage() {
    // One 50 minute block per day leaves room for a single subject.
    let config = PlannerConfig {
        weekend_study: false,
        min_block_minutes: 50,
        max_block_minutes: 50,
        ..PlannerConfig::default()
    };
    let subjects = (1..=6)
        .map(|i| Subject::new(format!("Subject {i}"), 3))
        .collect();
    let outcome = generator(config)
        .generate(&plan(subjects, 1.0), today(), 0)
        .unwrap();
    assert!(outcome.partial);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::CoverageRelaxed { missing, study_days: 5 } if missing == &["Subject 6"])));
}

#[test]
fn fallback_topics_fill_study_sessions() {
    let outcome = generator(PlannerConfig::default())
        .generate(&plan(vec![Subject::new("History", 3)], 2.0), today(), 0)
        .unwrap();
    for (_, session) in outcome.schedule.sessions() {
        match session.kind {
            SessionKind::Study | SessionKind::Revision => assert_eq!(session.topic, FALLBACK_TOPIC),
            SessionKind::Break => assert_eq!(session.topic, "Short break"),
            SessionKind::Buffer => assert_eq!(session.topic, "Buffer time"),
        }
    }
}

#[test]
fn generated_schedule_survives_storage() {
    let store = PlanStore::open_memory().unwrap();
    let mut p = plan(
        vec![Subject::new("Math", 1).with_color("#ef4444"), Subject::new("English", 5)],
        4.0,
    );
    store.insert(&p).unwrap();

    let planner = generator(PlannerConfig::default());
    let at = Utc::now();
    let outcome = planner.generate_into(&mut p, today(), 0, at).unwrap();
    store.save_schedule(&p.id, &outcome.schedule, at).unwrap();

    let loaded = store.active_plan().unwrap().unwrap();
    assert_eq!(loaded.schedule, Some(outcome.schedule.clone()));

    let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let session = loaded
        .schedule
        .as_ref()
        .unwrap()
        .today(monday)
        .unwrap()
        .session_at(t("08:30"))
        .unwrap();
    assert_eq!(session.subject_name.as_deref(), Some("Math"));
}

#[test]
fn streak_from_logged_sessions() {
    let store = PlanStore::open_memory().unwrap();
    let p = plan(vec![Subject::new("Math", 1)], 2.0);
    store.insert(&p).unwrap();

    for day in [15, 17, 18, 19] {
        let date = NaiveDate::from_ymd_opt(2026, 10, day).unwrap();
        store
            .record_study_session(&p.id, "Math", 45, date, Utc::now())
            .unwrap();
    }
    let streak = StreakSummary::from_dates(store.activity_dates(Some(&p.id)).unwrap(), today());
    assert_eq!(streak.current, 3);
    assert_eq!(streak.longest, 3);
    assert_eq!(streak.last_activity, Some(today()));
}
