pub mod catalog;
pub mod config;
pub mod generate;
pub mod plan;
pub mod session;
pub mod streak;
pub mod today;

use chrono::{Local, NaiveDate};
use studyplan_core::{PlanStore, StudyPlan};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// `YYYY-MM-DD`, or the local date when absent.
pub fn date_or_today(raw: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD").into())
}

/// The plan with `id`, or the active plan.
pub fn resolve_plan(
    store: &PlanStore,
    id: Option<&str>,
) -> Result<StudyPlan, Box<dyn std::error::Error>> {
    match id {
        Some(id) => Ok(store.get(id)?),
        None => store
            .active_plan()?
            .ok_or_else(|| "no active plan; create one with `studyplan plan create`".into()),
    }
}
