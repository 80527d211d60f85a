//! Study plan management commands for CLI.

use clap::Subcommand;
use serde::Serialize;
use studyplan_core::{PlanStore, StudyPlan, Subject};

use super::{date_or_today, parse_date, CmdResult};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Create a new plan and make it active
    Create {
        /// Class level (see `studyplan catalog`), e.g. class-10, jee
        #[arg(long = "class")]
        class_level: String,
        /// Stream, required for class 11 and 12
        #[arg(long)]
        stream: Option<String>,
        /// Subject as NAME:PROFICIENCY[:COLOR], repeatable (proficiency 1 = weakest)
        #[arg(long = "subject", required = true)]
        subjects: Vec<String>,
        /// Exam date (YYYY-MM-DD)
        #[arg(long)]
        exam_date: String,
        /// Daily study hours, 1 to 12
        #[arg(long)]
        hours: f64,
        /// Custom title
        #[arg(long)]
        title: Option<String>,
        /// Date to validate the exam date against (default: today)
        #[arg(long)]
        today: Option<String>,
    },
    /// List plans
    List,
    /// Show a plan with its schedule
    Show {
        /// Plan ID (default: active plan)
        id: Option<String>,
    },
    /// Make a plan the active one
    Activate {
        /// Plan ID
        id: String,
    },
    /// Delete a plan and its study log
    Delete {
        /// Plan ID
        id: String,
    },
}

/// One row of `plan list`.
#[derive(Serialize)]
struct PlanListing<'a> {
    id: &'a str,
    title: &'a str,
    exam_date: String,
    daily_hours: f64,
    subjects: usize,
    has_schedule: bool,
    is_active: bool,
}

pub fn run(action: PlanAction) -> CmdResult {
    let store = PlanStore::open()?;

    match action {
        PlanAction::Create {
            class_level,
            stream,
            subjects,
            exam_date,
            hours,
            title,
            today,
        } => {
            let subjects = subjects
                .iter()
                .map(|raw| parse_subject(raw))
                .collect::<Result<Vec<_>, _>>()?;
            let mut plan = StudyPlan::new(
                class_level,
                stream,
                subjects,
                parse_date(&exam_date)?,
                hours,
            );
            if let Some(title) = title {
                plan.title = title;
            }
            plan.validate(date_or_today(today.as_deref())?)?;

            store.insert(&plan)?;
            println!("Plan created: {}", plan.id);
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        PlanAction::List => {
            let plans = store.list()?;
            let listing: Vec<PlanListing<'_>> = plans
                .iter()
                .map(|p| PlanListing {
                    id: &p.id,
                    title: &p.title,
                    exam_date: p.exam_date.to_string(),
                    daily_hours: p.daily_hours,
                    subjects: p.subjects.len(),
                    has_schedule: p.schedule.is_some(),
                    is_active: p.is_active,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        PlanAction::Show { id } => {
            let plan = super::resolve_plan(&store, id.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        PlanAction::Activate { id } => {
            store.set_active(&id)?;
            println!("Plan activated: {id}");
        }
        PlanAction::Delete { id } => {
            store.delete(&id)?;
            println!("Plan deleted: {id}");
        }
    }
    Ok(())
}

/// Parse `NAME:PROFICIENCY[:COLOR]`.
fn parse_subject(raw: &str) -> Result<Subject, String> {
    let mut parts = raw.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    let proficiency = parts
        .next()
        .ok_or_else(|| format!("subject '{raw}' must look like NAME:PROFICIENCY"))?
        .trim()
        .parse::<u8>()
        .map_err(|_| format!("proficiency in '{raw}' must be a number from 1 to 5"))?;

    let subject = Subject::new(name, proficiency);
    Ok(match parts.next() {
        Some(color) if !color.trim().is_empty() => subject.with_color(color.trim()),
        _ => subject,
    })
}
