use chrono::Utc;
use clap::Subcommand;
use studyplan_core::PlanStore;

use super::{date_or_today, resolve_plan, CmdResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Log minutes studied for a subject
    Log {
        /// Subject name, as in the plan
        subject: String,
        /// Minutes studied
        minutes: u32,
        /// Day studied (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Plan ID (default: active plan)
        #[arg(long)]
        plan: Option<String>,
    },
    /// List logged sessions
    List {
        /// Plan ID (default: active plan)
        #[arg(long)]
        plan: Option<String>,
    },
}

pub fn run(action: SessionAction) -> CmdResult {
    let store = PlanStore::open()?;

    match action {
        SessionAction::Log {
            subject,
            minutes,
            date,
            plan,
        } => {
            if minutes == 0 {
                return Err("minutes must be positive".into());
            }
            let plan = resolve_plan(&store, plan.as_deref())?;
            if plan.subject(&subject).is_none() {
                return Err(format!("subject '{subject}' is not part of plan {}", plan.id).into());
            }
            let studied_on = date_or_today(date.as_deref())?;
            let id = store.record_study_session(&plan.id, &subject, minutes, studied_on, Utc::now())?;
            println!("Session logged: {id}");
        }
        SessionAction::List { plan } => {
            let plan = resolve_plan(&store, plan.as_deref())?;
            let sessions = store.study_sessions(&plan.id)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
