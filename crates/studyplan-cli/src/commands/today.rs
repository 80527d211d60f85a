use chrono::{Local, Timelike};
use clap::Args;
use studyplan_core::schedule::weekday_name;
use studyplan_core::{PlanStore, TimeOfDay};

use super::{date_or_today, resolve_plan, CmdResult};

#[derive(Args)]
pub struct TodayArgs {
    /// Date to show (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub date: Option<String>,
    /// Plan ID (default: active plan)
    #[arg(long)]
    pub plan: Option<String>,
    /// Print the day as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TodayArgs) -> CmdResult {
    let store = PlanStore::open()?;
    let plan = resolve_plan(&store, args.plan.as_deref())?;
    let schedule = plan
        .schedule
        .as_ref()
        .ok_or("plan has no schedule yet; run `studyplan generate`")?;

    let date = date_or_today(args.date.as_deref())?;
    let day = schedule
        .today(date)
        .ok_or_else(|| format!("schedule has no entry for {date}"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(day)?);
        return Ok(());
    }

    println!("{} {date}: {}", weekday_name(day.day), plan.title);
    if day.is_rest_day() {
        println!("  Rest day");
        return Ok(());
    }

    // Only mark the running session when looking at the current date.
    let current = if args.date.is_none() {
        let now = Local::now();
        TimeOfDay::from_hm(now.hour(), now.minute()).and_then(|t| day.session_at(t))
    } else {
        None
    };

    for session in &day.sessions {
        let marker = if current == Some(session) { ">" } else { " " };
        println!(
            "{marker} {}-{}  {:<8}  {:<12}  {}",
            session.start_time,
            session.end_time,
            session.kind.as_str(),
            session.subject_name.as_deref().unwrap_or("-"),
            session.topic
        );
    }
    println!("  {} min of study and revision", day.focus_minutes());
    Ok(())
}
