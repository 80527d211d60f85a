use clap::Args;
use studyplan_core::{PlanStore, StreakSummary};

use super::{date_or_today, CmdResult};

#[derive(Args)]
pub struct StreakArgs {
    /// Count up to this date (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub today: Option<String>,
    /// Only count sessions for this plan
    #[arg(long)]
    pub plan: Option<String>,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StreakArgs) -> CmdResult {
    let store = PlanStore::open()?;
    let today = date_or_today(args.today.as_deref())?;
    let dates = store.activity_dates(args.plan.as_deref())?;
    let streak = StreakSummary::from_dates(dates, today);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&streak)?);
        return Ok(());
    }

    println!("Current streak: {} day(s)", streak.current);
    println!("Longest streak: {} day(s)", streak.longest);
    match streak.last_activity {
        Some(date) => println!("Last studied: {date}"),
        None => println!("No study sessions logged yet"),
    }
    Ok(())
}
