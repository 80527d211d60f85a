use chrono::Utc;
use clap::Args;
use studyplan_core::schedule::weekday_name;
use studyplan_core::{Config, GenerationOutcome, PlanGenerator, PlanStore};

use super::{date_or_today, resolve_plan, CmdResult};

#[derive(Args)]
pub struct GenerateArgs {
    /// Plan ID (default: active plan)
    pub id: Option<String>,
    /// Date to generate as of (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub today: Option<String>,
    /// Week of preparation, used to vary topics (default: weeks since the plan was created)
    #[arg(long)]
    pub week: Option<u32>,
    /// Print the full outcome as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: GenerateArgs) -> CmdResult {
    let config = Config::load()?;
    let store = PlanStore::open()?;
    let mut plan = resolve_plan(&store, args.id.as_deref())?;
    let today = date_or_today(args.today.as_deref())?;

    let week_index = args.week.unwrap_or_else(|| {
        let days = (today - plan.created_at.date_naive()).num_days().max(0);
        (days / 7) as u32
    });

    let generator = PlanGenerator::new(config.planner, config.topics.source.build());
    let seen = plan.updated_at;
    let now = Utc::now();
    let outcome = generator.generate_into(&mut plan, today, week_index, now)?;
    // Another `generate` for this plan may have finished in the meantime.
    store.save_schedule_if_unchanged(&plan.id, &outcome.schedule, seen, now)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&plan.title, &outcome);
    }
    Ok(())
}

fn print_outcome(title: &str, outcome: &GenerationOutcome) {
    println!("Schedule generated for {title}");
    let summary = outcome.schedule.summary();
    for (day, focus) in &summary.focus_by_day {
        if *focus == 0 {
            println!("  {day:<10} rest");
        } else {
            println!("  {day:<10} {focus} min focus");
        }
    }
    for (subject, minutes) in &summary.subjects {
        println!(
            "  {subject}: {} min study, {} min revision",
            minutes.study, minutes.revision
        );
    }
    if !outcome.schedule.focus_areas.is_empty() {
        println!("Focus areas: {}", outcome.schedule.focus_areas.join(", "));
    }
    if outcome.partial {
        println!("Partial schedule, not enough time for:");
        for t in &outcome.truncations {
            println!(
                "  {} {}: {} of {} min",
                weekday_name(t.day),
                t.subject,
                t.placed_minutes,
                t.requested_minutes
            );
        }
    }
    for warning in &outcome.warnings {
        println!("Warning: {warning}");
    }
}
