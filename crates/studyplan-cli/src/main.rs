use clap::{Parser, Subcommand};
use studyplan_core::Config;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "studyplan", version, about = "Weekly study schedule planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Study plan management
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Generate the weekly schedule for a plan
    Generate(commands::generate::GenerateArgs),
    /// Show the sessions for a day of the active plan
    Today(commands::today::TodayArgs),
    /// Log completed study time
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Show the current and longest study streak
    Streak(commands::streak::StreakArgs),
    /// List class levels and streams
    Catalog,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&Config::load_or_default().logging.level);

    let result = match cli.command {
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Today(args) => commands::today::run(args),
        Commands::Session { action } => commands::session::run(action),
        Commands::Streak(args) => commands::streak::run(args),
        Commands::Catalog => commands::catalog::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
