mod api;
mod cli;
mod config;
mod db;
mod error;
mod insights;
mod ledger;
mod notify;
mod server;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cli::report::ReportKind;

#[derive(Parser)]
#[command(name = "questlog", version, about = "Gamified habit tracker — quests, XP, and streaks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API server
    Serve,
    /// Seed the global quest catalog
    Seed,
    /// Show lifetime statistics
    Stats,
    /// Render a notification email (check-in, weekly, inactive)
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
    },
    /// Rebuild aggregates and profile from the completion ledger
    Recompute,
    /// Remove all completions and the aggregate for one date
    ResetDay {
        /// Date to reset (YYYY-MM-DD)
        date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::QuestlogConfig::load()?;

    // Initialize tracing with the configured log level, on stderr so CLI
    // output stays clean.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Seed => {
            cli::seed::seed(&config)?;
        }
        Command::Stats => {
            cli::stats::stats(&config)?;
        }
        Command::Report { kind } => {
            cli::report::report(&config, kind)?;
        }
        Command::Recompute => {
            cli::maintenance::recompute(&config)?;
        }
        Command::ResetDay { date } => {
            cli::maintenance::reset(&config, date)?;
        }
    }

    Ok(())
}
