use anyhow::Result;
use chrono::Days;
use clap::ValueEnum;

use crate::config::QuestlogConfig;
use crate::ledger::{aggregate, profile, today};
use crate::notify::{check_in_email, inactivity_check, weekly_summary, EmailContent};

/// Which report to render.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportKind {
    CheckIn,
    Weekly,
    Inactive,
}

/// Render one of the notification emails to the terminal, exactly as the
/// dispatcher would receive it.
pub fn report(config: &QuestlogConfig, kind: ReportKind) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;
    let user = &config.storage.default_user;

    let profile = profile::get_or_create_profile(&conn, user, &config.storage.default_username)?;

    match kind {
        ReportKind::CheckIn => {
            let today_log = aggregate::get_daily_log(&conn, user, today())?;
            print_email(&check_in_email(&profile, today_log.as_ref(), &config.rules));
        }
        ReportKind::Weekly => {
            let to = today();
            let from = to - Days::new(6);
            let logs = aggregate::all_daily_logs(&conn, user)?;
            let (stats, email) = weekly_summary(&profile, &logs, from, to, &config.rules);
            print_email(&email);
            println!();
            println!(
                "({} days logged, {} goals met, streak {})",
                stats.days_logged, stats.days_goal_met, stats.window_streak
            );
        }
        ReportKind::Inactive => {
            let check = inactivity_check(&profile, today(), &config.rules);
            match check.email {
                Some(email) => print_email(&email),
                None => println!(
                    "User active {} day(s) ago. No reminder needed.",
                    check.days_inactive
                ),
            }
        }
    }

    Ok(())
}

fn print_email(email: &EmailContent) {
    println!("Subject: {}", email.subject);
    println!("{}", "-".repeat(40));
    println!("{}", email.html);
}
