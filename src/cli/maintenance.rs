use anyhow::Result;
use chrono::NaiveDate;

use crate::config::QuestlogConfig;
use crate::ledger::aggregate::{recompute_user, reset_day};

/// Rebuild aggregates, profile totals, and streaks from the completion
/// ledger.
pub fn recompute(config: &QuestlogConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let mut conn = crate::db::open_database(&db_path)?;

    let outcome = recompute_user(
        &mut conn,
        &config.rules,
        &config.storage.default_user,
        &config.storage.default_username,
    )?;

    println!("Rebuilt {} day(s) from the ledger.", outcome.days_rebuilt);
    println!(
        "Total XP: {}  Level: {}  Streak: {}/{}",
        outcome.total_xp, outcome.level, outcome.current_streak, outcome.longest_streak
    );
    Ok(())
}

/// Wipe one day's completions and aggregate.
pub fn reset(config: &QuestlogConfig, date: NaiveDate) -> Result<()> {
    let db_path = config.resolved_db_path();
    let mut conn = crate::db::open_database(&db_path)?;

    let outcome = reset_day(&mut conn, &config.rules, &config.storage.default_user, date)?;
    println!(
        "Reset {}: removed {} completion(s), {} XP.",
        outcome.date, outcome.completions_removed, outcome.xp_removed
    );
    Ok(())
}
