use anyhow::Result;

use crate::config::QuestlogConfig;
use crate::insights::stats::user_stats;
use crate::ledger::today;

/// Display lifetime statistics in the terminal.
pub fn stats(config: &QuestlogConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let response = user_stats(&conn, &config.rules, &config.storage.default_user, today())?;

    println!("Questlog Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total XP:            {}", response.profile.total_xp);
    println!("  Level:               {}", response.profile.level);
    println!("  Current streak:      {} day(s)", response.profile.current_streak);
    println!("  Longest streak:      {} day(s)", response.profile.longest_streak);
    println!();

    println!("Overview:");
    println!("  Days tracked:        {}", response.overview.total_days_tracked);
    println!("  Avg XP / day:        {}", response.overview.average_xp_per_day);
    println!("  Goals achieved:      {}", response.overview.goals_achieved);
    println!("  Completion rate:     {}%", response.overview.completion_rate);
    println!("  Last 7 days XP:      {}", response.overview.last_7_days_xp);
    if let Some(best) = &response.overview.best_day {
        println!("  Best day:            {} ({} XP)", best.date, best.xp);
    }
    println!();

    if !response.categories.is_empty() {
        println!("By Category:");
        let mut categories: Vec<_> = response.categories.iter().collect();
        categories.sort_by(|a, b| b.1.xp.cmp(&a.1.xp));
        for (name, stat) in categories {
            println!("  {:<14} {} completions, {} XP", name, stat.count, stat.xp);
        }
        println!();
    }

    println!("Quests in catalog:     {}", response.total_quests);
    println!("Total completions:     {}", response.total_completions);

    Ok(())
}
