//! Lifetime statistics and the leaderboard read.

use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::config::RulesConfig;
use crate::error::QuestResult;
use crate::insights::DayStat;
use crate::ledger::aggregate;

/// Per-category completion totals.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CategoryStat {
    pub count: i64,
    pub xp: i64,
}

/// Profile slice echoed in the stats response.
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub total_xp: i64,
    pub level: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
}

#[derive(Debug, Serialize)]
pub struct StatsOverview {
    pub total_days_tracked: usize,
    /// Lifetime XP divided by tracked days, rounded.
    pub average_xp_per_day: i64,
    /// Days at or above the daily goal.
    pub goals_achieved: usize,
    /// goals_achieved over tracked days, as a rounded percentage.
    pub completion_rate: i64,
    pub best_day: Option<DayStat>,
    pub last_7_days_xp: i64,
}

/// Response from the stats read.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub profile: ProfileSummary,
    pub overview: StatsOverview,
    pub categories: HashMap<String, CategoryStat>,
    pub quest_frequency: HashMap<String, i64>,
    pub total_quests: i64,
    pub total_completions: i64,
}

/// Compute lifetime statistics for a user. `today` anchors the trailing
/// 7-day window.
pub fn user_stats(
    conn: &Connection,
    rules: &RulesConfig,
    user: &str,
    today: NaiveDate,
) -> QuestResult<StatsResponse> {
    let profile = conn
        .query_row(
            "SELECT total_xp, level, current_streak, longest_streak FROM profiles WHERE id = ?1",
            params![user],
            |row| {
                Ok(ProfileSummary {
                    total_xp: row.get(0)?,
                    level: row.get(1)?,
                    current_streak: row.get(2)?,
                    longest_streak: row.get(3)?,
                })
            },
        )
        .optional()?
        .unwrap_or(ProfileSummary {
            total_xp: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
        });

    let logs = aggregate::all_daily_logs(conn, user)?;
    let total_days = logs.len();
    let average_xp_per_day = if total_days > 0 {
        (profile.total_xp as f64 / total_days as f64).round() as i64
    } else {
        0
    };
    let goals_achieved = logs.iter().filter(|l| l.total_xp >= rules.daily_goal).count();
    let completion_rate = if total_days > 0 {
        (goals_achieved as f64 / total_days as f64 * 100.0).round() as i64
    } else {
        0
    };

    let best_day = logs
        .iter()
        .max_by_key(|l| l.total_xp)
        .map(|l| DayStat {
            date: l.log_date,
            xp: l.total_xp,
        });

    let last_7_days_xp = logs
        .iter()
        .filter(|l| {
            let age = (today - l.log_date).num_days();
            (0..7).contains(&age)
        })
        .map(|l| l.total_xp)
        .sum();

    let (categories, quest_frequency, total_completions) = completion_breakdown(conn, user)?;

    let total_quests: i64 = conn.query_row("SELECT COUNT(*) FROM quests", [], |row| row.get(0))?;

    Ok(StatsResponse {
        profile,
        overview: StatsOverview {
            total_days_tracked: total_days,
            average_xp_per_day,
            goals_achieved,
            completion_rate,
            best_day,
            last_7_days_xp,
        },
        categories,
        quest_frequency,
        total_quests,
        total_completions,
    })
}

/// Group the user's completions by quest category and by quest name.
///
/// Completions whose quest was deleted fall into the `Other` category and
/// an `Unknown` frequency bucket.
fn completion_breakdown(
    conn: &Connection,
    user: &str,
) -> QuestResult<(HashMap<String, CategoryStat>, HashMap<String, i64>, i64)> {
    let mut stmt = conn.prepare(
        "SELECT c.xp_earned, q.category, q.name \
         FROM quest_completions c LEFT JOIN quests q ON q.id = c.quest_id \
         WHERE c.user_id = ?1",
    )?;
    let rows: Vec<(i64, Option<String>, Option<String>)> = stmt
        .query_map(params![user], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut categories: HashMap<String, CategoryStat> = HashMap::new();
    let mut frequency: HashMap<String, i64> = HashMap::new();
    let total = rows.len() as i64;

    for (xp, category, name) in rows {
        let entry = categories
            .entry(category.unwrap_or_else(|| "Other".to_string()))
            .or_default();
        entry.count += 1;
        entry.xp += xp;

        *frequency
            .entry(name.unwrap_or_else(|| "Unknown".to_string()))
            .or_insert(0) += 1;
    }

    Ok((categories, frequency, total))
}

/// One leaderboard row.
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub username: String,
    pub total_xp: i64,
    pub level: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    /// XP earned today, 0 when the user has no aggregate row yet.
    pub today_xp: i64,
}

/// Rank the given identities by lifetime XP, with today's XP joined in.
/// Identities are opaque strings supplied by the caller — the social graph
/// that selects them lives outside this crate.
pub fn leaderboard(
    conn: &Connection,
    user_ids: &[String],
    today: NaiveDate,
) -> QuestResult<Vec<LeaderboardEntry>> {
    let mut entries = Vec::new();
    for user in user_ids {
        let row = conn
            .query_row(
                "SELECT id, username, total_xp, level, current_streak, longest_streak \
                 FROM profiles WHERE id = ?1",
                params![user],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, username, total_xp, level, current_streak, longest_streak)) = row else {
            continue;
        };

        let today_xp = aggregate::get_daily_log(conn, &id, today)?
            .map(|l| l.total_xp)
            .unwrap_or(0);

        entries.push(LeaderboardEntry {
            id,
            username,
            total_xp,
            level,
            current_streak,
            longest_streak,
            today_xp,
        });
    }

    entries.sort_by(|a, b| b.total_xp.cmp(&a.total_xp));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::ledger::completions::record_completion;
    use crate::ledger::quests;
    use crate::ledger::types::NewQuest;

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn rules() -> RulesConfig {
        RulesConfig::default()
    }

    fn make_quest(conn: &Connection, name: &str, xp: i64, category: &str) -> String {
        quests::create_quest(
            conn,
            None,
            &NewQuest {
                name: name.into(),
                xp_value: Some(xp),
                category: Some(category.into()),
                ..Default::default()
            },
        )
        .unwrap()
        .id
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn empty_user_stats() {
        let conn = test_db();
        let stats = user_stats(&conn, &rules(), "u1", date("2025-01-15")).unwrap();
        assert_eq!(stats.overview.total_days_tracked, 0);
        assert_eq!(stats.overview.completion_rate, 0);
        assert_eq!(stats.profile.level, 1);
        assert!(stats.overview.best_day.is_none());
        assert_eq!(stats.total_completions, 0);
    }

    #[test]
    fn stats_aggregate_categories_and_frequency() {
        let mut conn = test_db();
        let workout = make_quest(&conn, "Workout", 30, "fitness");
        let reading = make_quest(&conn, "Read", 50, "mind");

        record_completion(&mut conn, &rules(), "u1", "t", &workout, Some(date("2025-01-14"))).unwrap();
        record_completion(&mut conn, &rules(), "u1", "t", &workout, Some(date("2025-01-15"))).unwrap();
        record_completion(&mut conn, &rules(), "u1", "t", &reading, Some(date("2025-01-15"))).unwrap();

        let stats = user_stats(&conn, &rules(), "u1", date("2025-01-15")).unwrap();
        assert_eq!(stats.overview.total_days_tracked, 2);
        assert_eq!(stats.overview.goals_achieved, 1); // only Jan 15 hits 80
        assert_eq!(stats.overview.completion_rate, 50);
        assert_eq!(stats.overview.last_7_days_xp, 110);
        assert_eq!(stats.overview.best_day.as_ref().unwrap().xp, 80);
        assert_eq!(stats.categories["fitness"].count, 2);
        assert_eq!(stats.categories["fitness"].xp, 60);
        assert_eq!(stats.quest_frequency["Workout"], 2);
        assert_eq!(stats.total_completions, 3);
        // average per tracked day: 110 / 2 = 55
        assert_eq!(stats.overview.average_xp_per_day, 55);
    }

    #[test]
    fn deleted_quest_falls_into_other_bucket() {
        let mut conn = test_db();
        let workout = make_quest(&conn, "Workout", 30, "fitness");
        record_completion(&mut conn, &rules(), "u1", "t", &workout, Some(date("2025-01-15"))).unwrap();
        quests::delete_quest(&conn, &workout).unwrap();

        let stats = user_stats(&conn, &rules(), "u1", date("2025-01-15")).unwrap();
        assert_eq!(stats.categories["Other"].count, 1);
        assert_eq!(stats.quest_frequency["Unknown"], 1);
    }

    #[test]
    fn leaderboard_orders_by_total_xp_with_today() {
        let mut conn = test_db();
        let big = make_quest(&conn, "Epic", 100, "fitness");
        let small = make_quest(&conn, "Walk", 10, "fitness");

        record_completion(&mut conn, &rules(), "alice", "alice", &big, Some(date("2025-01-15"))).unwrap();
        record_completion(&mut conn, &rules(), "bob", "bob", &small, Some(date("2025-01-15"))).unwrap();

        let board = leaderboard(
            &conn,
            &["bob".to_string(), "alice".to_string(), "ghost".to_string()],
            date("2025-01-15"),
        )
        .unwrap();

        assert_eq!(board.len(), 2); // unknown identities are skipped
        assert_eq!(board[0].username, "alice");
        assert_eq!(board[0].today_xp, 100);
        assert_eq!(board[1].username, "bob");
    }
}
