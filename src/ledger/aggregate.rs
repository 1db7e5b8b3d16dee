//! Daily aggregate maintenance.
//!
//! One row per (user, date) caches the day's XP total and positive-completion
//! count. Rows are created lazily on first completion, updated incrementally
//! in lockstep with the ledger, and never recomputed on the hot path. A full
//! rebuild from the ledger exists for repair and testing.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::RulesConfig;
use crate::error::{QuestError, QuestResult};
use crate::ledger::activity::{log_activity, ActivityAction};
use crate::ledger::profile;
use crate::ledger::types::DailyLog;

const LOG_COLUMNS: &str = "id, user_id, log_date, total_xp, quests_completed";

/// Apply an incremental delta to the (user, date) aggregate, creating the row
/// if absent. Both fields are clamped at zero. Callers pass `count_delta = 0`
/// for non-positive completions — penalty and neutral quests change
/// `total_xp` but never the completion counter.
pub fn apply_day_delta(
    conn: &Connection,
    user: &str,
    date: NaiveDate,
    xp_delta: i64,
    count_delta: i64,
) -> QuestResult<DailyLog> {
    let existing = get_daily_log(conn, user, date)?;

    match existing {
        Some(log) => {
            conn.execute(
                "UPDATE daily_logs SET total_xp = MAX(0, total_xp + ?1), \
                 quests_completed = MAX(0, quests_completed + ?2) WHERE id = ?3",
                params![xp_delta, count_delta, log.id],
            )?;
        }
        None => {
            conn.execute(
                "INSERT INTO daily_logs (id, user_id, log_date, total_xp, quests_completed) \
                 VALUES (?1, ?2, ?3, MAX(0, ?4), MAX(0, ?5))",
                params![
                    uuid::Uuid::now_v7().to_string(),
                    user,
                    date.to_string(),
                    xp_delta,
                    count_delta,
                ],
            )?;
        }
    }

    get_daily_log(conn, user, date)?
        .ok_or_else(|| QuestError::not_found(format!("daily log for {date}")))
}

/// Fetch the aggregate row for one (user, date), if present.
pub fn get_daily_log(
    conn: &Connection,
    user: &str,
    date: NaiveDate,
) -> QuestResult<Option<DailyLog>> {
    let log = conn
        .query_row(
            &format!("SELECT {LOG_COLUMNS} FROM daily_logs WHERE user_id = ?1 AND log_date = ?2"),
            params![user, date.to_string()],
            |row| DailyLog::from_row(row),
        )
        .optional()?;
    Ok(log)
}

/// List aggregates for a user, newest first, with an optional inclusive
/// date range and a row limit.
pub fn list_daily_logs(
    conn: &Connection,
    user: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    limit: usize,
) -> QuestResult<Vec<DailyLog>> {
    let mut sql = format!("SELECT {LOG_COLUMNS} FROM daily_logs WHERE user_id = ?1");
    let mut args: Vec<String> = vec![user.to_string()];

    if let Some(from) = from {
        args.push(from.to_string());
        sql.push_str(&format!(" AND log_date >= ?{}", args.len()));
    }
    if let Some(to) = to {
        args.push(to.to_string());
        sql.push_str(&format!(" AND log_date <= ?{}", args.len()));
    }
    sql.push_str(&format!(" ORDER BY log_date DESC LIMIT {limit}"));

    let mut stmt = conn.prepare(&sql)?;
    let logs = stmt
        .query_map(rusqlite::params_from_iter(args), |row| DailyLog::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(logs)
}

/// All aggregates for a user, oldest first. The streak scan and the insights
/// window both read this shape.
pub fn all_daily_logs(conn: &Connection, user: &str) -> QuestResult<Vec<DailyLog>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOG_COLUMNS} FROM daily_logs WHERE user_id = ?1 ORDER BY log_date"
    ))?;
    let logs = stmt
        .query_map(params![user], |row| DailyLog::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(logs)
}

/// Rebuild one (user, date) aggregate from the completion ledger.
pub fn recompute_day(conn: &Connection, user: &str, date: NaiveDate) -> QuestResult<DailyLog> {
    let (total, count) = ledger_day_sums(conn, user, date)?;

    conn.execute(
        "DELETE FROM daily_logs WHERE user_id = ?1 AND log_date = ?2",
        params![user, date.to_string()],
    )?;
    apply_day_delta(conn, user, date, total, count)
}

/// Sum the live ledger for one day: signed XP total and positive-XP count.
fn ledger_day_sums(conn: &Connection, user: &str, date: NaiveDate) -> QuestResult<(i64, i64)> {
    let sums = conn.query_row(
        "SELECT COALESCE(SUM(xp_earned), 0), \
                COALESCE(SUM(CASE WHEN xp_earned > 0 THEN 1 ELSE 0 END), 0) \
         FROM quest_completions WHERE user_id = ?1 AND completion_date = ?2",
        params![user, date.to_string()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(sums)
}

/// Outcome of a full per-user rebuild.
#[derive(Debug, serde::Serialize)]
pub struct RecomputeOutcome {
    pub days_rebuilt: usize,
    pub total_xp: i64,
    pub level: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
}

/// Rebuild every aggregate and the profile totals from the completion
/// ledger, inside one transaction. Repairs any drift between the cached
/// views and the source of truth.
pub fn recompute_user(
    conn: &mut Connection,
    rules: &RulesConfig,
    user: &str,
    username: &str,
) -> QuestResult<RecomputeOutcome> {
    let tx = conn.transaction()?;

    // 1. Distinct ledger dates for this user
    let dates: Vec<NaiveDate> = {
        let mut stmt = tx.prepare(
            "SELECT DISTINCT completion_date FROM quest_completions \
             WHERE user_id = ?1 ORDER BY completion_date",
        )?;
        let raw = stmt
            .query_map(params![user], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        raw.iter()
            .map(|d| {
                d.parse::<NaiveDate>()
                    .map_err(|e| QuestError::invalid(format!("bad ledger date {d}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    // 2. Drop cached rows and rebuild each day from ledger sums
    tx.execute("DELETE FROM daily_logs WHERE user_id = ?1", params![user])?;
    for &date in &dates {
        let (total, count) = ledger_day_sums(&tx, user, date)?;
        apply_day_delta(&tx, user, date, total, count)?;
    }

    // 3. Profile totals follow the aggregates
    profile::get_or_create_profile(&tx, user, username)?;
    let total_xp: i64 = tx.query_row(
        "SELECT COALESCE(SUM(total_xp), 0) FROM daily_logs WHERE user_id = ?1",
        params![user],
        |row| row.get(0),
    )?;
    let level = profile::level_for_xp(total_xp.max(0), rules.xp_per_level);
    let last_active = dates.last().map(|d| d.to_string());
    tx.execute(
        "UPDATE profiles SET total_xp = ?1, level = ?2, last_active_date = ?3 WHERE id = ?4",
        params![total_xp.max(0), level, last_active, user],
    )?;

    // 4. Streak counters follow the rebuilt history
    let (current_streak, longest_streak) = profile::recompute_streaks(&tx, rules, user)?;

    tx.commit()?;

    tracing::info!(user, days = dates.len(), total_xp, "rebuilt aggregates from ledger");
    Ok(RecomputeOutcome {
        days_rebuilt: dates.len(),
        total_xp: total_xp.max(0),
        level,
        current_streak,
        longest_streak,
    })
}

/// Outcome of an explicit daily reset.
#[derive(Debug, serde::Serialize)]
pub struct ResetOutcome {
    pub date: NaiveDate,
    pub completions_removed: usize,
    pub xp_removed: i64,
}

/// Explicit daily reset: remove the date's completions and its aggregate
/// row, and reverse the day's contribution to the profile. The only path
/// that deletes an aggregate outside a rebuild.
pub fn reset_day(
    conn: &mut Connection,
    rules: &RulesConfig,
    user: &str,
    date: NaiveDate,
) -> QuestResult<ResetOutcome> {
    let tx = conn.transaction()?;

    let day = get_daily_log(&tx, user, date)?;
    let day_xp = day.as_ref().map(|l| l.total_xp).unwrap_or(0);

    let removed = tx.execute(
        "DELETE FROM quest_completions WHERE user_id = ?1 AND completion_date = ?2",
        params![user, date.to_string()],
    )?;
    tx.execute(
        "DELETE FROM daily_logs WHERE user_id = ?1 AND log_date = ?2",
        params![user, date.to_string()],
    )?;

    if day.is_some() {
        profile::apply_xp_delta(&tx, rules, user, -day_xp, None)?;
    }
    profile::recompute_streaks(&tx, rules, user)?;

    log_activity(&tx, user, &ActivityAction::DayReset { date }, -day_xp)?;

    tx.commit()?;

    Ok(ResetOutcome {
        date,
        completions_removed: removed,
        xp_removed: day_xp,
    })
}
