//! Profile accumulator — lifetime XP, level, and streak counters.
//!
//! The level is a pure function of total XP and is recomputed on every
//! change, never stored independently of the formula. Streaks are derived
//! from the full daily-log history by [`compute_streaks`], the single
//! authoritative algorithm, re-run inside every mutating transaction.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::RulesConfig;
use crate::error::{QuestError, QuestResult};
use crate::ledger::now_rfc3339;
use crate::ledger::types::{DailyLog, Profile};

const PROFILE_COLUMNS: &str =
    "id, username, total_xp, level, current_streak, longest_streak, last_active_date, created_at";

/// level = total_xp / xp_per_level + 1
pub fn level_for_xp(total_xp: i64, xp_per_level: i64) -> i64 {
    total_xp / xp_per_level + 1
}

/// Fetch a profile by user id.
pub fn get_profile(conn: &Connection, user: &str) -> QuestResult<Profile> {
    find_profile(conn, user)?.ok_or_else(|| QuestError::not_found(format!("profile {user}")))
}

/// Fetch a profile if it exists. Store errors still propagate.
pub fn find_profile(conn: &Connection, user: &str) -> QuestResult<Option<Profile>> {
    let profile = conn
        .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
            params![user],
            |row| Profile::from_row(row),
        )
        .optional()?;
    Ok(profile)
}

/// Fetch the profile, creating the per-user singleton on first touch.
pub fn get_or_create_profile(conn: &Connection, user: &str, username: &str) -> QuestResult<Profile> {
    if let Some(profile) = find_profile(conn, user)? {
        return Ok(profile);
    }

    conn.execute(
        "INSERT INTO profiles (id, username, total_xp, level, current_streak, longest_streak, created_at) \
         VALUES (?1, ?2, 0, 1, 0, 0, ?3)",
        params![user, username, now_rfc3339()],
    )?;
    tracing::info!(user, "created profile");
    get_profile(conn, user)
}

/// Result of applying an XP delta: the level transition for the caller's
/// level-up signal.
#[derive(Debug, Clone, Copy)]
pub struct XpDelta {
    pub old_level: i64,
    pub new_level: i64,
    pub total_xp: i64,
}

/// Apply a signed XP delta to the profile: `total_xp = max(0, total + delta)`
/// with the level recomputed from the result. `active_date` is set only on
/// insertion paths (completion recording), never on removal.
pub fn apply_xp_delta(
    conn: &Connection,
    rules: &RulesConfig,
    user: &str,
    delta: i64,
    active_date: Option<NaiveDate>,
) -> QuestResult<XpDelta> {
    let profile = get_profile(conn, user)?;
    let total_xp = (profile.total_xp + delta).max(0);
    let new_level = level_for_xp(total_xp, rules.xp_per_level);

    match active_date {
        Some(date) => {
            conn.execute(
                "UPDATE profiles SET total_xp = ?1, level = ?2, last_active_date = ?3 WHERE id = ?4",
                params![total_xp, new_level, date.to_string(), user],
            )?;
        }
        None => {
            conn.execute(
                "UPDATE profiles SET total_xp = ?1, level = ?2 WHERE id = ?3",
                params![total_xp, new_level, user],
            )?;
        }
    }

    Ok(XpDelta {
        old_level: profile.level,
        new_level,
        total_xp,
    })
}

/// Derive (current, longest) streaks from a user's daily-log history.
///
/// A pass day meets the daily goal. Runs must be calendar-consecutive: a
/// date gap breaks a streak just like a failed day. `current` is the run
/// ending at the most recent logged day (zero when that day fails).
pub fn compute_streaks(logs: &[DailyLog], daily_goal: i64) -> (i64, i64) {
    let mut sorted: Vec<&DailyLog> = logs.iter().collect();
    sorted.sort_by_key(|l| l.log_date);

    let mut longest: i64 = 0;
    let mut run: i64 = 0;
    let mut prev_date: Option<NaiveDate> = None;

    for log in &sorted {
        let pass = log.total_xp >= daily_goal;
        let consecutive = prev_date
            .map(|p| log.log_date == p + chrono::Days::new(1))
            .unwrap_or(false);

        run = match (pass, consecutive) {
            (true, true) => run + 1,
            (true, false) => 1,
            (false, _) => 0,
        };
        longest = longest.max(run);
        prev_date = Some(log.log_date);
    }

    // `run` now holds the streak ending at the most recent logged day
    (run, longest)
}

/// Re-derive and persist both streak counters from the full history.
pub fn recompute_streaks(
    conn: &Connection,
    rules: &RulesConfig,
    user: &str,
) -> QuestResult<(i64, i64)> {
    let logs = crate::ledger::aggregate::all_daily_logs(conn, user)?;
    let (current, longest) = compute_streaks(&logs, rules.daily_goal);

    conn.execute(
        "UPDATE profiles SET current_streak = ?1, longest_streak = ?2 WHERE id = ?3",
        params![current, longest, user],
    )?;
    Ok((current, longest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::ledger::aggregate::apply_day_delta;

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn rules() -> RulesConfig {
        RulesConfig::default()
    }

    fn log(d: &str, xp: i64) -> DailyLog {
        DailyLog {
            id: d.into(),
            user_id: "u1".into(),
            log_date: d.parse().unwrap(),
            total_xp: xp,
            quests_completed: 1,
        }
    }

    #[test]
    fn level_formula() {
        assert_eq!(level_for_xp(0, 500), 1);
        assert_eq!(level_for_xp(499, 500), 1);
        assert_eq!(level_for_xp(500, 500), 2);
        assert_eq!(level_for_xp(1499, 500), 3);
    }

    #[test]
    fn get_or_create_is_lazy_singleton() {
        let conn = test_db();
        let created = get_or_create_profile(&conn, "u1", "tester").unwrap();
        assert_eq!(created.total_xp, 0);
        assert_eq!(created.level, 1);

        let again = get_or_create_profile(&conn, "u1", "other-name").unwrap();
        assert_eq!(again.username, "tester"); // first creation wins
    }

    #[test]
    fn xp_delta_clamps_and_recomputes_level() {
        let conn = test_db();
        get_or_create_profile(&conn, "u1", "tester").unwrap();

        let up = apply_xp_delta(&conn, &rules(), "u1", 510, Some("2025-01-15".parse().unwrap())).unwrap();
        assert_eq!(up.old_level, 1);
        assert_eq!(up.new_level, 2);
        assert_eq!(up.total_xp, 510);

        let down = apply_xp_delta(&conn, &rules(), "u1", -600, None).unwrap();
        assert_eq!(down.total_xp, 0);
        assert_eq!(down.new_level, 1);

        let profile = get_profile(&conn, "u1").unwrap();
        assert_eq!(profile.last_active_date, Some("2025-01-15".parse().unwrap()));
    }

    #[test]
    fn missing_profile_is_not_found() {
        let conn = test_db();
        assert!(matches!(
            apply_xp_delta(&conn, &rules(), "ghost", 10, None),
            Err(QuestError::NotFound(_))
        ));
    }

    #[test]
    fn streaks_empty_history() {
        assert_eq!(compute_streaks(&[], 70), (0, 0));
    }

    #[test]
    fn streaks_all_pass_consecutive() {
        let logs = vec![
            log("2025-01-01", 70),
            log("2025-01-02", 80),
            log("2025-01-03", 100),
        ];
        assert_eq!(compute_streaks(&logs, 70), (3, 3));
    }

    #[test]
    fn streak_broken_by_fail_day() {
        let logs = vec![
            log("2025-01-01", 70),
            log("2025-01-02", 30),
            log("2025-01-03", 70),
            log("2025-01-04", 70),
        ];
        assert_eq!(compute_streaks(&logs, 70), (2, 2));
    }

    #[test]
    fn streak_broken_by_date_gap() {
        let logs = vec![
            log("2025-01-01", 70),
            log("2025-01-02", 70),
            log("2025-01-05", 70),
        ];
        // Missing Jan 3-4 breaks the run even though every logged day passes
        assert_eq!(compute_streaks(&logs, 70), (1, 2));
    }

    #[test]
    fn current_zero_when_latest_day_fails() {
        let logs = vec![
            log("2025-01-01", 70),
            log("2025-01-02", 70),
            log("2025-01-03", 10),
        ];
        assert_eq!(compute_streaks(&logs, 70), (0, 2));
    }

    #[test]
    fn longest_survives_later_shorter_runs() {
        let logs = vec![
            log("2025-01-01", 70),
            log("2025-01-02", 70),
            log("2025-01-03", 70),
            log("2025-01-04", 0),
            log("2025-01-05", 70),
        ];
        assert_eq!(compute_streaks(&logs, 70), (1, 3));
    }

    #[test]
    fn recompute_streaks_persists_counters() {
        let conn = test_db();
        get_or_create_profile(&conn, "u1", "tester").unwrap();
        for d in ["2025-01-01", "2025-01-02", "2025-01-03"] {
            apply_day_delta(&conn, "u1", d.parse().unwrap(), 75, 1).unwrap();
        }

        let (current, longest) = recompute_streaks(&conn, &rules(), "u1").unwrap();
        assert_eq!((current, longest), (3, 3));

        let profile = get_profile(&conn, "u1").unwrap();
        assert_eq!(profile.current_streak, 3);
        assert_eq!(profile.longest_streak, 3);
    }
}
