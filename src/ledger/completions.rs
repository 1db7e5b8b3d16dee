//! Completion ledger — the write path for quest toggles.
//!
//! [`record_completion`] and [`remove_completion`] are the only entry points.
//! Each runs the full pipeline inside a single transaction: ledger write,
//! daily-aggregate delta, profile delta, streak recomputation, and audit log.
//! A mid-sequence failure therefore leaves no partial state — the cached
//! views never drift from the ledger.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::error::{QuestError, QuestResult};
use crate::ledger::activity::{log_activity, ActivityAction};
use crate::ledger::types::{QuestCompletion, RepeatPolicy};
use crate::ledger::{aggregate, now_rfc3339, profile, quests, today};

const COMPLETION_COLUMNS: &str =
    "id, user_id, quest_id, completion_date, xp_earned, completed_at";

/// Result returned from recording a completion.
#[derive(Debug, Serialize)]
pub struct RecordOutcome {
    pub completion_id: String,
    pub quest_id: String,
    /// Snapshot of the quest's xp_value at record time.
    pub xp_earned: i64,
    /// The day's aggregate after this completion.
    pub day_total_xp: i64,
    pub day_quests_completed: i64,
    /// Lifetime totals after this completion.
    pub total_xp: i64,
    pub level: i64,
    /// `true` only when a positive-XP completion pushed the level up.
    pub leveled_up: bool,
}

/// Result returned from removing a completion.
#[derive(Debug, Serialize)]
pub struct RemoveOutcome {
    pub completion_id: String,
    pub xp_deducted: i64,
    pub day_total_xp: i64,
    pub total_xp: i64,
    pub level: i64,
}

/// Record a quest completion for `date` (default: today).
///
/// The full pipeline runs inside one transaction: quest lookup, repeat-policy
/// gate, ledger insert with the XP snapshot, aggregate delta, profile delta
/// (which also stamps `last_active_date`), streak recomputation, audit log.
pub fn record_completion(
    conn: &mut Connection,
    rules: &RulesConfig,
    user: &str,
    username: &str,
    quest_id: &str,
    date: Option<NaiveDate>,
) -> QuestResult<RecordOutcome> {
    let date = date.unwrap_or_else(today);
    let tx = conn.transaction()?;

    // 1. Quest lookup — the xp_value snapshot source
    let quest = quests::get_quest(&tx, quest_id)?;

    // 2. Repeat-policy gate
    if rules.completion_policy == RepeatPolicy::OncePerDay {
        let done: i64 = tx.query_row(
            "SELECT COUNT(*) FROM quest_completions \
             WHERE user_id = ?1 AND quest_id = ?2 AND completion_date = ?3",
            params![user, quest_id, date.to_string()],
            |row| row.get(0),
        )?;
        if done > 0 {
            return Err(QuestError::invalid(format!(
                "quest {quest_id} already completed on {date}"
            )));
        }
    }

    // 3. Ledger insert
    let completion_id = uuid::Uuid::now_v7().to_string();
    tx.execute(
        "INSERT INTO quest_completions (id, user_id, quest_id, completion_date, xp_earned, completed_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            completion_id,
            user,
            quest_id,
            date.to_string(),
            quest.xp_value,
            now_rfc3339(),
        ],
    )?;

    // 4. Aggregate delta — the counter only tracks positive-XP completions
    let count_delta = if quest.xp_value > 0 { 1 } else { 0 };
    let day = aggregate::apply_day_delta(&tx, user, date, quest.xp_value, count_delta)?;

    // 5. Profile delta, stamping the active date
    profile::get_or_create_profile(&tx, user, username)?;
    let xp = profile::apply_xp_delta(&tx, rules, user, quest.xp_value, Some(date))?;
    let leveled_up = xp.new_level > xp.old_level && quest.xp_value > 0;

    // 6. Streak counters follow the updated history
    profile::recompute_streaks(&tx, rules, user)?;

    // 7. Audit log
    log_activity(
        &tx,
        user,
        &ActivityAction::QuestCompleted {
            quest_id: quest.id.clone(),
            quest_name: quest.name.clone(),
            date,
        },
        quest.xp_value,
    )?;
    if leveled_up {
        log_activity(
            &tx,
            user,
            &ActivityAction::LevelUp {
                from_level: xp.old_level,
                to_level: xp.new_level,
            },
            0,
        )?;
    }

    tx.commit()?;

    tracing::info!(
        user,
        quest = %quest.name,
        xp = quest.xp_value,
        %date,
        leveled_up,
        "recorded completion"
    );

    Ok(RecordOutcome {
        completion_id,
        quest_id: quest.id,
        xp_earned: quest.xp_value,
        day_total_xp: day.total_xp,
        day_quests_completed: day.quests_completed,
        total_xp: xp.total_xp,
        level: xp.new_level,
        leveled_up,
    })
}

/// Remove a completion (toggle-off), reversing exactly what its insertion
/// did: aggregate and profile XP come back off (clamped at zero), and the
/// day counter decrements only if the completion had incremented it.
/// `last_active_date` is left untouched.
pub fn remove_completion(
    conn: &mut Connection,
    rules: &RulesConfig,
    user: &str,
    completion_id: &str,
) -> QuestResult<RemoveOutcome> {
    let tx = conn.transaction()?;

    // 1. Fetch the ledger record
    let completion = tx
        .query_row(
            &format!(
                "SELECT {COMPLETION_COLUMNS} FROM quest_completions WHERE id = ?1 AND user_id = ?2"
            ),
            params![completion_id, user],
            |row| QuestCompletion::from_row(row),
        )
        .optional()?
        .ok_or_else(|| QuestError::not_found(format!("completion {completion_id}")))?;

    // 2. Delete it
    tx.execute(
        "DELETE FROM quest_completions WHERE id = ?1",
        params![completion_id],
    )?;

    // 3. Reverse the aggregate delta
    let count_delta = if completion.xp_earned > 0 { -1 } else { 0 };
    let day = aggregate::apply_day_delta(
        &tx,
        user,
        completion.completion_date,
        -completion.xp_earned,
        count_delta,
    )?;

    // 4. Reverse the profile delta (no active-date change on removal)
    let xp = profile::apply_xp_delta(&tx, rules, user, -completion.xp_earned, None)?;

    // 5. Streaks follow the updated history
    profile::recompute_streaks(&tx, rules, user)?;

    // 6. Audit log
    log_activity(
        &tx,
        user,
        &ActivityAction::QuestUnchecked {
            completion_id: completion.id.clone(),
            quest_id: completion.quest_id.clone(),
            date: completion.completion_date,
        },
        -completion.xp_earned,
    )?;

    tx.commit()?;

    tracing::info!(user, completion_id, xp = completion.xp_earned, "removed completion");

    Ok(RemoveOutcome {
        completion_id: completion.id,
        xp_deducted: completion.xp_earned,
        day_total_xp: day.total_xp,
        total_xp: xp.total_xp,
        level: xp.new_level,
    })
}

/// Date filter for completion queries: an exact date wins; otherwise an
/// inclusive `[from, to]` range, either end optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionQuery {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Query a user's completions, most recent toggle first.
pub fn query_completions(
    conn: &Connection,
    user: &str,
    query: &CompletionQuery,
) -> QuestResult<Vec<QuestCompletion>> {
    let mut sql =
        format!("SELECT {COMPLETION_COLUMNS} FROM quest_completions WHERE user_id = ?1");
    let mut args: Vec<String> = vec![user.to_string()];

    if let Some(date) = query.date {
        args.push(date.to_string());
        sql.push_str(&format!(" AND completion_date = ?{}", args.len()));
    } else {
        if let Some(from) = query.from {
            args.push(from.to_string());
            sql.push_str(&format!(" AND completion_date >= ?{}", args.len()));
        }
        if let Some(to) = query.to {
            args.push(to.to_string());
            sql.push_str(&format!(" AND completion_date <= ?{}", args.len()));
        }
    }
    sql.push_str(" ORDER BY completed_at DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let completions = stmt
        .query_map(rusqlite::params_from_iter(args), |row| {
            QuestCompletion::from_row(row)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(completions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::ledger::types::NewQuest;

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn rules() -> RulesConfig {
        RulesConfig::default()
    }

    fn make_quest(conn: &Connection, name: &str, xp: i64) -> String {
        quests::create_quest(
            conn,
            None,
            &NewQuest {
                name: name.into(),
                xp_value: Some(xp),
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
    fn record_creates_aggregate_and_profile() {
        let mut conn = test_db();
        let quest_id = make_quest(&conn, "Workout", 30);

        let outcome = record_completion(
            &mut conn,
            &rules(),
            "u1",
            "tester",
            &quest_id,
            Some(date("2025-01-15")),
        )
        .unwrap();

        assert_eq!(outcome.xp_earned, 30);
        assert_eq!(outcome.day_total_xp, 30);
        assert_eq!(outcome.day_quests_completed, 1);
        assert_eq!(outcome.total_xp, 30);
        assert_eq!(outcome.level, 1);
        assert!(!outcome.leveled_up);

        let profile = profile::get_profile(&conn, "u1").unwrap();
        assert_eq!(profile.total_xp, 30);
        assert_eq!(profile.last_active_date, Some(date("2025-01-15")));
    }

    #[test]
    fn record_missing_quest_is_not_found() {
        let mut conn = test_db();
        let result = record_completion(&mut conn, &rules(), "u1", "tester", "ghost", None);
        assert!(matches!(result, Err(QuestError::NotFound(_))));

        // Nothing was written by the failed call
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM quest_completions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn remove_reverses_record_exactly() {
        let mut conn = test_db();
        let quest_id = make_quest(&conn, "Workout", 30);

        let recorded = record_completion(
            &mut conn,
            &rules(),
            "u1",
            "tester",
            &quest_id,
            Some(date("2025-01-15")),
        )
        .unwrap();

        let removed =
            remove_completion(&mut conn, &rules(), "u1", &recorded.completion_id).unwrap();
        assert_eq!(removed.xp_deducted, 30);
        assert_eq!(removed.day_total_xp, 0);
        assert_eq!(removed.total_xp, 0);
        assert_eq!(removed.level, 1);

        let day = aggregate::get_daily_log(&conn, "u1", date("2025-01-15"))
            .unwrap()
            .unwrap();
        assert_eq!(day.total_xp, 0);
        assert_eq!(day.quests_completed, 0);
    }

    #[test]
    fn remove_missing_completion_is_not_found() {
        let mut conn = test_db();
        let result = remove_completion(&mut conn, &rules(), "u1", "ghost");
        assert!(matches!(result, Err(QuestError::NotFound(_))));
    }

    #[test]
    fn penalty_completion_skips_counter_both_ways() {
        let mut conn = test_db();
        let workout = make_quest(&conn, "Workout", 30);
        let junk = make_quest(&conn, "Junk food", -15);

        record_completion(&mut conn, &rules(), "u1", "tester", &workout, Some(date("2025-01-15"))).unwrap();
        let penalty = record_completion(
            &mut conn,
            &rules(),
            "u1",
            "tester",
            &junk,
            Some(date("2025-01-15")),
        )
        .unwrap();
        assert_eq!(penalty.day_total_xp, 15);
        assert_eq!(penalty.day_quests_completed, 1); // counter untouched by the penalty

        let removed = remove_completion(&mut conn, &rules(), "u1", &penalty.completion_id).unwrap();
        assert_eq!(removed.day_total_xp, 30);
        let day = aggregate::get_daily_log(&conn, "u1", date("2025-01-15"))
            .unwrap()
            .unwrap();
        assert_eq!(day.quests_completed, 1); // still untouched on reversal
    }

    #[test]
    fn level_up_signals_only_on_positive_xp() {
        let mut conn = test_db();
        let big = make_quest(&conn, "Epic", 520);

        let outcome = record_completion(&mut conn, &rules(), "u1", "tester", &big, None).unwrap();
        assert!(outcome.leveled_up);
        assert_eq!(outcome.level, 2);

        // A penalty never signals, even when it changes nothing upward
        let junk = make_quest(&conn, "Junk food", -15);
        let penalty = record_completion(&mut conn, &rules(), "u1", "tester", &junk, None).unwrap();
        assert!(!penalty.leveled_up);
    }

    #[test]
    fn once_per_day_policy_rejects_duplicates() {
        let mut conn = test_db();
        let quest_id = make_quest(&conn, "Workout", 30);
        let strict = RulesConfig {
            completion_policy: RepeatPolicy::OncePerDay,
            ..RulesConfig::default()
        };

        record_completion(&mut conn, &strict, "u1", "tester", &quest_id, Some(date("2025-01-15"))).unwrap();
        let dup = record_completion(
            &mut conn,
            &strict,
            "u1",
            "tester",
            &quest_id,
            Some(date("2025-01-15")),
        );
        assert!(matches!(dup, Err(QuestError::InvalidInput(_))));

        // Another date is fine
        record_completion(&mut conn, &strict, "u1", "tester", &quest_id, Some(date("2025-01-16"))).unwrap();
    }

    #[test]
    fn repeatable_policy_allows_duplicates() {
        let mut conn = test_db();
        let quest_id = make_quest(&conn, "Hydrate", 10);

        for _ in 0..3 {
            record_completion(&mut conn, &rules(), "u1", "tester", &quest_id, Some(date("2025-01-15"))).unwrap();
        }
        let day = aggregate::get_daily_log(&conn, "u1", date("2025-01-15"))
            .unwrap()
            .unwrap();
        assert_eq!(day.total_xp, 30);
        assert_eq!(day.quests_completed, 3);
    }

    #[test]
    fn quest_deletion_preserves_history() {
        let mut conn = test_db();
        let quest_id = make_quest(&conn, "Workout", 30);
        record_completion(&mut conn, &rules(), "u1", "tester", &quest_id, Some(date("2025-01-15"))).unwrap();

        quests::delete_quest(&conn, &quest_id).unwrap();

        let day = aggregate::get_daily_log(&conn, "u1", date("2025-01-15"))
            .unwrap()
            .unwrap();
        assert_eq!(day.total_xp, 30);
        let profile = profile::get_profile(&conn, "u1").unwrap();
        assert_eq!(profile.total_xp, 30);
    }

    #[test]
    fn query_by_exact_date_and_range() {
        let mut conn = test_db();
        let quest_id = make_quest(&conn, "Workout", 30);
        for d in ["2025-01-14", "2025-01-15", "2025-01-16"] {
            record_completion(&mut conn, &rules(), "u1", "tester", &quest_id, Some(date(d))).unwrap();
        }

        let exact = query_completions(
            &conn,
            "u1",
            &CompletionQuery {
                date: Some(date("2025-01-15")),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].completion_date, date("2025-01-15"));

        let range = query_completions(
            &conn,
            "u1",
            &CompletionQuery {
                from: Some(date("2025-01-15")),
                to: Some(date("2025-01-16")),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(range.len(), 2);

        // Most recent toggle first
        let all = query_completions(&conn, "u1", &CompletionQuery::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].completed_at >= all[1].completed_at);
    }
}
