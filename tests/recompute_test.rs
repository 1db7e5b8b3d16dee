mod helpers;

use helpers::{complete, date, make_quest, rules, test_db};
use questlog::ledger::aggregate::{get_daily_log, recompute_user, reset_day};
use questlog::ledger::profile::get_profile;
use rusqlite::params;

#[test]
fn recompute_repairs_drifted_aggregate_and_profile() {
    let mut conn = test_db();
    let quest = make_quest(&conn, "Workout", 30);
    complete(&mut conn, &quest, "2025-01-14");
    complete(&mut conn, &quest, "2025-01-15");

    // Simulate the drift a partial failure would leave behind
    conn.execute(
        "UPDATE daily_logs SET total_xp = 999 WHERE log_date = '2025-01-15'",
        params![],
    )
    .unwrap();
    conn.execute("UPDATE profiles SET total_xp = 5, level = 9 WHERE id = 'u1'", params![])
        .unwrap();

    let outcome = recompute_user(&mut conn, &rules(), "u1", "tester").unwrap();
    assert_eq!(outcome.days_rebuilt, 2);
    assert_eq!(outcome.total_xp, 60);
    assert_eq!(outcome.level, 1);

    let day = get_daily_log(&conn, "u1", date("2025-01-15")).unwrap().unwrap();
    assert_eq!(day.total_xp, 30);

    let profile = get_profile(&conn, "u1").unwrap();
    assert_eq!(profile.total_xp, 60);
    assert_eq!(profile.level, 1);
}

#[test]
fn recompute_rebuilds_streaks() {
    let mut conn = test_db();
    let quest = make_quest(&conn, "Goal quest", 70);
    for day in ["2025-01-13", "2025-01-14", "2025-01-15"] {
        complete(&mut conn, &quest, day);
    }
    conn.execute(
        "UPDATE profiles SET current_streak = 0, longest_streak = 0 WHERE id = 'u1'",
        params![],
    )
    .unwrap();

    let outcome = recompute_user(&mut conn, &rules(), "u1", "tester").unwrap();
    assert_eq!(outcome.current_streak, 3);
    assert_eq!(outcome.longest_streak, 3);
}

#[test]
fn recompute_on_empty_ledger_zeroes_everything() {
    let mut conn = test_db();
    let outcome = recompute_user(&mut conn, &rules(), "u1", "tester").unwrap();
    assert_eq!(outcome.days_rebuilt, 0);
    assert_eq!(outcome.total_xp, 0);
    assert_eq!(outcome.level, 1);
}

#[test]
fn reset_day_removes_completions_and_aggregate() {
    let mut conn = test_db();
    let quest = make_quest(&conn, "Workout", 30);
    complete(&mut conn, &quest, "2025-01-14");
    complete(&mut conn, &quest, "2025-01-15");
    complete(&mut conn, &quest, "2025-01-15");

    let outcome = reset_day(&mut conn, &rules(), "u1", date("2025-01-15")).unwrap();
    assert_eq!(outcome.completions_removed, 2);
    assert_eq!(outcome.xp_removed, 60);

    assert!(get_daily_log(&conn, "u1", date("2025-01-15")).unwrap().is_none());

    let profile = get_profile(&conn, "u1").unwrap();
    assert_eq!(profile.total_xp, 30); // the untouched day remains

    let remaining: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM quest_completions WHERE completion_date = '2025-01-15'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn reset_of_empty_day_is_a_no_op() {
    let mut conn = test_db();
    let quest = make_quest(&conn, "Workout", 30);
    complete(&mut conn, &quest, "2025-01-14");

    let outcome = reset_day(&mut conn, &rules(), "u1", date("2025-01-15")).unwrap();
    assert_eq!(outcome.completions_removed, 0);
    assert_eq!(outcome.xp_removed, 0);

    let profile = get_profile(&conn, "u1").unwrap();
    assert_eq!(profile.total_xp, 30);
}
