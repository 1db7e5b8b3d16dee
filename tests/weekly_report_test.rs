mod helpers;

use helpers::{complete, date, make_quest, rules, test_db};
use questlog::ledger::aggregate::all_daily_logs;
use questlog::ledger::profile::get_profile;
use questlog::notify::{inactivity_check, weekly_summary, WeekTier};

#[test]
fn perfect_week_through_the_record_path() {
    let mut conn = test_db();
    let quest = make_quest(&conn, "Goal quest", 70);

    for day in 9..=15 {
        complete(&mut conn, &quest, &format!("2025-01-{day:02}"));
    }

    let profile = get_profile(&conn, "u1").unwrap();
    let logs = all_daily_logs(&conn, "u1").unwrap();
    let (stats, email) = weekly_summary(
        &profile,
        &logs,
        date("2025-01-09"),
        date("2025-01-15"),
        &rules(),
    );

    assert_eq!(stats.days_goal_met, 7);
    assert!(stats.perfect_week);
    assert_eq!(stats.tier, WeekTier::Perfect);
    assert_eq!(stats.window_streak, 7);
    assert!(email.html.contains("PERFECT WEEK"));
    assert!(email.subject.contains("490 XP"));
}

#[test]
fn partial_week_is_not_perfect() {
    let mut conn = test_db();
    let quest = make_quest(&conn, "Goal quest", 70);

    // Only 6 of the 7 window days logged
    for day in 9..=14 {
        complete(&mut conn, &quest, &format!("2025-01-{day:02}"));
    }

    let profile = get_profile(&conn, "u1").unwrap();
    let logs = all_daily_logs(&conn, "u1").unwrap();
    let (stats, _) = weekly_summary(
        &profile,
        &logs,
        date("2025-01-09"),
        date("2025-01-15"),
        &rules(),
    );

    assert_eq!(stats.days_goal_met, 6);
    assert!(!stats.perfect_week);
    assert_eq!(stats.tier, WeekTier::Great);
}

#[test]
fn weekly_breakdown_lists_each_day() {
    let mut conn = test_db();
    let quest = make_quest(&conn, "Goal quest", 70);
    complete(&mut conn, &quest, "2025-01-12");

    let profile = get_profile(&conn, "u1").unwrap();
    let logs = all_daily_logs(&conn, "u1").unwrap();
    let (_, email) = weekly_summary(
        &profile,
        &logs,
        date("2025-01-09"),
        date("2025-01-15"),
        &rules(),
    );

    assert!(email.html.contains("2025-01-12: 70 XP (1 quests)"));
}

#[test]
fn inactivity_uses_last_active_date_from_ledger() {
    let mut conn = test_db();
    let quest = make_quest(&conn, "Goal quest", 70);
    complete(&mut conn, &quest, "2025-01-10");

    let profile = get_profile(&conn, "u1").unwrap();

    let fresh = inactivity_check(&profile, date("2025-01-11"), &rules());
    assert_eq!(fresh.days_inactive, 1);
    assert!(fresh.email.is_none());

    let stale = inactivity_check(&profile, date("2025-01-14"), &rules());
    assert_eq!(stale.days_inactive, 4);
    assert!(stale.email.is_some());
    assert!(stale.email.unwrap().html.contains("4 days"));
}
