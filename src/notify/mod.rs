//! Notification content generation.
//!
//! Pure functions from aggregate data to `{subject, html}` bodies: the daily
//! check-in, the inactivity reminder, and the weekly summary. Nothing here
//! schedules or sends anything — an external cron calls in, and the email
//! dispatch collaborator handles delivery. Generated content is logged to
//! the `notifications` table for that dispatcher to pick up.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::config::RulesConfig;
use crate::error::QuestResult;
use crate::ledger::now_rfc3339;
use crate::ledger::types::{DailyLog, Profile};

/// Sentinel for "never active" — matches the treatment of users who have no
/// recorded activity at all.
const NEVER_ACTIVE_DAYS: i64 = 999;

/// Rendered email content, ready for the dispatch collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// Daily check-in: today's progress against the goal plus lifetime status.
pub fn check_in_email(
    profile: &Profile,
    today_log: Option<&DailyLog>,
    rules: &RulesConfig,
) -> EmailContent {
    let today_xp = today_log.map(|l| l.total_xp).unwrap_or(0);
    let quests_done = today_log.map(|l| l.quests_completed).unwrap_or(0);
    let verdict = if today_xp >= rules.daily_goal {
        "MISSION COMPLETE! Keep crushing it!"
    } else {
        "Keep going! You got this!"
    };

    let html = format!(
        "<div style=\"font-family: Inter, system-ui; color: #0f172a;\">\
         <h2 style=\"margin:0 0 8px;\">Daily Check-In</h2>\
         <p style=\"margin:0 0 8px;\">Today's XP: <strong>{today_xp}</strong> / {goal}</p>\
         <p style=\"margin:0 0 8px;\">Quests Completed: {quests_done}</p>\
         <p style=\"margin:0 0 8px;\">Total XP: {total} &middot; Level {level}</p>\
         <p style=\"margin:0 0 8px;\">Streak: {streak} day(s)</p>\
         <p style=\"margin:12px 0 0;\"><strong>{verdict}</strong></p>\
         </div>",
        goal = rules.daily_goal,
        total = profile.total_xp,
        level = profile.level,
        streak = profile.current_streak,
    );

    EmailContent {
        subject: format!("Questlog Daily Check-In ({today_xp} XP)"),
        html,
    }
}

/// Result of the inactivity check. The email is only rendered once the
/// threshold is crossed.
#[derive(Debug, Serialize)]
pub struct InactivityCheck {
    pub days_inactive: i64,
    pub email: Option<EmailContent>,
}

/// Inactivity reminder: fires when `last_active_date` is at least
/// `rules.inactivity_days` whole days ago. A profile with no activity at all
/// counts as long-inactive.
pub fn inactivity_check(profile: &Profile, today: NaiveDate, rules: &RulesConfig) -> InactivityCheck {
    let days_inactive = profile
        .last_active_date
        .map(|d| (today - d).num_days())
        .unwrap_or(NEVER_ACTIVE_DAYS);

    if days_inactive < rules.inactivity_days {
        return InactivityCheck {
            days_inactive,
            email: None,
        };
    }

    let html = format!(
        "<div style=\"font-family: Inter, system-ui; color: #0f172a;\">\
         <h2 style=\"margin:0 0 8px;\">We Miss You!</h2>\
         <p style=\"margin:0 0 8px;\">It's been {days_inactive} days since you last logged a quest.</p>\
         <p style=\"margin:0 0 8px;\">Total XP: {total} &middot; Level {level}</p>\
         <p style=\"margin:0 0 8px;\">Streak: {streak} day(s) (at risk!)</p>\
         <p style=\"margin:12px 0 0;\">Don't let your streak die. Small consistent actions beat big sporadic efforts.</p>\
         </div>",
        total = profile.total_xp,
        level = profile.level,
        streak = profile.current_streak,
    );

    InactivityCheck {
        days_inactive,
        email: Some(EmailContent {
            subject: "Questlog - We Miss You!".to_string(),
            html,
        }),
    }
}

/// Tiered weekly verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekTier {
    Perfect,
    Great,
    NeedsWork,
}

impl WeekTier {
    fn message(self) -> &'static str {
        match self {
            Self::Perfect => "PERFECT WEEK! You're a LEGEND!",
            Self::Great => "Great week! Keep pushing!",
            Self::NeedsWork => "Room for improvement. You got this!",
        }
    }
}

/// Aggregated numbers for one trailing week.
#[derive(Debug, Serialize)]
pub struct WeeklyStats {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_xp: i64,
    pub days_logged: usize,
    pub days_goal_met: usize,
    pub elite_days: usize,
    pub average_xp: i64,
    /// Consecutive goal-met days counting back from the window's end.
    pub window_streak: usize,
    pub perfect_week: bool,
    pub tier: WeekTier,
}

/// Weekly summary over a trailing 7-day window `[from, to]`.
pub fn weekly_summary(
    profile: &Profile,
    logs: &[DailyLog],
    from: NaiveDate,
    to: NaiveDate,
    rules: &RulesConfig,
) -> (WeeklyStats, EmailContent) {
    let mut window: Vec<&DailyLog> = logs
        .iter()
        .filter(|l| l.log_date >= from && l.log_date <= to)
        .collect();
    window.sort_by_key(|l| l.log_date);

    let total_xp: i64 = window.iter().map(|l| l.total_xp).sum();
    let days_logged = window.len();
    let days_goal_met = window
        .iter()
        .filter(|l| l.total_xp >= rules.daily_goal)
        .count();
    let elite_days = window
        .iter()
        .filter(|l| l.total_xp >= rules.elite_goal)
        .count();
    let average_xp = if days_logged > 0 {
        (total_xp as f64 / days_logged as f64).round() as i64
    } else {
        0
    };

    // Window streak: walk the logged entries backward while they meet the goal
    let window_streak = window
        .iter()
        .rev()
        .take_while(|l| l.total_xp >= rules.daily_goal)
        .count();

    let perfect_week = days_goal_met == 7;
    let tier = if perfect_week {
        WeekTier::Perfect
    } else if days_goal_met >= 5 {
        WeekTier::Great
    } else {
        WeekTier::NeedsWork
    };

    let breakdown = if window.is_empty() {
        "<li>No data this week.</li>".to_string()
    } else {
        window
            .iter()
            .map(|l| {
                format!(
                    "<li>{}: {} XP ({} quests)</li>",
                    l.log_date, l.total_xp, l.quests_completed
                )
            })
            .collect::<Vec<_>>()
            .join("")
    };

    let html = format!(
        "<div style=\"font-family: Inter, system-ui; color: #0f172a;\">\
         <h2 style=\"margin:0 0 8px;\">Weekly XP Report</h2>\
         <p style=\"margin:0 0 12px;\">Range: {from} &rarr; {to}</p>\
         <p style=\"margin:0 0 8px;\">Total XP: <strong>{total_xp}</strong></p>\
         <p style=\"margin:0 0 8px;\">Days Logged: {days_logged}/7</p>\
         <p style=\"margin:0 0 8px;\">Goals Met ({goal}+ XP): <strong>{days_goal_met}</strong>/7</p>\
         <p style=\"margin:0 0 8px;\">Elite Days ({elite}+ XP): <strong>{elite_days}</strong></p>\
         <p style=\"margin:0 0 8px;\">Average Daily XP: {average_xp}</p>\
         <p style=\"margin:0 0 12px;\">Current Week Streak: <strong>{window_streak}</strong> day(s)</p>\
         <p style=\"margin:0 0 8px;\">Total XP: {profile_total} &middot; Level {level} &middot; Streak {streak} day(s)</p>\
         <h4 style=\"margin:16px 0 8px;\">Daily Breakdown</h4>\
         <ul style=\"padding-left:18px; margin:0 0 12px;\">{breakdown}</ul>\
         <p style=\"margin-top:16px;\"><strong>{message}</strong></p>\
         </div>",
        goal = rules.daily_goal,
        elite = rules.elite_goal,
        profile_total = profile.total_xp,
        level = profile.level,
        streak = profile.current_streak,
        message = tier.message(),
    );

    let stats = WeeklyStats {
        from,
        to,
        total_xp,
        days_logged,
        days_goal_met,
        elite_days,
        average_xp,
        window_streak,
        perfect_week,
        tier,
    };
    let email = EmailContent {
        subject: format!(
            "Questlog Weekly Report - {total_xp} XP Earned! ({days_goal_met} pass / {elite_days} elite)"
        ),
        html,
    };

    (stats, email)
}

/// Record generated content in the notifications table with status
/// `pending`. The external dispatcher owns everything after that.
pub fn log_notification(
    conn: &Connection,
    user: &str,
    notification_type: &str,
    email: &EmailContent,
) -> QuestResult<String> {
    let id = uuid::Uuid::now_v7().to_string();
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO notifications (id, user_id, notification_type, subject, body, status, scheduled_for, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?6)",
        params![id, user, notification_type, email.subject, email.html, now],
    )?;
    Ok(id)
}
