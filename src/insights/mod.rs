//! Insights engine — read-only derivation over daily-log history.
//!
//! Everything here is a pure function of the aggregate rows handed in:
//! per-day classification, weekday averages, best/worst day selection, and
//! the suggestion heuristics. Callers pick the window (the HTTP surface uses
//! calendar year-to-date).

pub mod stats;

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::config::RulesConfig;
use crate::ledger::types::{DailyLog, Profile};

/// Weekday display keys, Sunday first (weekday 0), matching the grouping
/// order of the weekday averages.
pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Classification of a single day by its XP total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    /// total_xp >= elite goal.
    Elite,
    /// daily goal <= total_xp < elite goal.
    Pass,
    /// 0 < total_xp < daily goal.
    Fail,
    /// No record, or total_xp == 0.
    None,
}

/// Classify one day's XP total against the configured thresholds.
pub fn classify_day(total_xp: i64, rules: &RulesConfig) -> DayClass {
    if total_xp >= rules.elite_goal {
        DayClass::Elite
    } else if total_xp >= rules.daily_goal {
        DayClass::Pass
    } else if total_xp > 0 {
        DayClass::Fail
    } else {
        DayClass::None
    }
}

/// A single day referenced in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStat {
    pub date: NaiveDate,
    pub xp: i64,
}

/// Response from the insights engine.
#[derive(Debug, Serialize)]
pub struct InsightsReport {
    pub total_days: usize,
    /// Days at or above the daily goal — elite days included.
    pub pass_days: usize,
    pub elite_days: usize,
    pub fail_days: usize,
    pub average_xp: i64,
    pub best_day: Option<DayStat>,
    pub worst_day: Option<DayStat>,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub weekday_avg: HashMap<String, i64>,
    pub suggestions: Vec<String>,
}

/// Derive the full insights report from a window of daily logs.
///
/// Pure: identical input always yields an identical report. The streak
/// counters are echoed from the profile (the ledger keeps them consistent
/// with the full history, which may extend beyond this window).
pub fn generate_insights(
    logs: &[DailyLog],
    profile: Option<&Profile>,
    rules: &RulesConfig,
) -> InsightsReport {
    let current_streak = profile.map(|p| p.current_streak).unwrap_or(0);
    let longest_streak = profile.map(|p| p.longest_streak).unwrap_or(0);

    if logs.is_empty() {
        return InsightsReport {
            total_days: 0,
            pass_days: 0,
            elite_days: 0,
            fail_days: 0,
            average_xp: 0,
            best_day: None,
            worst_day: None,
            current_streak,
            longest_streak,
            weekday_avg: HashMap::new(),
            suggestions: vec!["Start logging to see insights!".to_string()],
        };
    }

    let pass_days = logs.iter().filter(|l| l.total_xp >= rules.daily_goal).count();
    let elite_days = logs.iter().filter(|l| l.total_xp >= rules.elite_goal).count();
    let fail_days = logs
        .iter()
        .filter(|l| l.total_xp > 0 && l.total_xp < rules.daily_goal)
        .count();

    let total_xp: i64 = logs.iter().map(|l| l.total_xp).sum();
    let average_xp = (total_xp as f64 / logs.len() as f64).round() as i64;

    // Stable sort, descending XP, over date-ascending input: the first
    // element is the best day, the last is the worst.
    let mut by_date: Vec<&DailyLog> = logs.iter().collect();
    by_date.sort_by_key(|l| l.log_date);
    let mut by_xp = by_date.clone();
    by_xp.sort_by(|a, b| b.total_xp.cmp(&a.total_xp));
    let best_day = by_xp.first().map(|l| DayStat {
        date: l.log_date,
        xp: l.total_xp,
    });
    let worst_day = by_xp.last().map(|l| DayStat {
        date: l.log_date,
        xp: l.total_xp,
    });

    let weekday_avg = weekday_averages(logs);

    let mut suggestions = Vec::new();
    if let Some((day, avg)) = lowest_weekday(&weekday_avg) {
        if avg < rules.daily_goal {
            suggestions.push(format!(
                "{day} is your weakest day ({avg} avg). Plan extra focus."
            ));
        }
    }
    if average_xp < rules.daily_goal {
        suggestions.push(format!(
            "Average XP is below {}. Consider simplifying your quest list or stacking early wins.",
            rules.daily_goal
        ));
    }
    if (elite_days as f64) < pass_days as f64 * 0.3 {
        suggestions.push(format!(
            "Few elite days. Push for {}+ XP on strong days to boost momentum.",
            rules.elite_goal
        ));
    }
    if current_streak >= 7 {
        suggestions.push(format!(
            "You're on a {current_streak}-day streak. Don't break the chain!"
        ));
    }

    InsightsReport {
        total_days: logs.len(),
        pass_days,
        elite_days,
        fail_days,
        average_xp,
        best_day,
        worst_day,
        current_streak,
        longest_streak,
        weekday_avg,
        suggestions,
    }
}

/// Average XP per weekday (0=Sunday..6=Saturday), rounded to the nearest
/// integer. Weekdays with no data report 0.
pub fn weekday_averages(logs: &[DailyLog]) -> HashMap<String, i64> {
    let mut totals: [Vec<i64>; 7] = Default::default();
    for log in logs {
        let weekday = log.log_date.weekday().num_days_from_sunday() as usize;
        totals[weekday].push(log.total_xp);
    }

    let mut map = HashMap::new();
    for (i, name) in WEEKDAY_NAMES.iter().enumerate() {
        let avg = if totals[i].is_empty() {
            0
        } else {
            let sum: i64 = totals[i].iter().sum();
            (sum as f64 / totals[i].len() as f64).round() as i64
        };
        map.insert((*name).to_string(), avg);
    }
    map
}

/// The weekday with the lowest average; ties resolve to the earlier weekday
/// (Sunday first).
fn lowest_weekday(weekday_avg: &HashMap<String, i64>) -> Option<(&'static str, i64)> {
    let mut lowest: Option<(&'static str, i64)> = None;
    for name in WEEKDAY_NAMES {
        let avg = weekday_avg.get(name).copied().unwrap_or(0);
        if lowest.map(|(_, low)| avg < low).unwrap_or(true) {
            lowest = Some((name, avg));
        }
    }
    lowest
}
