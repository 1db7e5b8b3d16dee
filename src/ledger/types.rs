//! Core ledger type definitions.
//!
//! Defines [`Quest`] (a habit with an XP value), [`QuestCompletion`] (the
//! ledger record that a quest was done on a date), [`DailyLog`] (the cached
//! per-day aggregate), and [`Profile`] (per-user lifetime totals).

use chrono::NaiveDate;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Whether the same quest may be completed more than once on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatPolicy {
    /// No uniqueness enforced; every toggle-on appends a ledger record.
    Repeatable,
    /// At most one completion per (user, quest, date).
    OncePerDay,
}

impl RepeatPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repeatable => "repeatable",
            Self::OncePerDay => "once-per-day",
        }
    }
}

impl std::fmt::Display for RepeatPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RepeatPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "repeatable" => Ok(Self::Repeatable),
            "once-per-day" => Ok(Self::OncePerDay),
            _ => Err(format!("unknown completion policy: {s}")),
        }
    }
}

/// A quest definition. `xp_value` is signed: positive quests reward,
/// negative ones penalize, zero-value quests are logged-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    pub name: String,
    pub xp_value: i64,
    pub category: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// Display position; custom quests append after the owner's current max.
    pub sort_order: i64,
    /// Owning user for custom quests; `None` for the global catalog.
    pub user_id: Option<String>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// Fields accepted when creating a quest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewQuest {
    pub name: String,
    pub xp_value: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
}

/// Partial update for an existing quest. Value changes never rewrite
/// historical completions — those carry their own `xp_earned` snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestUpdate {
    pub name: Option<String>,
    pub xp_value: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
}

/// A ledger record: this quest was completed on this date.
///
/// `xp_earned` is a snapshot of the quest's value at record time, never a
/// live reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestCompletion {
    pub id: String,
    pub user_id: String,
    pub quest_id: String,
    pub completion_date: NaiveDate,
    pub xp_earned: i64,
    /// ISO 8601 timestamp of the toggle itself.
    pub completed_at: String,
}

/// The cached per-(user, date) aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: String,
    pub user_id: String,
    pub log_date: NaiveDate,
    /// Signed sum of the day's `xp_earned` values, clamped at 0.
    pub total_xp: i64,
    /// Count of the day's positive-XP completions, clamped at 0.
    pub quests_completed: i64,
}

/// Per-user lifetime totals, updated on every completion toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub total_xp: i64,
    pub level: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_active_date: Option<NaiveDate>,
    pub created_at: String,
}

/// Parse a `YYYY-MM-DD` column value into a [`NaiveDate`].
pub(crate) fn date_from_sql(idx: usize, raw: String) -> rusqlite::Result<NaiveDate> {
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl QuestCompletion {
    /// Map a `SELECT id, user_id, quest_id, completion_date, xp_earned,
    /// completed_at` row.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            quest_id: row.get(2)?,
            completion_date: date_from_sql(3, row.get(3)?)?,
            xp_earned: row.get(4)?,
            completed_at: row.get(5)?,
        })
    }
}

impl DailyLog {
    /// Map a `SELECT id, user_id, log_date, total_xp, quests_completed` row.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            log_date: date_from_sql(2, row.get(2)?)?,
            total_xp: row.get(3)?,
            quests_completed: row.get(4)?,
        })
    }
}

impl Quest {
    /// Map a `SELECT id, name, xp_value, category, description, icon,
    /// sort_order, user_id, created_at` row.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            xp_value: row.get(2)?,
            category: row.get(3)?,
            description: row.get(4)?,
            icon: row.get(5)?,
            sort_order: row.get(6)?,
            user_id: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl Profile {
    /// Map a `SELECT id, username, total_xp, level, current_streak,
    /// longest_streak, last_active_date, created_at` row.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let last_active: Option<String> = row.get(6)?;
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            total_xp: row.get(2)?,
            level: row.get(3)?,
            current_streak: row.get(4)?,
            longest_streak: row.get(5)?,
            last_active_date: last_active.map(|d| date_from_sql(6, d)).transpose()?,
            created_at: row.get(7)?,
        })
    }
}
