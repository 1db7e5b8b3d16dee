//! Activity audit trail.
//!
//! Every ledger mutation appends a row describing what happened. Action
//! payloads are a tagged union of the known action types plus an `Other`
//! variant carrying an opaque map, so externally-logged actions survive
//! round-trips without losing type safety for the known ones.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::QuestResult;
use crate::ledger::now_rfc3339;

/// A ledger action recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityAction {
    QuestCompleted {
        quest_id: String,
        quest_name: String,
        date: NaiveDate,
    },
    QuestUnchecked {
        completion_id: String,
        quest_id: String,
        date: NaiveDate,
    },
    LevelUp {
        from_level: i64,
        to_level: i64,
    },
    DayReset {
        date: NaiveDate,
    },
    /// Anything logged by a caller outside the known set.
    Other {
        action_type: String,
        details: Map<String, Value>,
    },
}

impl ActivityAction {
    /// The stable string stored in `activity_log.action_type`.
    pub fn kind(&self) -> &str {
        match self {
            Self::QuestCompleted { .. } => "quest_completed",
            Self::QuestUnchecked { .. } => "quest_unchecked",
            Self::LevelUp { .. } => "level_up",
            Self::DayReset { .. } => "day_reset",
            Self::Other { action_type, .. } => action_type,
        }
    }

    /// JSON payload stored in `activity_log.action_details`.
    fn details_json(&self) -> Value {
        match self {
            Self::Other { details, .. } => Value::Object(details.clone()),
            known => serde_json::to_value(known).unwrap_or(Value::Null),
        }
    }

    /// Reassemble an action from its stored parts. Unknown action types (or
    /// known types with malformed payloads) land in `Other`.
    pub fn from_parts(action_type: &str, details: Option<&Value>) -> Self {
        let detail = details.cloned().unwrap_or(Value::Null);
        let parsed = match action_type {
            "quest_completed" | "quest_unchecked" | "level_up" | "day_reset" => {
                serde_json::from_value::<ActivityAction>(detail.clone())
                    .ok()
                    .filter(|action| action.kind() == action_type)
            }
            _ => None,
        };
        parsed.unwrap_or_else(|| Self::Other {
            action_type: action_type.to_string(),
            details: match detail {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                other => {
                    let mut map = Map::new();
                    map.insert("value".into(), other);
                    map
                }
            },
        })
    }
}

/// One stored audit row.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub user_id: String,
    pub action_type: String,
    pub action: ActivityAction,
    pub xp_change: i64,
    pub created_at: String,
}

/// Append an entry to the activity log.
pub fn log_activity(
    conn: &Connection,
    user: &str,
    action: &ActivityAction,
    xp_change: i64,
) -> QuestResult<()> {
    conn.execute(
        "INSERT INTO activity_log (user_id, action_type, action_details, xp_change, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user,
            action.kind(),
            action.details_json().to_string(),
            xp_change,
            now_rfc3339(),
        ],
    )?;
    Ok(())
}

/// List a user's activity, newest first.
pub fn list_activity(
    conn: &Connection,
    user: &str,
    limit: usize,
    offset: usize,
) -> QuestResult<Vec<ActivityEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, action_type, action_details, xp_change, created_at \
         FROM activity_log WHERE user_id = ?1 \
         ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
    )?;
    let entries = stmt
        .query_map(params![user, limit as i64, offset as i64], |row| {
            let action_type: String = row.get(2)?;
            let raw_details: Option<String> = row.get(3)?;
            let details = raw_details.and_then(|d| serde_json::from_str::<Value>(&d).ok());
            Ok(ActivityEntry {
                id: row.get(0)?,
                user_id: row.get(1)?,
                action: ActivityAction::from_parts(&action_type, details.as_ref()),
                action_type,
                xp_change: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}
