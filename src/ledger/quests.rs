//! Quest catalog — the definable habits completions reference.
//!
//! Quests are global (seeded) or per-user custom. Editing or deleting a quest
//! never rewrites history: completions snapshot `xp_earned` at record time.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{QuestError, QuestResult};
use crate::ledger::now_rfc3339;
use crate::ledger::types::{NewQuest, Quest, QuestUpdate};

const QUEST_COLUMNS: &str =
    "id, name, xp_value, category, description, icon, sort_order, user_id, created_at";

/// Create a quest. `owner` is `None` for a global catalog entry.
///
/// Name and xp_value are required; category defaults to `general`, icon to
/// `⭐`, and sort_order to one past the owner's current maximum.
pub fn create_quest(
    conn: &Connection,
    owner: Option<&str>,
    new: &NewQuest,
) -> QuestResult<Quest> {
    if new.name.trim().is_empty() {
        return Err(QuestError::invalid("quest name must not be empty"));
    }
    let xp_value = new
        .xp_value
        .ok_or_else(|| QuestError::invalid("quest xp_value is required"))?;

    let sort_order = match new.sort_order {
        Some(order) => order,
        None => next_sort_order(conn, owner)?,
    };

    let id = uuid::Uuid::now_v7().to_string();
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO quests (id, name, xp_value, category, description, icon, sort_order, user_id, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            new.name.trim(),
            xp_value,
            new.category.as_deref().unwrap_or("general"),
            new.description,
            new.icon.as_deref().unwrap_or("⭐"),
            sort_order,
            owner,
            now,
        ],
    )?;

    get_quest(conn, &id)
}

/// One past the owner's current maximum sort_order (100 on an empty catalog).
fn next_sort_order(conn: &Connection, owner: Option<&str>) -> QuestResult<i64> {
    let max: Option<i64> = match owner {
        Some(user) => conn.query_row(
            "SELECT MAX(sort_order) FROM quests WHERE user_id = ?1",
            params![user],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT MAX(sort_order) FROM quests WHERE user_id IS NULL",
            [],
            |row| row.get(0),
        )?,
    };
    Ok(max.unwrap_or(100) + 1)
}

/// Fetch one quest by id.
pub fn get_quest(conn: &Connection, quest_id: &str) -> QuestResult<Quest> {
    conn.query_row(
        &format!("SELECT {QUEST_COLUMNS} FROM quests WHERE id = ?1"),
        params![quest_id],
        |row| Quest::from_row(row),
    )
    .optional()?
    .ok_or_else(|| QuestError::not_found(format!("quest {quest_id}")))
}

/// The user's visible catalog: global quests plus their own, by sort_order.
pub fn list_quests(conn: &Connection, user: &str) -> QuestResult<Vec<Quest>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {QUEST_COLUMNS} FROM quests \
         WHERE user_id IS NULL OR user_id = ?1 \
         ORDER BY sort_order, created_at"
    ))?;
    let quests = stmt
        .query_map(params![user], |row| Quest::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quests)
}

/// Apply a partial update. Untouched fields keep their values; historical
/// completions are unaffected either way.
pub fn update_quest(conn: &Connection, quest_id: &str, update: &QuestUpdate) -> QuestResult<Quest> {
    // Ensure it exists before building the update
    let existing = get_quest(conn, quest_id)?;

    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(QuestError::invalid("quest name must not be empty"));
        }
    }

    conn.execute(
        "UPDATE quests SET name = ?1, xp_value = ?2, category = ?3, description = ?4, \
         icon = ?5, sort_order = ?6 WHERE id = ?7",
        params![
            update.name.as_deref().map(str::trim).unwrap_or(&existing.name),
            update.xp_value.unwrap_or(existing.xp_value),
            update.category.as_deref().unwrap_or(&existing.category),
            update.description.as_deref().or(existing.description.as_deref()),
            update.icon.as_deref().or(existing.icon.as_deref()),
            update.sort_order.unwrap_or(existing.sort_order),
            quest_id,
        ],
    )?;

    get_quest(conn, quest_id)
}

/// Delete a quest definition. Completions referencing it survive untouched.
pub fn delete_quest(conn: &Connection, quest_id: &str) -> QuestResult<()> {
    let rows = conn.execute("DELETE FROM quests WHERE id = ?1", params![quest_id])?;
    if rows == 0 {
        return Err(QuestError::not_found(format!("quest {quest_id}")));
    }
    Ok(())
}

/// The default global catalog, inserted once on first run.
const SEED_QUESTS: &[(&str, i64, &str, &str)] = &[
    ("Morning workout", 25, "fitness", "💪"),
    ("Deep work block", 20, "focus", "🎯"),
    ("Hit protein target", 15, "fuel", "🥩"),
    ("Hydration goal", 10, "fuel", "💧"),
    ("Evening walk", 10, "fitness", "🚶"),
    ("Read 20 pages", 10, "mind", "📖"),
    ("Journal entry", 5, "mind", "✍️"),
    ("Junk food", -15, "penalty", "🍔"),
    ("Rest day logged", 0, "recovery", "😴"),
];

/// Seed the global quest catalog. Idempotent: skipped when any global quest
/// already exists.
pub fn seed_quests(conn: &Connection) -> QuestResult<usize> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM quests WHERE user_id IS NULL",
        [],
        |row| row.get(0),
    )?;
    if existing > 0 {
        return Ok(0);
    }

    let now = now_rfc3339();
    for (i, (name, xp, category, icon)) in SEED_QUESTS.iter().enumerate() {
        conn.execute(
            "INSERT INTO quests (id, name, xp_value, category, description, icon, sort_order, user_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, NULL, ?7)",
            params![
                uuid::Uuid::now_v7().to_string(),
                name,
                xp,
                category,
                icon,
                100 + i as i64,
                now,
            ],
        )?;
    }
    tracing::info!(count = SEED_QUESTS.len(), "seeded global quest catalog");
    Ok(SEED_QUESTS.len())
}
