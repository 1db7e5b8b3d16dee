//! SQL DDL for all questlog tables.
//!
//! Defines the `quests`, `quest_completions`, `daily_logs`, `profiles`,
//! `activity_log`, `notifications`, and `schema_meta` tables. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// All schema DDL statements for questlog's core tables.
///
/// `quest_completions.quest_id` deliberately carries no foreign key: each
/// completion snapshots `xp_earned` at record time, and deleting a quest must
/// never alter historical totals.
const SCHEMA_SQL: &str = r#"
-- Quest catalog: global quests (user_id NULL) plus per-user custom quests
CREATE TABLE IF NOT EXISTS quests (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    xp_value INTEGER NOT NULL,
    category TEXT NOT NULL DEFAULT 'general',
    description TEXT,
    icon TEXT,
    sort_order INTEGER NOT NULL DEFAULT 100,
    user_id TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_quests_user ON quests(user_id);
CREATE INDEX IF NOT EXISTS idx_quests_sort ON quests(sort_order);

-- Completion ledger: source of truth for XP earned per event
CREATE TABLE IF NOT EXISTS quest_completions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    quest_id TEXT NOT NULL,
    completion_date TEXT NOT NULL,
    xp_earned INTEGER NOT NULL,
    completed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_completions_user_date ON quest_completions(user_id, completion_date);
CREATE INDEX IF NOT EXISTS idx_completions_quest ON quest_completions(quest_id);

-- Cached per-day aggregate, maintained in lockstep with the ledger
CREATE TABLE IF NOT EXISTS daily_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    log_date TEXT NOT NULL,
    total_xp INTEGER NOT NULL DEFAULT 0,
    quests_completed INTEGER NOT NULL DEFAULT 0,
    UNIQUE(user_id, log_date)
);

CREATE INDEX IF NOT EXISTS idx_daily_logs_date ON daily_logs(log_date);

-- Per-user lifetime totals
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    total_xp INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 1,
    last_active_date TEXT,
    created_at TEXT NOT NULL
);

-- Audit trail of ledger mutations
CREATE TABLE IF NOT EXISTS activity_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    action_type TEXT NOT NULL,
    action_details TEXT,
    xp_change INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activity_user ON activity_log(user_id);

-- Generated email content, picked up by an external dispatcher
CREATE TABLE IF NOT EXISTS notifications (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    notification_type TEXT NOT NULL,
    subject TEXT NOT NULL,
    body TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    scheduled_for TEXT,
    created_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
