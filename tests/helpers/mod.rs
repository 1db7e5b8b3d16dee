#![allow(dead_code)]

use chrono::NaiveDate;
use questlog::config::RulesConfig;
use questlog::db;
use questlog::ledger::completions::{record_completion, RecordOutcome};
use questlog::ledger::quests::create_quest;
use questlog::ledger::types::NewQuest;
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// Default rules: 70 daily goal, 100 elite, 500 XP per level.
pub fn rules() -> RulesConfig {
    RulesConfig::default()
}

/// Parse a `YYYY-MM-DD` literal.
pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Create a quest and return its id.
pub fn make_quest(conn: &Connection, name: &str, xp: i64) -> String {
    create_quest(
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

/// Record a completion for user `u1` on the given date.
pub fn complete(conn: &mut Connection, quest_id: &str, on: &str) -> RecordOutcome {
    record_completion(conn, &rules(), "u1", "tester", quest_id, Some(date(on))).unwrap()
}
