mod helpers;

use questlog::db::{migrations, schema};
use rusqlite::{params, Connection};

fn v1_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    schema::init_schema(&conn).unwrap();
    conn
}

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = v1_db();
    assert_eq!(migrations::get_schema_version(&conn).unwrap(), 1);

    migrations::run_migrations(&conn).unwrap();
    assert_eq!(
        migrations::get_schema_version(&conn).unwrap(),
        migrations::CURRENT_SCHEMA_VERSION
    );
}

#[test]
fn v2_backfills_streak_columns_on_existing_profiles() {
    let conn = v1_db();

    // A profile created before the streak counters existed
    conn.execute(
        "INSERT INTO profiles (id, username, total_xp, level, created_at) \
         VALUES ('u1', 'veteran', 1200, 3, '2024-06-01T00:00:00Z')",
        params![],
    )
    .unwrap();

    migrations::run_migrations(&conn).unwrap();

    let (current, longest): (i64, i64) = conn
        .query_row(
            "SELECT current_streak, longest_streak FROM profiles WHERE id = 'u1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(current, 0);
    assert_eq!(longest, 0);

    // Pre-existing data is untouched
    let total: i64 = conn
        .query_row("SELECT total_xp FROM profiles WHERE id = 'u1'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(total, 1200);
}

#[test]
fn migrations_are_idempotent() {
    let conn = v1_db();
    migrations::run_migrations(&conn).unwrap();
    migrations::run_migrations(&conn).unwrap();
    assert_eq!(
        migrations::get_schema_version(&conn).unwrap(),
        migrations::CURRENT_SCHEMA_VERSION
    );
}

#[test]
fn migrated_db_supports_the_full_write_path() {
    let mut conn = helpers::test_db();
    let quest = helpers::make_quest(&conn, "Workout", 75);
    helpers::complete(&mut conn, &quest, "2025-01-15");

    let streak: i64 = conn
        .query_row(
            "SELECT current_streak FROM profiles WHERE id = 'u1'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(streak, 1);
}
