use anyhow::Result;

use crate::config::QuestlogConfig;
use crate::ledger::quests::seed_quests;

/// Seed the global quest catalog.
pub fn seed(config: &QuestlogConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let inserted = seed_quests(&conn)?;
    if inserted > 0 {
        println!("Seeded {inserted} quests.");
    } else {
        println!("Catalog already seeded; nothing to do.");
    }
    Ok(())
}
