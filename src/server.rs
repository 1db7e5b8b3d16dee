//! HTTP server initialization.
//!
//! [`serve`] wires the database and config into the axum route table and
//! runs until ctrl-c.

use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::api::{self, AppState};
use crate::config::QuestlogConfig;
use crate::db;
use crate::ledger::quests;

/// Open the database, seed the quest catalog, and serve the HTTP API.
pub async fn serve(config: QuestlogConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    quests::seed_quests(&conn)?;

    let state = AppState::new(Arc::new(Mutex::new(conn)), Arc::new(config));
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "questlog listening at http://{bind_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
