//! Quest catalog routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::AppState;
use crate::error::QuestError;
use crate::ledger::quests;
use crate::ledger::types::{NewQuest, Quest, QuestUpdate};

/// GET /quests — the configured user's visible catalog.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Quest>>, QuestError> {
    let conn = state.db();
    let quests = quests::list_quests(&conn, state.user())?;
    Ok(Json(quests))
}

/// POST /quests — create a catalog entry.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewQuest>,
) -> Result<(StatusCode, Json<Quest>), QuestError> {
    let conn = state.db();
    let quest = quests::create_quest(&conn, None, &body)?;
    Ok((StatusCode::CREATED, Json(quest)))
}

/// GET /quests/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Quest>, QuestError> {
    let conn = state.db();
    Ok(Json(quests::get_quest(&conn, &id)?))
}

/// PATCH /quests/{id} — partial update; history keeps its XP snapshots.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<QuestUpdate>,
) -> Result<Json<Quest>, QuestError> {
    let conn = state.db();
    Ok(Json(quests::update_quest(&conn, &id, &body)?))
}

/// DELETE /quests/{id} — completions referencing the quest survive.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, QuestError> {
    let conn = state.db();
    quests::delete_quest(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
