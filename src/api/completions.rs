//! Completion ledger routes — the quest toggle surface.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::AppState;
use crate::error::{QuestError, QuestResult};
use crate::ledger::completions::{
    query_completions, record_completion, remove_completion, CompletionQuery, RecordOutcome,
    RemoveOutcome,
};
use crate::ledger::types::QuestCompletion;

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub quest_id: String,
    pub date: Option<NaiveDate>,
}

/// POST /completions — toggle a quest on for a date (default today).
pub async fn record(
    State(state): State<AppState>,
    Json(body): Json<RecordRequest>,
) -> Result<(StatusCode, Json<RecordOutcome>), QuestError> {
    if body.quest_id.is_empty() {
        return Err(QuestError::invalid("quest_id is required"));
    }

    let mut conn = state.db();
    let outcome = record_completion(
        &mut conn,
        &state.config.rules,
        state.user(),
        &state.config.storage.default_username,
        &body.quest_id,
        body.date,
    )?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// DELETE /completions/{id} — toggle off, reversing the insertion exactly.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveOutcome>, QuestError> {
    let mut conn = state.db();
    let outcome = remove_completion(&mut conn, &state.config.rules, state.user(), &id)?;
    Ok(Json(outcome))
}

/// GET /completions?date=YYYY-MM-DD or ?from=&to= — most recent toggle first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CompletionQuery>,
) -> QuestResult<Json<Vec<QuestCompletion>>> {
    let conn = state.db();
    let completions = query_completions(&conn, state.user(), &query)?;
    Ok(Json(completions))
}
