//! Repair and reset routes.

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::AppState;
use crate::error::QuestResult;
use crate::ledger::aggregate::{self, RecomputeOutcome, ResetOutcome};
use crate::ledger::today;

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    pub date: Option<NaiveDate>,
}

/// POST /admin/reset-day — wipe one day's completions and aggregate
/// (default: today).
pub async fn reset_day(
    State(state): State<AppState>,
    Json(body): Json<ResetRequest>,
) -> QuestResult<Json<ResetOutcome>> {
    let mut conn = state.db();
    let outcome = aggregate::reset_day(
        &mut conn,
        &state.config.rules,
        state.user(),
        body.date.unwrap_or_else(today),
    )?;
    Ok(Json(outcome))
}

/// POST /admin/recompute — rebuild aggregates, profile totals, and streaks
/// from the completion ledger.
pub async fn recompute(State(state): State<AppState>) -> QuestResult<Json<RecomputeOutcome>> {
    let mut conn = state.db();
    let outcome = aggregate::recompute_user(
        &mut conn,
        &state.config.rules,
        state.user(),
        &state.config.storage.default_username,
    )?;
    Ok(Json(outcome))
}
