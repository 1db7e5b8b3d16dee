//! Profile route.

use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::error::QuestResult;
use crate::ledger::profile::get_or_create_profile;
use crate::ledger::types::Profile;

/// GET /profile — the configured user's profile, created lazily on first
/// visit.
pub async fn show(State(state): State<AppState>) -> QuestResult<Json<Profile>> {
    let conn = state.db();
    let profile = get_or_create_profile(
        &conn,
        state.user(),
        &state.config.storage.default_username,
    )?;
    Ok(Json(profile))
}
