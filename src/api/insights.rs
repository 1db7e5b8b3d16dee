//! Insights, stats, and leaderboard read routes.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Datelike;
use serde::Deserialize;

use crate::api::AppState;
use crate::error::QuestResult;
use crate::insights::stats::{leaderboard as rank_users, user_stats, LeaderboardEntry, StatsResponse};
use crate::insights::{generate_insights, InsightsReport};
use crate::ledger::types::DailyLog;
use crate::ledger::{aggregate, profile, today};

/// GET /insights — the report over the calendar year to date.
pub async fn insights(State(state): State<AppState>) -> QuestResult<Json<InsightsReport>> {
    let conn = state.db();
    let user = state.user();
    let now = today();
    let year_start = now.with_ordinal(1).unwrap_or(now);

    let mut logs: Vec<DailyLog> =
        aggregate::list_daily_logs(&conn, user, Some(year_start), Some(now), 400)?;
    logs.reverse(); // ascending by date for the report

    let profile = profile::find_profile(&conn, user)?;
    let report = generate_insights(&logs, profile.as_ref(), &state.config.rules);
    Ok(Json(report))
}

/// GET /stats — lifetime statistics.
pub async fn stats(State(state): State<AppState>) -> QuestResult<Json<StatsResponse>> {
    let conn = state.db();
    let response = user_stats(&conn, &state.config.rules, state.user(), today())?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Comma-separated identity list; defaults to the configured user.
    pub ids: Option<String>,
}

/// GET /leaderboard?ids=a,b,c — ranked by lifetime XP.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> QuestResult<Json<Vec<LeaderboardEntry>>> {
    let ids: Vec<String> = match &query.ids {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        None => vec![state.user().to_string()],
    };

    let conn = state.db();
    let board = rank_users(&conn, &ids, today())?;
    Ok(Json(board))
}
