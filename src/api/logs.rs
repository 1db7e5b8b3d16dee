//! Daily-log and activity-trail read routes.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::AppState;
use crate::error::QuestResult;
use crate::ledger::activity::{list_activity, ActivityEntry};
use crate::ledger::aggregate::list_daily_logs;
use crate::ledger::types::DailyLog;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

/// GET /logs?from=&to=&limit= — aggregates, newest first (default limit 30).
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> QuestResult<Json<Vec<DailyLog>>> {
    let conn = state.db();
    let logs = list_daily_logs(
        &conn,
        state.user(),
        query.from,
        query.to,
        query.limit.unwrap_or(30),
    )?;
    Ok(Json(logs))
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// GET /activity?limit=&offset= — audit trail, newest first.
pub async fn activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> QuestResult<Json<Vec<ActivityEntry>>> {
    let conn = state.db();
    let entries = list_activity(
        &conn,
        state.user(),
        query.limit.unwrap_or(50),
        query.offset.unwrap_or(0),
    )?;
    Ok(Json(entries))
}
