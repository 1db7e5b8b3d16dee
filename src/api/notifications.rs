//! Notification generation routes, called by an external cron.
//!
//! Each route renders content, logs it to the `notifications` table for the
//! dispatch collaborator, and returns the rendered email in the response.

use axum::extract::State;
use axum::Json;
use chrono::Days;
use serde::Serialize;

use crate::api::AppState;
use crate::error::QuestResult;
use crate::ledger::{aggregate, profile, today};
use crate::notify::{
    check_in_email, inactivity_check, log_notification, weekly_summary, EmailContent, WeeklyStats,
};

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub notification_id: String,
    pub email: EmailContent,
}

/// POST /notifications/check-in — daily status email.
pub async fn check_in(State(state): State<AppState>) -> QuestResult<Json<CheckInResponse>> {
    let conn = state.db();
    let user = state.user();
    let profile = profile::get_profile(&conn, user)?;
    let today_log = aggregate::get_daily_log(&conn, user, today())?;

    let email = check_in_email(&profile, today_log.as_ref(), &state.config.rules);
    let notification_id = log_notification(&conn, user, "daily_check_in", &email)?;

    Ok(Json(CheckInResponse {
        notification_id,
        email,
    }))
}

#[derive(Debug, Serialize)]
pub struct WeeklyResponse {
    pub notification_id: String,
    pub stats: WeeklyStats,
    pub email: EmailContent,
}

/// POST /notifications/weekly — trailing 7-day summary.
pub async fn weekly(State(state): State<AppState>) -> QuestResult<Json<WeeklyResponse>> {
    let conn = state.db();
    let user = state.user();
    let profile = profile::get_profile(&conn, user)?;

    let to = today();
    let from = to - Days::new(6);
    let logs = aggregate::all_daily_logs(&conn, user)?;

    let (stats, email) = weekly_summary(&profile, &logs, from, to, &state.config.rules);
    let notification_id = log_notification(&conn, user, "weekly_summary", &email)?;

    Ok(Json(WeeklyResponse {
        notification_id,
        stats,
        email,
    }))
}

#[derive(Debug, Serialize)]
pub struct InactiveResponse {
    pub days_inactive: i64,
    /// Present only when the reminder actually fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailContent>,
}

/// POST /notifications/inactive — reminder once the inactivity threshold is
/// crossed; a quiet 200 otherwise.
pub async fn inactive(State(state): State<AppState>) -> QuestResult<Json<InactiveResponse>> {
    let conn = state.db();
    let user = state.user();
    let profile = profile::get_profile(&conn, user)?;

    let check = inactivity_check(&profile, today(), &state.config.rules);
    let notification_id = match &check.email {
        Some(email) => Some(log_notification(&conn, user, "inactivity_reminder", email)?),
        None => None,
    };

    Ok(Json(InactiveResponse {
        days_inactive: check.days_inactive,
        notification_id,
        email: check.email,
    }))
}
