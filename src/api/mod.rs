//! HTTP surface: route table, shared state, and error mapping.
//!
//! Handlers live one-file-per-resource. All routes are scoped to the
//! configured identity — the auth collaborator that would resolve real users
//! is outside this crate, and the core treats identity as an opaque string.

pub mod admin;
pub mod completions;
pub mod insights;
pub mod logs;
pub mod notifications;
pub mod profile;
pub mod quests;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use rusqlite::Connection;

use crate::config::QuestlogConfig;
use crate::error::QuestError;

/// Shared handler state: one connection behind a mutex plus the config.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: Arc<QuestlogConfig>,
}

impl AppState {
    pub fn new(db: Arc<Mutex<Connection>>, config: Arc<QuestlogConfig>) -> Self {
        Self { db, config }
    }

    /// Acquire the database connection.
    pub fn db(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().expect("database mutex poisoned")
    }

    /// The identity every route operates as.
    pub fn user(&self) -> &str {
        &self.config.storage.default_user
    }
}

/// Build the full route table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/quests", get(quests::list).post(quests::create))
        .route(
            "/quests/{id}",
            get(quests::show).patch(quests::update).delete(quests::remove),
        )
        .route(
            "/completions",
            get(completions::list).post(completions::record),
        )
        .route("/completions/{id}", delete(completions::remove))
        .route("/logs", get(logs::list))
        .route("/activity", get(logs::activity))
        .route("/insights", get(insights::insights))
        .route("/stats", get(insights::stats))
        .route("/leaderboard", get(insights::leaderboard))
        .route("/profile", get(profile::show))
        .route("/notifications/check-in", post(notifications::check_in))
        .route("/notifications/weekly", post(notifications::weekly))
        .route("/notifications/inactive", post(notifications::inactive))
        .route("/admin/reset-day", post(admin::reset_day))
        .route("/admin/recompute", post(admin::recompute))
        .with_state(state)
}

/// Map core errors onto the HTTP surface. Persistence details never leak to
/// clients — they get a generic 500 while the real error is logged.
impl IntoResponse for QuestError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            QuestError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            QuestError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            QuestError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            QuestError::Persistence(err) => {
                tracing::error!(error = %err, "persistence failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
