//! Preference route handlers backed by the local cache.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::state::AppState;

/// Theme update request.
#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

/// Current theme preference, `null` when unset.
#[instrument(skip(state))]
pub async fn show_theme(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "theme": state.caches().theme().get() }))
}

/// Store the theme preference.
#[instrument(skip(state))]
pub async fn set_theme(
    State(state): State<AppState>,
    Json(request): Json<ThemeRequest>,
) -> Json<Value> {
    state.caches().theme().set(&request.theme);
    Json(json!({ "theme": request.theme }))
}

/// Current user preferences object, `null` when unset or expired.
#[instrument(skip(state))]
pub async fn show_preferences(State(state): State<AppState>) -> Json<Value> {
    Json(state.caches().preferences().get().unwrap_or(Value::Null))
}

/// Store the user preferences object.
#[instrument(skip(state, preferences))]
pub async fn set_preferences(
    State(state): State<AppState>,
    Json(preferences): Json<Value>,
) -> StatusCode {
    state.caches().preferences().set(&preferences);
    StatusCode::NO_CONTENT
}
