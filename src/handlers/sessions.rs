use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::errors::AppError;
use crate::models::Session;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/sessions
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Session>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(state.sessions.list_all().await?))
}

// DELETE /api/sessions
pub async fn clear_sessions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let cleared = state.sessions.clear_all().await?;
    tracing::warn!(cleared, backend = state.sessions.backend(), "all sessions cleared");
    Ok(Json(serde_json::json!({ "cleared": cleared })))
}
