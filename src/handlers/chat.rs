use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::services::concierge;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub phone: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

// POST /api/chat
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Response {
    let phone = payload.phone.trim().to_string();
    let message = payload.message.trim().to_string();

    if phone.is_empty() || message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "phone and message are required"})),
        )
            .into_response();
    }

    tracing::info!(phone = %phone, message = %message, "incoming message");

    let reply = concierge::handle_message(&state, &phone, &message).await;
    Json(ChatResponse { reply: reply.text }).into_response()
}
