use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("booking gateway authentication failed: {0}")]
    Auth(String),

    #[error("booking gateway error: {0}")]
    Gateway(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("generative model error: {0}")]
    Generative(String),

    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Auth(_) => StatusCode::BAD_GATEWAY,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Generative(_) => StatusCode::BAD_GATEWAY,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
