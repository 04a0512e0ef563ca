//! Handler errors and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use confab_agent::ChatError;

#[derive(Debug)]
pub enum ApiError {
    /// The manager has not been installed yet.
    Uninitialized,
    /// Manager rejected or failed the message.
    Chat(ChatError),
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        ApiError::Chat(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Uninitialized => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": "Chatbot not initialized" })),
            )
                .into_response(),
            ApiError::Chat(ChatError::EmptyInput) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Message cannot be empty" })),
            )
                .into_response(),
            ApiError::Chat(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": e.to_string(), "kind": e.kind() })),
            )
                .into_response(),
        }
    }
}
