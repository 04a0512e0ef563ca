//! Router and request handlers.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

fn default_session_id() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize)]
pub struct InvocationRequest {
    pub message: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    pub response: String,
    pub session_id: String,
}

/// Build the application router (without tracing/CORS layers).
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/invocations", post(invoke))
        .route("/invocations/:session_id", delete(clear_session))
        .route("/sessions", get(list_sessions))
        .with_state(state)
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn invoke(
    State(state): State<AppState>,
    Json(req): Json<InvocationRequest>,
) -> Result<Json<InvocationResponse>, ApiError> {
    let manager = state.manager()?;
    debug!(session = %req.session_id, "invocation");

    let response = manager.send_message(&req.session_id, &req.message).await?;
    Ok(Json(InvocationResponse {
        response,
        session_id: req.session_id,
    }))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.manager()?.clear_session(&session_id);
    Ok(Json(json!({ "status": "cleared" })))
}

async fn list_sessions(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let sessions = state.manager()?.list_sessions();
    Ok(Json(json!({ "sessions": sessions })))
}
