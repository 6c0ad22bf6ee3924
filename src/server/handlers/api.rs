//! Operational endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::super::AppState;
use super::api_types::ErrorBody;

/// Health check for container orchestration. Reports 503 when the store
/// cannot be reached.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.news.store().ping().await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ErrorBody::response(StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}
