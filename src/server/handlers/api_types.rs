//! Response bodies shared by the JSON endpoints.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::services::NewsError;
use crate::store::StoreError;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn response(status: StatusCode, message: impl Into<String>) -> impl IntoResponse {
        (
            status,
            Json(ErrorBody {
                message: message.into(),
            }),
        )
    }
}

impl NewsError {
    pub fn status(&self) -> StatusCode {
        match self {
            NewsError::NotFound(_) => StatusCode::NOT_FOUND,
            NewsError::BadInput(_) => StatusCode::BAD_REQUEST,
            NewsError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            NewsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NewsError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        match &self {
            NewsError::NotFound(_) => tracing::debug!("{}", self),
            NewsError::BadInput(e) => tracing::debug!("Rejected request: {}", e),
            NewsError::Store(e) => tracing::error!("Store error: {}", e),
        }
        ErrorBody::response(status, self.to_string()).into_response()
    }
}
