use apipub_core::{ErrorCategory, ReconcileError, StoreError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Errors returned by the lifecycle and documentation endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is not a lifecycle request.
    #[error("Invalid lifecycle request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
            Self::Reconcile(e) => match e.category() {
                ErrorCategory::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCategory::NotFound | ErrorCategory::Remote => StatusCode::BAD_GATEWAY,
                ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
