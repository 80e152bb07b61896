//! API errors and their HTTP mapping.
//!
//! Every error body is `{"error": "<text>"}`. Storage failures answer with a
//! fixed message per operation and log the underlying cause.

use axum::{
    extract::rejection::{BytesRejection, JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::repository::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed id or JSON body (400).
    #[error("{0}")]
    BadRequest(String),

    /// Update failed (404). The store error text is returned to the client.
    #[error(transparent)]
    NotFound(StoreError),

    /// Persistence operation failed (500).
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn storage(message: &'static str, source: StoreError) -> Self {
        Self::Storage { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Storage { message, source } => {
                tracing::error!(error = %source, "{message}");
            }
            other => tracing::debug!(error = %other, "request rejected"),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
