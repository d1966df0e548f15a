//! Error types for the store and the HTTP boundary.
//!
//! Every failure reaching a handler is rendered as `{"message": ...}`. Only
//! an unknown id gets 404 and only an undecodable body gets 400 (413 when it
//! exceeds the body limit); validation and backend failures share 500.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Failures raised by a `TodoStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field is missing or blank.
    #[error("todo validation failed: {0}")]
    Validation(String),

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document could not be encoded or decoded.
    #[error("store document is unreadable: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Failures returned from request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Can't find ToDo work.")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON with ill-typed fields is a validation failure.
            JsonRejection::JsonDataError(e) => {
                ApiError::Store(StoreError::Validation(e.body_text()))
            }
            other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                ApiError::PayloadTooLarge(other.body_text())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        } else {
            debug!(error = %self, %status, "request rejected");
        }
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
