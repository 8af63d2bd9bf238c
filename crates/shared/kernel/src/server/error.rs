//! Uniform error payload for HTTP handlers.
//!
//! Every failing request answers with the same envelope:
//!
//! ```json
//! { "statusCode": 400, "error": "Bad Request", "message": "...", "data": { ... } }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_derive::api_model;
use serde_json::Value;
use std::borrow::Cow;

#[api_model]
#[derive(Clone, PartialEq)]
pub struct ErrorBody {
    /// HTTP status code
    pub status_code: u16,
    /// Canonical reason phrase of the status
    pub error: String,
    /// Human-readable message or a dotted message key (`group.notFound`)
    pub message: String,
    /// Structured details such as validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_owned(),
            message: message.into().into_owned(),
            data: None,
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Internal errors never leak their cause; callers log it instead.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred")
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
