use folio_derive::api_model;
use std::borrow::Cow;
use std::fmt;

/// One field-level violation, addressed by a dotted path (`layouts.edit[0][1].size`).
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

/// Every violation found in one request, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue { path: path.into(), message: message.into() });
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// `Ok(value)` when nothing was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", issue.path, issue.message)?;
        }
        Ok(())
    }
}

/// Error types of the content manager slice.
#[folio_derive::folio_error]
pub enum ContentManagerError {
    /// Unknown model or entry; `message` is the client-facing key (`group.notFound`).
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Validation failed{}: {issues}", format_context(.context))]
    Validation { issues: ValidationErrors, context: Option<Cow<'static, str>> },

    /// Unreadable request body.
    #[error("Bad request{}: {message}", format_context(.context))]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Declared models are inconsistent; raised while the slice initializes.
    #[error("Invalid schema{}: {message}", format_context(.context))]
    Schema { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("State error{}: {source}", format_context(.context))]
    State {
        source: folio_kernel::server::ApiStateError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal content manager error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ContentManagerError {
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest { message: message.into(), context: None }
    }

    pub fn schema(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Schema { message: message.into(), context: None }
    }
}

impl From<ValidationErrors> for ContentManagerError {
    fn from(issues: ValidationErrors) -> Self {
        Self::Validation { issues, context: None }
    }
}

#[cfg(feature = "server")]
mod response {
    use super::ContentManagerError;
    use axum::response::{IntoResponse, Response};
    use folio_kernel::server::ErrorBody;
    use serde_json::json;

    impl IntoResponse for ContentManagerError {
        fn into_response(self) -> Response {
            let body = match self {
                Self::NotFound { message, .. } => ErrorBody::not_found(message),
                Self::Validation { issues, .. } => ErrorBody::bad_request("Bad Request").with_data(
                    json!({ "name": "validationError", "errors": issues.issues() }),
                ),
                Self::BadRequest { message, .. } => ErrorBody::bad_request(message),
                other => {
                    tracing::error!(error = %other, "Content manager request failed");
                    ErrorBody::internal()
                },
            };
            body.into_response()
        }
    }
}
