//! Request-level error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::ai::AiError;

/// Errors surfaced by tutor operations.
///
/// Every variant is handled at the request boundary and rendered as an
/// `{"error": ...}` body with a matching status code.
#[derive(Error, Debug)]
pub enum TutorError {
    /// Wrong or missing admin secret.
    #[error("{0}")]
    Auth(String),

    /// Missing question or missing learn content.
    #[error("{0}")]
    Validation(String),

    /// Generation service is not configured.
    #[error("Generation service not configured: {0}")]
    Configuration(String),

    /// The generation service failed.
    #[error("{action}: {source}")]
    Upstream {
        action: &'static str,
        #[source]
        source: AiError,
    },

    /// The request form could not be read, e.g. the body exceeded the size limit.
    #[error("Malformed form data: {message}")]
    Form { status: StatusCode, message: String },

    /// Feature disabled on this server.
    #[error("{0}")]
    Unsupported(String),
}

impl TutorError {
    /// Wrap a generation failure with what was being attempted.
    #[must_use]
    pub fn upstream(action: &'static str, source: AiError) -> Self {
        Self::Upstream { action, source }
    }

    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Form { status, .. } => *status,
        }
    }
}

impl IntoResponse for TutorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
