//! Request and response types for the HTTP endpoints.

use serde::{Deserialize, Serialize};

/// Request body for POST /admin_login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Response for POST /admin_login and a successful POST /learn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Message describing the result.
    pub message: String,
}

impl StatusMessage {
    /// Create a success response.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Create a failure response.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Request body for POST /ask.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Response for POST /ask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// The model's answer, verbatim.
    pub answer: String,
}

/// Response for GET /health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Number of entries in the knowledge base.
    pub knowledge_entries: usize,
    /// Whether the generation service is configured.
    pub generation_ready: bool,
}
