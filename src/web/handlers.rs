//! HTTP handlers for the tutor API.

use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use super::api::{AdminLoginRequest, AskRequest, AskResponse, HealthResponse, StatusMessage};
use crate::ai::ImageInput;
use crate::error::TutorError;
use crate::tutor::Tutor;

/// MIME type assumed when an upload does not declare one.
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tutor: Arc<Tutor>,
}

impl AppState {
    #[must_use]
    pub fn new(tutor: Tutor) -> Self {
        Self {
            tutor: Arc::new(tutor),
        }
    }
}

/// POST /admin_login - Check the admin password.
pub async fn post_admin_login(
    State(state): State<AppState>,
    body: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> (StatusCode, Json<StatusMessage>) {
    let password = body.ok().and_then(|Json(request)| request.password);

    if state.tutor.check_admin(password.as_deref()) {
        tracing::info!("Admin login succeeded");
        (
            StatusCode::OK,
            Json(StatusMessage::success("Login successful!")),
        )
    } else {
        tracing::warn!("Admin login failed");
        (
            StatusCode::UNAUTHORIZED,
            Json(StatusMessage::failure("Incorrect password.")),
        )
    }
}

/// Fields of the multipart form posted to /learn.
#[derive(Debug, Default)]
struct LearnForm {
    admin_pass: Option<String>,
    text_input: Option<String>,
    file: Option<ImageInput>,
}

impl LearnForm {
    async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "admin_pass" => form.admin_pass = Some(field.text().await?),
                "text_input" => {
                    form.text_input = Some(field.text().await?).filter(|t| !t.is_empty());
                }
                "file" => {
                    let mime_type = field
                        .content_type()
                        .unwrap_or(FALLBACK_MIME_TYPE)
                        .to_string();
                    let data = field.bytes().await?;
                    // Browsers send an empty part when no file was chosen.
                    if !data.is_empty() {
                        form.file = Some(ImageInput::new(mime_type, data.to_vec()));
                    }
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }
        Ok(form)
    }
}

/// POST /learn - Teach the tutor from text or an uploaded image.
///
/// The admin password is checked before anything else. When both a file and
/// text are sent, the file wins.
pub async fn post_learn(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StatusMessage>, TutorError> {
    // A request that is not a multipart form carries no admin password.
    let Ok(multipart) = multipart else {
        return Err(TutorError::Auth("Unauthorized Access".to_string()));
    };
    let form = LearnForm::read(multipart)
        .await
        .map_err(|e| TutorError::Form {
            status: e.status(),
            message: e.body_text(),
        })?;

    state.tutor.authorize(form.admin_pass.as_deref())?;

    if let Some(image) = form.file {
        let summary = state.tutor.learn_image(&image).await?;
        return Ok(Json(StatusMessage::success(format!(
            "Successfully learned from image. Model response: {summary}"
        ))));
    }

    match form.text_input {
        Some(text) => {
            state.tutor.learn_text(&text).await?;
            Ok(Json(StatusMessage::success("Learned from text successfully.")))
        }
        None => Err(TutorError::Validation("No content provided.".to_string())),
    }
}

/// POST /ask - Answer a question using the knowledge base.
pub async fn post_ask(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, TutorError> {
    let question = body
        .ok()
        .and_then(|Json(request)| request.question)
        .unwrap_or_default();

    let answer = state.tutor.ask(&question).await?;
    Ok(Json(AskResponse { answer }))
}

/// GET /health - Liveness plus knowledge base and configuration summary.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        knowledge_entries: state.tutor.store().len().await,
        generation_ready: state.tutor.backend().is_ready(),
    })
}
