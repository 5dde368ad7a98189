//! Tutor HTTP server with axum router and graceful shutdown.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, get_service, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use super::error::ServerError;
use super::handlers::{get_health, post_admin_login, post_ask, post_learn, AppState};
use crate::config::ServerConfig;
use crate::tutor::Tutor;

/// HTTP server for the tutor API and pages.
pub struct TutorServer {
    /// Server configuration.
    config: ServerConfig,
    /// Application state shared across handlers.
    state: AppState,
    /// Triggers graceful shutdown.
    cancel: CancellationToken,
}

impl TutorServer {
    /// Create a new server with default configuration.
    #[must_use]
    pub fn new(tutor: Tutor) -> Self {
        Self {
            config: ServerConfig::default(),
            state: AppState::new(tutor),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the server configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Token that stops the server when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Build the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let pages = &self.config.pages_dir;
        let router = Router::new()
            .route("/admin_login", post(post_admin_login))
            .route("/learn", post(post_learn))
            .route("/ask", post(post_ask))
            .route("/health", get(get_health))
            .route(
                "/",
                get_service(ServeFile::new(pages.join("index.html"))),
            )
            .route(
                "/admin",
                get_service(ServeFile::new(pages.join("admin.html"))),
            )
            .with_state(self.state.clone())
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .layer(TraceLayer::new_for_http());

        if self.config.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server, binding to the configured address.
    ///
    /// The server will run until the cancellation token is triggered,
    /// at which point it will perform a graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::BindError {
                address: addr.clone(),
                source: e,
            })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if serving fails.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let cancel = self.cancel.clone();
        let app = self.build_router();

        match listener.local_addr() {
            Ok(local) => tracing::info!(address = %local, "Starting tutor server"),
            Err(_) => tracing::info!(address = %self.address(), "Starting tutor server"),
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("Tutor server shutting down gracefully");
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::ai::GenerationBackend;
    use crate::config::DEFAULT_PORT;
    use crate::knowledge::KnowledgeStore;

    fn tutor() -> Tutor {
        Tutor::new(KnowledgeStore::new(), GenerationBackend::unavailable("test"))
    }

    #[test]
    fn test_tutor_server_address() {
        let server = TutorServer::new(tutor());
        assert_eq!(server.address(), format!("0.0.0.0:{DEFAULT_PORT}"));
    }

    #[test]
    fn test_tutor_server_with_config() {
        let server = TutorServer::new(tutor()).with_config(ServerConfig {
            port: 8080,
            host: "127.0.0.1".to_string(),
            cors_permissive: false,
            pages_dir: PathBuf::from("/srv/pages"),
            max_upload_bytes: 1024,
        });

        assert_eq!(server.address(), "127.0.0.1:8080");
        assert!(!server.config.cors_permissive);
        assert_eq!(server.config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_build_router() {
        let server = TutorServer::new(tutor());
        let _router = server.build_router();
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let server = TutorServer::new(tutor());
        let token = server.cancel_token();
        token.cancel();
        assert!(server.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_run_reports_bind_error() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let server = TutorServer::new(tutor()).with_config(ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..ServerConfig::default()
        });

        let result = server.run().await;
        assert!(matches!(result, Err(ServerError::BindError { .. })));
    }
}
