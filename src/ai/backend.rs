//! Startup-resolved availability of the generation service.

use std::fmt;
use std::sync::Arc;

use super::client::{AiClient, AiProvider};
use crate::config::AiConfig;

/// Generation service as resolved once at startup.
///
/// A missing credential does not stop the server; every call that needs the
/// service reports the stored reason instead.
#[derive(Clone)]
pub enum GenerationBackend {
    /// A configured provider.
    Ready(Arc<dyn AiProvider>),
    /// The provider could not be configured.
    Unavailable { reason: String },
}

impl GenerationBackend {
    /// Resolve the backend from configuration.
    #[must_use]
    pub fn from_config(config: AiConfig) -> Self {
        let provider = config.provider.clone();
        match AiClient::from_config(config) {
            Ok(client) => {
                tracing::info!(provider = ?provider, model = client.model(), "Generation service configured");
                Self::Ready(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Generation service unavailable");
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Wrap an existing provider.
    #[must_use]
    pub fn ready(provider: Arc<dyn AiProvider>) -> Self {
        Self::Ready(provider)
    }

    /// Mark the service as unavailable.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether a provider is configured.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Get the provider, or the reason it is unavailable.
    ///
    /// # Errors
    ///
    /// Returns the configuration failure reason when no provider is configured.
    pub fn provider(&self) -> Result<&Arc<dyn AiProvider>, &str> {
        match self {
            Self::Ready(provider) => Ok(provider),
            Self::Unavailable { reason } => Err(reason.as_str()),
        }
    }
}

impl fmt::Debug for GenerationBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("GenerationBackend::Ready"),
            Self::Unavailable { reason } => f
                .debug_struct("GenerationBackend::Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_unavailable() {
        let config = AiConfig {
            api_key_env: "HSC_TUTOR_TEST_BACKEND_UNSET".to_string(),
            ..AiConfig::default()
        };
        let backend = GenerationBackend::from_config(config);

        assert!(!backend.is_ready());
        let reason = backend.provider().err().unwrap();
        assert!(reason.contains("HSC_TUTOR_TEST_BACKEND_UNSET"));
    }

    #[test]
    fn test_configured_key_is_ready() {
        std::env::set_var("HSC_TUTOR_TEST_BACKEND_KEY", "key");
        let config = AiConfig {
            api_key_env: "HSC_TUTOR_TEST_BACKEND_KEY".to_string(),
            ..AiConfig::default()
        };
        let backend = GenerationBackend::from_config(config);
        std::env::remove_var("HSC_TUTOR_TEST_BACKEND_KEY");

        assert!(backend.is_ready());
        assert_eq!(format!("{backend:?}"), "GenerationBackend::Ready");
    }

    #[test]
    fn test_unavailable_debug_shows_reason() {
        let backend = GenerationBackend::unavailable("no key");
        assert!(format!("{backend:?}").contains("no key"));
    }
}
