//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// AI provider kind.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Claude,
}

impl ProviderKind {
    /// Model used when the config does not name one.
    #[must_use]
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::Claude => "claude-sonnet-4-20250514",
        }
    }

    /// API base URL used when the config does not set one.
    #[must_use]
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Claude => "https://api.anthropic.com",
        }
    }

    /// API key environment variable used when the config does not set one.
    #[must_use]
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Claude => "ANTHROPIC_API_KEY",
        }
    }
}

/// Configuration for the generation service client.
///
/// `model`, `base_url` and `api_key_env` default per provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawAiConfig")]
pub struct AiConfig {
    /// Provider to use (gemini or claude).
    pub provider: ProviderKind,
    /// Model used for answers and image summaries.
    pub model: String,
    /// Maximum tokens in response.
    pub max_tokens: u32,
    /// Base URL for the API.
    pub base_url: String,
    /// Environment variable name for the API key.
    pub api_key_env: String,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Overall HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// `[ai]` table as written, before provider defaults are filled in.
#[derive(Deserialize)]
struct RawAiConfig {
    #[serde(default)]
    provider: ProviderKind,
    model: Option<String>,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    base_url: Option<String>,
    api_key_env: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

impl From<RawAiConfig> for AiConfig {
    fn from(raw: RawAiConfig) -> Self {
        let provider = raw.provider;
        Self {
            model: raw
                .model
                .unwrap_or_else(|| provider.default_model().to_string()),
            base_url: raw
                .base_url
                .unwrap_or_else(|| provider.default_base_url().to_string()),
            api_key_env: raw
                .api_key_env
                .unwrap_or_else(|| provider.default_api_key_env().to_string()),
            max_tokens: raw.max_tokens,
            connect_timeout_secs: raw.connect_timeout_secs,
            request_timeout_secs: raw.request_timeout_secs,
            provider,
        }
    }
}

impl AiConfig {
    /// Configuration for a provider with all of its defaults.
    #[must_use]
    pub fn for_provider(provider: ProviderKind) -> Self {
        Self::from(RawAiConfig {
            provider,
            model: None,
            max_tokens: default_max_tokens(),
            base_url: None,
            api_key_env: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        })
    }
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl AiConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::for_provider(ProviderKind::default())
    }
}

/// Default port, matching what hosting platforms usually expect.
pub const DEFAULT_PORT: u16 = 5000;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable permissive CORS.
    pub cors_permissive: bool,
    /// Directory holding `index.html` and `admin.html`.
    pub pages_dir: PathBuf,
    /// Maximum request body size, which bounds image uploads.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_permissive: true,
            pages_dir: PathBuf::from("static"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Tutor behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Environment variable holding the admin password.
    pub admin_password_env: String,
    /// Whether the admin may teach from uploaded images.
    pub image_learning: bool,
    /// Upper bound on a single generation call, in seconds.
    pub generation_timeout_secs: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            admin_password_env: "ADMIN_PASSWORD".to_string(),
            image_learning: true,
            generation_timeout_secs: 60,
        }
    }
}

impl TutorConfig {
    #[must_use]
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ai: AiConfig,
    pub tutor: TutorConfig,
}
