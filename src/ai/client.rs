//! Multi-provider client for the text generation service.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, RequestBuilder};
use thiserror::Error;

use crate::config::{AiConfig, ProviderKind};

/// Build an HTTP client with the configured timeouts.
fn build_http_client(config: &AiConfig) -> Result<Client, AiError> {
    Client::builder()
        .connect_timeout(config.connect_timeout())
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| AiError::ClientBuild(e.to_string()))
}

/// An image to be described by the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// MIME type reported by the upload, e.g. `image/png`.
    pub mime_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

impl ImageInput {
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    fn base64_data(&self) -> String {
        BASE64.encode(&self.data)
    }
}

/// Errors from generation service operations.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("API key not configured (env: {0})")]
    MissingApiKey(String),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("API request failed: {0}")]
    RequestFailed(String),
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("Generation request timed out")]
    Timeout,
}

/// Trait for text generation providers.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Generate a text response for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;

    /// Generate a text response for a prompt accompanied by an image.
    async fn generate_with_image(&self, prompt: &str, image: &ImageInput)
        -> Result<String, AiError>;
}

/// Send a request once and decode the JSON body of a successful response.
async fn send_json(request: RequestBuilder) -> Result<serde_json::Value, AiError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            AiError::Timeout
        } else {
            AiError::RequestFailed(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(AiError::RequestFailed(format!("HTTP {status}: {text}")));
    }

    response
        .json()
        .await
        .map_err(|e| AiError::ParseError(e.to_string()))
}

/// Gemini API provider.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    #[must_use]
    pub fn new(
        client: Client,
        base_url: String,
        api_key: String,
        model: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
            max_tokens,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_parts(&self, parts: serde_json::Value) -> Result<String, AiError> {
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": parts
            }],
            "generationConfig": {
                "maxOutputTokens": self.max_tokens
            }
        });

        let json = send_json(
            self.client
                .post(self.url())
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&body),
        )
        .await?;

        extract_gemini_text(&json)
    }
}

/// Concatenate the text parts of the first Gemini candidate.
fn extract_gemini_text(json: &serde_json::Value) -> Result<String, AiError> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| AiError::ParseError("No text in Gemini response".to_string()))?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        return Err(AiError::ParseError("No text in Gemini response".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.generate_parts(serde_json::json!([{ "text": prompt }]))
            .await
    }

    async fn generate_with_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, AiError> {
        self.generate_parts(serde_json::json!([
            { "text": prompt },
            {
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": image.base64_data()
                }
            }
        ]))
        .await
    }
}

/// Claude API provider.
#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeProvider {
    /// Create a new Claude provider.
    #[must_use]
    pub fn new(
        client: Client,
        base_url: String,
        api_key: String,
        model: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
            max_tokens,
        }
    }

    async fn generate_content(&self, content: serde_json::Value) -> Result<String, AiError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{
                "role": "user",
                "content": content
            }]
        });

        let json = send_json(
            self.client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("Content-Type", "application/json")
                .json(&body),
        )
        .await?;

        json["content"][0]["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AiError::ParseError("No text in Claude response".to_string()))
    }
}

#[async_trait]
impl AiProvider for ClaudeProvider {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.generate_content(serde_json::json!(prompt)).await
    }

    async fn generate_with_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, AiError> {
        self.generate_content(serde_json::json!([
            {
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": image.mime_type,
                    "data": image.base64_data()
                }
            },
            { "type": "text", "text": prompt }
        ]))
        .await
    }
}

/// Provider enum for dispatch.
#[derive(Debug, Clone)]
pub enum Provider {
    Gemini(GeminiProvider),
    Claude(ClaudeProvider),
}

#[async_trait]
impl AiProvider for Provider {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        match self {
            Self::Gemini(p) => p.generate(prompt).await,
            Self::Claude(p) => p.generate(prompt).await,
        }
    }

    async fn generate_with_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, AiError> {
        match self {
            Self::Gemini(p) => p.generate_with_image(prompt, image).await,
            Self::Claude(p) => p.generate_with_image(prompt, image).await,
        }
    }
}

/// Configured client for the generation service.
#[derive(Debug, Clone)]
pub struct AiClient {
    provider: Provider,
    config: AiConfig,
}

impl AiClient {
    /// Create client from configuration, reading the API key from the
    /// configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AiError::MissingApiKey` if the configured API key environment
    /// variable is not set or empty, or `AiError::ClientBuild` if the HTTP
    /// client cannot be built.
    pub fn from_config(config: AiConfig) -> Result<Self, AiError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AiError::MissingApiKey(config.api_key_env.clone()))?;
        Self::with_api_key(config, api_key)
    }

    /// Create client from configuration with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns `AiError::ClientBuild` if the HTTP client cannot be built.
    pub fn with_api_key(config: AiConfig, api_key: String) -> Result<Self, AiError> {
        let client = build_http_client(&config)?;

        let provider = match config.provider {
            ProviderKind::Gemini => Provider::Gemini(GeminiProvider::new(
                client,
                config.base_url.clone(),
                api_key,
                config.model.clone(),
                config.max_tokens,
            )),
            ProviderKind::Claude => Provider::Claude(ClaudeProvider::new(
                client,
                config.base_url.clone(),
                api_key,
                config.model.clone(),
                config.max_tokens,
            )),
        };

        Ok(Self { provider, config })
    }

    /// Get the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get the provider kind.
    #[must_use]
    pub fn provider_kind(&self) -> &ProviderKind {
        &self.config.provider
    }
}

#[async_trait]
impl AiProvider for AiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.provider.generate(prompt).await
    }

    async fn generate_with_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, AiError> {
        self.provider.generate_with_image(prompt, image).await
    }
}
