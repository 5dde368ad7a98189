//! Configuration file loader.

use std::path::{Path, PathBuf};

use super::AppConfig;

/// Environment variable that overrides the configured port.
pub const PORT_ENV: &str = "PORT";

/// Configuration loader that searches multiple locations.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Search paths in order of priority.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default search paths.
    #[must_use]
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        // 1. Current directory: .hsc-tutor.toml
        search_paths.push(PathBuf::from(".hsc-tutor.toml"));

        // 2. User config directory: ~/.config/hsc-tutor/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("hsc-tutor").join("config.toml"));
        }

        Self { search_paths }
    }

    /// Create a config loader with a specific config file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Load configuration from the first available file, or return defaults.
    ///
    /// The `PORT` environment variable, when set, overrides the file's port.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed,
    /// if the AI base URL is invalid, or if `PORT` is not a valid port.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let config = match self.find_config_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                Self::load_from_path(&path)?
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                AppConfig::default()
            }
        };

        let config = apply_port_override(config, std::env::var(PORT_ENV).ok().as_deref())?;
        validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path.
    fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the search paths for debugging.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find the first config file that exists.
    #[must_use]
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths.iter().find(|p| p.exists()).cloned()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Override the server port with a raw `PORT` value, if one is given.
///
/// # Errors
///
/// Returns `ConfigError::InvalidPort` if the value is not a valid port number.
pub fn apply_port_override(
    mut config: AppConfig,
    port: Option<&str>,
) -> Result<AppConfig, ConfigError> {
    if let Some(raw) = port {
        config.server.port = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
        tracing::debug!(port = config.server.port, "Port overridden from environment");
    }
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    url::Url::parse(&config.ai.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: config.ai.base_url.clone(),
        source: e,
    })?;
    Ok(())
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid AI base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Invalid port: {0}")]
    InvalidPort(String),
}
