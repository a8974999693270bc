//! Configuration loading, validation, and capability resolution for CropSage.
//!
//! Loads configuration from `~/.cropsage/config.toml` with environment
//! variable overrides. Every backend (classifier, knowledge index,
//! generation) is resolved exactly once at startup to an explicit
//! enabled/disabled state — there is no silent fallback mid-request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.cropsage/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Classifier backend settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Knowledge index settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Generation backend settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Session store settings
    #[serde(default)]
    pub session: SessionConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("classifier", &self.classifier)
            .field("retrieval", &self.retrieval)
            .field("generation", &self.generation)
            .field("session", &self.session)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Model-serving endpoint (e.g. "http://localhost:9901"). Unset means
    /// the classifier backend is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Per-request timeout for inference calls.
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

fn default_classifier_timeout() -> u64 {
    30
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_classifier_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Path to the knowledge corpus file. Unset means retrieval is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_path: Option<String>,

    /// How many passages to retrieve per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            knowledge_path: None,
            top_k: default_top_k(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Which backend to use: "openai", "groq", "azure", "ollama",
    /// or "custom" (requires `api_url`).
    #[serde(default = "default_generation_backend")]
    pub backend: String,

    /// API key. `CROPSAGE_API_KEY`, `GROQ_API_KEY`, and `OPENAI_API_KEY`
    /// environment variables override this, in that order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override the backend base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_generation_backend() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: default_generation_backend(),
            api_key: None,
            api_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("backend", &self.backend)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of client sessions kept in memory. The least
    /// recently touched session is evicted when full.
    #[serde(default = "default_session_capacity")]
    pub capacity: usize,
}

fn default_session_capacity() -> usize {
    1024
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: default_session_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// The resolved startup-time state of one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Capability {
    Enabled,
    Disabled { reason: String },
}

impl Capability {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Capability::Enabled)
    }

    fn disabled(reason: impl Into<String>) -> Self {
        Capability::Disabled {
            reason: reason.into(),
        }
    }
}

/// What the process can actually do, decided once at startup and
/// queryable via the status operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub classifier: Capability,
    pub knowledge_index: Capability,
    pub generator: Capability,
}

impl AppConfig {
    /// Load configuration from the default path (~/.cropsage/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `CROPSAGE_API_KEY`, `GROQ_API_KEY`, `OPENAI_API_KEY` — generation key
    /// - `CROPSAGE_MODEL` — generation model
    /// - `CROPSAGE_CLASSIFIER_URL` — classifier endpoint
    /// - `CROPSAGE_KNOWLEDGE_PATH` — knowledge corpus file
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.generation.api_key.is_none() {
            config.generation.api_key = std::env::var("CROPSAGE_API_KEY")
                .ok()
                .or_else(|| std::env::var("GROQ_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("CROPSAGE_MODEL") {
            config.generation.model = model;
        }

        if let Ok(endpoint) = std::env::var("CROPSAGE_CLASSIFIER_URL") {
            config.classifier.endpoint = Some(endpoint);
        }

        if let Ok(path) = std::env::var("CROPSAGE_KNOWLEDGE_PATH") {
            config.retrieval.knowledge_path = Some(path);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cropsage")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.temperature < 0.0 || self.generation.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        if self.session.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "session.capacity must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Resolve each backend to an explicit enabled/disabled state.
    ///
    /// This runs once at startup; the answer never changes for the life of
    /// the process.
    pub fn capabilities(&self) -> Capabilities {
        let classifier = match &self.classifier.endpoint {
            Some(_) => Capability::Enabled,
            None => Capability::disabled("no classifier endpoint configured"),
        };

        let knowledge_index = match &self.retrieval.knowledge_path {
            Some(_) => Capability::Enabled,
            None => Capability::disabled("no knowledge corpus configured"),
        };

        let generator = if self.generation.backend == "ollama" {
            // Ollama runs locally and needs no key
            Capability::Enabled
        } else if self.generation.backend == "custom" && self.generation.api_url.is_none() {
            Capability::disabled("backend 'custom' requires generation.api_url")
        } else if self.generation.api_key.is_none() {
            Capability::disabled(format!(
                "no API key for generation backend '{}'",
                self.generation.backend
            ))
        } else {
            Capability::Enabled
        };

        Capabilities {
            classifier,
            knowledge_index,
            generator,
        }
    }

    /// Generate a default config TOML string (for `cropsage init`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            retrieval: RetrievalConfig::default(),
            generation: GenerationConfig::default(),
            session: SessionConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
