//! OpenAI-compatible generation backend.
//!
//! Works with: OpenAI, Groq, Azure OpenAI, Ollama, and any endpoint
//! exposing a `/chat/completions` route. The prompt is already fully
//! composed upstream, so every request is a single user message and the
//! backend's text comes back verbatim.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use cropsage_config::GenerationConfig;
use cropsage_core::Generator;
use cropsage_core::error::GenerationError;

/// How the API key travels. Azure uses an `api-key` header; everyone else
/// uses a bearer token.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AuthStyle {
    Bearer,
    ApiKeyHeader,
}

pub struct OpenAiCompatGenerator {
    name: String,
    /// Full URL of the chat-completions route, query string included.
    completions_url: String,
    api_key: String,
    auth: AuthStyle,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatGenerator {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        config: &GenerationConfig,
    ) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        Self::with_url(
            name,
            format!("{base}/chat/completions"),
            api_key,
            AuthStyle::Bearer,
            config,
        )
    }

    fn with_url(
        name: impl Into<String>,
        completions_url: String,
        api_key: impl Into<String>,
        auth: AuthStyle,
        config: &GenerationConfig,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            completions_url,
            api_key: api_key.into(),
            auth,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        }
    }

    /// OpenAI (convenience constructor).
    pub fn openai(api_key: impl Into<String>, config: &GenerationConfig) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, config)
    }

    /// Groq (convenience constructor).
    pub fn groq(api_key: impl Into<String>, config: &GenerationConfig) -> Self {
        Self::new("groq", "https://api.groq.com/openai/v1", api_key, config)
    }

    /// Azure OpenAI — deployment-scoped URL and `api-key` header auth.
    pub fn azure(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        config: &GenerationConfig,
    ) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let url = format!(
            "{endpoint}/openai/deployments/{}/chat/completions?api-version=2025-01-01-preview",
            config.model
        );
        Self::with_url("azure", url, api_key, AuthStyle::ApiKeyHeader, config)
    }

    /// Ollama — local, no real key needed.
    pub fn ollama(base_url: Option<&str>, config: &GenerationConfig) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama",
            config,
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            AuthStyle::Bearer => {
                request.header("Authorization", format!("Bearer {}", self.api_key))
            }
            AuthStyle::ApiKeyHeader => request.header("api-key", &self.api_key),
        }
    }

    fn map_send_error(e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(e.to_string())
        } else {
            GenerationError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl Generator for OpenAiCompatGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        debug!(backend = %self.name, model = %self.model, "Sending generation request");

        let response = self
            .authorize(self.client.post(&self.completions_url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GenerationError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(GenerationError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Generation backend returned error");
            return Err(GenerationError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| GenerationError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        Ok(choice.message.content.unwrap_or_default())
    }

    async fn health_check(&self) -> Result<bool, GenerationError> {
        // The models route lives next to chat/completions on every
        // OpenAI-compatible backend.
        let url = self
            .completions_url
            .split("/chat/completions")
            .next()
            .map(|base| format!("{base}/models"))
            .unwrap_or_else(|| self.completions_url.clone());

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Ok(response.status().is_success())
    }
}

// --- API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}
