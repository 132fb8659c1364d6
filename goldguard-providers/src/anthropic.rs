//! Anthropic messages API provider.
//!
//! # Example
//!
//! ```ignore
//! use goldguard_providers::AnthropicProvider;
//!
//! let provider = AnthropicProvider::new(); // reads ANTHROPIC_API_KEY
//! let provider = AnthropicProvider::with_base_url("http://localhost:8080");
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use goldguard_core::error::ProviderError;
use goldguard_core::provider::{GenerateRequest, Generation, Pricing, Provider, Usage};

/// Default Anthropic API base URL.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

// ────────────────────────────────────────────────────────────────────────────
// Anthropic API Types
// ────────────────────────────────────────────────────────────────────────────

/// Request body for `/v1/messages`.
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// Response from `/v1/messages`.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl From<MessagesResponse> for Generation {
    fn from(response: MessagesResponse) -> Self {
        let text: String = response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();
        Generation {
            text,
            model: response.model,
            usage: Usage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AnthropicProvider
// ────────────────────────────────────────────────────────────────────────────

/// Text generation through the Anthropic messages API, registered as
/// `anthropic`.
///
/// Without an API key the provider stays usable: `generate` logs a warning
/// and returns a deterministic `[anthropic placeholder]` response, so
/// snapshot plumbing can be exercised offline. Embeddings are unsupported.
pub struct AnthropicProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Read `ANTHROPIC_API_KEY` and optional `ANTHROPIC_API_URL`.
    pub fn new() -> Self {
        let base_url =
            std::env::var("ANTHROPIC_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at a custom base URL, keeping the env credentials.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn placeholder(&self, request: &GenerateRequest) -> Generation {
        Generation {
            text: format!("[anthropic placeholder] {}", request.prompt),
            model: request.model.clone(),
            usage: Usage::default(),
        }
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<Generation, ProviderError> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("ANTHROPIC_API_KEY not set, returning placeholder response");
            return Ok(self.placeholder(&request));
        };

        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.prompt,
            }],
            system: request.system,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request {
                provider: "anthropic".to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Response {
                provider: "anthropic".to_string(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let parsed: MessagesResponse =
            response.json().await.map_err(|e| ProviderError::Response {
                provider: "anthropic".to_string(),
                message: e.to_string(),
            })?;

        Ok(parsed.into())
    }

    fn pricing(&self, model: &str) -> Option<Pricing> {
        // Per-million-token prices by model family.
        if model.contains("opus") {
            Some(Pricing {
                input_per_million: 15.0,
                output_per_million: 75.0,
            })
        } else if model.contains("sonnet") {
            Some(Pricing {
                input_per_million: 3.0,
                output_per_million: 15.0,
            })
        } else if model.contains("haiku") {
            Some(Pricing {
                input_per_million: 0.8,
                output_per_million: 4.0,
            })
        } else {
            None
        }
    }
}
