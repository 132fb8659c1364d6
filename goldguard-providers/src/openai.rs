//! OpenAI chat completions and embeddings provider.
//!
//! # Example
//!
//! ```ignore
//! use goldguard_providers::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new(); // reads OPENAI_API_KEY
//! let provider = OpenAiProvider::with_base_url("http://localhost:8080");
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use goldguard_core::error::ProviderError;
use goldguard_core::provider::{
    EmbedRequest, EmbedResponse, GenerateRequest, Generation, Pricing, Provider, Usage,
};

use crate::hash::embed_text;

/// Default OpenAI API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";

// ────────────────────────────────────────────────────────────────────────────
// OpenAI API Types
// ────────────────────────────────────────────────────────────────────────────

/// Request body for `/v1/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAiMessage {
    pub role: String,
    pub content: String,
}

/// Response from `/v1/chat/completions`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
    pub model: String,
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: OpenAiMessage,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAiUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl From<ChatCompletionResponse> for Generation {
    fn from(response: ChatCompletionResponse) -> Self {
        let usage = response.usage.unwrap_or_default();
        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        Generation {
            text,
            model: response.model,
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        }
    }
}

/// Request body for `/v1/embeddings`.
#[derive(Debug, Serialize)]
pub struct EmbeddingsRequest {
    pub model: String,
    pub input: Vec<String>,
}

/// Response from `/v1/embeddings`.
#[derive(Debug, Deserialize)]
pub struct EmbeddingsResponse {
    pub data: Vec<EmbeddingDatum>,
    pub model: String,
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingDatum {
    pub embedding: Vec<f32>,
    pub index: usize,
}

impl From<EmbeddingsResponse> for EmbedResponse {
    fn from(mut response: EmbeddingsResponse) -> Self {
        // The API may return data out of order; index restores input order.
        response.data.sort_by_key(|datum| datum.index);
        let usage = response.usage.unwrap_or_default();
        EmbedResponse {
            embeddings: response.data.into_iter().map(|d| d.embedding).collect(),
            model: response.model,
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: 0,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAiProvider
// ────────────────────────────────────────────────────────────────────────────

/// Chat completions and embeddings through the OpenAI API, registered as
/// `openai`.
///
/// Without an API key the provider stays usable offline: `generate` returns
/// a deterministic `[openai placeholder]` response and `embed` falls back to
/// the same hash-bucket vectors as `hash-embed`, so semantic scoring keeps
/// producing stable numbers.
pub struct OpenAiProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Read `OPENAI_API_KEY` and optional `OPENAI_API_URL`.
    pub fn new() -> Self {
        let base_url =
            std::env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key: std::env::var("OPENAI_API_KEY")
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

    fn request_error(e: reqwest::Error) -> ProviderError {
        ProviderError::Request {
            provider: "openai".to_string(),
            message: e.to_string(),
        }
    }

    fn response_error(message: String) -> ProviderError {
        ProviderError::Response {
            provider: "openai".to_string(),
            message,
        }
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<Generation, ProviderError> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("OPENAI_API_KEY not set, returning placeholder response");
            return Ok(Generation {
                text: format!("[openai placeholder] {}", request.prompt),
                model: request.model,
                usage: Usage::default(),
            });
        };

        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(OpenAiMessage {
            role: "user".to_string(),
            content: request.prompt,
        });

        let body = ChatCompletionRequest {
            model: request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::response_error(format!("API returned {status}: {body}")));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Self::response_error(e.to_string()))?;
        Ok(parsed.into())
    }

    async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, ProviderError> {
        let model = if request.model.is_empty() {
            DEFAULT_EMBED_MODEL.to_string()
        } else {
            request.model.clone()
        };

        let Some(api_key) = &self.api_key else {
            tracing::warn!("OPENAI_API_KEY not set, returning hash-derived embeddings");
            return Ok(EmbedResponse {
                embeddings: request.inputs.iter().map(|text| embed_text(text)).collect(),
                model,
                usage: Usage::default(),
            });
        };

        let body = EmbeddingsRequest {
            model,
            input: request.inputs,
        };

        let url = format!("{}/v1/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::response_error(format!("API returned {status}: {body}")));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Self::response_error(e.to_string()))?;
        Ok(parsed.into())
    }

    fn pricing(&self, model: &str) -> Option<Pricing> {
        // Per-million-token prices by model family.
        if model.starts_with("gpt-4o-mini") {
            Some(Pricing {
                input_per_million: 0.15,
                output_per_million: 0.6,
            })
        } else if model.starts_with("gpt-4o") {
            Some(Pricing {
                input_per_million: 2.5,
                output_per_million: 10.0,
            })
        } else if model.starts_with("text-embedding-3-small") {
            Some(Pricing {
                input_per_million: 0.02,
                output_per_million: 0.0,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyless() -> OpenAiProvider {
        OpenAiProvider {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    #[test]
    fn parse_chat_response_takes_the_first_choice() {
        let json = r#"{
            "id": "chatcmpl-01",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Hello!"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let generation: Generation = response.into();

        assert_eq!(generation.text, "Hello!");
        assert_eq!(generation.usage.input_tokens, 9);
        assert_eq!(generation.usage.output_tokens, 3);
    }

    #[test]
    fn parse_embeddings_response_restores_input_order() {
        let json = r#"{
            "object": "list",
            "model": "text-embedding-3-small",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ],
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }"#;

        let response: EmbeddingsResponse = serde_json::from_str(json).unwrap();
        let embed: EmbedResponse = response.into();

        assert_eq!(embed.embeddings[0], vec![1.0, 0.0]);
        assert_eq!(embed.embeddings[1], vec![0.0, 1.0]);
        assert_eq!(embed.usage.input_tokens, 4);
    }

    #[tokio::test]
    async fn keyless_generate_returns_a_marked_placeholder() {
        let generation = keyless()
            .generate(GenerateRequest::new("gpt-4o-mini", "Say hello"))
            .await
            .unwrap();

        assert!(generation.text.starts_with("[openai placeholder]"));
    }

    #[tokio::test]
    async fn keyless_embed_falls_back_to_hash_vectors() {
        let response = keyless()
            .embed(EmbedRequest::new("", vec!["same text".into(), "same text".into()]))
            .await
            .unwrap();

        assert_eq!(response.model, DEFAULT_EMBED_MODEL);
        assert_eq!(response.embeddings[0], response.embeddings[1]);
        assert_eq!(response.embeddings[0], embed_text("same text"));
    }

    #[test]
    fn pricing_distinguishes_mini_from_full_gpt4o() {
        let provider = keyless();

        assert_eq!(provider.pricing("gpt-4o-mini").unwrap().input_per_million, 0.15);
        assert_eq!(provider.pricing("gpt-4o").unwrap().input_per_million, 2.5);
        assert!(provider.pricing("davinci").is_none());
    }

    #[tokio::test]
    #[ignore = "requires OPENAI_API_KEY and network access"]
    async fn integration_embed_hits_the_real_api() {
        let provider = OpenAiProvider::new();
        let response = provider
            .embed(EmbedRequest::new("", vec!["ready".into()]))
            .await
            .expect("embed should succeed");

        assert_eq!(response.embeddings.len(), 1);
        assert!(!response.embeddings[0].is_empty());
    }
}
