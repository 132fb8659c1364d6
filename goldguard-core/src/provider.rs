//! Provider abstraction for generative backends.
//!
//! A [`Provider`] turns prompts into text and, optionally, text into
//! embedding vectors. Metrics resolve providers by name through the registry
//! and never construct them directly, so swapping a live backend for a
//! deterministic stand-in is a registration change, not a code change.
//!
//! # Example
//!
//! ```ignore
//! use goldguard_core::provider::{GenerateRequest, Provider};
//!
//! async fn ask(provider: &dyn Provider) -> String {
//!     let request = GenerateRequest::new("claude-sonnet-4-20250514", "Say hello")
//!         .temperature(0.0);
//!     provider.generate(request).await.unwrap().text
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A text completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub model: String,
    #[serde(default)]
    pub usage: Usage,
}

/// An embedding request for one or more input texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub model: String,
    pub inputs: Vec<String>,
}

impl EmbedRequest {
    pub fn new(model: impl Into<String>, inputs: Vec<String>) -> Self {
        Self {
            model: model.into(),
            inputs,
        }
    }
}

/// Embedding vectors, one per input, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub model: String,
    #[serde(default)]
    pub usage: Usage,
}

/// Token counts reported by a provider for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Per-million-token prices for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl Pricing {
    /// Dollar cost of `usage` under this price sheet.
    pub fn calculate(&self, usage: &Usage) -> f64 {
        (usage.input_tokens as f64 * self.input_per_million
            + usage.output_tokens as f64 * self.output_per_million)
            / 1_000_000.0
    }
}

/// A generative backend.
///
/// # Required Methods
///
/// - [`name`](Provider::name): stable identifier used in configuration
/// - [`generate`](Provider::generate): text completion
///
/// # Optional Methods
///
/// - [`embed`](Provider::embed): embedding vectors; defaults to an
///   `Unsupported` error for completion-only backends
/// - [`pricing`](Provider::pricing): per-model price sheet; defaults to
///   `None`, in which case calls are costed at zero
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerateRequest) -> Result<Generation, ProviderError>;

    async fn embed(&self, _request: EmbedRequest) -> Result<EmbedResponse, ProviderError> {
        Err(ProviderError::Unsupported {
            provider: self.name().to_string(),
            capability: "embeddings".to_string(),
        })
    }

    fn pricing(&self, _model: &str) -> Option<Pricing> {
        None
    }
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("name", &self.name()).finish()
    }
}
