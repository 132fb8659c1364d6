//! Offline hash-bucket embeddings.
//!
//! No network, no credentials, no model weights: tokens are FNV-1a hashed
//! into a fixed number of signed buckets and the vector is L2-normalized.
//! The result is stable across runs and platforms, which is what the
//! default `semantic` metric needs: texts that share wording land close
//! together, and CI never flakes on a remote embedding endpoint.

use async_trait::async_trait;

use goldguard_core::error::ProviderError;
use goldguard_core::provider::{
    EmbedRequest, EmbedResponse, GenerateRequest, Generation, Provider, Usage,
};

/// Embedding vector width.
pub const DIMENSIONS: usize = 256;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Deterministic, dependency-free embedding provider registered as
/// `hash-embed`. Generation is unsupported.
pub struct HashEmbedProvider;

#[async_trait]
impl Provider for HashEmbedProvider {
    fn name(&self) -> &str {
        "hash-embed"
    }

    async fn generate(&self, _request: GenerateRequest) -> Result<Generation, ProviderError> {
        Err(ProviderError::Unsupported {
            provider: self.name().to_string(),
            capability: "generation".to_string(),
        })
    }

    async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, ProviderError> {
        let embeddings = request.inputs.iter().map(|text| embed_text(text)).collect();
        Ok(EmbedResponse {
            embeddings,
            model: "hash-embed".to_string(),
            usage: Usage::default(),
        })
    }
}

/// Hash every token into a signed bucket, then L2-normalize.
pub(crate) fn embed_text(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; DIMENSIONS];

    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let hash = fnv1a(&token.to_lowercase());
        let bucket = (hash % DIMENSIONS as u64) as usize;
        // Sign bit comes from the upper half of the hash.
        let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }

    l2_normalize(&mut vector);
    vector
}

fn fnv1a(token: &str) -> u64 {
    token
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
