//! Embedding similarity.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::MetricOptions;
use crate::error::ScoringError;
use crate::metric::{InitContext, Metric, Score, ScoreInput, Scorer};
use crate::provider::{EmbedRequest, Provider};

/// Provider used when neither the metric options nor the config name one.
const DEFAULT_PROVIDER: &str = "hash-embed";

/// Scores the cosine similarity between embeddings of the gold and fresh
/// answers, embedded in a single provider call.
pub struct SemanticMetric;

#[async_trait]
impl Metric for SemanticMetric {
    fn name(&self) -> &str {
        "semantic"
    }

    async fn init(
        &self,
        options: &MetricOptions,
        ctx: &InitContext<'_>,
    ) -> Result<Box<dyn Scorer>, ScoringError> {
        let name = options.provider.as_deref().unwrap_or(DEFAULT_PROVIDER);
        let provider = ctx.registry.provider(name)?;
        let model = options.model.clone().unwrap_or_default();
        Ok(Box::new(SemanticScorer { provider, model }))
    }
}

struct SemanticScorer {
    provider: Arc<dyn Provider>,
    /// Embedding model; empty means the provider's default.
    model: String,
}

#[async_trait]
impl Scorer for SemanticScorer {
    async fn score(&self, input: &ScoreInput<'_>) -> Result<Score, ScoringError> {
        let request = EmbedRequest::new(
            &self.model,
            vec![input.gold.to_string(), input.fresh.to_string()],
        );
        let response = self.provider.embed(request).await?;

        let [gold, fresh] = response.embeddings.as_slice() else {
            return Err(ScoringError::EmbeddingCount {
                got: response.embeddings.len(),
            });
        };

        let cost_usd = self
            .provider
            .pricing(&response.model)
            .map(|p| p.calculate(&response.usage))
            .unwrap_or(0.0);

        Ok(Score {
            value: cosine_similarity(gold, fresh),
            cost_usd,
        })
    }
}

/// Cosine similarity over f32 vectors, accumulated in f64. Zero-norm or
/// mismatched-length inputs score 0.0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
