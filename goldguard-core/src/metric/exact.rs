//! Exact string comparison.

use async_trait::async_trait;

use crate::config::MetricOptions;
use crate::error::ScoringError;
use crate::metric::{InitContext, Metric, Score, ScoreInput, Scorer};

/// Scores 1.0 when the fresh output matches the gold answer after trimming
/// surrounding whitespace, else 0.0.
pub struct ExactMetric;

#[async_trait]
impl Metric for ExactMetric {
    fn name(&self) -> &str {
        "exact"
    }

    async fn init(
        &self,
        _options: &MetricOptions,
        _ctx: &InitContext<'_>,
    ) -> Result<Box<dyn Scorer>, ScoringError> {
        Ok(Box::new(ExactScorer))
    }
}

struct ExactScorer;

#[async_trait]
impl Scorer for ExactScorer {
    async fn score(&self, input: &ScoreInput<'_>) -> Result<Score, ScoringError> {
        let value = if input.gold.trim() == input.fresh.trim() {
            1.0
        } else {
            0.0
        };
        Ok(Score::free(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(gold: &'a str, fresh: &'a str) -> ScoreInput<'a> {
        ScoreInput {
            prompt: "[\"hi\"]",
            gold,
            fresh,
        }
    }

    #[tokio::test]
    async fn identical_answers_score_one() {
        let score = ExactScorer.score(&input("hello", "hello")).await.unwrap();
        assert_eq!(score.value, 1.0);
        assert_eq!(score.cost_usd, 0.0);
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_ignored() {
        let score = ExactScorer.score(&input("hello", "  hello\n")).await.unwrap();
        assert_eq!(score.value, 1.0);
    }

    #[tokio::test]
    async fn different_answers_score_zero() {
        let score = ExactScorer.score(&input("hello", "goodbye")).await.unwrap();
        assert_eq!(score.value, 0.0);
    }

    #[tokio::test]
    async fn interior_whitespace_still_counts() {
        let score = ExactScorer.score(&input("a b", "a  b")).await.unwrap();
        assert_eq!(score.value, 0.0);
    }
}
