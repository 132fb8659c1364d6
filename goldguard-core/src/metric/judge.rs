//! Rubric-guided judging by a second model.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::MetricOptions;
use crate::error::ScoringError;
use crate::metric::{InitContext, Metric, Score, ScoreInput, Scorer};
use crate::provider::{GenerateRequest, Provider};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_RUBRIC: &str = ".goldguard/rubrics/default.md";

/// Asks a judge model to grade the fresh answer against a rubric, with the
/// gold answer shown for reference, and extracts its 0-10 overall score.
///
/// The rubric document is read once at init, so a missing rubric fails the
/// evaluation before any provider call is made.
pub struct JudgeMetric;

#[async_trait]
impl Metric for JudgeMetric {
    fn name(&self) -> &str {
        "judge"
    }

    async fn init(
        &self,
        options: &MetricOptions,
        ctx: &InitContext<'_>,
    ) -> Result<Box<dyn Scorer>, ScoringError> {
        let provider_name = options
            .provider
            .as_deref()
            .unwrap_or(&ctx.config.defaults.provider);
        let provider = ctx.registry.provider(provider_name)?;

        let model = options
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let rubric_path = options
            .rubric_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RUBRIC));
        let rubric = tokio::fs::read_to_string(&rubric_path)
            .await
            .map_err(|source| ScoringError::Rubric {
                path: rubric_path,
                source,
            })?;

        Ok(Box::new(JudgeScorer {
            provider,
            model,
            rubric,
        }))
    }
}

struct JudgeScorer {
    provider: Arc<dyn Provider>,
    model: String,
    rubric: String,
}

#[async_trait]
impl Scorer for JudgeScorer {
    async fn score(&self, input: &ScoreInput<'_>) -> Result<Score, ScoringError> {
        let prompt = build_prompt(&self.rubric, input);
        let request = GenerateRequest::new(&self.model, prompt).temperature(0.0);
        let generation = self.provider.generate(request).await?;

        let value = extract_overall_score(&generation.text)
            .ok_or(ScoringError::JudgeFormat)?
            .clamp(0.0, 10.0);

        let cost_usd = self
            .provider
            .pricing(&generation.model)
            .map(|p| p.calculate(&generation.usage))
            .unwrap_or(0.0);

        Ok(Score { value, cost_usd })
    }
}

fn build_prompt(rubric: &str, input: &ScoreInput<'_>) -> String {
    format!(
        "You are an impartial judge evaluating the quality of an AI response.\n\
         \n\
         # Rubric\n\
         {rubric}\n\
         \n\
         # Original Query\n\
         {prompt}\n\
         \n\
         # Gold Standard Response (for reference)\n\
         {gold}\n\
         \n\
         # Response to Evaluate\n\
         {fresh}\n\
         \n\
         # Evaluation\n\
         Score the response against each rubric criterion, then conclude with:\n\
         - one line per criterion: \"<criterion>: <score> - <short justification>\"\n\
         - a line \"Overall Score: <number>\" where <number> is from 0 to 10\n\
         - a line \"Summary: <one sentence>\"\n",
        rubric = rubric,
        prompt = input.prompt,
        gold = input.gold,
        fresh = input.fresh,
    )
}

/// Find the first `Overall Score: <number>` line, ignoring case and leading
/// markdown decoration. `None` when no line parses.
fn extract_overall_score(text: &str) -> Option<f64> {
    const LABEL: &str = "overall score:";

    for line in text.lines() {
        let trimmed = line.trim().trim_start_matches(['#', '*', '-', ' ']);
        let Some(head) = trimmed.get(..LABEL.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(LABEL) {
            continue;
        }

        let number: String = trimmed[LABEL.len()..]
            .trim_start_matches(['*', '[', ' '])
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if let Ok(value) = number.parse::<f64>() {
            return Some(value);
        }
    }
    None
}
