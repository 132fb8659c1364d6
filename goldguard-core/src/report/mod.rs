//! Result reporting.
//!
//! Reporters observe finished evaluations; they never influence the verdict.
//! A reporter failure is logged and swallowed so a broken CI summary cannot
//! flip a passing run.

pub mod console;
pub mod github;

pub use console::ConsoleReporter;
pub use github::GitHubCheckReporter;

use async_trait::async_trait;
use serde::Serialize;

/// One metric's contribution to a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricScore {
    pub name: String,
    /// Raw score on the metric's own scale.
    pub value: f64,
    /// Whether the score landed inside the configured bounds.
    pub passed: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Whether this metric is binding under the `must-pass` policy.
    pub must_pass: bool,
    pub cost_usd: f64,
}

/// The full outcome of one guarded evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardResult {
    pub id: String,
    pub passed: bool,
    /// Per-metric scores, in resolution order. Empty on bootstrap.
    pub metrics: Vec<MetricScore>,
    /// Canonical serialization of the call's arguments.
    pub prompt: String,
    pub gold_answer: String,
    pub fresh_answer: String,
    pub duration_ms: u64,
    /// Total provider spend across all metrics.
    pub cost_usd: f64,
    /// True when this run recorded the first snapshot instead of scoring.
    pub bootstrapped: bool,
}

/// A registered result sink.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Stable name the reporter is configured under.
    fn name(&self) -> &str;

    async fn report(&self, result: &GuardResult) -> std::io::Result<()>;
}

#[cfg(test)]
pub(crate) fn sample_result() -> GuardResult {
    GuardResult {
        id: "greet".to_string(),
        passed: false,
        metrics: vec![
            MetricScore {
                name: "exact".to_string(),
                value: 1.0,
                passed: true,
                min: Some(1.0),
                max: None,
                must_pass: true,
                cost_usd: 0.0,
            },
            MetricScore {
                name: "semantic".to_string(),
                value: 0.85,
                passed: false,
                min: Some(0.92),
                max: None,
                must_pass: false,
                cost_usd: 0.0001,
            },
        ],
        prompt: "[\"hi\"]".to_string(),
        gold_answer: "hello".to_string(),
        fresh_answer: "hey".to_string(),
        duration_ms: 42,
        cost_usd: 0.0001,
        bootstrapped: false,
    }
}
